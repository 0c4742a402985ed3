use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::metrics::{ALL_METRICS, MetricKey};
use crate::report_export::ExportJob;

pub struct WorkbookReport {
    pub players: usize,
    pub metrics: usize,
    pub sessions: usize,
}

pub struct ExportProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

const SHEETS: usize = 3;

pub fn export_workbook_with_progress(
    job: &ExportJob,
    path: &Path,
    mut on_progress: impl FnMut(ExportProgress),
) -> Result<WorkbookReport> {
    let labels = job.language.labels();
    let metrics = ALL_METRICS
        .iter()
        .copied()
        .filter(|m| job.totals.iter().any(|t| t.metric == *m))
        .collect::<Vec<_>>();

    let mut current = 0usize;
    on_progress(ExportProgress {
        current,
        total: SHEETS,
        message: "Building averages".to_string(),
    });

    let averages_rows = averages_rows(job, &metrics);
    current += 1;
    on_progress(ExportProgress {
        current,
        total: SHEETS,
        message: "Building totals".to_string(),
    });

    let totals_rows = totals_rows(job, &metrics);
    current += 1;
    on_progress(ExportProgress {
        current,
        total: SHEETS,
        message: "Building sessions".to_string(),
    });

    let mut session_rows = vec![vec![
        Cell::Text("File".to_string()),
        Cell::Text(labels.date.to_string()),
        Cell::Text(labels.match_label.to_string()),
        Cell::Text("Rows".to_string()),
    ]];
    for session in &job.sessions {
        session_rows.push(vec![
            Cell::Text(session.file_name.clone()),
            Cell::Text(session.date.label(labels)),
            Cell::Text(session.match_key.display(labels)),
            Cell::Number(session.rows as f64),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Averages")?;
        write_rows(sheet, &averages_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Totals")?;
        write_rows(sheet, &totals_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Sessions")?;
        write_rows(sheet, &session_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    current += 1;
    on_progress(ExportProgress {
        current,
        total: SHEETS,
        message: "Workbook saved".to_string(),
    });
    tracing::info!(path = %path.display(), "workbook written");

    Ok(WorkbookReport {
        players: averages_rows.len().saturating_sub(1),
        metrics: metrics.len(),
        sessions: job.sessions.len(),
    })
}

fn header_row(first: &str, metrics: &[MetricKey], job: &ExportJob) -> Vec<Cell> {
    let mut row = vec![Cell::Text(first.to_string())];
    row.extend(
        metrics
            .iter()
            .map(|m| Cell::Text(m.label(job.language).to_string())),
    );
    row
}

fn averages_rows(job: &ExportJob, metrics: &[MetricKey]) -> Vec<Vec<Cell>> {
    let labels = job.language.labels();
    let mut rows = vec![header_row(labels.player, metrics, job)];
    for means in &job.means {
        let mut row = vec![Cell::Text(means.player.clone())];
        row.extend(metrics.iter().map(|m| match means.values.get(m) {
            Some(v) => Cell::Number(*v),
            None => Cell::Empty,
        }));
        rows.push(row);
    }
    rows
}

fn totals_rows(job: &ExportJob, metrics: &[MetricKey]) -> Vec<Vec<Cell>> {
    let labels = job.language.labels();
    let mut rows = vec![header_row(labels.player, metrics, job)];
    for means in &job.means {
        let mut row = vec![Cell::Text(means.player.clone())];
        row.extend(metrics.iter().map(|metric| {
            job.totals
                .iter()
                .find(|t| t.metric == *metric)
                .and_then(|t| t.totals.iter().find(|p| p.player == means.player))
                .map(|p| Cell::Number(p.total))
                .unwrap_or(Cell::Empty)
        }));
        rows.push(row);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match value {
                Cell::Text(text) => worksheet.write_string(r, c, text),
                Cell::Number(number) => worksheet.write_number(r, c, *number),
                Cell::Empty => continue,
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
