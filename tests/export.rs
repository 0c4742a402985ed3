use std::fs;
use std::path::PathBuf;

use gps_report::aggregate::{Dataset, HalfFilter, Selection};
use gps_report::ingest::{IngestOptions, load_sessions};
use gps_report::labels::Language;
use gps_report::metrics::MetricKey;
use gps_report::report_export::{ExportJob, build_pdf, write_pdf};
use gps_report::workbook_export::export_workbook_with_progress;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn match_dataset() -> Dataset {
    let paths = vec![
        fixture_path("CD-Demo_CD-Rivals_1ER_2024_3_9.csv"),
        fixture_path("CD-Demo_CD-Rivals_2DO_2024_3_9.csv"),
    ];
    Dataset::concat(load_sessions(&paths, &IngestOptions::default()).sessions)
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gps_report_{tag}_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn export_job_summarises_selection() {
    let dataset = match_dataset();
    let selection = Selection {
        match_key: dataset.match_options().first().cloned(),
        half: HalfFilter::First,
        player: None,
    };
    let job = ExportJob::build(&dataset, &selection, Language::Spanish).expect("rows");
    assert_eq!(
        job.summary_lines(),
        vec![
            "Partido: CD Rivals | 2024-03-09".to_string(),
            "Fecha: 2024-03-09".to_string(),
            "Jugador: Todos".to_string(),
        ]
    );
    assert_eq!(job.means.len(), 3);
    assert_eq!(job.sessions.len(), 2);
    assert!(job.totals.iter().any(|t| t.metric == MetricKey::Rhie));
}

#[test]
fn export_job_is_none_for_empty_selection() {
    let dataset = match_dataset();
    let selection = Selection {
        player: Some("Nobody".to_string()),
        ..Selection::default()
    };
    assert!(ExportJob::build(&dataset, &selection, Language::English).is_none());
    assert!(ExportJob::build(&Dataset::default(), &Selection::default(), Language::English).is_none());
}

#[test]
fn pdf_bytes_look_like_a_pdf() {
    let dataset = match_dataset();
    let job = ExportJob::build(&dataset, &Selection::default(), Language::Spanish).expect("rows");
    let with_totals = build_pdf(&job, true).expect("pdf with totals");
    let without_totals = build_pdf(&job, false).expect("pdf without totals");
    assert!(with_totals.starts_with(b"%PDF"));
    assert!(without_totals.starts_with(b"%PDF"));
    assert!(with_totals.len() > without_totals.len());
}

#[test]
fn pdf_is_written_into_missing_directory() {
    let dataset = match_dataset();
    let job = ExportJob::build(&dataset, &Selection::default(), Language::English).expect("rows");
    let dir = temp_dir("pdf");
    let path = dir.join("nested").join("report.pdf");
    let written = write_pdf(&job, &path, true).expect("write pdf");
    assert_eq!(written, path);
    assert!(fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn workbook_reports_progress_and_counts() {
    let dataset = match_dataset();
    let job = ExportJob::build(&dataset, &Selection::default(), Language::English).expect("rows");
    let dir = temp_dir("xlsx");
    let path = dir.join("report.xlsx");

    let mut steps = Vec::new();
    let report = export_workbook_with_progress(&job, &path, |p| steps.push((p.current, p.total)))
        .expect("workbook");
    assert_eq!(report.players, 3);
    assert_eq!(report.sessions, 2);
    assert_eq!(report.metrics, job.totals.len());
    assert_eq!(steps.first(), Some(&(0, 3)));
    assert_eq!(steps.last(), Some(&(3, 3)));
    assert!(path.exists());

    fs::remove_dir_all(&dir).ok();
}
