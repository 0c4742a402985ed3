use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::report_export;
use crate::state::{Delta, ExportCommand, ExportKind};
use crate::workbook_export;

/// Runs exports off the UI thread; results come back as deltas.
pub fn spawn_export_worker(tx: Sender<Delta>, cmd_rx: Receiver<ExportCommand>) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            handle_command(&tx, cmd);
        }
    });
}

fn handle_command(tx: &Sender<Delta>, cmd: ExportCommand) {
    match cmd {
        ExportCommand::Pdf {
            job,
            path,
            include_totals,
        } => {
            let labels = job.language.labels();
            let shown = path.display().to_string();
            let _ = tx.send(Delta::ExportStarted {
                kind: ExportKind::Pdf,
                path: shown.clone(),
                total: 1,
            });
            let _ = tx.send(Delta::Log(format!("[INFO] Writing PDF to {shown}")));
            match report_export::write_pdf(&job, &path, include_totals) {
                Ok(_) => {
                    let _ = tx.send(Delta::ExportFinished {
                        kind: ExportKind::Pdf,
                        path: shown,
                        message: format!(
                            "{}: {} {}",
                            labels.pdf_ready,
                            job.groups.len(),
                            labels.groups_unit
                        ),
                    });
                }
                Err(err) => {
                    tracing::warn!("pdf export failed: {err:#}");
                    let _ = tx.send(Delta::ExportFailed {
                        kind: ExportKind::Pdf,
                        path: shown,
                        error: format!("{err:#}"),
                    });
                }
            }
        }
        ExportCommand::Workbook { job, path } => {
            let labels = job.language.labels();
            let shown = path.display().to_string();
            let _ = tx.send(Delta::ExportStarted {
                kind: ExportKind::Workbook,
                path: shown.clone(),
                total: 3,
            });
            let _ = tx.send(Delta::Log(format!("[INFO] Writing workbook to {shown}")));
            let result = workbook_export::export_workbook_with_progress(&job, &path, |p| {
                let _ = tx.send(Delta::ExportProgress {
                    current: p.current,
                    total: p.total,
                    message: p.message,
                });
            });
            match result {
                Ok(report) => {
                    let _ = tx.send(Delta::ExportFinished {
                        kind: ExportKind::Workbook,
                        path: shown,
                        message: format!(
                            "{}: {} {}, {} {}, {} {}",
                            labels.xlsx_ready,
                            report.players,
                            labels.players_unit,
                            report.metrics,
                            labels.metrics_unit,
                            report.sessions,
                            labels.sessions_unit
                        ),
                    });
                }
                Err(err) => {
                    tracing::warn!("workbook export failed: {err:#}");
                    let _ = tx.send(Delta::ExportFailed {
                        kind: ExportKind::Workbook,
                        path: shown,
                        error: format!("{err:#}"),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::aggregate::{Dataset, Selection};
    use crate::ingest::{IngestOptions, parse_session};
    use crate::labels::Language;
    use crate::report_export::ExportJob;

    fn spanish_job() -> ExportJob {
        let raw = "Player Name;Period Name;Period Number;Player Load\n\
                   Ana;Rivals 1ER TIEMPO;1;400\n\
                   Bruno;Rivals 1ER TIEMPO;1;350\n";
        let session = parse_session("A_Rivals_2024_3_9.csv", raw.as_bytes(), &IngestOptions::default())
            .expect("csv parses");
        let dataset = Dataset::concat(vec![session]);
        ExportJob::build(&dataset, &Selection::default(), Language::Spanish).expect("rows")
    }

    #[test]
    fn workbook_command_reports_in_job_language() {
        let dir = std::env::temp_dir().join(format!("gps_report_worker_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("libro.xlsx");

        let (tx, rx) = mpsc::channel();
        handle_command(
            &tx,
            ExportCommand::Workbook {
                job: spanish_job(),
                path: path.clone(),
            },
        );
        drop(tx);
        let deltas = rx.iter().collect::<Vec<_>>();

        assert!(matches!(deltas.first(), Some(Delta::ExportStarted { total: 3, .. })));
        assert!(deltas.iter().any(|d| matches!(d, Delta::Log(msg) if msg.contains("libro.xlsx"))));
        let Some(Delta::ExportFinished { message, .. }) = deltas.last() else {
            panic!("expected a finished delta, got {deltas:?}");
        };
        assert_eq!(message, "Libro listo: 2 jugadores, 1 métricas, 1 sesiones");

        std::fs::remove_dir_all(&dir).ok();
    }
}
