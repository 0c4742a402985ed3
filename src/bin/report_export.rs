use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use gps_report::aggregate::{HalfFilter, Selection};
use gps_report::config::{AppConfig, flag_value, has_flag, positional_args};
use gps_report::ingest::{self, MatchKey};
use gps_report::labels::Labels;
use gps_report::logging;
use gps_report::report_export::{self, ExportJob};
use gps_report::workbook_export;

const VALUED_FLAGS: &[&str] = &[
    "--lang",
    "--delimiter",
    "--out-dir",
    "--match",
    "--half",
    "--player",
    "--out",
    "--xlsx",
];

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = AppConfig::load();
    config.apply_args(&args);
    logging::init_stderr(&config.log_filter)?;

    let inputs = ingest::expand_inputs(&positional_args(&args, VALUED_FLAGS))?;
    if inputs.is_empty() {
        bail!("no CSV files given; pass files or folders");
    }

    let report = ingest::load_sessions(&inputs, &config.ingest_options());
    let dataset = gps_report::aggregate::Dataset::concat(report.sessions);
    let labels = config.language.labels();

    println!("Sessions loaded: {}/{}", dataset.sessions.len(), inputs.len());
    println!("Rows: {}", dataset.rows.len());
    if !report.errors.is_empty() {
        println!("Skipped: {}", report.errors.len());
        for err in report.errors.iter().take(8) {
            println!(" - {err}");
        }
    }

    let matches = dataset.match_options();
    if has_flag(&args, "--list") {
        println!("{}:", labels.match_label);
        for key in &matches {
            println!(" - {}", key.display(labels));
        }
        println!("{}:", labels.player);
        for player in dataset.player_options() {
            println!(" - {player}");
        }
        return Ok(());
    }

    let mut selection = Selection::default();
    if let Some(raw) = flag_value(&args, "--match") {
        selection.match_key = Some(
            find_match(&matches, &raw, labels)
                .with_context(|| format!("unknown match {raw:?}; see --list"))?,
        );
    }
    if let Some(raw) = flag_value(&args, "--half") {
        selection.half = HalfFilter::from_arg(&raw)
            .with_context(|| format!("unknown half {raw:?}; use 1, 2 or all"))?;
    }
    selection.player = flag_value(&args, "--player");

    let Some(job) = ExportJob::build(&dataset, &selection, config.language) else {
        bail!("{}", labels.no_rows);
    };
    for line in job.summary_lines() {
        println!("{line}");
    }

    let pdf_path = flag_value(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.out_dir.join(labels.pdf_file));
    let written = report_export::write_pdf(&job, &pdf_path, !has_flag(&args, "--no-totals"))?;
    println!("PDF: {}", written.display());

    if let Some(xlsx) = flag_value(&args, "--xlsx") {
        let summary = workbook_export::export_workbook_with_progress(
            &job,
            &PathBuf::from(&xlsx),
            |p| tracing::debug!(current = p.current, total = p.total, "{}", p.message),
        )?;
        println!(
            "Workbook: {xlsx} ({} players, {} metrics, {} sessions)",
            summary.players, summary.metrics, summary.sessions
        );
    }

    Ok(())
}

/// Matches either the full `base | date` label or just the base name.
fn find_match(matches: &[MatchKey], raw: &str, labels: &Labels) -> Option<MatchKey> {
    let wanted = raw.trim();
    matches
        .iter()
        .find(|key| key.display(labels) == wanted)
        .or_else(|| {
            matches
                .iter()
                .find(|key| key.base.eq_ignore_ascii_case(wanted))
        })
        .cloned()
}
