use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::labels::Labels;
use crate::metrics::MetricKey;

pub const PLAYER_NAME_COLUMN: &str = "Player Name";
pub const PERIOD_NAME_COLUMN: &str = "Period Name";
pub const PERIOD_NUMBER_COLUMN: &str = "Period Number";

static HALF_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[-_]*\s*(1ER|2DO)?\s*TIEMPO").expect("half suffix regex"));

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { delimiter: b';' }
    }
}

/// Identifies a match across the per-half files that make it up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchKey {
    pub base: String,
    pub date: SessionDate,
}

impl MatchKey {
    pub fn display(&self, labels: &Labels) -> String {
        format!("{} | {}", self.base, self.date.label(labels))
    }
}

/// Date taken from the last three `_` parts of a file name. Parts that do not
/// form a calendar date are kept as text so distinct files stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SessionDate {
    Parsed(NaiveDate),
    Raw(String),
    #[default]
    Missing,
}

impl SessionDate {
    pub fn parsed(&self) -> Option<NaiveDate> {
        match self {
            SessionDate::Parsed(date) => Some(*date),
            _ => None,
        }
    }

    pub fn label(&self, labels: &Labels) -> String {
        match self {
            SessionDate::Parsed(date) => date.format("%Y-%m-%d").to_string(),
            SessionDate::Raw(raw) => raw.clone(),
            SessionDate::Missing => labels.no_date.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub player: Option<String>,
    pub period: Option<u32>,
    pub period_name: String,
    /// Only values that parsed as finite numbers; anything else is treated as missing.
    pub values: HashMap<MetricKey, f64>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub file_name: String,
    pub date: SessionDate,
    pub match_key: MatchKey,
    pub columns: BTreeSet<MetricKey>,
    pub rows: Vec<SessionRow>,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub sessions: Vec<Session>,
    pub errors: Vec<String>,
}

/// Derives the session date from a `..._YYYY_MM_DD.csv` style file name.
pub fn session_date_from_file_name(file_name: &str) -> SessionDate {
    let parts = file_name.split('_').collect::<Vec<_>>();
    if parts.len() < 3 {
        return SessionDate::Missing;
    }
    let year = parts[parts.len() - 3];
    let month = parts[parts.len() - 2];
    let day = parts[parts.len() - 1].split('.').next().unwrap_or_default();
    let raw = format!("{year}-{month:0>2}-{day:0>2}");
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => SessionDate::Parsed(date),
        Err(_) => SessionDate::Raw(raw),
    }
}

/// Strips the "1ER TIEMPO" / "2DO TIEMPO" half marker from a period name.
pub fn match_base_from_period_name(period_name: &str) -> String {
    HALF_SUFFIX.replace_all(period_name, "").trim().to_string()
}

pub fn is_half_label(raw: &str) -> bool {
    let upper = raw.to_uppercase();
    upper.contains("1ER") || upper.contains("2DO")
}

pub fn parse_session<R: Read>(
    file_name: &str,
    input: R,
    options: &IngestOptions,
) -> Result<Session> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .byte_headers()
        .with_context(|| format!("read header of {file_name}"))?
        .iter()
        .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
        .collect::<Vec<_>>();

    let column_index = |name: &str| headers.iter().position(|h| h == name);
    let period_name_idx = column_index(PERIOD_NAME_COLUMN)
        .ok_or_else(|| anyhow!("{file_name}: missing '{PERIOD_NAME_COLUMN}' column"))?;
    let player_idx = column_index(PLAYER_NAME_COLUMN);
    let period_number_idx = column_index(PERIOD_NUMBER_COLUMN);
    let metric_columns = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| MetricKey::from_column(name).map(|metric| (idx, metric)))
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for (line, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("{file_name}: row {}", line + 2))?;
        let field = |idx: usize| {
            record
                .get(idx)
                .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
                .unwrap_or_default()
        };

        let player = player_idx.map(field).filter(|name| !name.is_empty());
        let period = period_number_idx.and_then(|idx| parse_period(&field(idx)));
        let values = metric_columns
            .iter()
            .filter_map(|(idx, metric)| parse_number(&field(*idx)).map(|v| (*metric, v)))
            .collect::<HashMap<_, _>>();

        rows.push(SessionRow {
            player,
            period,
            period_name: field(period_name_idx),
            values,
        });
    }

    let Some(first) = rows.first() else {
        return Err(anyhow!("{file_name}: no data rows"));
    };

    let date = session_date_from_file_name(file_name);
    let match_key = MatchKey {
        base: match_base_from_period_name(&first.period_name),
        date: date.clone(),
    };

    Ok(Session {
        file_name: file_name.to_string(),
        date,
        match_key,
        columns: metric_columns.iter().map(|(_, metric)| *metric).collect(),
        rows,
    })
}

pub fn load_session(path: &Path, options: &IngestOptions) -> Result<Session> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    parse_session(&file_name, file, options)
}

/// Loads every path in parallel; failures are reported per file and the rest still load.
pub fn load_sessions(paths: &[PathBuf], options: &IngestOptions) -> LoadReport {
    let results = paths
        .par_iter()
        .map(|path| load_session(path, options))
        .collect::<Vec<_>>();

    let mut report = LoadReport::default();
    for result in results {
        match result {
            Ok(session) => {
                tracing::debug!(
                    file = %session.file_name,
                    rows = session.rows.len(),
                    "session loaded"
                );
                report.sessions.push(session);
            }
            Err(err) => {
                tracing::warn!("skipping file: {err:#}");
                report.errors.push(format!("{err:#}"));
            }
        }
    }
    report
}

/// Expands directory arguments to their `*.csv` files, sorted by name.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = fs::read_dir(input)
                .with_context(|| format!("read dir {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| {
                    path.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
                })
                .collect::<Vec<_>>();
            found.sort();
            out.extend(found);
        } else {
            out.push(input.clone());
        }
    }
    Ok(out)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_period(raw: &str) -> Option<u32> {
    let value = parse_number(raw)?;
    if value < 0.0 || value.fract() != 0.0 {
        return None;
    }
    Some(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Language;

    #[test]
    fn date_from_file_name_pads_month_and_day() {
        assert_eq!(
            session_date_from_file_name("Liga_Rivals_2024_3_9.csv").parsed(),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
        assert_eq!(
            session_date_from_file_name("export_2023_11_05.csv").parsed(),
            NaiveDate::from_ymd_opt(2023, 11, 5)
        );
    }

    #[test]
    fn short_names_have_no_date() {
        assert_eq!(session_date_from_file_name("match.csv"), SessionDate::Missing);
        assert_eq!(session_date_from_file_name("a_b.csv"), SessionDate::Missing);
    }

    #[test]
    fn non_calendar_parts_are_kept_as_text() {
        assert_eq!(
            session_date_from_file_name("Team_A_vs_B.csv"),
            SessionDate::Raw("A-vs-0B".to_string())
        );
        assert_eq!(
            session_date_from_file_name("x_2024_02_30.csv"),
            SessionDate::Raw("2024-02-30".to_string())
        );
        assert_eq!(
            session_date_from_file_name("Training_Mon_7.csv"),
            SessionDate::Raw("Training-Mon-07".to_string())
        );
        assert_eq!(
            SessionDate::Missing.label(Language::Spanish.labels()),
            "Sin Fecha"
        );
    }

    #[test]
    fn half_labels_are_detected_in_any_case() {
        assert!(is_half_label("Rivals 1ER"));
        assert!(is_half_label("rivals 2do"));
        assert!(!is_half_label("Rivals"));
    }

    #[test]
    fn half_suffix_is_removed_in_any_case() {
        assert_eq!(match_base_from_period_name("CD Rivals 1ER TIEMPO"), "CD Rivals");
        assert_eq!(match_base_from_period_name("CD Rivals - 2do tiempo"), "CD Rivals");
        assert_eq!(match_base_from_period_name("CD Rivals_TIEMPO"), "CD Rivals");
        assert_eq!(match_base_from_period_name("Friendly"), "Friendly");
    }

    #[test]
    fn number_parsing_treats_garbage_as_missing() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_period("2"), Some(2));
        assert_eq!(parse_period("1.0"), Some(1));
        assert_eq!(parse_period("1.5"), None);
    }
}
