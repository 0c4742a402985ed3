use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

use crate::aggregate::{Dataset, HalfFilter, Report, Selection};
use crate::charts;
use crate::ingest::{LoadReport, MatchKey};
use crate::labels::{Labels, Language};
use crate::metrics::{ALL_GROUPS, ALL_METRICS, MetricGroup, MetricKey};
use crate::persist::Prefs;
use crate::report_export::ExportJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Cards,
    Bars,
    Stacked,
    Radar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Pdf,
    Workbook,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub dataset: Dataset,
    pub language: Language,
    pub selection: Selection,
    pub match_options: Vec<MatchKey>,
    pub player_options: Vec<String>,
    pub view: View,
    pub metric_idx: usize,
    pub group_idx: usize,
    pub card_scroll: u16,
    pub files_loaded: usize,
    pub load_errors: Vec<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export: ExportState,
}

impl AppState {
    pub fn new(dataset: Dataset, language: Language) -> Self {
        let match_options = dataset.match_options();
        let player_options = dataset.player_options();
        Self {
            files_loaded: dataset.sessions.len(),
            dataset,
            language,
            selection: Selection::default(),
            match_options,
            player_options,
            view: View::Cards,
            metric_idx: 0,
            group_idx: 0,
            card_scroll: 0,
            load_errors: Vec::new(),
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            export: ExportState::new(),
        }
    }

    pub fn from_load_report(report: LoadReport, language: Language) -> Self {
        let LoadReport { sessions, errors } = report;
        let mut state = Self::new(Dataset::concat(sessions), language);
        state.push_log(format!(
            "[INFO] Loaded {} file(s), {} row(s)",
            state.files_loaded,
            state.dataset.rows.len()
        ));
        for err in &errors {
            state.push_log(format!("[WARN] {err}"));
        }
        state.load_errors = errors;
        state
    }

    pub fn labels(&self) -> &'static Labels {
        self.language.labels()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn report(&self) -> Report<'_> {
        self.dataset.report(&self.selection)
    }

    pub fn title(&self) -> String {
        charts::report_title(&self.selection, self.language)
    }

    pub fn match_label(&self) -> String {
        self.selection
            .match_key
            .as_ref()
            .map(|key| key.display(self.labels()))
            .unwrap_or_else(|| self.labels().all.to_string())
    }

    pub fn player_label(&self) -> String {
        self.selection
            .player
            .clone()
            .unwrap_or_else(|| self.labels().all.to_string())
    }

    pub fn cycle_match(&mut self) {
        self.selection.match_key = cycle_option(&self.selection.match_key, &self.match_options);
        self.card_scroll = 0;
    }

    pub fn cycle_half(&mut self) {
        self.selection.half = self.selection.half.next();
        self.card_scroll = 0;
    }

    pub fn cycle_player(&mut self) {
        self.selection.player = cycle_option(&self.selection.player, &self.player_options);
        self.card_scroll = 0;
    }

    pub fn cycle_language(&mut self) {
        self.language = self.language.next();
    }

    pub fn cycle_view(&mut self) {
        self.view = match self.view {
            View::Cards => View::Bars,
            View::Bars => View::Stacked,
            View::Stacked => View::Radar,
            View::Radar => View::Cards,
        };
    }

    pub fn view_label(&self) -> &'static str {
        let labels = self.labels();
        match self.view {
            View::Cards => labels.view_cards,
            View::Bars => labels.view_bars,
            View::Stacked => labels.view_stacked,
            View::Radar => labels.view_radar,
        }
    }

    /// Metrics whose column exists in at least one loaded file, in catalogue order.
    pub fn chart_metrics(&self) -> Vec<MetricKey> {
        ALL_METRICS
            .iter()
            .copied()
            .filter(|m| self.dataset.columns.contains(m))
            .collect()
    }

    pub fn current_metric(&self) -> Option<MetricKey> {
        let metrics = self.chart_metrics();
        if metrics.is_empty() {
            return None;
        }
        metrics.get(self.metric_idx % metrics.len()).copied()
    }

    pub fn next_metric(&mut self) {
        let count = self.chart_metrics().len();
        if count > 0 {
            self.metric_idx = (self.metric_idx + 1) % count;
        }
    }

    pub fn prev_metric(&mut self) {
        let count = self.chart_metrics().len();
        if count == 0 {
            return;
        }
        self.metric_idx = if self.metric_idx == 0 {
            count - 1
        } else {
            self.metric_idx - 1
        };
    }

    pub fn radar_group(&self) -> MetricGroup {
        ALL_GROUPS[self.group_idx % ALL_GROUPS.len()]
    }

    pub fn cycle_group(&mut self) {
        self.group_idx = (self.group_idx + 1) % ALL_GROUPS.len();
    }

    /// The selected player, or the first one in the current filter.
    pub fn radar_player(&self, report: &Report<'_>) -> Option<String> {
        if let Some(player) = &self.selection.player {
            return Some(player.clone());
        }
        report.means.first().map(|m| m.player.clone())
    }

    pub fn scroll_down(&mut self) {
        self.card_scroll = self.card_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.card_scroll = self.card_scroll.saturating_sub(1);
    }

    pub fn apply_prefs(&mut self, prefs: &Prefs) {
        self.language = prefs.language;
        self.selection = prefs.selection_within(&self.match_options, &self.player_options);
    }

    pub fn prefs(&self) -> Prefs {
        Prefs::new(self.language, &self.selection)
    }

    pub fn export_job(&self) -> Option<ExportJob> {
        ExportJob::build(&self.dataset, &self.selection, self.language)
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }

    pub fn half_label(&self) -> &'static str {
        self.selection.half.label(self.labels())
    }

    pub fn set_half(&mut self, half: HalfFilter) {
        self.selection.half = half;
        self.card_scroll = 0;
    }
}

/// Steps through `[All] + options`, where `None` stands for "All".
fn cycle_option<T: Clone + PartialEq>(current: &Option<T>, options: &[T]) -> Option<T> {
    match current {
        None => options.first().cloned(),
        Some(value) => {
            let pos = options.iter().position(|o| o == value)?;
            options.get(pos + 1).cloned()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub done: bool,
    pub failed: bool,
    pub kind: Option<ExportKind>,
    pub path: Option<String>,
    pub current: usize,
    pub total: usize,
    pub message: String,
    pub last_updated: Option<Instant>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            active: false,
            done: false,
            failed: false,
            kind: None,
            path: None,
            current: 0,
            total: 0,
            message: String::new(),
            last_updated: None,
        }
    }

    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.active || !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::new();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    ExportStarted {
        kind: ExportKind,
        path: String,
        total: usize,
    },
    ExportProgress {
        current: usize,
        total: usize,
        message: String,
    },
    ExportFinished {
        kind: ExportKind,
        path: String,
        message: String,
    },
    ExportFailed {
        kind: ExportKind,
        path: String,
        error: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ExportCommand {
    Pdf {
        job: ExportJob,
        path: PathBuf,
        include_totals: bool,
    },
    Workbook {
        job: ExportJob,
        path: PathBuf,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::ExportStarted { kind, path, total } => {
            state.export = ExportState::new();
            state.export.active = true;
            state.export.kind = Some(kind);
            state.export.path = Some(path);
            state.export.total = total;
            state.export.message = "Starting export".to_string();
            state.export.last_updated = Some(Instant::now());
        }
        Delta::ExportProgress {
            current,
            total,
            message,
        } => {
            state.export.active = true;
            state.export.total = total;
            state.export.current = current;
            state.export.message = message;
            state.export.last_updated = Some(Instant::now());
        }
        Delta::ExportFinished {
            kind,
            path,
            message,
        } => {
            state.export.active = true;
            state.export.done = true;
            state.export.kind = Some(kind);
            state.export.current = state.export.total;
            state.export.message = message;
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[INFO] Export written to {path}"));
            state.export.path = Some(path);
        }
        Delta::ExportFailed { kind, path, error } => {
            state.export.active = true;
            state.export.done = true;
            state.export.failed = true;
            state.export.kind = Some(kind);
            state.export.message = error.clone();
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[WARN] Export to {path} failed: {error}"));
            state.export.path = Some(path);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
