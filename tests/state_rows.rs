use std::path::PathBuf;

use gps_report::aggregate::HalfFilter;
use gps_report::ingest::{IngestOptions, load_sessions};
use gps_report::labels::Language;
use gps_report::metrics::{MetricGroup, MetricKey};
use gps_report::persist::Prefs;
use gps_report::state::{AppState, View};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn loaded_state() -> AppState {
    let paths = vec![
        fixture_path("CD-Demo_CD-Rivals_1ER_2024_3_9.csv"),
        fixture_path("CD-Demo_CD-Rivals_2DO_2024_3_9.csv"),
        fixture_path("no_period_name.csv"),
    ];
    let report = load_sessions(&paths, &IngestOptions::default());
    AppState::from_load_report(report, Language::English)
}

#[test]
fn load_report_feeds_counts_and_console() {
    let state = loaded_state();
    assert_eq!(state.files_loaded, 2);
    assert_eq!(state.load_errors.len(), 1);
    assert!(state.logs.iter().any(|l| l.starts_with("[INFO] Loaded 2 file(s)")));
    assert!(state.logs.iter().any(|l| l.starts_with("[WARN]")));
}

#[test]
fn match_cycle_returns_to_all() {
    let mut state = loaded_state();
    assert_eq!(state.match_label(), "All");
    state.cycle_match();
    assert_eq!(state.match_label(), "CD Rivals | 2024-03-09");
    state.cycle_match();
    assert_eq!(state.selection.match_key, None);
}

#[test]
fn player_cycle_walks_sorted_names() {
    let mut state = loaded_state();
    state.cycle_player();
    assert_eq!(state.player_label(), "Ana Ruiz");
    state.cycle_player();
    state.cycle_player();
    assert_eq!(state.player_label(), "Carla Méndez");
    state.cycle_player();
    assert_eq!(state.player_label(), "All");
}

#[test]
fn half_cycle_changes_filtered_rows() {
    let mut state = loaded_state();
    assert_eq!(state.report().rows.len(), 6);
    state.cycle_half();
    assert_eq!(state.selection.half, HalfFilter::First);
    assert_eq!(state.report().rows.len(), 4);
    state.cycle_half();
    assert_eq!(state.report().rows.len(), 2);
    state.cycle_half();
    assert_eq!(state.selection.half, HalfFilter::All);
}

#[test]
fn language_switch_relabels_without_losing_selection() {
    let mut state = loaded_state();
    state.cycle_match();
    state.set_half(HalfFilter::Second);
    state.cycle_language();
    assert_eq!(state.language, Language::Spanish);
    assert_eq!(state.half_label(), "Segundo Tiempo");
    assert_eq!(state.match_label(), "CD Rivals | 2024-03-09");
    assert!(state.title().starts_with("Informe GPS del Partido"));
}

#[test]
fn metric_cursor_wraps_over_present_columns() {
    let mut state = loaded_state();
    let metrics = state.chart_metrics();
    assert_eq!(metrics.first(), Some(&MetricKey::Distance));
    assert!(!metrics.contains(&MetricKey::Accelerations));

    state.prev_metric();
    assert_eq!(state.current_metric(), metrics.last().copied());
    state.next_metric();
    assert_eq!(state.current_metric(), Some(MetricKey::Distance));
}

#[test]
fn view_and_group_cycles_wrap() {
    let mut state = loaded_state();
    for _ in 0..4 {
        state.cycle_view();
    }
    assert_eq!(state.view, View::Cards);
    assert_eq!(state.radar_group(), MetricGroup::Load);
    for _ in 0..5 {
        state.cycle_group();
    }
    assert_eq!(state.radar_group(), MetricGroup::Load);
}

#[test]
fn radar_player_defaults_to_first_in_filter() {
    let mut state = loaded_state();
    let report = state.report();
    assert_eq!(state.radar_player(&report).as_deref(), Some("Ana Ruiz"));
    drop(report);
    state.cycle_player();
    state.cycle_player();
    let report = state.report();
    assert_eq!(state.radar_player(&report).as_deref(), Some("Bruno Díaz"));
}

#[test]
fn prefs_restore_selection_and_language() {
    let mut state = loaded_state();
    state.cycle_match();
    state.cycle_player();
    state.cycle_language();
    let prefs = state.prefs();

    let mut fresh = loaded_state();
    fresh.apply_prefs(&prefs);
    assert_eq!(fresh.language, Language::Spanish);
    assert_eq!(fresh.selection, state.selection);

    let stale = Prefs {
        player: Some("Someone Else".to_string()),
        ..prefs
    };
    fresh.apply_prefs(&stale);
    assert_eq!(fresh.selection.player, None);
}

#[test]
fn empty_selection_has_no_export_job() {
    let mut state = loaded_state();
    assert!(state.export_job().is_some());
    state.selection.player = Some("Nobody".to_string());
    assert!(state.export_job().is_none());
}
