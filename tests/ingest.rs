use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use gps_report::ingest::{
    IngestOptions, SessionDate, expand_inputs, load_session, load_sessions, parse_session,
    session_date_from_file_name,
};
use gps_report::metrics::MetricKey;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn loads_first_half_fixture_with_padded_headers() {
    let session = load_session(
        &fixture_path("CD-Demo_CD-Rivals_1ER_2024_3_9.csv"),
        &IngestOptions::default(),
    )
    .expect("fixture should parse");

    assert_eq!(session.file_name, "CD-Demo_CD-Rivals_1ER_2024_3_9.csv");
    assert_eq!(session.date.parsed(), NaiveDate::from_ymd_opt(2024, 3, 9));
    assert_eq!(session.match_key.base, "CD Rivals");
    assert_eq!(session.rows.len(), 4);
    assert!(session.columns.contains(&MetricKey::Tempo));
    assert!(session.columns.contains(&MetricKey::Rhie));
    assert!(!session.columns.contains(&MetricKey::Accelerations));

    let ana = &session.rows[0];
    assert_eq!(ana.player.as_deref(), Some("Ana Ruiz"));
    assert_eq!(ana.period, Some(1));
    assert_eq!(ana.values.get(&MetricKey::Distance), Some(&5000.0));

    assert_eq!(session.rows[2].player, None);

    let carla = &session.rows[3];
    assert_eq!(carla.values.get(&MetricKey::Distance), None);
    assert_eq!(carla.values.get(&MetricKey::Sprint), Some(&0.0));
}

#[test]
fn both_halves_share_a_match_key() {
    let opts = IngestOptions::default();
    let first = load_session(&fixture_path("CD-Demo_CD-Rivals_1ER_2024_3_9.csv"), &opts)
        .expect("first half");
    let second = load_session(&fixture_path("CD-Demo_CD-Rivals_2DO_2024_3_9.csv"), &opts)
        .expect("second half");
    assert_eq!(first.match_key, second.match_key);
    assert_eq!(second.rows[0].period, Some(2));
}

#[test]
fn file_without_date_parts_keeps_raw_label() {
    let session = load_session(
        &fixture_path("training_no_date.csv"),
        &IngestOptions::default(),
    )
    .expect("fixture should parse");
    assert_eq!(session.date, SessionDate::Raw("training-no-date".to_string()));
    assert_eq!(session.match_key.base, "Rondo Session");
}

#[test]
fn missing_period_name_column_is_an_error() {
    let err = load_session(&fixture_path("no_period_name.csv"), &IngestOptions::default())
        .expect_err("period name is required");
    assert!(format!("{err:#}").contains("Period Name"));
}

#[test]
fn header_only_file_is_an_error() {
    let raw = "Player Name;Period Name;Period Number\n";
    let err = parse_session("empty_2024_01_01.csv", raw.as_bytes(), &IngestOptions::default())
        .expect_err("no data rows");
    assert!(format!("{err:#}").contains("no data rows"));
}

#[test]
fn fractional_period_number_is_ignored() {
    let raw = "Player Name;Period Name;Period Number\nAna;Match 1ER TIEMPO;1.5\n";
    let session = parse_session("x_2024_01_01.csv", raw.as_bytes(), &IngestOptions::default())
        .expect("parses");
    assert_eq!(session.rows[0].period, None);
}

#[test]
fn custom_delimiter_is_honoured() {
    let raw = "Player Name,Period Name,Max Velocity\nAna,Derby,31.2\n";
    let session = parse_session(
        "derby_2024_05_01.csv",
        raw.as_bytes(),
        &IngestOptions { delimiter: b',' },
    )
    .expect("parses");
    assert_eq!(session.rows[0].values.get(&MetricKey::MaxSpeed), Some(&31.2));
}

#[test]
fn bad_files_are_reported_and_the_rest_still_load() {
    let paths = vec![
        fixture_path("CD-Demo_CD-Rivals_1ER_2024_3_9.csv"),
        fixture_path("no_period_name.csv"),
        fixture_path("does_not_exist.csv"),
    ];
    let report = load_sessions(&paths, &IngestOptions::default());
    assert_eq!(report.sessions.len(), 1);
    assert_eq!(report.errors.len(), 2);
}

#[test]
fn directories_expand_to_sorted_csv_files() {
    let dir = std::env::temp_dir().join(format!("gps_report_expand_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    fs::write(dir.join("b_2024_01_02.csv"), "x").expect("write b");
    fs::write(dir.join("a_2024_01_01.CSV"), "x").expect("write a");
    fs::write(dir.join("notes.txt"), "x").expect("write txt");

    let found = expand_inputs(&[dir.clone()]).expect("expand");
    let names = found
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["a_2024_01_01.CSV", "b_2024_01_02.csv"]);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn date_parts_are_zero_padded() {
    assert_eq!(
        session_date_from_file_name("Team_Opp_2DO_2023_11_5.csv").parsed(),
        NaiveDate::from_ymd_opt(2023, 11, 5)
    );
    assert_eq!(session_date_from_file_name("Team_2023_13_40.csv").parsed(), None);
    assert_eq!(session_date_from_file_name("plain.csv"), SessionDate::Missing);
}
