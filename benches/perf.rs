use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;

use gps_report::aggregate::{Dataset, HalfFilter, Selection};
use gps_report::fake_feed::{SyntheticFile, synthetic_season};
use gps_report::ingest::{IngestOptions, parse_session};
use gps_report::labels::Language;
use gps_report::metrics::{DISTANCE_ZONES, MetricKey};
use gps_report::report_export::{ExportJob, build_pdf};

fn season_files(matches: usize) -> Vec<SyntheticFile> {
    let mut rng = StdRng::seed_from_u64(42);
    let first = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
    synthetic_season(&mut rng, matches, first)
}

fn season_dataset(matches: usize) -> Dataset {
    let opts = IngestOptions::default();
    let sessions = season_files(matches)
        .iter()
        .map(|f| parse_session(&f.file_name, f.contents.as_bytes(), &opts).unwrap())
        .collect();
    Dataset::concat(sessions)
}

fn bench_parse_sessions(c: &mut Criterion) {
    let files = season_files(20);
    let opts = IngestOptions::default();
    c.bench_function("parse_sessions_40_files", |b| {
        b.iter(|| {
            for file in &files {
                let session =
                    parse_session(&file.file_name, black_box(file.contents.as_bytes()), &opts)
                        .unwrap();
                black_box(session.rows.len());
            }
        })
    });
}

fn bench_report_all(c: &mut Criterion) {
    let dataset = season_dataset(20);
    c.bench_function("report_all_matches", |b| {
        b.iter(|| {
            let report = dataset.report(black_box(&Selection::default()));
            black_box(report.groups.len());
            black_box(report.totals(MetricKey::Distance).len());
            black_box(report.stacked(&DISTANCE_ZONES).len());
        })
    });
}

fn bench_report_one_half(c: &mut Criterion) {
    let dataset = season_dataset(20);
    let selection = Selection {
        match_key: dataset.match_options().first().cloned(),
        half: HalfFilter::Second,
        player: None,
    };
    c.bench_function("report_one_match_half", |b| {
        b.iter(|| {
            let report = dataset.report(black_box(&selection));
            black_box(report.means.len());
        })
    });
}

fn bench_pdf_build(c: &mut Criterion) {
    let dataset = season_dataset(4);
    let job = ExportJob::build(&dataset, &Selection::default(), Language::English).unwrap();
    c.bench_function("pdf_build_with_totals", |b| {
        b.iter(|| {
            let bytes = build_pdf(black_box(&job), true).unwrap();
            black_box(bytes.len());
        })
    });
}

criterion_group!(
    benches,
    bench_parse_sessions,
    bench_report_all,
    bench_report_one_half,
    bench_pdf_build
);
criterion_main!(benches);
