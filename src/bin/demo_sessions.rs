use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;

use gps_report::config::flag_value;
use gps_report::fake_feed;

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let out_dir = flag_value(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("demo_sessions"));
    let matches = flag_value(&args, "--matches")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(4);
    let mut rng = match flag_value(&args, "--seed").and_then(|v| v.parse::<u64>().ok()) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let first_date = NaiveDate::from_ymd_opt(2024, 3, 9).context("invalid start date")?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;
    let files = fake_feed::synthetic_season(&mut rng, matches, first_date);
    for file in &files {
        let path = out_dir.join(&file.file_name);
        fs::write(&path, &file.contents).with_context(|| format!("write {}", path.display()))?;
    }

    println!("Demo sessions written");
    println!("Dir: {}", out_dir.display());
    println!("Matches: {matches}");
    println!("Files: {}", files.len());
    Ok(())
}
