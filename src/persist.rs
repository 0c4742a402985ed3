use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::{HalfFilter, Selection};
use crate::ingest::{MatchKey, SessionDate};
use crate::labels::Language;

const CACHE_DIR: &str = "gps_report";
const PREFS_FILE: &str = "prefs.json";
const PREFS_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefs {
    pub version: u32,
    pub language: Language,
    #[serde(default)]
    pub match_key: Option<MatchKey>,
    #[serde(default)]
    pub half: HalfFilter,
    #[serde(default)]
    pub player: Option<String>,
}

impl Prefs {
    pub fn new(language: Language, selection: &Selection) -> Self {
        Self {
            version: PREFS_VERSION,
            language,
            match_key: selection.match_key.clone(),
            half: selection.half,
            player: selection.player.clone(),
        }
    }

    /// The remembered selection, minus values that are no longer in the data.
    pub fn selection_within(&self, matches: &[MatchKey], players: &[String]) -> Selection {
        Selection {
            match_key: self.match_key.clone().filter(|key| matches.contains(key)),
            half: self.half,
            player: self.player.clone().filter(|p| players.contains(p)),
        }
    }
}

pub fn load() -> Option<Prefs> {
    load_from(&prefs_path()?)
}

pub fn load_from(path: &Path) -> Option<Prefs> {
    let raw = fs::read_to_string(path).ok()?;
    let prefs = serde_json::from_str::<Prefs>(&raw).ok()?;
    if prefs.version != PREFS_VERSION {
        return None;
    }
    Some(prefs)
}

pub fn save(prefs: &Prefs) -> Result<()> {
    let Some(path) = prefs_path() else {
        return Ok(());
    };
    save_to(prefs, &path)
}

pub fn save_to(prefs: &Prefs, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(prefs).context("serialize prefs")?;
    fs::write(&tmp, json).context("write prefs")?;
    fs::rename(&tmp, path).context("swap prefs")?;
    Ok(())
}

fn prefs_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(PREFS_FILE))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_selection_values_are_dropped() {
        let key = MatchKey {
            base: "CD Rivals".to_string(),
            date: SessionDate::Raw("Mon-AM".to_string()),
        };
        let prefs = Prefs {
            version: PREFS_VERSION,
            language: Language::Spanish,
            match_key: Some(key.clone()),
            half: HalfFilter::Second,
            player: Some("Gone Player".to_string()),
        };
        let sel = prefs.selection_within(&[key.clone()], &["Ana Ruiz".to_string()]);
        assert_eq!(sel.match_key, Some(key));
        assert_eq!(sel.half, HalfFilter::Second);
        assert_eq!(sel.player, None);
    }

    #[test]
    fn prefs_round_trip_through_disk() {
        let dir = std::env::temp_dir().join(format!("gps_report_prefs_{}", std::process::id()));
        let path = dir.join(PREFS_FILE);
        let prefs = Prefs::new(Language::Spanish, &Selection::default());
        save_to(&prefs, &path).expect("save prefs");
        assert_eq!(load_from(&path), Some(prefs));
        fs::remove_dir_all(&dir).ok();
    }
}
