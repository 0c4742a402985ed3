use std::env;
use std::path::PathBuf;

use crate::ingest::IngestOptions;
use crate::labels::Language;

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub language: Language,
    /// Set when the language came from the environment or `--lang`.
    pub language_pinned: bool,
    pub delimiter: u8,
    pub out_dir: PathBuf,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            language_pinned: false,
            delimiter: b';',
            out_dir: PathBuf::from("."),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Reads `.env.local` then `.env`, then the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(language) = env_nonempty("GPS_REPORT_LANG").and_then(|v| Language::from_code(&v))
        {
            cfg.language = language;
            cfg.language_pinned = true;
        }
        if let Some(delimiter) = env_nonempty("GPS_REPORT_DELIMITER").and_then(|v| parse_delimiter(&v))
        {
            cfg.delimiter = delimiter;
        }
        if let Some(dir) = env_nonempty("GPS_REPORT_OUT_DIR") {
            cfg.out_dir = PathBuf::from(dir);
        }
        if let Some(filter) = env_nonempty("GPS_REPORT_LOG") {
            cfg.log_filter = filter;
        }
        cfg.log_file = env_nonempty("GPS_REPORT_LOG_FILE").map(PathBuf::from);
        cfg
    }

    /// Flags on the command line win over the environment.
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(language) = flag_value(args, "--lang").and_then(|v| Language::from_code(&v)) {
            self.language = language;
            self.language_pinned = true;
        }
        if let Some(delimiter) = flag_value(args, "--delimiter").and_then(|v| parse_delimiter(&v)) {
            self.delimiter = delimiter;
        }
        if let Some(dir) = flag_value(args, "--out-dir") {
            self.out_dir = PathBuf::from(dir);
        }
    }

    /// A pinned language beats the one remembered from the last session.
    pub fn resolve_language(&self, saved: Option<Language>) -> Language {
        match saved {
            Some(saved) if !self.language_pinned => saved,
            _ => self.language,
        }
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            delimiter: self.delimiter,
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_delimiter(raw: &str) -> Option<u8> {
    match raw {
        "\\t" | "tab" => Some(b'\t'),
        _ => {
            let bytes = raw.as_bytes();
            (bytes.len() == 1).then(|| bytes[0])
        }
    }
}

/// Value of `--name=value` or `--name value`.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

/// Arguments that are neither flags nor the value of a `valued` flag.
pub fn positional_args(args: &[String], valued: &[&str]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = valued.contains(&arg.as_str());
            continue;
        }
        out.push(PathBuf::from(arg));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_value_accepts_both_forms() {
        let a = args(&["--lang=es", "--out-dir", "reports", "a.csv"]);
        assert_eq!(flag_value(&a, "--lang").as_deref(), Some("es"));
        assert_eq!(flag_value(&a, "--out-dir").as_deref(), Some("reports"));
        assert_eq!(flag_value(&a, "--player"), None);
    }

    #[test]
    fn positional_args_skip_flag_values() {
        let a = args(&["--player", "Ana Ruiz", "one.csv", "--lang=es", "dir", "--no-totals"]);
        let paths = positional_args(&a, &["--player"]);
        assert_eq!(paths, vec![PathBuf::from("one.csv"), PathBuf::from("dir")]);
    }

    #[test]
    fn delimiter_parsing() {
        assert_eq!(parse_delimiter(";"), Some(b';'));
        assert_eq!(parse_delimiter("tab"), Some(b'\t'));
        assert_eq!(parse_delimiter(";;"), None);
    }

    #[test]
    fn args_override_defaults() {
        let mut cfg = AppConfig::default();
        cfg.apply_args(&args(&["--lang", "es", "--delimiter=,"]));
        assert_eq!(cfg.language, Language::Spanish);
        assert_eq!(cfg.ingest_options().delimiter, b',');
    }

    #[test]
    fn saved_language_applies_only_when_not_pinned() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.resolve_language(Some(Language::Spanish)), Language::Spanish);
        assert_eq!(cfg.resolve_language(None), Language::English);

        let pinned = AppConfig {
            language: Language::English,
            language_pinned: true,
            ..AppConfig::default()
        };
        assert_eq!(pinned.resolve_language(Some(Language::Spanish)), Language::English);

        let mut from_args = AppConfig::default();
        from_args.apply_args(&args(&["--lang=es"]));
        assert_eq!(from_args.resolve_language(Some(Language::English)), Language::Spanish);
    }
}
