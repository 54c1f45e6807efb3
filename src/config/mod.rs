//! Configuration for cineseek
//!
//! Settings are read from `~/.cineseek/config.json` and then overridden by
//! `CINESEEK_*` environment variables (a `.env` file in the working directory
//! is honoured). Every section carries `#[serde(default)]`, so a partial file
//! only needs the keys it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CineError, Result};
use crate::phrases::PhraseScoring;

/// Environment variable holding a single corpus URI. When set it replaces the
/// configured profile list.
pub const ENV_CORPUS_URI: &str = "CINESEEK_CORPUS_URI";
const ENV_SCAN_SAMPLE_SIZE: &str = "CINESEEK_SCAN_SAMPLE_SIZE";
const ENV_RETRIEVAL_BREADTH: &str = "CINESEEK_RETRIEVAL_BREADTH";
const ENV_RESULT_LIMIT: &str = "CINESEEK_RESULT_LIMIT";
const ENV_LOG_LEVEL: &str = "CINESEEK_LOG_LEVEL";

// ============================================================================
// Sections
// ============================================================================

/// One way of reaching the subtitle corpus. Profiles are tried in order until
/// one connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Name used in logs and in corpus info.
    pub name: String,
    /// Location of the corpus (`file://…`, a bare path, or `memory://`).
    pub uri: String,
    /// Upper bound for a single connection attempt.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    20
}

impl ConnectionProfile {
    pub fn new(name: &str, uri: &str) -> Self {
        Self {
            name: name.to_string(),
            uri: uri.to_string(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Corpus access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Connection profiles, tried in order.
    pub profiles: Vec<ConnectionProfile>,
    /// Maximum number of lines the substring scan reads per query.
    pub scan_sample_size: usize,
    /// Page size used while scanning.
    pub scan_page_size: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        let default_corpus = Config::dir().join("subtitles.jsonl");
        Self {
            profiles: vec![ConnectionProfile::new(
                "local",
                &format!("file://{}", default_corpus.display()),
            )],
            scan_sample_size: 10_000,
            scan_page_size: 1_000,
        }
    }
}

/// Retrieval and ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidate pool kept after retrieval, as a multiple of the requested limit.
    pub retrieval_breadth: usize,
    /// Default number of movies returned by a search.
    pub result_limit: usize,
    /// Number of movies requested for each phrase during identification.
    pub per_phrase_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            retrieval_breadth: 2,
            result_limit: 10,
            per_phrase_limit: 5,
        }
    }
}

/// Phrase extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseConfig {
    /// Words per sliding window.
    pub phrase_length: usize,
    /// Phrases submitted as queries per transcript.
    pub phrase_count: usize,
    /// How phrases are ranked before selection.
    pub scoring: PhraseScoring,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            phrase_length: 5,
            phrase_count: 3,
            scoring: PhraseScoring::default(),
        }
    }
}

/// Identification pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifyConfig {
    /// Overall deadline for all phrase searches of one transcript.
    pub timeout_secs: u64,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self { timeout_secs: 20 }
    }
}

/// Logging settings, consumed by the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ============================================================================
// Config
// ============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub search: SearchConfig,
    pub phrases: PhraseConfig,
    pub identify: IdentifyConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Base directory for cineseek data (`~/.cineseek`).
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cineseek")
    }

    /// Default config file location.
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from the default path, apply environment overrides and validate.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Load from `path` (defaults when the file is absent), apply environment
    /// overrides and validate.
    pub fn load_from(path: &Path) -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            debug!(error = %e, "No .env file loaded");
        }

        let mut config = Self::read_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            CineError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Apply overrides from a key lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup(ENV_CORPUS_URI).filter(|v| !v.trim().is_empty()) {
            self.corpus.profiles = vec![ConnectionProfile::new("env", uri.trim())];
        }
        if let Some(v) = parse_usize(&lookup, ENV_SCAN_SAMPLE_SIZE) {
            self.corpus.scan_sample_size = v;
        }
        if let Some(v) = parse_usize(&lookup, ENV_RETRIEVAL_BREADTH) {
            self.search.retrieval_breadth = v;
        }
        if let Some(v) = parse_usize(&lookup, ENV_RESULT_LIMIT) {
            self.search.result_limit = v;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_string();
        }
    }

    /// Reject values that would make searches meaningless.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("corpus.scan_sample_size", self.corpus.scan_sample_size),
            ("corpus.scan_page_size", self.corpus.scan_page_size),
            ("search.retrieval_breadth", self.search.retrieval_breadth),
            ("search.result_limit", self.search.result_limit),
            ("search.per_phrase_limit", self.search.per_phrase_limit),
            ("phrases.phrase_length", self.phrases.phrase_length),
            ("phrases.phrase_count", self.phrases.phrase_count),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(CineError::Config(format!("{} must be positive", name)));
            }
        }
        if self.corpus.profiles.is_empty() {
            return Err(CineError::Config(
                "corpus.profiles must list at least one connection profile".to_string(),
            ));
        }
        if self.identify.timeout_secs == 0 {
            return Err(CineError::Config(
                "identify.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_usize<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring non-numeric override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.retrieval_breadth, 2);
        assert_eq!(config.phrases.phrase_length, 5);
        assert_eq!(config.phrases.phrase_count, 3);
        assert_eq!(config.identify.timeout_secs, 20);
        assert_eq!(config.corpus.profiles.len(), 1);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"search": {"result_limit": 3}}"#).unwrap();

        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.search.result_limit, 3);
        assert_eq!(config.search.retrieval_breadth, 2);
        assert_eq!(config.corpus.scan_sample_size, 10_000);
    }

    #[test]
    fn test_profiles_from_file_keep_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"corpus": {"profiles": [
                {"name": "primary", "uri": "file:///srv/a.jsonl", "connect_timeout_secs": 5},
                {"name": "backup", "uri": "/srv/b.jsonl"}
            ]}}"#,
        )
        .unwrap();

        let config = Config::read_file(&path).unwrap();
        let names: Vec<&str> = config
            .corpus
            .profiles
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["primary", "backup"]);
        assert_eq!(config.corpus.profiles[0].connect_timeout_secs, 5);
        assert_eq!(config.corpus.profiles[1].connect_timeout_secs, 20);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::read_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.search.result_limit, 10);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::read_file(&path).unwrap_err();
        assert!(matches!(err, CineError::Config(_)));
    }

    #[test]
    fn test_env_uri_replaces_profiles() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[(ENV_CORPUS_URI, "/data/subs.jsonl")]));

        assert_eq!(config.corpus.profiles.len(), 1);
        assert_eq!(config.corpus.profiles[0].name, "env");
        assert_eq!(config.corpus.profiles[0].uri, "/data/subs.jsonl");
    }

    #[test]
    fn test_numeric_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            (ENV_SCAN_SAMPLE_SIZE, "500"),
            (ENV_RETRIEVAL_BREADTH, "3"),
            (ENV_RESULT_LIMIT, "nope"),
            (ENV_LOG_LEVEL, "debug"),
        ]));

        assert_eq!(config.corpus.scan_sample_size, 500);
        assert_eq!(config.search.retrieval_breadth, 3);
        assert_eq!(config.search.result_limit, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.search.retrieval_breadth = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search.retrieval_breadth"));

        let mut config = Config::default();
        config.corpus.profiles.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.identify.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
