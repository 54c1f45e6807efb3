//! Vector-backed corpus store.
//!
//! Holds every line in memory in load order, which doubles as the stable
//! scan order. Loaded from JSON Lines files (one `SubtitleDocument` per line)
//! or a JSON array; malformed lines are skipped with a warning.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::types::{SubtitleDocument, SubtitleLine};
use super::CorpusStore;
use crate::error::{CineError, Result};

/// In-memory corpus.
#[derive(Debug, Default, Clone)]
pub struct MemoryCorpus {
    name: String,
    lines: Vec<SubtitleLine>,
}

impl MemoryCorpus {
    /// Create a corpus from already-typed lines.
    pub fn from_lines(name: &str, lines: Vec<SubtitleLine>) -> Self {
        Self {
            name: name.to_string(),
            lines,
        }
    }

    /// Empty corpus.
    pub fn empty(name: &str) -> Self {
        Self::from_lines(name, Vec::new())
    }

    /// Parse JSON Lines content. Blank lines and `#` comments are ignored.
    pub fn from_jsonl_str(name: &str, content: &str) -> Self {
        let mut lines = Vec::new();
        let mut skipped = 0usize;

        for (number, raw) in content.lines().enumerate() {
            let raw = raw.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }
            match serde_json::from_str::<SubtitleDocument>(raw) {
                Ok(doc) => lines.push(SubtitleLine::from(doc)),
                Err(e) => {
                    skipped += 1;
                    warn!(corpus = name, line = number + 1, error = %e, "Skipping malformed subtitle document");
                }
            }
        }

        debug!(corpus = name, loaded = lines.len(), skipped, "Parsed JSONL corpus");
        Self::from_lines(name, lines)
    }

    /// Parse a JSON array of documents.
    pub fn from_json_array_str(name: &str, content: &str) -> Result<Self> {
        let docs: Vec<SubtitleDocument> = serde_json::from_str(content)?;
        let lines = docs.into_iter().map(SubtitleLine::from).collect();
        Ok(Self::from_lines(name, lines))
    }

    /// Load a corpus file. `.json` files holding an array are parsed as one
    /// document; everything else is treated as JSON Lines.
    pub async fn from_path(name: &str, path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CineError::Connection(format!(
                "Corpus file not found: {}",
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let is_json_array = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
            && content.trim_start().starts_with('[');

        if is_json_array {
            Self::from_json_array_str(name, &content)
        } else {
            Ok(Self::from_jsonl_str(name, &content))
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[async_trait]
impl CorpusStore for MemoryCorpus {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.lines.len() as u64)
    }

    async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<SubtitleLine>> {
        Ok(self
            .lines
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_title(&self, needle: &str, limit: usize) -> Result<Vec<SubtitleLine>> {
        let needle = needle.to_lowercase();
        Ok(self
            .lines
            .iter()
            .filter(|line| line.movie_title.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}
