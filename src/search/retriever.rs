//! Tiered candidate retrieval.
//!
//! Tiers, in order:
//! - **Substring**: the query occurs in the line, either after strict
//!   normalization of both sides (+2.0 bonus) or as raw lowercase text
//!   (+1.5 bonus), on top of the containment score.
//! - **Overlap**: multi-word queries whose tokens appear in the line for at
//!   least 60% of the tokens; scored by that fraction.
//! - **Title**: only when nothing above matched and the query is at most
//!   three words; movie titles containing the query, flat score.
//!
//! Substring and overlap share one bounded scan over the corpus sample, so a
//! line matched by the first never counts for the second.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize::{normalize_strict, tokens};
use super::scorer::containment_score;
use crate::config::{CorpusConfig, SearchConfig};
use crate::corpus::{CorpusStore, SubtitleLine};
use crate::error::Result;

const STRICT_SUBSTRING_BONUS: f64 = 2.0;
const RAW_SUBSTRING_BONUS: f64 = 1.5;
const MIN_OVERLAP_RATIO: f64 = 0.6;
const MAX_TITLE_QUERY_TOKENS: usize = 3;
const TITLE_MATCH_SCORE: f64 = 0.0;

/// Which tier produced a candidate. Also reported as the result `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalTier {
    Substring,
    Overlap,
    Title,
}

impl RetrievalTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalTier::Substring => "substring",
            RetrievalTier::Overlap => "overlap",
            RetrievalTier::Title => "title",
        }
    }
}

/// A corpus line picked by the retriever, with its tier score.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub line: SubtitleLine,
    pub score: f64,
    pub tier: RetrievalTier,
}

/// Query forms used while matching, computed once per query.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    lower: String,
    strict: String,
    tokens: Vec<String>,
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        let lower = query.trim().to_lowercase();
        let strict = normalize_strict(&lower);
        let words = tokens(&lower).map(str::to_string).collect();
        Self {
            lower,
            strict,
            tokens: words,
        }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Score one line against the substring and overlap tiers.
    pub fn match_line(&self, line: &SubtitleLine) -> Option<(f64, RetrievalTier)> {
        if !self.strict.is_empty() {
            let strict_line = normalize_strict(&line.text_normalized);
            if let Some(score) = containment_score(&self.strict, &strict_line) {
                return Some((score + STRICT_SUBSTRING_BONUS, RetrievalTier::Substring));
            }
        }

        if let Some(score) = containment_score(&self.lower, &line.text_normalized) {
            return Some((score + RAW_SUBSTRING_BONUS, RetrievalTier::Substring));
        }

        if self.tokens.len() > 1 {
            let matched = self
                .tokens
                .iter()
                .filter(|token| line.text_normalized.contains(token.as_str()))
                .count();
            let ratio = matched as f64 / self.tokens.len() as f64;
            if ratio >= MIN_OVERLAP_RATIO {
                return Some((ratio, RetrievalTier::Overlap));
            }
        }

        None
    }
}

/// Bounds applied to one retrieval.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalOptions {
    /// Lines read by the substring/overlap scan.
    pub scan_sample_size: usize,
    pub scan_page_size: usize,
    /// Candidates kept, as a multiple of the requested limit.
    pub retrieval_breadth: usize,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            scan_sample_size: 10_000,
            scan_page_size: 1_000,
            retrieval_breadth: 2,
        }
    }
}

impl RetrievalOptions {
    pub fn from_config(corpus: &CorpusConfig, search: &SearchConfig) -> Self {
        Self {
            scan_sample_size: corpus.scan_sample_size,
            scan_page_size: corpus.scan_page_size,
            retrieval_breadth: search.retrieval_breadth,
        }
    }
}

/// Fallback-chain retriever over a corpus store.
#[derive(Debug, Clone, Default)]
pub struct Retriever {
    options: RetrievalOptions,
}

impl Retriever {
    pub fn new(options: RetrievalOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RetrievalOptions {
        &self.options
    }

    /// Collect candidates for `query`, best first, at most
    /// `limit * retrieval_breadth` of them.
    pub async fn retrieve(
        &self,
        store: &dyn CorpusStore,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let prepared = PreparedQuery::new(query);
        if prepared.lower.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = self.scan(store, &prepared).await?;

        if candidates.is_empty()
            && (1..=MAX_TITLE_QUERY_TOKENS).contains(&prepared.token_count())
        {
            candidates = store
                .find_by_title(&prepared.lower, limit)
                .await?
                .into_iter()
                .map(|line| Candidate {
                    line,
                    score: TITLE_MATCH_SCORE,
                    tier: RetrievalTier::Title,
                })
                .collect();
            debug!(found = candidates.len(), "Title fallback");
        }

        // Stable: equal scores keep corpus order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(limit.saturating_mul(self.options.retrieval_breadth.max(1)));
        Ok(candidates)
    }

    async fn scan(&self, store: &dyn CorpusStore, prepared: &PreparedQuery) -> Result<Vec<Candidate>> {
        let page_size = self.options.scan_page_size.max(1);
        let mut candidates = Vec::new();
        let mut offset = 0usize;

        while offset < self.options.scan_sample_size {
            let want = page_size.min(self.options.scan_sample_size - offset);
            let page = store.scan(offset, want).await?;
            let got = page.len();

            for line in page {
                if let Some((score, tier)) = prepared.match_line(&line) {
                    candidates.push(Candidate { line, score, tier });
                }
            }

            offset += got;
            if got < want {
                break;
            }
        }

        debug!(scanned = offset, matched = candidates.len(), "Corpus scan finished");
        Ok(candidates)
    }
}
