//! Movie identification from transcript text.
//!
//! The transcript is cut into phrases, the best few are searched
//! concurrently, and the per-phrase lists are merged in phrase order. The
//! whole run is bounded by a deadline: phrases still searching when it
//! passes are dropped and the answer is built from whatever finished.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::phrases::{extract_phrases, select_best_phrases, PhraseScoring};
use crate::search::{merge_results, MatchResult, SubtitleSearch};

/// Outcome of one identification run.
#[derive(Debug, Clone, Serialize)]
pub struct Identification {
    /// Correlates log lines of this run.
    pub request_id: String,
    /// Phrases that were searched, best first.
    pub phrases: Vec<String>,
    /// Distinct movies, truncated to the result limit.
    pub results: Vec<MatchResult>,
    /// Distinct movies before truncation.
    pub total_results: usize,
    /// The deadline passed before every phrase finished.
    pub timed_out: bool,
}

/// Runs the transcript → phrases → search → merge pipeline.
#[derive(Debug, Clone)]
pub struct Identifier {
    search: Arc<SubtitleSearch>,
    phrase_length: usize,
    phrase_count: usize,
    scoring: PhraseScoring,
    per_phrase_limit: usize,
    result_limit: usize,
    timeout: Duration,
}

impl Identifier {
    pub fn new(search: Arc<SubtitleSearch>, config: &Config) -> Self {
        Self {
            search,
            phrase_length: config.phrases.phrase_length,
            phrase_count: config.phrases.phrase_count,
            scoring: config.phrases.scoring,
            per_phrase_limit: config.search.per_phrase_limit,
            result_limit: config.search.result_limit,
            timeout: Duration::from_secs(config.identify.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The phrases that `identify` would search for `text`.
    pub fn phrases_for(&self, text: &str) -> Vec<String> {
        select_best_phrases(
            extract_phrases(text, self.phrase_length),
            self.phrase_count,
            self.scoring,
        )
    }

    /// Identify the movie a transcript most likely comes from.
    pub async fn identify(&self, text: &str) -> Identification {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("identify", request_id = %request_id);
        self.run(request_id, text).instrument(span).await
    }

    async fn run(&self, request_id: String, text: &str) -> Identification {
        let phrases = self.phrases_for(text);
        if phrases.is_empty() {
            info!("No phrases extracted from transcript");
            return Identification {
                request_id,
                phrases,
                results: Vec::new(),
                total_results: 0,
                timed_out: false,
            };
        }
        info!(count = phrases.len(), "Searching phrases");

        let deadline = Instant::now() + self.timeout;
        let mut slots: Vec<Option<Vec<MatchResult>>> = vec![None; phrases.len()];
        let mut timed_out = false;

        {
            let mut pending: FuturesUnordered<_> = phrases
                .iter()
                .enumerate()
                .map(|(index, phrase)| async move {
                    (index, self.search.search(phrase, self.per_phrase_limit).await)
                })
                .collect();

            loop {
                match tokio::time::timeout_at(deadline, pending.next()).await {
                    Ok(Some((index, results))) => slots[index] = Some(results),
                    Ok(None) => break,
                    Err(_) => {
                        timed_out = true;
                        warn!(
                            finished = slots.iter().filter(|s| s.is_some()).count(),
                            total = phrases.len(),
                            timeout_ms = self.timeout.as_millis() as u64,
                            "Identification deadline passed, using partial results"
                        );
                        break;
                    }
                }
            }
        }

        let mut results = merge_results(slots.into_iter().flatten());
        let total_results = results.len();
        results.truncate(self.result_limit);

        info!(total_results, timed_out, "Identification finished");
        Identification {
            request_id,
            phrases,
            results,
            total_results,
            timed_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusStore, MemoryCorpus, SubtitleLine};
    use crate::error::Result;
    use crate::search::Retriever;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    const TRANSCRIPT: &str = "Cobb said: we need to go deeper. Right now, please!";

    fn lines() -> Vec<SubtitleLine> {
        vec![
            SubtitleLine::new("Inception", "2010", "We need to go deeper.").with_votes(8.1, 14075),
            SubtitleLine::new("Inception", "2010", "Right now, please."),
            SubtitleLine::new("Hot Fuzz", "2007", "Right now please, Danny"),
        ]
    }

    fn identifier(store: Arc<dyn CorpusStore>) -> Identifier {
        let search = Arc::new(SubtitleSearch::with_store(store, Retriever::default()));
        Identifier::new(search, &Config::default())
    }

    /// Serves the first scan immediately and stalls every later one.
    struct StallingStore {
        inner: MemoryCorpus,
        scans: AtomicU32,
        stall: Duration,
    }

    #[async_trait]
    impl CorpusStore for StallingStore {
        fn name(&self) -> &str {
            "stalling"
        }

        async fn count(&self) -> Result<u64> {
            self.inner.count().await
        }

        async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<SubtitleLine>> {
            if self.scans.fetch_add(1, Ordering::SeqCst) > 0 {
                tokio::time::sleep(self.stall).await;
            }
            self.inner.scan(offset, limit).await
        }

        async fn find_by_title(&self, needle: &str, limit: usize) -> Result<Vec<SubtitleLine>> {
            self.inner.find_by_title(needle, limit).await
        }
    }

    #[test]
    fn test_phrases_for_uses_config() {
        let id = identifier(Arc::new(MemoryCorpus::empty("e")));
        let phrases = id.phrases_for(TRANSCRIPT);
        assert_eq!(phrases.len(), 3);
        assert!(phrases.iter().all(|p| p.split_whitespace().count() == 5));
    }

    #[tokio::test]
    async fn test_identify_finds_movie() {
        let id = identifier(Arc::new(MemoryCorpus::from_lines("t", lines())));
        let outcome = id.identify(TRANSCRIPT).await;

        assert!(!outcome.timed_out);
        assert_eq!(outcome.phrases.len(), 3);
        assert!(!outcome.results.is_empty());
        assert_eq!(outcome.results[0].movie_title, "Inception");
        assert_eq!(outcome.total_results, outcome.results.len());

        let mut keys: Vec<(&str, &str)> = outcome
            .results
            .iter()
            .map(|r| (r.movie_title.as_str(), r.year.as_str()))
            .collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), before, "merged results must be distinct movies");
    }

    #[tokio::test]
    async fn test_identify_short_transcript() {
        let id = identifier(Arc::new(MemoryCorpus::from_lines("t", lines())));
        let outcome = id.identify("too short").await;
        assert!(outcome.phrases.is_empty());
        assert!(outcome.results.is_empty());
        assert!(!outcome.timed_out);
    }

    #[tokio::test]
    async fn test_deadline_returns_partial_results() {
        let store = StallingStore {
            inner: MemoryCorpus::from_lines("t", lines()),
            scans: AtomicU32::new(0),
            stall: Duration::from_secs(30),
        };
        let id = identifier(Arc::new(store)).with_timeout(Duration::from_millis(200));

        let outcome = id.identify(TRANSCRIPT).await;
        assert!(outcome.timed_out);
        assert_eq!(outcome.phrases.len(), 3);
        assert!(!outcome.results.is_empty(), "the unstalled phrase still counts");
    }

    #[tokio::test]
    async fn test_deadline_with_nothing_finished() {
        let store = StallingStore {
            inner: MemoryCorpus::from_lines("t", lines()),
            scans: AtomicU32::new(1),
            stall: Duration::from_secs(30),
        };
        let id = identifier(Arc::new(store)).with_timeout(Duration::from_millis(50));

        let outcome = id.identify(TRANSCRIPT).await;
        assert!(outcome.timed_out);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.total_results, 0);
    }
}
