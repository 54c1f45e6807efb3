//! Deduplication of retrieved lines into distinct movies.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::normalize::normalize;
use super::retriever::{Candidate, RetrievalTier};
use super::scorer::score;
use crate::corpus::UNKNOWN;

/// One identified movie with the subtitle line that matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub movie_title: String,
    pub year: String,
    pub subtitle_text: String,
    pub match_score: f64,
    /// Retrieval tier that surfaced the line.
    pub source: RetrievalTier,
    pub imdb_id: String,
    pub genres: Vec<String>,
    pub overview: String,
    pub start_time: f64,
    pub end_time: f64,
    pub vote_average: f64,
    pub vote_count: u64,
}

impl MatchResult {
    fn from_candidate(candidate: Candidate, match_score: f64) -> Self {
        let line = candidate.line;
        Self {
            movie_title: line.movie_title,
            year: line.year,
            subtitle_text: line.text,
            match_score,
            source: candidate.tier,
            imdb_id: line.imdb_id,
            genres: line.genres,
            overview: line.overview,
            start_time: line.start_time,
            end_time: line.end_time,
            vote_average: line.vote_average,
            vote_count: line.vote_count,
        }
    }
}

/// Tracks identity keys already emitted.
#[derive(Debug, Default)]
struct SeenMovies(HashSet<(String, String)>);

impl SeenMovies {
    /// `true` the first time a valid key is offered.
    fn admit(&mut self, title: &str, year: &str) -> bool {
        if title == UNKNOWN && year == UNKNOWN {
            return false;
        }
        self.0.insert((title.to_string(), year.to_string()))
    }
}

/// Turn retriever output into at most `limit` distinct movies.
///
/// Candidates are visited in retriever order and the first line per
/// `(movie_title, year)` is kept. Scores are recomputed against the
/// normalized line so every tier lands in the same score space, then results
/// are ordered by `(match_score, vote_count)` descending.
pub fn aggregate(candidates: Vec<Candidate>, query_normalized: &str, limit: usize) -> Vec<MatchResult> {
    let mut seen = SeenMovies::default();
    let mut results = Vec::new();

    for candidate in candidates {
        let (title, year) = candidate.line.identity();
        if !seen.admit(title, year) {
            continue;
        }
        let match_score = score(query_normalized, &normalize(&candidate.line.text_normalized));
        results.push(MatchResult::from_candidate(candidate, match_score));
    }

    results.sort_by(|a, b| {
        b.match_score
            .total_cmp(&a.match_score)
            .then_with(|| b.vote_count.cmp(&a.vote_count))
    });
    results.truncate(limit);
    results
}

/// Merge per-phrase result lists, keeping the first result seen for each
/// movie. Lists are visited in the order given; nothing is re-scored.
pub fn merge_results<I>(lists: I) -> Vec<MatchResult>
where
    I: IntoIterator<Item = Vec<MatchResult>>,
{
    let mut seen = SeenMovies::default();
    lists
        .into_iter()
        .flatten()
        .filter(|result| seen.admit(&result.movie_title, &result.year))
        .collect()
}
