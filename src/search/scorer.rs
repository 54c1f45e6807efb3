//! Query-vs-line relevance scoring.
//!
//! Scoring algorithm, both inputs already normalized:
//! - Query contained in the line: `1.0 + (1.0 - position / len)`, so an exact
//!   phrase always lands in `[1.0, 2.0]` and earlier matches score higher.
//! - Otherwise: fraction of query tokens that occur as whole tokens of the
//!   line, in `[0.0, 1.0]`.
//!
//! Any containment therefore outranks any partial token overlap.

use super::normalize::tokens;

/// Score a normalized query against a normalized subtitle line.
pub fn score(query: &str, text: &str) -> f64 {
    if query.is_empty() || text.is_empty() {
        return 0.0;
    }

    if let Some(contained) = containment_score(query, text) {
        return contained;
    }

    token_overlap(query, text)
}

/// The containment branch on its own: `None` when `query` does not occur in
/// `text`. Positions and lengths are counted in characters.
pub fn containment_score(query: &str, text: &str) -> Option<f64> {
    if query.is_empty() || text.is_empty() {
        return None;
    }

    let byte_pos = text.find(query)?;
    let position = text[..byte_pos].chars().count() as f64;
    let len = text.chars().count() as f64;
    Some(1.0 + (1.0 - position / len))
}

/// Fraction of query tokens found among the text's whole tokens.
fn token_overlap(query: &str, text: &str) -> f64 {
    let query_tokens: Vec<&str> = tokens(query).collect();
    if query_tokens.is_empty() {
        return 0.0;
    }

    let text_tokens: Vec<&str> = tokens(text).collect();
    let matched = query_tokens
        .iter()
        .filter(|token| text_tokens.contains(token))
        .count();

    matched as f64 / query_tokens.len() as f64
}
