//! Phrase extraction from transcript text.
//!
//! A transcript is cut into every window of `phrase_length` consecutive
//! words. The windows are ranked and the best few become search queries.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Characters stripped from both ends of each word.
const EDGE_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '(', ')', '[', ']', '{', '}',
];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did",
        "will", "would", "could", "should", "this", "that", "these", "those", "i", "you", "he",
        "she", "it", "we", "they",
    ]
    .into_iter()
    .collect()
});

/// How candidate phrases are ranked before selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseScoring {
    /// Longer phrases first.
    #[default]
    Length,
    /// Characters outside stop words first, full length as tie-break.
    Informative,
}

/// Lazy iterator over distinct sliding-window phrases, in transcript order.
#[derive(Debug)]
pub struct Phrases {
    words: Vec<String>,
    window: usize,
    next: usize,
    seen: HashSet<String>,
}

impl Iterator for Phrases {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.window == 0 {
            return None;
        }
        while self.next + self.window <= self.words.len() {
            let phrase = self.words[self.next..self.next + self.window].join(" ");
            self.next += 1;
            if self.seen.insert(phrase.clone()) {
                return Some(phrase);
            }
        }
        None
    }
}

/// Split `text` into words and yield each distinct window of `phrase_length`
/// words. Yields nothing when there are fewer words than `phrase_length`.
pub fn extract_phrases(text: &str, phrase_length: usize) -> Phrases {
    let words = text
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(EDGE_PUNCTUATION))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect();

    Phrases {
        words,
        window: phrase_length,
        next: 0,
        seen: HashSet::new(),
    }
}

/// Pick the `count` best phrases, best first. Ties keep input order.
pub fn select_best_phrases<I>(phrases: I, count: usize, scoring: PhraseScoring) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut scored: Vec<((usize, usize), String)> = phrases
        .into_iter()
        .filter(|phrase| !phrase.is_empty())
        .map(|phrase| (score_phrase(&phrase, scoring), phrase))
        .collect();

    let total = scored.len();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    let best: Vec<String> = scored.into_iter().take(count).map(|(_, p)| p).collect();

    debug!(candidates = total, selected = best.len(), ?scoring, "Selected phrases");
    best
}

fn score_phrase(phrase: &str, scoring: PhraseScoring) -> (usize, usize) {
    let length = phrase.chars().count();
    match scoring {
        PhraseScoring::Length => (length, 0),
        PhraseScoring::Informative => {
            let content = phrase
                .split_whitespace()
                .filter(|word| !STOP_WORDS.contains(word))
                .map(|word| word.chars().count())
                .sum();
            (content, length)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_count() {
        let phrases: Vec<String> = extract_phrases("a b c d", 2).collect();
        assert_eq!(phrases, vec!["a b", "b c", "c d"]);
    }

    #[test]
    fn test_strips_edge_punctuation_and_lowercases() {
        let phrases: Vec<String> = extract_phrases("\"Hello,\" (World)! ... Again?", 2).collect();
        assert_eq!(phrases, vec!["hello world", "world again"]);
    }

    #[test]
    fn test_inner_punctuation_kept() {
        let phrases: Vec<String> = extract_phrases("I'm not here", 3).collect();
        assert_eq!(phrases, vec!["i'm not here"]);
    }

    #[test]
    fn test_duplicates_dropped_first_wins() {
        let phrases: Vec<String> = extract_phrases("go go go go", 2).collect();
        assert_eq!(phrases, vec!["go go"]);

        let phrases: Vec<String> = extract_phrases("a b a b c", 2).collect();
        assert_eq!(phrases, vec!["a b", "b a", "b c"]);
    }

    #[test]
    fn test_too_few_words() {
        assert_eq!(extract_phrases("only two", 5).count(), 0);
        assert_eq!(extract_phrases("", 1).count(), 0);
        assert_eq!(extract_phrases("some words", 0).count(), 0);
    }

    #[test]
    fn test_iterator_is_lazy_and_single_pass() {
        let mut phrases = extract_phrases("a b c", 1);
        assert_eq!(phrases.next().as_deref(), Some("a"));
        assert_eq!(phrases.by_ref().count(), 2);
        assert_eq!(phrases.next(), None);
    }

    #[test]
    fn test_select_longest_in_order() {
        let phrases: Vec<String> = (1..=10).map(|n| "x".repeat(n)).collect();
        let best = select_best_phrases(phrases, 3, PhraseScoring::Length);
        assert_eq!(best, vec!["x".repeat(10), "x".repeat(9), "x".repeat(8)]);
    }

    #[test]
    fn test_select_fewer_than_count() {
        let best = select_best_phrases(
            vec!["ab".to_string(), "abc".to_string()],
            5,
            PhraseScoring::Length,
        );
        assert_eq!(best, vec!["abc", "ab"]);
        assert!(select_best_phrases(Vec::new(), 3, PhraseScoring::Length).is_empty());
    }

    #[test]
    fn test_select_ties_keep_input_order() {
        let best = select_best_phrases(
            vec!["bb".to_string(), "aa".to_string(), "c".to_string()],
            2,
            PhraseScoring::Length,
        );
        assert_eq!(best, vec!["bb", "aa"]);
    }

    #[test]
    fn test_informative_scoring_discounts_stop_words() {
        let phrases = vec![
            "and it was the one that we had".to_string(),
            "mister anderson welcome back".to_string(),
        ];
        let by_length = select_best_phrases(phrases.clone(), 1, PhraseScoring::Length);
        assert_eq!(by_length, vec!["and it was the one that we had"]);

        let informative = select_best_phrases(phrases, 1, PhraseScoring::Informative);
        assert_eq!(informative, vec!["mister anderson welcome back"]);
    }

    #[test]
    fn test_scoring_serde_names() {
        let s: PhraseScoring = serde_json::from_str("\"informative\"").unwrap();
        assert_eq!(s, PhraseScoring::Informative);
        assert_eq!(PhraseScoring::default(), PhraseScoring::Length);
    }
}
