//! Text normalization shared by corpus text and queries.
//!
//! Scores are only comparable when both sides went through the same
//! function, so every comparison in the search pipeline starts here.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is neither a word character nor whitespace. `\w` is
/// Unicode-aware: letters, digits and `_` in any script.
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("static regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Lowercase, turn punctuation into spaces, collapse whitespace and trim.
///
/// ```
/// use cineseek::search::normalize::normalize;
/// assert_eq!(normalize("Wait... WHAT?!  No"), "wait what no");
/// ```
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let spaced = NON_WORD.replace_all(&lower, " ");
    collapse(&spaced)
}

/// Stricter variant used by the substring tier: punctuation is deleted
/// instead of replaced, so `"don't"` becomes `"dont"`.
pub fn normalize_strict(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");
    collapse(&stripped)
}

/// Whitespace tokens of already-normalized text.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

fn collapse(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert_eq!(normalize("THE Force"), normalize("the   force!!"));
        assert_eq!(normalize("THE Force"), "the force");
    }

    #[test]
    fn test_punctuation_becomes_space() {
        assert_eq!(normalize("don't"), "don t");
        assert_eq!(normalize("end.start"), "end start");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "  Hello,   World!  ",
            "Wait... what?",
            "I'll be back.",
            "",
            "¿Dónde está?",
            "tabs\tand\nnewlines",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
            let strict = normalize_strict(input);
            assert_eq!(normalize_strict(&strict), strict, "input: {:?}", input);
        }
    }

    #[test]
    fn test_unicode_word_characters_survive() {
        assert_eq!(normalize("Ça VA, Amélie?"), "ça va amélie");
        assert_eq!(normalize("snake_case stays"), "snake_case stays");
    }

    #[test]
    fn test_strict_deletes_punctuation() {
        assert_eq!(normalize_strict("Don't   panic!"), "dont panic");
        assert_eq!(normalize_strict("...and, then"), "and then");
    }

    #[test]
    fn test_only_punctuation_normalizes_to_empty() {
        assert_eq!(normalize("?!... --"), "");
        assert_eq!(normalize_strict("?!... --"), "");
    }

    #[test]
    fn test_tokens() {
        let toks: Vec<&str> = tokens("we need  to go").collect();
        assert_eq!(toks, vec!["we", "need", "to", "go"]);
        assert_eq!(tokens("").count(), 0);
    }
}
