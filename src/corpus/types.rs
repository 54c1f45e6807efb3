//! Corpus record types.
//!
//! `SubtitleDocument` mirrors the loosely typed stored shape (every field
//! optional). It is converted to the strongly typed `SubtitleLine` at the
//! corpus-read boundary, where all defaults are applied once.

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder for a missing title or year.
pub const UNKNOWN: &str = "Unknown";

/// One stored subtitle line as it appears on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleDocument {
    pub movie_title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub year: Option<String>,
    #[serde(alias = "text")]
    pub subtitle_text: Option<String>,
    pub text_lower: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub start_time: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub end_time: Option<f64>,
    pub imdb_id: Option<String>,
    pub genres: Option<Vec<String>>,
    pub overview: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub vote_average: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub vote_count: Option<f64>,
}

/// A subtitle line as seen by the search engine. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleLine {
    pub movie_title: String,
    pub year: String,
    /// Verbatim line.
    pub text: String,
    /// Lowercase of `text`, computed once when the record is loaded.
    pub text_normalized: String,
    pub start_time: f64,
    pub end_time: f64,
    pub imdb_id: String,
    pub genres: Vec<String>,
    pub overview: String,
    pub vote_average: f64,
    pub vote_count: u64,
}

impl SubtitleLine {
    /// Build a line with empty metadata. Mostly useful for fixtures.
    pub fn new(movie_title: &str, year: &str, text: &str) -> Self {
        Self {
            movie_title: movie_title.to_string(),
            year: year.to_string(),
            text: text.to_string(),
            text_normalized: text.to_lowercase(),
            start_time: 0.0,
            end_time: 0.0,
            imdb_id: String::new(),
            genres: Vec::new(),
            overview: String::new(),
            vote_average: 0.0,
            vote_count: 0,
        }
    }

    pub fn with_votes(mut self, vote_average: f64, vote_count: u64) -> Self {
        self.vote_average = vote_average;
        self.vote_count = vote_count;
        self
    }

    pub fn with_timing(mut self, start_time: f64, end_time: f64) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// Identity key used for deduplication.
    pub fn identity(&self) -> (&str, &str) {
        (&self.movie_title, &self.year)
    }
}

impl From<SubtitleDocument> for SubtitleLine {
    fn from(doc: SubtitleDocument) -> Self {
        let text = doc.subtitle_text.unwrap_or_default();
        let text_normalized = match doc.text_lower {
            Some(lower) if !lower.is_empty() => lower.to_lowercase(),
            _ => text.to_lowercase(),
        };

        Self {
            movie_title: non_empty_or_unknown(doc.movie_title),
            year: non_empty_or_unknown(doc.year),
            text,
            text_normalized,
            start_time: doc.start_time.unwrap_or(0.0),
            end_time: doc.end_time.unwrap_or(0.0),
            imdb_id: doc.imdb_id.unwrap_or_default(),
            genres: doc.genres.unwrap_or_default(),
            overview: doc.overview.unwrap_or_default(),
            vote_average: doc.vote_average.unwrap_or(0.0),
            vote_count: doc
                .vote_count
                .filter(|v| v.is_finite() && *v > 0.0)
                .map(|v| v as u64)
                .unwrap_or(0),
        }
    }
}

fn non_empty_or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => UNKNOWN.to_string(),
    }
}

/// Years show up as strings (`"2010"`) or numbers (`2010`, `2010.0`).
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Int(i)) => Some(i.to_string()),
        Some(Raw::Float(f)) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
        Some(Raw::Float(f)) => Some(f.to_string()),
        None => None,
    })
}

/// Numbers sometimes arrive as strings; unparseable values become `None`.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
