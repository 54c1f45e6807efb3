//! cineseek - identify a movie from a short quote
//!
//! Matches a noisy phrase (from a transcript or typed text) against a corpus
//! of time-coded subtitle lines and returns the most likely movies.

pub mod config;
pub mod corpus;
pub mod error;
pub mod identify;
pub mod phrases;
pub mod search;

pub use config::Config;
pub use error::{CineError, Result};
pub use identify::{Identification, Identifier};
pub use search::{CorpusInfo, MatchResult, SubtitleSearch};
