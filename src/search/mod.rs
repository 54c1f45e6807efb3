//! Phrase-matching search engine.
//!
//! Pipeline for one query:
//! 1. [`retriever`] walks the tier chain (substring → overlap → title) over a
//!    bounded corpus sample.
//! 2. [`aggregate`] collapses lines into distinct `(movie_title, year)`
//!    identities, rescoring each with [`scorer`] on [`normalize`]d text.
//! 3. [`service`] wraps both behind a connection-owning `SubtitleSearch`.

pub mod aggregate;
pub mod normalize;
pub mod retriever;
pub mod scorer;
pub mod service;

pub use aggregate::{aggregate, merge_results, MatchResult};
pub use normalize::{normalize, normalize_strict};
pub use retriever::{Candidate, RetrievalOptions, RetrievalTier, Retriever};
pub use scorer::score;
pub use service::{CorpusInfo, SubtitleSearch};
