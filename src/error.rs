//! Error types for cineseek
//!
//! This module defines all error types used throughout the search engine.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.
//!
//! Note that an empty result set is never an error: searches that find
//! nothing return `Ok(vec![])`.

use thiserror::Error;

/// The primary error type for cineseek operations.
#[derive(Error, Debug)]
pub enum CineError {
    /// Configuration-related errors (invalid values, unreadable config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every configured connection profile failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The operation needs a corpus connection and none is established.
    #[error("Not connected to the subtitle corpus")]
    NotConnected,

    /// Empty or unusable query, rejected before retrieval.
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// Read failures inside a corpus store.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for cineseek operations.
pub type Result<T> = std::result::Result<T, CineError>;
