//! Subtitle corpus access.
//!
//! The search engine only ever reads the corpus. Stores expose a stable,
//! paginated scan, a document count and a case-insensitive title lookup;
//! everything else (ranking, dedup) happens above this layer.

pub mod connect;
pub mod memory;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use connect::{ConnectionChain, CorpusConnector, FileConnector};
pub use memory::MemoryCorpus;
pub use types::{SubtitleDocument, SubtitleLine, UNKNOWN};

/// Read-only view of the subtitle corpus.
///
/// Implementations must be safe to share across concurrent searches.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Store name for logs.
    fn name(&self) -> &str;

    /// Total number of stored lines.
    async fn count(&self) -> Result<u64>;

    /// Up to `limit` lines starting at `offset`, in an order that does not
    /// change between calls.
    async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<SubtitleLine>>;

    /// Lines whose movie title contains `needle` (case-insensitive).
    async fn find_by_title(&self, needle: &str, limit: usize) -> Result<Vec<SubtitleLine>>;

    /// One representative line, reported by corpus info.
    async fn sample(&self) -> Result<Option<SubtitleLine>> {
        Ok(self.scan(0, 1).await?.into_iter().next())
    }
}
