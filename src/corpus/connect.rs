//! Ordered connection strategies for the corpus store.
//!
//! A [`ConnectionChain`] holds the configured [`ConnectionProfile`]s and tries
//! them in order. Each attempt is bounded by the profile's timeout and is
//! verified with a document count before it counts as connected. The first
//! profile that passes wins; when none does, the error lists every failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cineseek::config::ConnectionProfile;
//! use cineseek::corpus::{ConnectionChain, FileConnector};
//!
//! let chain = ConnectionChain::new(
//!     Arc::new(FileConnector),
//!     vec![
//!         ConnectionProfile::new("primary", "file:///srv/subtitles.jsonl"),
//!         ConnectionProfile::new("fallback", "/mnt/backup/subtitles.jsonl"),
//!     ],
//! );
//! let connection = chain.connect().await?;
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::memory::MemoryCorpus;
use super::CorpusStore;
use crate::config::ConnectionProfile;
use crate::error::{CineError, Result};

// ============================================================================
// Connector
// ============================================================================

/// Opens a corpus store for one profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CorpusConnector: Send + Sync {
    async fn connect(&self, profile: &ConnectionProfile) -> Result<Arc<dyn CorpusStore>>;
}

/// Connector for file-backed corpora.
///
/// Accepts `file://<path>`, a bare path, or `memory://` (an empty corpus,
/// handy for smoke tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct FileConnector;

#[async_trait]
impl CorpusConnector for FileConnector {
    async fn connect(&self, profile: &ConnectionProfile) -> Result<Arc<dyn CorpusStore>> {
        let uri = profile.uri.trim();
        if uri.starts_with("memory://") {
            return Ok(Arc::new(MemoryCorpus::empty(&profile.name)));
        }

        let path = match uri.strip_prefix("file://") {
            Some(rest) => PathBuf::from(rest),
            None if uri.contains("://") => {
                return Err(CineError::Connection(format!(
                    "Unsupported corpus URI scheme: {}",
                    uri
                )));
            }
            None => PathBuf::from(uri),
        };

        let corpus = MemoryCorpus::from_path(&profile.name, &path).await?;
        Ok(Arc::new(corpus))
    }
}

// ============================================================================
// Chain
// ============================================================================

/// An established corpus connection.
#[derive(Clone)]
pub struct Connection {
    pub store: Arc<dyn CorpusStore>,
    /// Name of the profile that connected.
    pub profile: String,
    pub connected_at: DateTime<Utc>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("store", &self.store.name())
            .field("profile", &self.profile)
            .field("connected_at", &self.connected_at)
            .finish()
    }
}

/// Tries connection profiles in order until one works.
pub struct ConnectionChain {
    connector: Arc<dyn CorpusConnector>,
    profiles: Vec<ConnectionProfile>,
}

impl fmt::Debug for ConnectionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.profiles.iter().map(|p| p.name.as_str()).collect();
        f.debug_struct("ConnectionChain")
            .field("profiles", &names)
            .finish()
    }
}

impl ConnectionChain {
    pub fn new(connector: Arc<dyn CorpusConnector>, profiles: Vec<ConnectionProfile>) -> Self {
        Self {
            connector,
            profiles,
        }
    }

    pub fn profiles(&self) -> &[ConnectionProfile] {
        &self.profiles
    }

    /// Connect using the first profile that opens and answers a count.
    pub async fn connect(&self) -> Result<Connection> {
        if self.profiles.is_empty() {
            return Err(CineError::Connection(
                "No connection profiles configured".to_string(),
            ));
        }

        let mut failures = Vec::with_capacity(self.profiles.len());

        for (attempt, profile) in self.profiles.iter().enumerate() {
            info!(
                profile = %profile.name,
                attempt = attempt + 1,
                total = self.profiles.len(),
                "Connecting to subtitle corpus"
            );

            match self.attempt(profile).await {
                Ok((store, total)) => {
                    info!(
                        profile = %profile.name,
                        total_documents = total,
                        "Connected to subtitle corpus"
                    );
                    return Ok(Connection {
                        store,
                        profile: profile.name.clone(),
                        connected_at: Utc::now(),
                    });
                }
                Err(err) => {
                    warn!(profile = %profile.name, error = %err, "Connection attempt failed");
                    failures.push(format!("{}: {}", profile.name, err));
                }
            }
        }

        Err(CineError::Connection(format!(
            "All {} connection profiles failed ({})",
            self.profiles.len(),
            failures.join("; ")
        )))
    }

    async fn attempt(&self, profile: &ConnectionProfile) -> Result<(Arc<dyn CorpusStore>, u64)> {
        let timeout = Duration::from_secs(profile.connect_timeout_secs.max(1));
        let connect = async {
            let store = self.connector.connect(profile).await?;
            let total = store.count().await?;
            Ok::<_, CineError>((store, total))
        };

        match tokio::time::timeout(timeout, connect).await {
            Ok(result) => result,
            Err(_) => Err(CineError::Connection(format!(
                "timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }
}
