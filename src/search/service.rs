//! The subtitle search service.
//!
//! [`SubtitleSearch`] owns the corpus connection and runs the
//! retrieve → aggregate pipeline per query. It is built explicitly and handed
//! to whoever serves requests; there is no global instance.
//!
//! The connection is opened lazily by the first search (or eagerly with
//! [`SubtitleSearch::open`]) and then shared by every concurrent search. A
//! failed attempt leaves the service disconnected so a later call can try
//! again.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::aggregate::{aggregate, merge_results, MatchResult};
use super::normalize::normalize;
use super::retriever::{RetrievalOptions, Retriever};
use crate::config::Config;
use crate::corpus::connect::Connection;
use crate::corpus::{ConnectionChain, CorpusStore, FileConnector, SubtitleLine};
use crate::error::{CineError, Result};

/// Connection status as reported to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorpusInfo {
    Connected {
        total_documents: u64,
        profile: String,
        connected_at: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sample_document: Option<SubtitleLine>,
    },
    NotConnected {
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        error: String,
    },
}

impl CorpusInfo {
    pub fn status(&self) -> &'static str {
        match self {
            CorpusInfo::Connected { .. } => "connected",
            CorpusInfo::NotConnected { .. } => "not_connected",
            CorpusInfo::Error { .. } => "error",
        }
    }
}

/// Phrase-matching search over the subtitle corpus.
pub struct SubtitleSearch {
    chain: ConnectionChain,
    retriever: Retriever,
    connection: RwLock<Option<Connection>>,
}

impl fmt::Debug for SubtitleSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubtitleSearch")
            .field("chain", &self.chain)
            .field("retriever", &self.retriever)
            .finish()
    }
}

impl SubtitleSearch {
    pub fn new(chain: ConnectionChain, retriever: Retriever) -> Self {
        Self {
            chain,
            retriever,
            connection: RwLock::new(None),
        }
    }

    /// Service over the configured profiles, using file-backed corpora.
    pub fn from_config(config: &Config) -> Self {
        let chain = ConnectionChain::new(Arc::new(FileConnector), config.corpus.profiles.clone());
        let retriever = Retriever::new(RetrievalOptions::from_config(&config.corpus, &config.search));
        Self::new(chain, retriever)
    }

    /// Service over an already-open store. There are no profiles to fall
    /// back on, so after [`close`](Self::close) it stays disconnected.
    pub fn with_store(store: Arc<dyn CorpusStore>, retriever: Retriever) -> Self {
        let profile = store.name().to_string();
        let connection = Connection {
            store,
            profile,
            connected_at: Utc::now(),
        };
        Self {
            chain: ConnectionChain::new(Arc::new(FileConnector), Vec::new()),
            retriever,
            connection: RwLock::new(Some(connection)),
        }
    }

    /// Connect now instead of on first search.
    pub async fn open(&self) -> Result<()> {
        self.connect_if_absent().await.map(|_| ())
    }

    /// Drop the connection. The next search reconnects through the chain.
    pub async fn close(&self) {
        if let Some(connection) = self.connection.write().await.take() {
            info!(profile = %connection.profile, "Closed subtitle corpus connection");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    async fn connect_if_absent(&self) -> Result<Connection> {
        if let Some(connection) = self.connection.read().await.as_ref() {
            return Ok(connection.clone());
        }

        let mut slot = self.connection.write().await;
        // Another search may have connected while we waited for the lock.
        if let Some(connection) = slot.as_ref() {
            return Ok(connection.clone());
        }

        if self.chain.profiles().is_empty() {
            return Err(CineError::NotConnected);
        }
        let connection = self.chain.connect().await?;
        *slot = Some(connection.clone());
        Ok(connection)
    }

    /// Search for `query`, surfacing failures.
    ///
    /// Returns at most `limit` distinct movies, best first. No match is
    /// `Ok(vec![])`.
    pub async fn try_search(&self, query: &str, limit: usize) -> Result<Vec<MatchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CineError::MalformedQuery("query is empty".to_string()));
        }
        let query_normalized = normalize(query);
        if query_normalized.is_empty() {
            return Err(CineError::MalformedQuery(format!(
                "query {:?} has no searchable words",
                query
            )));
        }
        if limit == 0 {
            return Err(CineError::MalformedQuery(
                "limit must be positive".to_string(),
            ));
        }

        let connection = self.connect_if_absent().await?;
        let candidates = self
            .retriever
            .retrieve(connection.store.as_ref(), query, limit)
            .await?;
        debug!(candidates = candidates.len(), "Retrieved candidates");

        let results = aggregate(candidates, &query_normalized, limit);
        match results.first() {
            Some(top) => info!(
                found = results.len(),
                top_title = %top.movie_title,
                top_score = top.match_score,
                "Subtitle search finished"
            ),
            None => info!("Subtitle search found no matches"),
        }
        Ok(results)
    }

    /// Search for `query`. Never fails: any problem is logged and yields an
    /// empty list.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<MatchResult> {
        let span = info_span!("search", query = %query, limit);
        async {
            match self.try_search(query, limit).await {
                Ok(results) => results,
                Err(CineError::MalformedQuery(reason)) => {
                    warn!(%reason, "Rejected query");
                    Vec::new()
                }
                Err(err) => {
                    error!(error = %err, "Subtitle search failed");
                    Vec::new()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Search several queries one after another, merge the lists keeping the
    /// first result per movie, then order by match score.
    pub async fn search_many<S: AsRef<str>>(
        &self,
        queries: &[S],
        limit_per_query: usize,
    ) -> Vec<MatchResult> {
        let mut lists = Vec::with_capacity(queries.len());
        for query in queries {
            lists.push(self.search(query.as_ref(), limit_per_query).await);
        }

        let mut merged = merge_results(lists);
        merged.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
        merged
    }

    /// Report whether the corpus is reachable and how large it is.
    pub async fn corpus_info(&self) -> CorpusInfo {
        if self.chain.profiles().is_empty() && !self.is_connected().await {
            return CorpusInfo::NotConnected { error: None };
        }

        let connection = match self.connect_if_absent().await {
            Ok(connection) => connection,
            Err(err) => {
                warn!(error = %err, "Corpus connection failed");
                return CorpusInfo::Error {
                    error: err.to_string(),
                };
            }
        };

        let total_documents = match connection.store.count().await {
            Ok(total) => total,
            Err(err) => {
                return CorpusInfo::Error {
                    error: err.to_string(),
                }
            }
        };

        let sample_document = match connection.store.sample().await {
            Ok(sample) => sample,
            Err(err) => {
                return CorpusInfo::Error {
                    error: err.to_string(),
                }
            }
        };

        CorpusInfo::Connected {
            total_documents,
            profile: connection.profile,
            connected_at: connection.connected_at,
            sample_document,
        }
    }
}
