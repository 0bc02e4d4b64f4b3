//! Raw feed collaborator boundary.
//!
//! The engine consumes `(name, recurrence text)` pairs from an upstream
//! schedule source. Scraping mechanics live outside this crate; adapters
//! here only fetch and decode the already-structured feed.

use std::time::Duration;

use spawnwatch_core::RawSpawnEntry;

/// Errors from fetching or decoding the spawn feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status {status}")]
    Status { status: u16 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Source of raw spawn schedule entries.
#[async_trait::async_trait]
pub trait SpawnFeed: Send + Sync {
    /// Fetch the full current schedule.
    async fn fetch(&self) -> Result<Vec<RawSpawnEntry>, FeedError>;

    /// Human-readable name for this source (e.g., "http", "static").
    fn source_name(&self) -> &str;
}

/// Fetches the schedule as a JSON array of `{name, time_str}` records
/// from a configured endpoint.
#[derive(Debug)]
pub struct HttpFeed {
    url: String,
    client: reqwest::Client,
}

impl HttpFeed {
    /// Build a feed client with a bounded request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl SpawnFeed for HttpFeed {
    async fn fetch(&self) -> Result<Vec<RawSpawnEntry>, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, %status, "spawn feed returned non-2xx status");
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        let entries: Vec<RawSpawnEntry> = response.json().await?;
        tracing::debug!(url = %self.url, count = entries.len(), "spawn feed fetched");
        Ok(entries)
    }

    fn source_name(&self) -> &str {
        "http"
    }
}

/// Fixed in-memory feed for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    entries: Vec<RawSpawnEntry>,
}

impl StaticFeed {
    pub fn new(entries: Vec<RawSpawnEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait::async_trait]
impl SpawnFeed for StaticFeed {
    async fn fetch(&self) -> Result<Vec<RawSpawnEntry>, FeedError> {
        Ok(self.entries.clone())
    }

    fn source_name(&self) -> &str {
        "static"
    }
}
