//! Song search for the music/name stage.
//!
//! Lookups are debounced: each keystroke restarts a short timer and only the
//! query typed last before the timer fires is sent. A lookup that has
//! started is never cancelled by later typing; whichever response arrives
//! last replaces the visible results.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One selectable search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    /// `"song - artist - album"`, also the text put into the input
    pub name: String,
}

/// Record returned by the music search endpoint
#[derive(Debug, Deserialize)]
pub struct SongRecord {
    #[serde(rename = "songID")]
    pub song_id: serde_json::Value,
    #[serde(rename = "songName")]
    pub song_name: String,
    #[serde(rename = "artistName")]
    pub artist_name: String,
    #[serde(rename = "albumName")]
    pub album_name: String,
}

impl From<SongRecord> for SearchResult {
    fn from(record: SongRecord) -> Self {
        let id = match record.song_id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            id,
            name: format!(
                "{} - {} - {}",
                record.song_name, record.artist_name, record.album_name
            ),
        }
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

/// HTTP client for `GET {base_url}/api/music_search?q=<query>`
pub struct MusicSearchClient {
    client: reqwest::Client,
    base_url: String,
}

impl MusicSearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for MusicSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let records: Vec<SongRecord> = self
            .client
            .get(format!("{}/api/music_search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(records.into_iter().map(SearchResult::from).collect())
    }
}

/// Results of one finished lookup
#[derive(Debug)]
pub struct SearchUpdate {
    epoch: u64,
    pub query: String,
    pub results: Vec<SearchResult>,
}

/// Trailing-edge debouncer in front of a [`SearchProvider`]
pub struct SearchDebouncer {
    provider: Arc<dyn SearchProvider>,
    delay: Duration,
    updates: mpsc::UnboundedSender<SearchUpdate>,
    timer: Option<JoinHandle<()>>,
    epoch: Arc<AtomicU64>,
}

impl SearchDebouncer {
    /// Create a debouncer and the receiver its results arrive on
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                provider,
                delay,
                updates: tx,
                timer: None,
                epoch: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    /// The input changed. Empty input clears instead of searching.
    pub fn on_input(&mut self, query: &str) {
        if query.is_empty() {
            self.clear();
            return;
        }

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let provider = Arc::clone(&self.provider);
        let updates = self.updates.clone();
        let epoch = self.epoch.load(Ordering::SeqCst);
        let delay = self.delay;
        let query = query.to_string();

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so that aborting the timer cannot cancel the request
            tokio::spawn(async move {
                debug!(query = %query, "Searching songs");
                match provider.search(&query).await {
                    Ok(results) => {
                        let _ = updates.send(SearchUpdate {
                            epoch,
                            query,
                            results,
                        });
                    }
                    Err(e) => warn!(query = %query, "{}", e),
                }
            });
        }));
    }

    /// Cancel the pending timer and ignore every response from before now
    pub fn clear(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Results to show for an update, or `None` if it predates a clear
    pub fn accept(&self, update: SearchUpdate) -> Option<Vec<SearchResult>> {
        if update.epoch == self.epoch.load(Ordering::SeqCst) {
            Some(update.results)
        } else {
            debug!(query = %update.query, "Dropping stale search results");
            None
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
