// ABOUTME: Playlist resolver: fetch, parse and filter a remote playlist
// ABOUTME: Runs the blocking fetcher off the async thread under a deadline

use crate::error::{FetchFailure, PlaybackError};
use crate::playlist::fetch::PlaylistFetcher;
use crate::playlist::parser::{parse_playlist, PlaylistEntry};
use crate::source::absolutize;
use std::sync::Arc;
use std::time::Duration;

/// Default playlist fetch deadline
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves playlist URLs into entries
#[derive(Clone)]
pub struct PlaylistResolver {
    fetcher: Arc<dyn PlaylistFetcher>,
    origin: Option<String>,
    timeout: Duration,
}

impl PlaylistResolver {
    /// Create a resolver using `fetcher`
    pub fn new(fetcher: Arc<dyn PlaylistFetcher>) -> Self {
        Self {
            fetcher,
            origin: None,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Origin used to absolutise relative playlist URLs
    pub fn with_origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }

    /// Fetch deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute form of `playlist_url`
    pub fn normalize(&self, playlist_url: &str) -> String {
        absolutize(playlist_url, self.origin.as_deref())
    }

    /// Fetch and parse `playlist_url`.
    ///
    /// Each call fetches again; nothing is cached between calls.
    pub async fn resolve(&self, playlist_url: &str) -> Result<Vec<PlaylistEntry>, PlaybackError> {
        let url = self.normalize(playlist_url);
        let body = self.fetch(&url).await?;

        let entries = parse_playlist(&body, &url);
        if entries.is_empty() {
            log::warn!("Playlist {} has no playable entries", url);
            return Err(PlaybackError::PlaylistEmpty { url });
        }

        log::info!("Resolved playlist {} into {} entries", url, entries.len());
        Ok(entries)
    }

    async fn fetch(&self, url: &str) -> Result<String, PlaybackError> {
        let fetcher = Arc::clone(&self.fetcher);
        let target = url.to_string();
        let timeout = self.timeout;
        let request = tokio::task::spawn_blocking(move || fetcher.fetch(&target, timeout));

        let outcome = match tokio::time::timeout(timeout, request).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(FetchFailure::Network(join_err.to_string())),
            // The blocking request is abandoned; its own timeout ends it
            Err(_) => Err(FetchFailure::Timeout),
        };

        outcome.map_err(|reason| {
            log::warn!("Fetching playlist {} failed: {}", url, reason);
            PlaybackError::PlaylistFetch {
                url: url.to_string(),
                reason,
            }
        })
    }
}
