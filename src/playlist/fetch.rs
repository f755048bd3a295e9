// ABOUTME: HTTP fetching for playlist text
// ABOUTME: Blocking fetcher trait with a ureq-backed implementation

use crate::error::FetchFailure;
use std::io;
use std::time::Duration;

/// Blocking fetch of a text resource.
///
/// Implementations should honour `timeout` themselves; the resolver also
/// abandons the call once the deadline passes.
pub trait PlaylistFetcher: Send + Sync {
    /// Fetch `url` and return the body as text
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchFailure>;
}

/// Playlist fetcher backed by a shared `ureq` agent
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh agent
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!("radiocast/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }

    /// Use an existing agent (proxy or TLS settings)
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistFetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchFailure> {
        log::debug!("Fetching playlist {}", url);

        let response = match self.agent.get(url).timeout(timeout).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(FetchFailure::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                return Err(if is_timeout(&transport) {
                    FetchFailure::Timeout
                } else {
                    FetchFailure::Network(transport.to_string())
                });
            }
        };

        response.into_string().map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => FetchFailure::Timeout,
            _ => FetchFailure::Network(e.to_string()),
        })
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    let mut source = std::error::Error::source(transport);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        source = err.source();
    }
    false
}
