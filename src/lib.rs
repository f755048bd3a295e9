// ABOUTME: Main library entry point for radiocast
// ABOUTME: Exports the playback controller and the components it drives

//! # radiocast
//!
//! One playback controller for the three shapes internet radio comes in:
//! direct audio files, HLS (`.m3u8`) adaptive streams and legacy M3U
//! playlists. Callers hand it a URL and drive it through a single control
//! surface (play, stop, rewind, volume, mute) while observers receive status
//! and error notifications.
//!
//! ## Components
//!
//! - **source**: classifies a URL as direct, HLS or M3U
//! - **playlist**: fetches and parses M3U/M3U8 text playlists
//! - **hls**: binds an adaptive-streaming engine (or native HLS) to the sink
//! - **player**: the controller state machine and its sink abstraction
//! - **persistence**: consent-gated volume persistence
//! - **native**: a desktop sink built on symphonia and cpal
//!
//! ## Example
//!
//! ```no_run
//! use radiocast::PlaybackController;
//!
//! #[tokio::main]
//! async fn main() -> radiocast::Result<()> {
//!     let mut player = PlaybackController::new();
//!     player.on_playback_status_change(|status| println!("status: {status}"));
//!     player.play_src("https://example.com/station.m3u").await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line argument parsing for the radiocast binary
pub mod cli;
/// Controller configuration
pub mod config;
/// Adaptive streaming (HLS) adapter
pub mod hls;
/// Desktop playback sink (symphonia + cpal)
pub mod native;
/// Volume persistence bridge
pub mod persistence;
/// Playback controller and sink abstraction
pub mod player;
/// M3U playlist fetching and parsing
pub mod playlist;
/// Now-playing session metadata
pub mod session;
/// URL classification
pub mod source;

pub use config::PlayerConfig;
pub use error::{FetchFailure, PlaybackError, Stage};
pub use player::{PlaybackController, PlaybackStatus, PlayerNotice};
pub use source::{classify, PlaybackSource, SourceKind};

/// Result type for radiocast operations
pub type Result<T> = std::result::Result<T, error::PlaybackError>;

/// Error types for radiocast
pub mod error {
    use std::fmt;
    use thiserror::Error;

    /// Stage of a playback attempt at which a media error occurred
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Stage {
        /// Fetching a playlist
        Fetch,
        /// Attaching a streaming engine to the sink
        Attach,
        /// Loading source metadata or an HLS manifest
        Load,
        /// Starting playback
        Play,
        /// While already playing
        Playback,
    }

    impl Stage {
        /// Lowercase name used in messages
        pub fn as_str(&self) -> &'static str {
            match self {
                Stage::Fetch => "fetch",
                Stage::Attach => "attach",
                Stage::Load => "load",
                Stage::Play => "play",
                Stage::Playback => "playback",
            }
        }
    }

    impl fmt::Display for Stage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Why a playlist could not be fetched
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum FetchFailure {
        /// The request did not complete before the deadline
        #[error("request timed out")]
        Timeout,

        /// The server answered with a non-2xx status
        #[error("HTTP status {0}")]
        Status(u16),

        /// Transport or I/O failure
        #[error("network error: {0}")]
        Network(String),
    }

    /// Error types for playback operations
    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum PlaybackError {
        /// Neither native nor engine-backed HLS playback is available
        #[error("no HLS playback path available for {url}")]
        UnsupportedStream {
            /// Stream URL
            url: String,
        },

        /// Playlist could not be fetched
        #[error("failed to fetch playlist {url}: {reason}")]
        PlaylistFetch {
            /// Playlist URL
            url: String,
            /// Underlying failure
            reason: FetchFailure,
        },

        /// Playlist parsed but held no usable audio entries
        #[error("playlist {url} contains no playable entries")]
        PlaylistEmpty {
            /// Playlist URL
            url: String,
        },

        /// Playlist resolution made no forward progress
        #[error("playlist {url} resolves to itself")]
        SelfReferentialPlaylist {
            /// Playlist URL
            url: String,
        },

        /// The sink or streaming engine failed to load or decode the source
        #[error("media error during {stage} of {url}: {message}")]
        Media {
            /// Source URL
            url: String,
            /// Where the failure happened
            stage: Stage,
            /// Description from the sink or engine
            message: String,
        },

        /// Volume outside `[0, 1]`
        #[error("volume {0} is outside the range [0, 1]")]
        InvalidVolume(f64),

        /// The controller was destroyed
        #[error("playback controller has been destroyed")]
        Destroyed,
    }

    impl PlaybackError {
        /// URL the error concerns, if any
        pub fn url(&self) -> Option<&str> {
            match self {
                PlaybackError::UnsupportedStream { url }
                | PlaybackError::PlaylistFetch { url, .. }
                | PlaybackError::PlaylistEmpty { url }
                | PlaybackError::SelfReferentialPlaylist { url }
                | PlaybackError::Media { url, .. } => Some(url),
                PlaybackError::InvalidVolume(_) | PlaybackError::Destroyed => None,
            }
        }
    }
}
