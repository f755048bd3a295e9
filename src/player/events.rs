// ABOUTME: Status and notice types broadcast by the playback controller
// ABOUTME: Observers receive these synchronously, in transition order

use crate::error::PlaybackError;
use serde::Serialize;
use std::fmt;

/// Playback status of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Nothing is playing and the position is at the start
    Stopped,
    /// A source is being loaded or playback stalled
    Loading,
    /// Currently playing
    Playing,
    /// Paused by the user mid-stream
    Paused,
}

impl PlaybackStatus {
    /// Convert to status string
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "stopped",
            PlaybackStatus::Loading => "loading",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notice delivered to error observers
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerNotice {
    /// Something failed; playback did not start or stopped
    Error(PlaybackError),
    /// The source is ready but the host blocked programmatic start
    AutoplayBlocked {
        /// Source waiting for a user gesture
        url: String,
    },
}

impl PlayerNotice {
    /// Whether this notice is recoverable without a new source
    pub fn is_warning(&self) -> bool {
        matches!(self, PlayerNotice::AutoplayBlocked { .. })
    }

    /// The error carried by this notice, if any
    pub fn error(&self) -> Option<&PlaybackError> {
        match self {
            PlayerNotice::Error(err) => Some(err),
            PlayerNotice::AutoplayBlocked { .. } => None,
        }
    }
}

impl fmt::Display for PlayerNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerNotice::Error(err) => write!(f, "{err}"),
            PlayerNotice::AutoplayBlocked { url } => {
                write!(f, "autoplay blocked for {url}; waiting for user interaction")
            }
        }
    }
}
