// ABOUTME: Playback controller configuration
// ABOUTME: Defines tunable parameters for resolution, volume and streaming

use crate::hls::EngineConfig;
use crate::persistence::DEFAULT_VOLUME_KEY;
use crate::playlist::DEFAULT_FETCH_TIMEOUT;
use std::time::Duration;

/// Controller configuration
#[derive(Clone, Debug)]
pub struct PlayerConfig {
    /// Origin used to absolutise relative URLs (e.g. `http://localhost:8080`)
    pub origin: Option<String>,
    /// Playlist fetch deadline
    pub fetch_timeout: Duration,
    /// Increment used by volume up/down
    pub volume_step: f64,
    /// Volume when nothing is persisted
    pub default_volume: f64,
    /// Persistence key for the volume
    pub volume_key: String,
    /// How many playlists may nest before giving up
    pub max_playlist_depth: usize,
    /// Artist line for session metadata
    pub artist: Option<String>,
    /// Settings for the streaming engine
    pub engine: EngineConfig,
}

impl PlayerConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin for relative URLs
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set the playlist fetch deadline
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the volume step
    pub fn volume_step(mut self, step: f64) -> Self {
        self.volume_step = step;
        self
    }

    /// Set the fallback volume, clamped into `[0, 1]`
    pub fn default_volume(mut self, volume: f64) -> Self {
        self.default_volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Set the volume persistence key
    pub fn volume_key(mut self, key: impl Into<String>) -> Self {
        self.volume_key = key.into();
        self
    }

    /// Set the nested playlist limit
    pub fn max_playlist_depth(mut self, depth: usize) -> Self {
        self.max_playlist_depth = depth;
        self
    }

    /// Set the session metadata artist
    pub fn artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the streaming engine settings
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            origin: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            volume_step: 0.1,
            default_volume: 1.0,
            volume_key: DEFAULT_VOLUME_KEY.to_string(),
            max_playlist_depth: 4,
            artist: None,
            engine: EngineConfig::default(),
        }
    }
}
