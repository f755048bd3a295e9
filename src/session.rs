// ABOUTME: Now-playing session metadata
// ABOUTME: Best-effort publishing of title/artist/artwork to the host

use serde::Serialize;
use thiserror::Error;

/// Artwork image for the now-playing display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artwork {
    /// Image URL
    pub src: String,
    /// Size hint such as `"512x512"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    /// MIME type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

/// Now-playing metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionMetadata {
    /// Track or station title
    pub title: String,
    /// Artist line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Album line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Artwork in preference order
    pub artwork: Vec<Artwork>,
}

impl SessionMetadata {
    /// Metadata with just a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the artist line
    pub fn with_artist(mut self, artist: Option<String>) -> Self {
        self.artist = artist;
        self
    }
}

/// Failure reported by a metadata sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// The host has no media session facility
    #[error("media session unavailable")]
    Unavailable,

    /// The host rejected the metadata
    #[error("media session rejected metadata: {0}")]
    Rejected(String),
}

/// Host media-session integration
pub trait MetadataSink: Send + Sync {
    /// Publish now-playing metadata
    fn set_metadata(&self, metadata: &SessionMetadata) -> Result<(), MetadataError>;

    /// Release media-control handler registrations
    fn clear_action_handlers(&self) {}
}

/// Metadata sink that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMetadataSink;

impl MetadataSink for LogMetadataSink {
    fn set_metadata(&self, metadata: &SessionMetadata) -> Result<(), MetadataError> {
        match &metadata.artist {
            Some(artist) => log::info!("Now playing: {} - {}", artist, metadata.title),
            None => log::info!("Now playing: {}", metadata.title),
        }
        Ok(())
    }
}
