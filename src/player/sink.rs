// ABOUTME: Playback sink abstraction
// ABOUTME: The output endpoint the controller owns and drives

use thiserror::Error;
use tokio::sync::mpsc;

/// Events reported by a sink
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// The source was replaced or cleared; earlier events belong to the old one
    SourceChanged,
    /// Source metadata is known; the sink can start playing
    MetadataLoaded {
        /// Duration in seconds, `None` for live or unknown
        duration: Option<f64>,
    },
    /// Playback started or resumed
    Playing,
    /// Playback paused (also emitted when stopped)
    Paused,
    /// Playback stalled waiting for data
    Waiting,
    /// The source played to its end
    Ended,
    /// The source failed to load or decode
    Error {
        /// Description from the sink
        message: String,
    },
}

/// Why a sink refused to start playing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayRejection {
    /// The host's autoplay policy needs a user gesture first
    #[error("playback blocked by autoplay policy")]
    AutoplayBlocked,

    /// No source is assigned
    #[error("no source assigned")]
    NoSource,

    /// Any other refusal
    #[error("{0}")]
    Failed(String),
}

/// Output endpoint for decoded or streamed audio.
///
/// The controller owns exactly one sink and is the only component that
/// mutates it. Asynchronous notifications flow back through the channel
/// returned by [`PlaybackSink::subscribe`].
pub trait PlaybackSink: Send {
    /// Assign a source URL, or clear it with `None`.
    ///
    /// Every call emits [`SinkEvent::SourceChanged`] before any event of the
    /// new source, and the old source emits nothing after it.
    fn set_source(&mut self, url: Option<&str>);

    /// Start or resume playback
    fn play(&mut self) -> Result<(), PlayRejection>;

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Whether playback is paused
    fn is_paused(&self) -> bool;

    /// Position in seconds
    fn current_time(&self) -> f64;

    /// Move to `position` seconds
    fn seek(&mut self, position: f64);

    /// Duration in seconds, `None` when unknown (live streams)
    fn duration(&self) -> Option<f64>;

    /// Output volume in `[0, 1]`
    fn set_volume(&mut self, volume: f64);

    /// Mute or unmute output
    fn set_muted(&mut self, muted: bool);

    /// Whether the sink can play HLS manifests by itself
    fn supports_native_hls(&self) -> bool {
        false
    }

    /// Channel of sink events; a new call replaces the previous channel
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SinkEvent>;
}

/// Sink wrapper that counts source assignments.
///
/// Matching the count against received [`SinkEvent::SourceChanged`] markers
/// tells whether a queued event belongs to the current source.
pub(crate) struct TrackedSink {
    inner: Box<dyn PlaybackSink>,
    assigned: u64,
}

impl TrackedSink {
    pub(crate) fn new(inner: Box<dyn PlaybackSink>) -> Self {
        Self { inner, assigned: 0 }
    }

    /// How many times a source was assigned or cleared
    pub(crate) fn assigned(&self) -> u64 {
        self.assigned
    }
}

impl PlaybackSink for TrackedSink {
    fn set_source(&mut self, url: Option<&str>) {
        self.assigned += 1;
        self.inner.set_source(url);
    }

    fn play(&mut self) -> Result<(), PlayRejection> {
        self.inner.play()
    }

    fn pause(&mut self) {
        self.inner.pause();
    }

    fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    fn seek(&mut self, position: f64) {
        self.inner.seek(position);
    }

    fn duration(&self) -> Option<f64> {
        self.inner.duration()
    }

    fn set_volume(&mut self, volume: f64) {
        self.inner.set_volume(volume);
    }

    fn set_muted(&mut self, muted: bool) {
        self.inner.set_muted(muted);
    }

    fn supports_native_hls(&self) -> bool {
        self.inner.supports_native_hls()
    }

    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SinkEvent> {
        self.inner.subscribe()
    }
}
