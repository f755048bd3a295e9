// ABOUTME: Adaptive-streaming engine contract
// ABOUTME: Traits and event types for an external HLS engine

use crate::player::PlaybackSink;
use std::fmt;
use tokio::sync::mpsc;

/// Settings passed to the engine on construction
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Prefer the live edge over buffer safety
    pub low_latency: bool,
    /// Forward buffer target in seconds
    pub max_buffer_secs: f64,
    /// Verbose engine logging
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            low_latency: false,
            max_buffer_secs: 30.0,
            debug: false,
        }
    }
}

/// Category of an engine error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// Manifest or segment download failed
    Network,
    /// Decoding or buffering failed
    Media,
    /// Anything else
    Other,
}

/// Error reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Whether the engine cannot continue without intervention
    pub fatal: bool,
    /// Error category
    pub kind: EngineErrorKind,
    /// Engine-provided details
    pub details: String,
}

impl EngineError {
    /// Fatal error of `kind`
    pub fn fatal(kind: EngineErrorKind, details: impl Into<String>) -> Self {
        Self {
            fatal: true,
            kind,
            details: details.into(),
        }
    }

    /// Non-fatal error of `kind`
    pub fn transient(kind: EngineErrorKind, details: impl Into<String>) -> Self {
        Self {
            fatal: false,
            kind,
            details: details.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = if self.fatal { "fatal" } else { "non-fatal" };
        write!(f, "{} {:?} error: {}", severity, self.kind, self.details)
    }
}

/// Events emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The manifest was parsed and playback can begin
    ManifestParsed {
        /// Number of quality levels in the manifest
        levels: usize,
    },
    /// The engine hit an error
    Error(EngineError),
}

/// One engine instance bound to a sink for one playback session
pub trait StreamingEngine: Send {
    /// Start loading the manifest at `url`
    fn load_source(&mut self, url: &str);

    /// Bind the engine's output to `sink`
    fn attach_media(&mut self, sink: &mut dyn PlaybackSink);

    /// Channel of engine events
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EngineEvent>;

    /// Restart loading of the current manifest
    fn start_load(&mut self);

    /// Engine-specific recovery after a media error
    fn recover_media_error(&mut self);

    /// Tear down the engine and release the sink
    fn destroy(&mut self);
}

/// Creates engine instances
pub trait EngineFactory: Send + Sync {
    /// Whether this engine can run on the current host
    fn is_supported(&self) -> bool;

    /// Create an engine with `config`
    fn create(&self, config: &EngineConfig) -> Box<dyn StreamingEngine>;
}
