// ABOUTME: HLS adapter binding a streaming engine or native HLS to the sink
// ABOUTME: Owns the engine instance and applies its error-recovery policy

use crate::error::{PlaybackError, Stage};
use crate::hls::engine::{
    EngineConfig, EngineError, EngineErrorKind, EngineEvent, EngineFactory, StreamingEngine,
};
use crate::player::PlaybackSink;
use std::sync::Arc;
use tokio::sync::mpsc;

/// How an attached HLS stream is played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterMode {
    /// An external engine feeds the sink
    Engine,
    /// The sink plays the manifest itself
    Native,
}

/// What the handle did with an engine event
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    /// Manifest parsed; playback can start
    Ready,
    /// Non-fatal error, logged only
    Ignored,
    /// Fatal network error; manifest loading restarted
    Reloading,
    /// Fatal media error; engine recovery requested
    Recovering,
    /// Unrecoverable; the engine has been torn down
    Failed(PlaybackError),
}

/// Attaches HLS streams to a sink
#[derive(Clone)]
pub struct HlsAdapter {
    factory: Option<Arc<dyn EngineFactory>>,
    config: EngineConfig,
}

impl HlsAdapter {
    /// Create an adapter; `factory` is `None` when no engine is available
    pub fn new(factory: Option<Arc<dyn EngineFactory>>, config: EngineConfig) -> Self {
        Self { factory, config }
    }

    /// Whether an engine is present and reports itself supported
    pub fn engine_supported(&self) -> bool {
        self.factory.as_ref().is_some_and(|f| f.is_supported())
    }

    /// Attach `url` to `sink`.
    ///
    /// Native HLS on the sink wins; otherwise a supported engine is created,
    /// loaded and bound to the sink. With neither available this fails with
    /// [`PlaybackError::UnsupportedStream`].
    pub fn attach(
        &self,
        sink: &mut dyn PlaybackSink,
        url: &str,
    ) -> Result<AdapterHandle, PlaybackError> {
        if sink.supports_native_hls() {
            log::info!("Playing HLS natively: {}", url);
            sink.set_source(Some(url));
            return Ok(AdapterHandle {
                url: url.to_string(),
                mode: AdapterMode::Native,
                engine: None,
                events: None,
                ready: false,
                reload_attempted: false,
                recovery_attempted: false,
                destroyed: false,
                detached: false,
            });
        }

        let factory = match &self.factory {
            Some(factory) if factory.is_supported() => factory,
            _ => {
                log::warn!("No HLS playback path for {}", url);
                return Err(PlaybackError::UnsupportedStream {
                    url: url.to_string(),
                });
            }
        };

        log::info!("Attaching streaming engine for {}", url);
        let mut engine = factory.create(&self.config);
        let events = engine.subscribe();
        engine.load_source(url);
        engine.attach_media(sink);

        Ok(AdapterHandle {
            url: url.to_string(),
            mode: AdapterMode::Engine,
            engine: Some(engine),
            events: Some(events),
            ready: false,
            reload_attempted: false,
            recovery_attempted: false,
            destroyed: false,
            detached: false,
        })
    }
}

/// Live binding of one HLS stream to the sink
pub struct AdapterHandle {
    url: String,
    mode: AdapterMode,
    engine: Option<Box<dyn StreamingEngine>>,
    events: Option<mpsc::UnboundedReceiver<EngineEvent>>,
    ready: bool,
    reload_attempted: bool,
    recovery_attempted: bool,
    destroyed: bool,
    detached: bool,
}

impl AdapterHandle {
    /// Manifest URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Playback mode
    pub fn mode(&self) -> AdapterMode {
        self.mode
    }

    /// Whether the manifest has been parsed
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether [`AdapterHandle::destroy`] ran or the engine failed
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Wait for the next engine event.
    ///
    /// Returns `None` once the engine is gone or the handle runs in
    /// native mode.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => None,
        }
    }

    /// Next engine event if one is already queued
    pub fn try_next_event(&mut self) -> Option<EngineEvent> {
        self.events.as_mut().and_then(|events| events.try_recv().ok())
    }

    /// Apply the recovery policy to an engine event.
    ///
    /// Fatal network errors restart loading once and fatal media errors
    /// trigger engine recovery once; a repeat, or any other fatal error,
    /// tears the engine down. A parsed manifest re-arms both retries.
    pub fn handle_event(&mut self, event: &EngineEvent) -> EngineOutcome {
        match event {
            EngineEvent::ManifestParsed { levels } => {
                log::debug!("Manifest parsed for {} ({} levels)", self.url, levels);
                self.ready = true;
                self.reload_attempted = false;
                self.recovery_attempted = false;
                EngineOutcome::Ready
            }
            EngineEvent::Error(error) if !error.fatal => {
                log::warn!("Stream {}: {}", self.url, error);
                EngineOutcome::Ignored
            }
            EngineEvent::Error(error) => self.handle_fatal(error),
        }
    }

    fn handle_fatal(&mut self, error: &EngineError) -> EngineOutcome {
        match (error.kind, self.engine.as_mut()) {
            (EngineErrorKind::Network, Some(engine)) if !self.reload_attempted => {
                log::warn!("Stream {}: {}, reloading manifest", self.url, error);
                self.reload_attempted = true;
                engine.start_load();
                EngineOutcome::Reloading
            }
            (EngineErrorKind::Media, Some(engine)) if !self.recovery_attempted => {
                log::warn!("Stream {}: {}, recovering", self.url, error);
                self.recovery_attempted = true;
                engine.recover_media_error();
                EngineOutcome::Recovering
            }
            _ => {
                log::error!("Stream {}: {}, giving up", self.url, error);
                self.release_engine();
                let stage = if self.ready { Stage::Playback } else { Stage::Load };
                EngineOutcome::Failed(PlaybackError::Media {
                    url: self.url.clone(),
                    stage,
                    message: error.to_string(),
                })
            }
        }
    }

    /// Tear down the engine and detach the stream from `sink`.
    ///
    /// Safe to call more than once.
    pub fn destroy(&mut self, sink: &mut dyn PlaybackSink) {
        if self.detached {
            return;
        }
        log::debug!("Destroying HLS adapter for {}", self.url);
        self.release_engine();
        sink.set_source(None);
        self.detached = true;
    }

    fn release_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        self.events = None;
        self.destroyed = true;
    }
}

impl Drop for AdapterHandle {
    fn drop(&mut self) {
        self.release_engine();
    }
}
