// ABOUTME: In-memory fakes shared by the integration tests
// ABOUTME: Scriptable sink, streaming engine, playlist fetcher and metadata sink

#![allow(dead_code)]

use parking_lot::Mutex;
use radiocast::hls::{EngineConfig, EngineEvent, EngineFactory, StreamingEngine};
use radiocast::player::{PlayRejection, PlaybackSink, SinkEvent, Subscription};
use radiocast::playlist::PlaylistFetcher;
use radiocast::session::{MetadataError, MetadataSink, SessionMetadata};
use radiocast::{FetchFailure, PlaybackController, PlaybackStatus, PlayerNotice};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ---------------------------------------------------------------------------
// Sink

/// What the fake sink does when it is given a source
#[derive(Debug, Clone)]
pub enum LoadBehavior {
    /// Report metadata straight away
    Metadata(Option<f64>),
    /// Report a load error
    Fail(String),
    /// Never report anything
    Silent,
}

struct SinkState {
    source: Option<String>,
    paused: bool,
    time: f64,
    duration: Option<f64>,
    volume: f64,
    muted: bool,
    native_hls: bool,
    load: LoadBehavior,
    autoplay_blocked: bool,
    calls: Vec<String>,
    events: Option<mpsc::UnboundedSender<SinkEvent>>,
    /// Emitted by the outgoing source just before the next switch
    late_event: Option<SinkEvent>,
}

impl SinkState {
    fn emit(&self, event: SinkEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Sink half handed to the controller
pub struct FakeSink(Arc<Mutex<SinkState>>);

/// Test half: inspects and pokes the sink the controller owns
#[derive(Clone)]
pub struct SinkProbe(Arc<Mutex<SinkState>>);

pub fn fake_sink() -> (FakeSink, SinkProbe) {
    let state = Arc::new(Mutex::new(SinkState {
        source: None,
        paused: true,
        time: 0.0,
        duration: None,
        volume: 1.0,
        muted: false,
        native_hls: false,
        load: LoadBehavior::Metadata(None),
        autoplay_blocked: false,
        calls: Vec::new(),
        events: None,
        late_event: None,
    }));
    (FakeSink(state.clone()), SinkProbe(state))
}

impl PlaybackSink for FakeSink {
    fn set_source(&mut self, url: Option<&str>) {
        let mut state = self.0.lock();
        if let Some(event) = state.late_event.take() {
            state.emit(event);
        }
        state.emit(SinkEvent::SourceChanged);
        match url {
            Some(url) => {
                state.calls.push(format!("set_source {}", url));
                state.source = Some(url.to_string());
                state.paused = true;
                state.time = 0.0;
                match state.load.clone() {
                    LoadBehavior::Metadata(duration) => {
                        state.emit(SinkEvent::MetadataLoaded { duration })
                    }
                    LoadBehavior::Fail(message) => state.emit(SinkEvent::Error { message }),
                    LoadBehavior::Silent => {}
                }
            }
            None => {
                state.calls.push("clear_source".to_string());
                state.source = None;
            }
        }
    }

    fn play(&mut self) -> Result<(), PlayRejection> {
        let mut state = self.0.lock();
        state.calls.push("play".to_string());
        if state.source.is_none() {
            return Err(PlayRejection::NoSource);
        }
        if state.autoplay_blocked {
            return Err(PlayRejection::AutoplayBlocked);
        }
        state.paused = false;
        state.emit(SinkEvent::Playing);
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.0.lock();
        if !state.paused {
            state.paused = true;
            state.emit(SinkEvent::Paused);
        }
    }

    fn is_paused(&self) -> bool {
        self.0.lock().paused
    }

    fn current_time(&self) -> f64 {
        self.0.lock().time
    }

    fn seek(&mut self, position: f64) {
        self.0.lock().time = position;
    }

    fn duration(&self) -> Option<f64> {
        self.0.lock().duration
    }

    fn set_volume(&mut self, volume: f64) {
        self.0.lock().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.0.lock().muted = muted;
    }

    fn supports_native_hls(&self) -> bool {
        self.0.lock().native_hls
    }

    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SinkEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.0.lock().events = Some(tx);
        rx
    }
}

impl SinkProbe {
    pub fn emit(&self, event: SinkEvent) {
        self.0.lock().emit(event);
    }

    /// Have the current source emit `event` while the next source is assigned
    pub fn emit_on_switch(&self, event: SinkEvent) {
        self.0.lock().late_event = Some(event);
    }

    pub fn set_time(&self, seconds: f64) {
        self.0.lock().time = seconds;
    }

    pub fn time(&self) -> f64 {
        self.0.lock().time
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        self.0.lock().duration = duration;
    }

    pub fn set_load(&self, load: LoadBehavior) {
        self.0.lock().load = load;
    }

    pub fn block_autoplay(&self, blocked: bool) {
        self.0.lock().autoplay_blocked = blocked;
    }

    pub fn set_native_hls(&self, native: bool) {
        self.0.lock().native_hls = native;
    }

    pub fn source(&self) -> Option<String> {
        self.0.lock().source.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.0.lock().paused
    }

    pub fn volume(&self) -> f64 {
        self.0.lock().volume
    }

    pub fn muted(&self) -> bool {
        self.0.lock().muted
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().calls.clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Streaming engine

#[derive(Default)]
struct EngineState {
    calls: Vec<String>,
    events: Option<mpsc::UnboundedSender<EngineEvent>>,
    destroyed: bool,
}

/// Test half of one engine instance
#[derive(Clone, Default)]
pub struct EngineProbe(Arc<Mutex<EngineState>>);

impl EngineProbe {
    pub fn emit(&self, event: EngineEvent) {
        if let Some(tx) = &self.0.lock().events {
            let _ = tx.send(event);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().calls.iter().filter(|c| c.as_str() == call).count()
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.lock().destroyed
    }
}

struct FakeEngine {
    probe: EngineProbe,
    on_load: Vec<EngineEvent>,
}

impl StreamingEngine for FakeEngine {
    fn load_source(&mut self, url: &str) {
        self.probe.0.lock().calls.push(format!("load_source {}", url));
        for event in &self.on_load {
            self.probe.emit(event.clone());
        }
    }

    fn attach_media(&mut self, sink: &mut dyn PlaybackSink) {
        self.probe.0.lock().calls.push("attach_media".to_string());
        // The engine feeds the sink through its own media source
        sink.set_source(Some("blob:engine"));
    }

    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.probe.0.lock().events = Some(tx);
        rx
    }

    fn start_load(&mut self) {
        self.probe.0.lock().calls.push("start_load".to_string());
    }

    fn recover_media_error(&mut self) {
        self.probe.0.lock().calls.push("recover_media_error".to_string());
    }

    fn destroy(&mut self) {
        let mut state = self.probe.0.lock();
        state.calls.push("destroy".to_string());
        state.destroyed = true;
        state.events = None;
    }
}

/// Engine factory recording every engine it creates
pub struct FakeEngineFactory {
    supported: bool,
    on_load: Vec<EngineEvent>,
    engines: Mutex<Vec<EngineProbe>>,
    configs: Mutex<Vec<EngineConfig>>,
}

impl FakeEngineFactory {
    /// Supported engine whose manifests parse as soon as they load
    pub fn new() -> Self {
        Self::scripted(vec![EngineEvent::ManifestParsed { levels: 1 }])
    }

    /// Supported engine emitting `on_load` when a manifest is loaded
    pub fn scripted(on_load: Vec<EngineEvent>) -> Self {
        Self {
            supported: true,
            on_load,
            engines: Mutex::new(Vec::new()),
            configs: Mutex::new(Vec::new()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    pub fn created(&self) -> usize {
        self.engines.lock().len()
    }

    pub fn engine(&self, index: usize) -> EngineProbe {
        self.engines.lock()[index].clone()
    }

    pub fn last(&self) -> EngineProbe {
        let engines = self.engines.lock();
        engines[engines.len() - 1].clone()
    }

    pub fn configs(&self) -> Vec<EngineConfig> {
        self.configs.lock().clone()
    }
}

impl EngineFactory for FakeEngineFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, config: &EngineConfig) -> Box<dyn StreamingEngine> {
        let probe = EngineProbe::default();
        self.engines.lock().push(probe.clone());
        self.configs.lock().push(config.clone());
        Box::new(FakeEngine {
            probe,
            on_load: self.on_load.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Playlist fetcher

/// Fetcher answering from a fixed table; unknown URLs are 404s
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, Result<String, FetchFailure>>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    count: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, body: &str) -> Self {
        self.responses
            .lock()
            .insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn failing(self, url: &str, failure: FetchFailure) -> Self {
        self.responses.lock().insert(url.to_string(), Err(failure));
        self
    }

    /// Block every fetch for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl PlaylistFetcher for FakeFetcher {
    fn fetch(&self, url: &str, _timeout: Duration) -> Result<String, FetchFailure> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(url.to_string());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.responses
            .lock()
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchFailure::Status(404)))
    }
}

// ---------------------------------------------------------------------------
// Session metadata

#[derive(Default)]
pub struct FakeMetadata {
    published: Mutex<Vec<SessionMetadata>>,
    cleared: AtomicUsize,
    reject: bool,
}

impl FakeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.published
            .lock()
            .iter()
            .map(|m| m.title.clone())
            .collect()
    }

    pub fn published(&self) -> Vec<SessionMetadata> {
        self.published.lock().clone()
    }

    pub fn cleared(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }
}

impl MetadataSink for FakeMetadata {
    fn set_metadata(&self, metadata: &SessionMetadata) -> Result<(), MetadataError> {
        self.published.lock().push(metadata.clone());
        if self.reject {
            Err(MetadataError::Rejected("not now".to_string()))
        } else {
            Ok(())
        }
    }

    fn clear_action_handlers(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Observer recording

pub type Recorded<T> = Arc<Mutex<Vec<T>>>;

pub fn record_statuses(player: &PlaybackController) -> (Recorded<PlaybackStatus>, Subscription) {
    let log: Recorded<PlaybackStatus> = Arc::default();
    let sink = log.clone();
    let subscription = player.on_playback_status_change(move |status| sink.lock().push(*status));
    (log, subscription)
}

pub fn record_notices(player: &PlaybackController) -> (Recorded<PlayerNotice>, Subscription) {
    let log: Recorded<PlayerNotice> = Arc::default();
    let sink = log.clone();
    let subscription = player.on_error(move |notice| sink.lock().push(notice.clone()));
    (log, subscription)
}
