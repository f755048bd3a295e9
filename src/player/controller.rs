// ABOUTME: Playback controller state machine
// ABOUTME: Classifies sources, drives resolver/adapter/sink and notifies observers

use crate::config::PlayerConfig;
use crate::error::{PlaybackError, Stage};
use crate::hls::{AdapterHandle, AdapterMode, EngineEvent, EngineFactory, EngineOutcome, HlsAdapter};
use crate::native::NativeSink;
use crate::persistence::VolumeStore;
use crate::player::events::{PlaybackStatus, PlayerNotice};
use crate::player::observers::{ObserverList, Subscription};
use crate::player::sink::{PlayRejection, PlaybackSink, SinkEvent, TrackedSink};
use crate::playlist::{HttpFetcher, PlaylistEntry, PlaylistFetcher, PlaylistResolver};
use crate::session::{MetadataSink, SessionMetadata};
use crate::source::{absolutize, PlaybackSource, SourceKind};
use crate::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Playlist the current source was resolved from
#[derive(Debug, Clone)]
struct ResolvedPlaylist {
    url: String,
    entries: Vec<PlaylistEntry>,
    index: usize,
}

/// Mutable controller state; only the controller's own methods touch it
struct PlayerState {
    source: Option<PlaybackSource>,
    adapter: Option<AdapterHandle>,
    volume: f64,
    muted: bool,
    status: PlaybackStatus,
    playlist: Option<ResolvedPlaylist>,
    faulted: bool,
    /// A load started by `begin` is in flight
    loading: bool,
    /// `SourceChanged` markers received from the sink
    sources_seen: u64,
}

/// What the controller waits for before issuing play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    /// Sink reports metadata loaded
    Metadata,
    /// Engine reports the manifest parsed
    Manifest,
}

/// Next thing that woke the controller up
enum Wake {
    Sink(Option<SinkEvent>),
    Engine(Option<EngineEvent>),
}

/// Builder for [`PlaybackController`]
pub struct ControllerBuilder {
    sink: Box<dyn PlaybackSink>,
    fetcher: Option<Arc<dyn PlaylistFetcher>>,
    engine: Option<Arc<dyn EngineFactory>>,
    volume_store: Option<VolumeStore>,
    metadata: Option<Arc<dyn MetadataSink>>,
    config: PlayerConfig,
    initial_source: Option<String>,
}

impl ControllerBuilder {
    /// Fetcher used for playlists (default: [`HttpFetcher`])
    pub fn fetcher(mut self, fetcher: Arc<dyn PlaylistFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Adaptive-streaming engine for HLS
    pub fn engine(mut self, engine: Arc<dyn EngineFactory>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Volume persistence bridge
    pub fn volume_store(mut self, store: VolumeStore) -> Self {
        self.volume_store = Some(store);
        self
    }

    /// Now-playing metadata sink
    pub fn metadata(mut self, metadata: Arc<dyn MetadataSink>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Controller configuration
    pub fn config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Source preloaded (without playing) by [`ControllerBuilder::build`]
    pub fn initial_source(mut self, url: impl Into<String>) -> Self {
        self.initial_source = Some(url.into());
        self
    }

    /// Build the controller, preloading the initial source if one was set.
    ///
    /// A failing initial source is logged; the controller is returned either
    /// way.
    pub async fn build(mut self) -> PlaybackController {
        let initial = self.initial_source.take();
        let mut controller = self.assemble();
        if let Some(url) = initial {
            if let Err(e) = controller.load_src(&url).await {
                log::warn!("Failed to restore source {}: {}", url, e);
            }
        }
        controller
    }

    fn assemble(self) -> PlaybackController {
        let config = self.config;
        let mut sink = TrackedSink::new(self.sink);
        let sink_events = sink.subscribe();

        let volume_store = self
            .volume_store
            .map(|store| store.with_key(config.volume_key.clone()));
        let volume = volume_store
            .as_ref()
            .and_then(VolumeStore::load)
            .unwrap_or(config.default_volume);
        sink.set_volume(volume);
        sink.set_muted(false);

        let fetcher = self
            .fetcher
            .unwrap_or_else(|| Arc::new(HttpFetcher::new()));
        let resolver = PlaylistResolver::new(fetcher)
            .with_origin(config.origin.clone())
            .with_timeout(config.fetch_timeout);
        let adapter = HlsAdapter::new(self.engine, config.engine.clone());

        PlaybackController {
            config,
            sink,
            sink_events,
            resolver,
            adapter,
            volume_store,
            metadata: self.metadata,
            state: PlayerState {
                source: None,
                adapter: None,
                volume,
                muted: false,
                status: PlaybackStatus::Stopped,
                playlist: None,
                faulted: false,
                loading: false,
                sources_seen: 0,
            },
            status_observers: ObserverList::new(),
            error_observers: ObserverList::new(),
            destroyed: false,
        }
    }
}

/// Single control surface over direct, HLS and M3U sources.
///
/// The controller owns the sink and any HLS adapter handle. Status changes
/// and notices are delivered synchronously to observers in the order they
/// happen. Sink and engine events queue up between calls; they are handled
/// while a load is awaited, by [`PlaybackController::pump`] and by
/// [`PlaybackController::handle_next_event`].
pub struct PlaybackController {
    config: PlayerConfig,
    sink: TrackedSink,
    sink_events: mpsc::UnboundedReceiver<SinkEvent>,
    resolver: PlaylistResolver,
    adapter: HlsAdapter,
    volume_store: Option<VolumeStore>,
    metadata: Option<Arc<dyn MetadataSink>>,
    state: PlayerState,
    status_observers: ObserverList<PlaybackStatus>,
    error_observers: ObserverList<PlayerNotice>,
    destroyed: bool,
}

impl PlaybackController {
    /// Controller over the native desktop sink with default settings
    pub fn new() -> Self {
        Self::builder(NativeSink::new()).assemble()
    }

    /// Start building a controller around `sink`
    pub fn builder(sink: impl PlaybackSink + 'static) -> ControllerBuilder {
        ControllerBuilder {
            sink: Box::new(sink),
            fetcher: None,
            engine: None,
            volume_store: None,
            metadata: None,
            config: PlayerConfig::default(),
            initial_source: None,
        }
    }

    /// Play `url`.
    ///
    /// Resolves once playback started or the host requires a user gesture
    /// (reported as [`PlayerNotice::AutoplayBlocked`]). Re-playing the paused
    /// current source resumes in place without reloading.
    pub async fn play_src(&mut self, url: &str) -> Result<()> {
        self.open(url, true).await
    }

    /// Load `url` without starting playback
    pub async fn load_src(&mut self, url: &str) -> Result<()> {
        self.open(url, false).await
    }

    async fn open(&mut self, url: &str, autoplay: bool) -> Result<()> {
        self.ensure_alive()?;
        self.pump();

        let url = self.normalize(url);
        if self.can_resume(&url) {
            if autoplay {
                log::info!("Resuming {}", url);
                self.start_playback(autoplay);
            }
            return Ok(());
        }

        self.state.playlist = None;
        self.begin(PlaybackSource::new(url), autoplay).await
    }

    /// Play entry `index` of the resolved playlist.
    ///
    /// Returns `Ok(false)` when there is no playlist or no such entry.
    pub async fn play_track(&mut self, index: usize) -> Result<bool> {
        self.ensure_alive()?;

        let Some(playlist) = self.state.playlist.as_mut() else {
            return Ok(false);
        };
        let Some(entry) = playlist.entries.get(index).cloned() else {
            return Ok(false);
        };
        playlist.index = index;
        let source = PlaybackSource::from_playlist(entry.media_url, playlist.url.clone());

        self.publish_track_metadata(&entry.title);
        self.begin(source, true).await.map(|()| true)
    }

    /// Play the next playlist entry, wrapping to the first
    pub async fn next_track(&mut self) -> Result<bool> {
        match self.state.playlist.as_ref() {
            Some(p) if !p.entries.is_empty() => {
                let index = (p.index + 1) % p.entries.len();
                self.play_track(index).await
            }
            _ => Ok(false),
        }
    }

    /// Play the previous playlist entry, wrapping to the last
    pub async fn previous_track(&mut self) -> Result<bool> {
        match self.state.playlist.as_ref() {
            Some(p) if !p.entries.is_empty() => {
                let len = p.entries.len();
                let index = (p.index + len - 1) % len;
                self.play_track(index).await
            }
            _ => Ok(false),
        }
    }

    /// Tear down current playback and load `source`
    async fn begin(&mut self, source: PlaybackSource, autoplay: bool) -> Result<()> {
        self.stop();
        self.pump();
        self.state.source = None;
        self.state.faulted = false;
        self.set_status(PlaybackStatus::Loading);

        self.state.loading = true;
        let result = self.dispatch(source, autoplay).await;
        self.state.loading = false;
        if let Err(err) = &result {
            self.fail(err.clone());
        }
        result
    }

    async fn dispatch(&mut self, mut source: PlaybackSource, autoplay: bool) -> Result<()> {
        let mut depth = 0;
        loop {
            match source.kind {
                SourceKind::M3u => {
                    depth += 1;
                    if depth > self.config.max_playlist_depth {
                        return Err(PlaybackError::SelfReferentialPlaylist { url: source.url });
                    }
                    source = self.resolve_playlist(source).await?;
                }
                SourceKind::Hls => return self.open_hls(source, autoplay).await,
                SourceKind::Direct => return self.open_direct(source, autoplay).await,
            }
        }
    }

    /// Resolve a playlist source into its first entry
    async fn resolve_playlist(&mut self, source: PlaybackSource) -> Result<PlaybackSource> {
        let playlist_url = self.resolver.normalize(&source.url);
        let entries = self.resolver.resolve(&playlist_url).await?;

        let Some(first) = entries.first().cloned() else {
            return Err(PlaybackError::PlaylistEmpty { url: playlist_url });
        };
        if first.media_url == playlist_url || first.media_url == source.url {
            return Err(PlaybackError::SelfReferentialPlaylist { url: playlist_url });
        }

        // Nested playlists stay attributed to the one the caller asked for
        let root_url = source.playlist_url.unwrap_or(playlist_url);
        self.publish_track_metadata(&first.title);
        self.state.playlist = Some(ResolvedPlaylist {
            url: root_url.clone(),
            entries,
            index: 0,
        });

        Ok(PlaybackSource::from_playlist(first.media_url, root_url))
    }

    async fn open_direct(&mut self, source: PlaybackSource, autoplay: bool) -> Result<()> {
        log::info!("Loading {}", source.url);
        let url = source.url.clone();
        self.state.source = Some(source);
        self.sink.set_source(Some(&url));

        self.wait_until_ready(&url, Readiness::Metadata).await?;
        self.start_playback(autoplay);
        Ok(())
    }

    async fn open_hls(&mut self, source: PlaybackSource, autoplay: bool) -> Result<()> {
        log::info!("Loading HLS stream {}", source.url);
        let url = source.url.clone();
        let handle = self.adapter.attach(&mut self.sink, &url)?;
        let readiness = match handle.mode() {
            AdapterMode::Engine => Readiness::Manifest,
            AdapterMode::Native => Readiness::Metadata,
        };
        self.state.source = Some(source);
        self.state.adapter = Some(handle);

        self.wait_until_ready(&url, readiness).await?;
        self.start_playback(autoplay);
        Ok(())
    }

    /// Handle events until the source is ready or fails
    async fn wait_until_ready(&mut self, url: &str, readiness: Readiness) -> Result<()> {
        loop {
            let wake = self.next_wake().await;
            if let Wake::Sink(Some(event)) = &wake {
                if !self.is_current(event) {
                    continue;
                }
            }
            match wake {
                Wake::Sink(Some(SinkEvent::MetadataLoaded { duration })) => {
                    log::debug!("Metadata loaded for {} (duration {:?})", url, duration);
                    if readiness == Readiness::Metadata {
                        return Ok(());
                    }
                }
                Wake::Sink(Some(SinkEvent::Error { message })) => {
                    return Err(PlaybackError::Media {
                        url: url.to_string(),
                        stage: Stage::Load,
                        message,
                    });
                }
                Wake::Sink(Some(event)) => self.handle_sink_event(event),
                Wake::Sink(None) => {
                    return Err(PlaybackError::Media {
                        url: url.to_string(),
                        stage: Stage::Load,
                        message: "sink closed".to_string(),
                    });
                }
                Wake::Engine(Some(event)) => {
                    let Some(handle) = self.state.adapter.as_mut() else {
                        continue;
                    };
                    match handle.handle_event(&event) {
                        EngineOutcome::Ready if readiness == Readiness::Manifest => return Ok(()),
                        EngineOutcome::Failed(err) => return Err(err),
                        _ => {}
                    }
                }
                Wake::Engine(None) => {
                    return Err(PlaybackError::Media {
                        url: url.to_string(),
                        stage: Stage::Attach,
                        message: "streaming engine stopped".to_string(),
                    });
                }
            }
        }
    }

    async fn next_wake(&mut self) -> Wake {
        match self.state.adapter.as_mut() {
            Some(handle) if handle.mode() == AdapterMode::Engine && !handle.is_destroyed() => {
                tokio::select! {
                    event = self.sink_events.recv() => Wake::Sink(event),
                    event = handle.next_event() => Wake::Engine(event),
                }
            }
            _ => Wake::Sink(self.sink_events.recv().await),
        }
    }

    /// Issue play on a loaded source; rejections become notices
    fn start_playback(&mut self, autoplay: bool) {
        let url = self.current_url().unwrap_or_default().to_string();
        if !autoplay {
            self.set_status(self.idle_status());
            return;
        }

        match self.sink.play() {
            Ok(()) => {
                self.drain();
            }
            Err(PlayRejection::AutoplayBlocked) => {
                log::warn!("Autoplay blocked for {}; waiting for user interaction", url);
                self.set_status(self.idle_status());
                self.notify(PlayerNotice::AutoplayBlocked { url });
            }
            Err(rejection) => {
                log::warn!("Play rejected for {}: {}", url, rejection);
                self.set_status(self.idle_status());
                self.notify(PlayerNotice::Error(PlaybackError::Media {
                    url,
                    stage: Stage::Play,
                    message: rejection.to_string(),
                }));
            }
        }
    }

    /// Resume the paused source
    pub fn resume(&mut self) -> Result<()> {
        self.ensure_alive()?;
        if self.state.source.is_some() {
            self.start_playback(true);
        }
        Ok(())
    }

    /// Pause playback, keeping the position
    pub fn pause(&mut self) {
        if self.destroyed {
            return;
        }
        self.sink.pause();
        self.pump();
    }

    /// Pause when playing, resume otherwise
    pub fn toggle_pause(&mut self) -> Result<()> {
        if self.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.resume()
        }
    }

    /// Stop playback: pause, rewind to the start and release any HLS adapter.
    ///
    /// Always emits [`PlaybackStatus::Stopped`].
    pub fn stop(&mut self) {
        if self.destroyed {
            return;
        }
        self.sink.pause();
        self.sink.seek(0.0);
        if let Some(mut handle) = self.state.adapter.take() {
            handle.destroy(&mut self.sink);
        }
        self.state.status = PlaybackStatus::Stopped;
        self.status_observers.emit(&PlaybackStatus::Stopped);
    }

    /// Move back `seconds`, not before the start
    pub fn rewind(&mut self, seconds: f64) {
        let target = self.sink.current_time() - seconds.abs();
        self.seek_clamped(target);
    }

    /// Move forward `seconds`; unbounded when the duration is unknown
    pub fn forward(&mut self, seconds: f64) {
        let target = self.sink.current_time() + seconds.abs();
        self.seek_clamped(target);
    }

    fn seek_clamped(&mut self, target: f64) {
        let mut position = target.max(0.0);
        if let Some(duration) = self.sink.duration().filter(|d| d.is_finite()) {
            position = position.min(duration);
        }
        self.sink.seek(position);
    }

    /// Raise the volume by one step, returning the new volume
    pub fn up_volume(&mut self) -> f64 {
        let volume = round_volume((self.state.volume + self.config.volume_step).min(1.0));
        self.apply_volume(volume);
        volume
    }

    /// Lower the volume by one step, returning the new volume
    pub fn down_volume(&mut self) -> f64 {
        let volume = round_volume((self.state.volume - self.config.volume_step).max(0.0));
        self.apply_volume(volume);
        volume
    }

    /// Set the volume; fails without changing anything outside `[0, 1]`
    pub fn set_volume(&mut self, level: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&level) {
            return Err(PlaybackError::InvalidVolume(level));
        }
        self.apply_volume(level);
        Ok(())
    }

    fn apply_volume(&mut self, volume: f64) {
        self.state.volume = volume;
        self.sink.set_volume(volume);
        if let Some(store) = &self.volume_store {
            store.save(volume);
        }
    }

    /// Toggle mute, returning the new state
    pub fn mute(&mut self) -> bool {
        self.state.muted = !self.state.muted;
        self.sink.set_muted(self.state.muted);
        self.state.muted
    }

    /// Observe status transitions
    pub fn on_playback_status_change(
        &self,
        handler: impl Fn(&PlaybackStatus) + Send + Sync + 'static,
    ) -> Subscription {
        self.status_observers.subscribe(handler)
    }

    /// Observe errors and warnings
    pub fn on_error(&self, handler: impl Fn(&PlayerNotice) + Send + Sync + 'static) -> Subscription {
        self.error_observers.subscribe(handler)
    }

    /// Publish now-playing metadata; failures are logged only
    pub fn set_session_metadata(&self, metadata: &SessionMetadata) {
        if let Some(sink) = &self.metadata {
            if let Err(e) = sink.set_metadata(metadata) {
                log::warn!("Failed to update session metadata: {}", e);
            }
        }
    }

    fn publish_track_metadata(&self, title: &str) {
        let metadata = SessionMetadata::titled(title).with_artist(self.config.artist.clone());
        self.set_session_metadata(&metadata);
    }

    /// Stop, release the adapter and drop every observer. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        log::debug!("Destroying playback controller");
        self.stop();
        self.sink.set_source(None);
        self.status_observers.clear();
        self.error_observers.clear();
        if let Some(metadata) = &self.metadata {
            metadata.clear_action_handlers();
        }
        self.state.source = None;
        self.state.playlist = None;
        self.destroyed = true;
    }

    /// Handle every event already queued, without waiting.
    ///
    /// Returns how many events were handled.
    pub fn pump(&mut self) -> usize {
        // Nothing is loading while the caller holds the controller
        self.state.loading = false;
        self.drain()
    }

    fn drain(&mut self) -> usize {
        let mut handled = 0;
        loop {
            if let Ok(event) = self.sink_events.try_recv() {
                if self.is_current(&event) {
                    self.handle_sink_event(event);
                }
            } else if let Some(event) = self
                .state
                .adapter
                .as_mut()
                .and_then(AdapterHandle::try_next_event)
            {
                self.handle_engine_event(event);
            } else {
                return handled;
            }
            handled += 1;
        }
    }

    /// Wait for the next sink or engine event and handle it.
    ///
    /// Returns `false` once the sink's event channel is closed or the
    /// controller was destroyed.
    pub async fn handle_next_event(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.state.loading = false;
        match self.next_wake().await {
            Wake::Sink(Some(event)) => {
                if self.is_current(&event) {
                    self.handle_sink_event(event);
                }
            }
            Wake::Sink(None) => return false,
            Wake::Engine(Some(event)) => self.handle_engine_event(event),
            Wake::Engine(None) => {
                let url = self.current_url().unwrap_or_default().to_string();
                self.fail(PlaybackError::Media {
                    url,
                    stage: Stage::Playback,
                    message: "streaming engine stopped".to_string(),
                });
            }
        }
        true
    }

    fn handle_sink_event(&mut self, event: SinkEvent) {
        match event {
            SinkEvent::Playing => self.set_status(PlaybackStatus::Playing),
            SinkEvent::Paused => {
                // The pause that stop() issued ahead of a load
                if self.state.loading {
                    return;
                }
                self.set_status(self.idle_status());
            }
            SinkEvent::Waiting => {
                if self.state.status != PlaybackStatus::Stopped {
                    self.set_status(PlaybackStatus::Loading);
                }
            }
            SinkEvent::Ended => self.set_status(PlaybackStatus::Stopped),
            SinkEvent::MetadataLoaded { duration } => {
                log::debug!("Metadata loaded (duration {:?})", duration);
            }
            SinkEvent::SourceChanged => {}
            SinkEvent::Error { message } => {
                let url = self.current_url().unwrap_or_default().to_string();
                self.fail(PlaybackError::Media {
                    url,
                    stage: Stage::Playback,
                    message,
                });
            }
        }
    }

    /// Whether `event` belongs to the source assigned last; consumes
    /// `SourceChanged` markers
    fn is_current(&mut self, event: &SinkEvent) -> bool {
        if *event == SinkEvent::SourceChanged {
            self.state.sources_seen += 1;
            return false;
        }
        let current = self.state.sources_seen == self.sink.assigned();
        if !current {
            log::debug!("Dropping {:?} from a replaced source", event);
        }
        current
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        let Some(handle) = self.state.adapter.as_mut() else {
            return;
        };
        if let EngineOutcome::Failed(err) = handle.handle_event(&event) {
            self.fail(err);
        }
    }

    /// Drop to stopped after an error and tell observers
    fn fail(&mut self, err: PlaybackError) {
        if let Some(mut handle) = self.state.adapter.take() {
            handle.destroy(&mut self.sink);
        }
        self.state.faulted = true;
        self.set_status(PlaybackStatus::Stopped);
        self.notify(PlayerNotice::Error(err));
    }

    fn notify(&self, notice: PlayerNotice) {
        if notice.is_warning() {
            log::warn!("{}", notice);
        } else {
            log::error!("{}", notice);
        }
        self.error_observers.emit(&notice);
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.state.status == status {
            return;
        }
        log::debug!("Status {} -> {}", self.state.status, status);
        self.state.status = status;
        self.status_observers.emit(&status);
    }

    /// Status for a sink that is not playing; a pause at the start is what
    /// stop() looks like
    fn idle_status(&self) -> PlaybackStatus {
        if self.sink.current_time() > 0.0 {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Stopped
        }
    }

    fn normalize(&self, url: &str) -> String {
        absolutize(url, self.config.origin.as_deref())
    }

    fn can_resume(&self, url: &str) -> bool {
        let Some(source) = &self.state.source else {
            return false;
        };
        if self.state.faulted
            || !source.matches(url)
            || !self.sink.is_paused()
            || self.sink.current_time() <= 0.0
        {
            return false;
        }
        source.kind != SourceKind::Hls || self.state.adapter.is_some()
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(PlaybackError::Destroyed)
        } else {
            Ok(())
        }
    }

    /// Current status
    pub fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.state.status == PlaybackStatus::Playing
    }

    /// Whether an HLS adapter handle is live
    pub fn is_hls_active(&self) -> bool {
        self.state
            .adapter
            .as_ref()
            .is_some_and(|handle| !handle.is_destroyed())
    }

    /// URL handed to the sink or adapter (never a pending playlist URL)
    pub fn current_url(&self) -> Option<&str> {
        self.state.source.as_ref().map(|source| source.url.as_str())
    }

    /// Current source, classified
    pub fn current_source(&self) -> Option<&PlaybackSource> {
        self.state.source.as_ref()
    }

    /// Position in seconds
    pub fn current_time(&self) -> f64 {
        self.sink.current_time()
    }

    /// Duration in seconds, `None` for live streams
    pub fn duration(&self) -> Option<f64> {
        self.sink.duration()
    }

    /// Volume in `[0, 1]`
    pub fn volume(&self) -> f64 {
        self.state.volume
    }

    /// Whether output is muted
    pub fn muted(&self) -> bool {
        self.state.muted
    }

    /// Entries of the playlist the current source came from
    pub fn playlist(&self) -> Option<&[PlaylistEntry]> {
        self.state.playlist.as_ref().map(|p| p.entries.as_slice())
    }

    /// Index of the current playlist entry
    pub fn playlist_index(&self) -> Option<usize> {
        self.state.playlist.as_ref().map(|p| p.index)
    }

    /// Whether [`PlaybackController::destroy`] ran
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

/// Round to two decimals so repeated steps do not drift
fn round_volume(volume: f64) -> f64 {
    (volume * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_volume() {
        assert_eq!(round_volume(0.1 + 0.2), 0.3);
        assert_eq!(round_volume(0.7000000000000001), 0.7);
        assert_eq!(round_volume(1.0), 1.0);
    }
}
