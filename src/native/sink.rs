// ABOUTME: Desktop playback sink
// ABOUTME: Runs a decode worker per source and reports progress as sink events

use super::decoder::StreamDecoder;
use super::output::{AudioOutput, Controls};
use crate::player::{PlayRejection, PlaybackSink, SinkEvent};
use crossbeam::channel::{bounded, SendTimeoutError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// Decoded chunks buffered ahead of the audio callback
const CHUNK_QUEUE: usize = 32;

/// How long the worker sleeps while paused or draining
const IDLE_WAIT: Duration = Duration::from_millis(20);

/// How long a blocked send waits before re-checking for seek/cancel
const SEND_WAIT: Duration = Duration::from_millis(50);

/// Event channel shared by the sink and its workers.
///
/// Only the source assigned last (`generation`) may send. The check and the
/// send happen under one lock, so nothing from a replaced source follows the
/// `SourceChanged` marker.
struct EventLink {
    generation: u64,
    tx: Option<mpsc::UnboundedSender<SinkEvent>>,
}

/// Sending half held by one worker
#[derive(Clone)]
struct Emitter {
    link: Arc<Mutex<EventLink>>,
    generation: u64,
}

impl Emitter {
    fn send(&self, event: SinkEvent) {
        let link = self.link.lock();
        if link.generation != self.generation {
            return;
        }
        if let Some(tx) = &link.tx {
            let _ = tx.send(event);
        }
    }
}

/// Sink that decodes with symphonia and plays through the default cpal device.
///
/// Each assigned source gets its own worker thread; replacing or clearing the
/// source cancels the old worker, which goes quiet immediately.
pub struct NativeSink {
    source: Option<String>,
    controls: Arc<Controls>,
    volume: f64,
    muted: bool,
    link: Arc<Mutex<EventLink>>,
}

impl NativeSink {
    /// Sink with no source and full volume
    pub fn new() -> Self {
        Self {
            source: None,
            controls: Arc::new(Controls::idle(1.0, false)),
            volume: 1.0,
            muted: false,
            link: Arc::new(Mutex::new(EventLink {
                generation: 0,
                tx: None,
            })),
        }
    }

    /// Retire the current source's emitter and announce the switch
    fn switch_source(&mut self) -> Emitter {
        let mut link = self.link.lock();
        link.generation += 1;
        if let Some(tx) = &link.tx {
            let _ = tx.send(SinkEvent::SourceChanged);
        }
        Emitter {
            link: Arc::clone(&self.link),
            generation: link.generation,
        }
    }

    fn current_emitter(&self) -> Emitter {
        Emitter {
            link: Arc::clone(&self.link),
            generation: self.link.lock().generation,
        }
    }

    fn spawn_worker(&mut self, url: String, events: Emitter) {
        let carried_seek = self.controls.take_seek();
        self.controls.cancel();

        let controls = Arc::new(Controls::new(self.volume, self.muted));
        if let Some(position) = carried_seek {
            controls.request_seek(position);
        }
        self.controls = Arc::clone(&controls);

        let spawned = thread::Builder::new()
            .name("radiocast-decoder".to_string())
            .spawn({
                let controls = Arc::clone(&controls);
                let events = events.clone();
                move || run_worker(url, controls, events)
            });

        if let Err(e) = spawned {
            log::error!("Failed to spawn decoder thread: {}", e);
            controls.set_finished();
            events.send(SinkEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn emit(&self, event: SinkEvent) {
        self.current_emitter().send(event);
    }
}

impl Default for NativeSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NativeSink {
    fn drop(&mut self) {
        self.controls.cancel();
    }
}

impl PlaybackSink for NativeSink {
    fn set_source(&mut self, url: Option<&str>) {
        self.controls.cancel();
        let events = self.switch_source();
        match url {
            Some(url) => {
                log::debug!("Native sink source: {}", url);
                self.source = Some(url.to_string());
                self.spawn_worker(url.to_string(), events);
            }
            None => {
                self.source = None;
                self.controls = Arc::new(Controls::idle(self.volume, self.muted));
            }
        }
    }

    fn play(&mut self) -> Result<(), PlayRejection> {
        let Some(url) = self.source.clone() else {
            return Err(PlayRejection::NoSource);
        };
        // Ended or failed: start over from the top (or the pending seek)
        if self.controls.is_finished() {
            let events = self.current_emitter();
            self.spawn_worker(url, events);
        }
        self.controls.set_paused(false);
        self.emit(SinkEvent::Playing);
        Ok(())
    }

    fn pause(&mut self) {
        let was_paused = self.controls.is_paused();
        self.controls.set_paused(true);
        if !was_paused {
            self.emit(SinkEvent::Paused);
        }
    }

    fn is_paused(&self) -> bool {
        self.controls.is_paused()
    }

    fn current_time(&self) -> f64 {
        self.controls.position()
    }

    fn seek(&mut self, position: f64) {
        if self.source.is_none() {
            return;
        }
        self.controls.request_seek(position.max(0.0));
    }

    fn duration(&self) -> Option<f64> {
        self.controls.duration()
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        self.controls.set_volume(volume);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.controls.set_muted(muted);
    }

    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SinkEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.link.lock().tx = Some(tx);
        rx
    }
}

fn run_worker(url: String, controls: Arc<Controls>, events: Emitter) {
    decode_loop(&url, &controls, &events);
    controls.set_finished();
    log::debug!("Decoder for {} exited", url);
}

fn decode_loop(url: &str, controls: &Arc<Controls>, events: &Emitter) {
    let fail = |message: String| {
        log::warn!("Native playback of {} failed: {}", url, message);
        events.send(SinkEvent::Error { message });
    };

    let mut decoder = match StreamDecoder::open(url) {
        Ok(decoder) => decoder,
        Err(e) => return fail(e.to_string()),
    };
    if controls.is_cancelled() {
        return;
    }

    controls.set_sample_rate(decoder.sample_rate());
    controls.set_duration(decoder.duration());
    events.send(SinkEvent::MetadataLoaded {
        duration: decoder.duration(),
    });

    let (tx, rx) = bounded::<Vec<f32>>(CHUNK_QUEUE);
    let queued = rx.clone();
    let _output = match AudioOutput::open(decoder.sample_rate(), Arc::clone(controls), rx) {
        Ok(output) => output,
        Err(e) => return fail(e.to_string()),
    };

    while !controls.is_cancelled() {
        if let Some(target) = controls.take_seek() {
            // Drop audio queued from the old position
            while queued.try_recv().is_ok() {}
            match decoder.seek(target) {
                Ok(actual) => controls.set_position(actual),
                Err(e) if target == 0.0 => {
                    // Unseekable (HTTP) streams restart by reconnecting
                    log::debug!("Seek failed ({}), reopening {}", e, url);
                    match StreamDecoder::open(url) {
                        Ok(reopened) => {
                            decoder = reopened;
                            controls.set_position(0.0);
                        }
                        Err(e) => return fail(e.to_string()),
                    }
                }
                Err(e) => log::warn!("Seek to {:.1}s failed: {}", target, e),
            }
        }

        if controls.is_paused() {
            thread::sleep(IDLE_WAIT);
            continue;
        }

        let Some(mut chunk) = decoder.next_chunk() else {
            if decoder.is_exhausted() {
                wait_for_drain(controls, &tx);
                if !controls.is_cancelled() && !controls.has_pending_seek() {
                    controls.set_paused(true);
                    events.send(SinkEvent::Ended);
                    return;
                }
            }
            continue;
        };

        loop {
            match tx.send_timeout(chunk, SEND_WAIT) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(pending)) => {
                    if controls.is_cancelled() || controls.has_pending_seek() {
                        break;
                    }
                    chunk = pending;
                }
                Err(SendTimeoutError::Disconnected(_)) => return,
            }
        }
    }
}

/// Let the callback play out what is queued
fn wait_for_drain(controls: &Controls, tx: &crossbeam::channel::Sender<Vec<f32>>) {
    while !tx.is_empty() && !controls.is_cancelled() && !controls.has_pending_seek() {
        thread::sleep(IDLE_WAIT);
    }
}
