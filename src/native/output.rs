// ABOUTME: cpal audio output for the native sink
// ABOUTME: Plays queued stereo chunks, applying pause, volume and mute

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam::channel::Receiver;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Output channel count; decoded audio is always folded to stereo
pub const OUTPUT_CHANNELS: u16 = 2;

/// Errors opening the output device
#[derive(Error, Debug)]
pub enum OutputError {
    /// No default output device
    #[error("no audio output device available")]
    NoDevice,

    /// Device configuration could not be queried
    #[error("failed to get output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    /// Stream could not be built
    #[error("failed to build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    /// Stream could not be started
    #[error("failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    /// Device sample format is not handled
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// State shared between the sink, its decode worker and the audio callback
#[derive(Debug)]
pub struct Controls {
    paused: AtomicBool,
    muted: AtomicBool,
    volume: AtomicU32,
    frames_played: AtomicU64,
    sample_rate: AtomicU32,
    cancelled: AtomicBool,
    finished: AtomicBool,
    pending_seek: Mutex<Option<f64>>,
    duration: Mutex<Option<f64>>,
}

impl Controls {
    /// Paused controls for a new source
    pub fn new(volume: f64, muted: bool) -> Self {
        Self {
            paused: AtomicBool::new(true),
            muted: AtomicBool::new(muted),
            volume: AtomicU32::new((volume as f32).to_bits()),
            frames_played: AtomicU64::new(0),
            sample_rate: AtomicU32::new(0),
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            pending_seek: Mutex::new(None),
            duration: Mutex::new(None),
        }
    }

    /// Controls with no worker behind them
    pub fn idle(volume: f64, muted: bool) -> Self {
        let controls = Self::new(volume, muted);
        controls.finished.store(true, Ordering::SeqCst);
        controls
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    pub fn set_volume(&self, volume: f64) {
        self.volume
            .store((volume.clamp(0.0, 1.0) as f32).to_bits(), Ordering::Relaxed);
    }

    /// Effective gain after mute
    pub fn gain(&self) -> f32 {
        if self.muted.load(Ordering::Relaxed) {
            0.0
        } else {
            f32::from_bits(self.volume.load(Ordering::Relaxed))
        }
    }

    pub fn set_sample_rate(&self, rate: u32) {
        self.sample_rate.store(rate, Ordering::SeqCst);
    }

    /// Playback position in seconds
    pub fn position(&self) -> f64 {
        let rate = self.sample_rate.load(Ordering::SeqCst);
        if rate == 0 {
            return self
                .pending_seek
                .lock()
                .unwrap_or(0.0);
        }
        self.frames_played.load(Ordering::SeqCst) as f64 / rate as f64
    }

    /// Reset the position counter to `seconds`
    pub fn set_position(&self, seconds: f64) {
        let rate = self.sample_rate.load(Ordering::SeqCst) as f64;
        self.frames_played
            .store((seconds.max(0.0) * rate) as u64, Ordering::SeqCst);
    }

    fn advance(&self, frames: u64) {
        self.frames_played.fetch_add(frames, Ordering::SeqCst);
    }

    /// Queue a seek for the worker
    pub fn request_seek(&self, seconds: f64) {
        *self.pending_seek.lock() = Some(seconds);
        self.set_position(seconds);
    }

    pub fn take_seek(&self) -> Option<f64> {
        self.pending_seek.lock().take()
    }

    pub fn has_pending_seek(&self) -> bool {
        self.pending_seek.lock().is_some()
    }

    pub fn duration(&self) -> Option<f64> {
        *self.duration.lock()
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        *self.duration.lock() = duration;
    }

    /// Ask the worker to exit
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn set_finished(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    /// Whether the worker exited (end of stream, error or cancel)
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

/// Pulls chunks off the queue inside the audio callback
struct Feeder {
    controls: Arc<Controls>,
    chunks: Receiver<Vec<f32>>,
    current: Vec<f32>,
    position: usize,
}

impl Feeder {
    fn fill<T: Copy>(&mut self, out: &mut [T], convert: impl Fn(f32) -> T) {
        if self.controls.is_paused() {
            out.fill(convert(0.0));
            return;
        }

        let gain = self.controls.gain();
        let mut written = 0;
        for slot in out.iter_mut() {
            if self.position >= self.current.len() {
                match self.chunks.try_recv() {
                    Ok(chunk) => {
                        self.current = chunk;
                        self.position = 0;
                    }
                    Err(_) => {
                        *slot = convert(0.0);
                        continue;
                    }
                }
            }
            *slot = convert(self.current[self.position] * gain);
            self.position += 1;
            written += 1;
        }

        self.controls
            .advance((written / OUTPUT_CHANNELS as usize) as u64);
    }
}

/// Open output stream; audio stops when dropped
pub struct AudioOutput {
    _stream: cpal::Stream,
}

impl AudioOutput {
    /// Open the default output device at `sample_rate` and start pulling from `chunks`
    pub fn open(
        sample_rate: u32,
        controls: Arc<Controls>,
        chunks: Receiver<Vec<f32>>,
    ) -> Result<Self, OutputError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(OutputError::NoDevice)?;
        log::debug!(
            "Using audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported = device.default_output_config()?;
        let config = cpal::StreamConfig {
            channels: OUTPUT_CHANNELS,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut feeder = Feeder {
            controls,
            chunks,
            current: Vec::new(),
            position: 0,
        };
        let err_fn = |err| log::error!("Audio stream error: {}", err);

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| feeder.fill(data, |s| s),
                err_fn,
                None,
            )?,
            cpal::SampleFormat::I16 => device.build_output_stream(
                &config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    feeder.fill(data, |s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                },
                err_fn,
                None,
            )?,
            other => return Err(OutputError::UnsupportedFormat(format!("{:?}", other))),
        };

        stream.play()?;
        log::debug!("Output stream started at {}Hz", sample_rate);

        Ok(Self { _stream: stream })
    }
}
