// ABOUTME: Audio decoding for the native sink
// ABOUTME: Opens files or HTTP streams and decodes them with symphonia

use std::io;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};
use thiserror::Error;

/// Errors opening or seeking a stream
#[derive(Error, Debug)]
pub enum DecodeError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Local file could not be opened
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Container or codec error
    #[error("decoder error: {0}")]
    Symphonia(#[from] SymphoniaError),

    /// No decodable audio track
    #[error("no audio track found")]
    NoAudioTrack,
}

/// Decoder for one file or HTTP stream, producing interleaved stereo `f32`
pub struct StreamDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    time_base: Option<TimeBase>,
    sample_rate: u32,
    duration: Option<f64>,
    sample_buf: Option<SampleBuffer<f32>>,
    exhausted: bool,
}

impl StreamDecoder {
    /// Open `location`: `http(s)://` URLs are streamed, anything else is a path
    ///
    /// Supports: MP3, FLAC, WAV, AAC, Ogg Vorbis and other formats via symphonia
    pub fn open(location: &str) -> Result<Self, DecodeError> {
        let (mss, hint) = if is_http(location) {
            open_http(location)?
        } else {
            open_file(location)?
        };

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let format = probed.format;

        // Skip video/image tracks such as embedded album art
        let track = format
            .tracks()
            .iter()
            .find(|t| {
                t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some()
            })
            .ok_or(DecodeError::NoAudioTrack)?;

        let track_id = track.id;
        let params = &track.codec_params;
        let sample_rate = params.sample_rate.ok_or(DecodeError::NoAudioTrack)?;
        let time_base = params.time_base;
        let duration = match (time_base, params.n_frames) {
            (Some(tb), Some(frames)) => Some(seconds(tb.calc_time(frames))),
            _ => None,
        };

        let decoder = symphonia::default::get_codecs().make(params, &DecoderOptions::default())?;

        log::info!(
            "Opened {}: {}Hz, duration {:?}",
            location,
            sample_rate,
            duration
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            time_base,
            sample_rate,
            duration,
            sample_buf: None,
            exhausted: false,
        })
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds, `None` for live streams
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Whether the end of the stream was reached
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Decode the next packet into interleaved stereo samples.
    ///
    /// Returns `None` at the end of the stream or on an unrecoverable error.
    pub fn next_chunk(&mut self) -> Option<Vec<f32>> {
        if self.exhausted {
            return None;
        }

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(SymphoniaError::IoError(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    self.exhausted = true;
                    return None;
                }
                Err(e) => {
                    log::warn!("Error reading stream: {}", e);
                    self.exhausted = true;
                    return None;
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count();
                    let needed = decoded.capacity() * channels;
                    if self.sample_buf.as_ref().map_or(true, |b| b.capacity() < needed) {
                        self.sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                    }
                    let Some(buf) = self.sample_buf.as_mut() else {
                        continue;
                    };
                    buf.copy_interleaved_ref(decoded);
                    return Some(to_stereo(buf.samples(), channels));
                }
                Err(SymphoniaError::DecodeError(err)) => {
                    log::warn!("Decode error: {}", err);
                    continue;
                }
                Err(e) => {
                    log::warn!("Decoder failed: {}", e);
                    self.exhausted = true;
                    return None;
                }
            }
        }
    }

    /// Seek to `position` seconds, returning where the demuxer landed
    pub fn seek(&mut self, position: f64) -> Result<f64, DecodeError> {
        let position = position.max(0.0);
        let seeked = self.format.seek(
            SeekMode::Coarse,
            SeekTo::Time {
                time: Time::new(position.trunc() as u64, position.fract()),
                track_id: Some(self.track_id),
            },
        )?;
        self.decoder.reset();
        self.exhausted = false;

        Ok(match self.time_base {
            Some(tb) => seconds(tb.calc_time(seeked.actual_ts)),
            None => position,
        })
    }
}

fn seconds(time: Time) -> f64 {
    time.seconds as f64 + time.frac
}

fn is_http(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn open_http(url: &str) -> Result<(MediaSourceStream, Hint), DecodeError> {
    // No timeout: live streams keep the connection open indefinitely
    let response = ureq::get(url)
        .call()
        .map_err(|e| DecodeError::Http(e.to_string()))?;

    let content_type = response.header("content-type").map(|s| s.to_string());
    log::debug!("Content-Type: {:?}", content_type);
    let hint = hint_for(content_type.as_deref(), url);

    // HTTP streams don't support seeking
    let source = ReadOnlySource::new(response.into_reader());
    Ok((MediaSourceStream::new(Box::new(source), Default::default()), hint))
}

fn open_file(path: &str) -> Result<(MediaSourceStream, Hint), DecodeError> {
    let file = std::fs::File::open(path)?;
    let mut hint = Hint::new();
    if let Some(ext) = std::path::Path::new(path).extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    Ok((MediaSourceStream::new(Box::new(file), Default::default()), hint))
}

/// Probe hint from the content type, falling back to the URL extension
fn hint_for(content_type: Option<&str>, url: &str) -> Hint {
    let mut hint = Hint::new();
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    let extension = match mime.as_deref() {
        Some("audio/mpeg") | Some("audio/mp3") => Some("mp3"),
        Some("audio/flac") => Some("flac"),
        Some("audio/wav") | Some("audio/x-wav") => Some("wav"),
        Some("audio/aac") | Some("audio/x-aac") | Some("audio/aacp") => Some("aac"),
        Some("audio/ogg") | Some("application/ogg") => Some("ogg"),
        Some("audio/mp4") | Some("audio/x-m4a") => Some("m4a"),
        _ => None,
    };

    match extension {
        Some(ext) => {
            hint.with_extension(ext);
        }
        None => {
            let path = crate::source::strip_query(url);
            if let Some((_, ext)) = path.rsplit_once('.') {
                if !ext.contains('/') {
                    hint.with_extension(ext);
                }
            }
        }
    }
    hint
}

/// Fold interleaved samples of any channel count into stereo
fn to_stereo(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => samples.to_vec(),
        // Multi-channel: keep the front left/right pair
        n => samples
            .chunks_exact(n)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}
