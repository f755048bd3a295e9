// ABOUTME: Integration tests for the native desktop sink
// ABOUTME: Exercises decoding paths that do not need an audio device

mod common;

use common::init_logging;
use radiocast::native::NativeSink;
use radiocast::player::{PlayRejection, PlaybackSink, SinkEvent};
use radiocast::{PlaybackController, PlaybackStatus};
use std::io::Write;
use std::time::Duration;

/// One second of 8 kHz mono 16-bit silence
fn silent_wav() -> tempfile::NamedTempFile {
    let rate: u32 = 8000;
    let data_len: u32 = rate * 2;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&rate.to_le_bytes());
    bytes.extend_from_slice(&(rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, 0);

    let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_wav_reports_duration() {
    init_logging();
    let wav = silent_wav();
    let mut sink = NativeSink::new();
    let mut events = sink.subscribe();

    sink.set_source(Some(wav.path().to_str().unwrap()));

    assert_eq!(events.recv().await, Some(SinkEvent::SourceChanged));
    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap();
    assert_eq!(
        event,
        Some(SinkEvent::MetadataLoaded {
            duration: Some(1.0)
        })
    );
    assert_eq!(sink.duration(), Some(1.0));
    assert!(sink.is_paused());
    assert_eq!(sink.current_time(), 0.0);
}

#[tokio::test]
async fn test_controller_loads_file_through_native_sink() {
    init_logging();
    let wav = silent_wav();
    let mut player = PlaybackController::builder(NativeSink::new()).build().await;

    player
        .load_src(wav.path().to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(player.status(), PlaybackStatus::Stopped);
    assert_eq!(player.duration(), Some(1.0));
    player.destroy();
}

#[tokio::test]
async fn test_unreadable_source_fails_to_load() {
    init_logging();
    let mut player = PlaybackController::builder(NativeSink::new()).build().await;

    let err = player.play_src("/no/such/dir/track.flac").await.unwrap_err();

    assert_eq!(err.url(), Some("/no/such/dir/track.flac"));
    assert_eq!(player.status(), PlaybackStatus::Stopped);
}

#[test]
fn test_cleared_sink_rejects_play() {
    let mut sink = NativeSink::new();
    sink.set_source(None);
    assert_eq!(sink.play(), Err(PlayRejection::NoSource));
    assert!(!sink.supports_native_hls());
}
