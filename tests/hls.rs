// ABOUTME: Integration tests for the HLS adapter
// ABOUTME: Covers mode selection, the recovery policy and teardown

mod common;

use common::{fake_sink, init_logging, FakeEngineFactory};
use radiocast::hls::{
    AdapterMode, EngineConfig, EngineError, EngineErrorKind, EngineEvent, EngineOutcome,
    HlsAdapter,
};
use radiocast::{PlaybackError, Stage};
use std::sync::Arc;

const LIVE: &str = "http://x/live/master.m3u8";

fn adapter(factory: &Arc<FakeEngineFactory>) -> HlsAdapter {
    init_logging();
    HlsAdapter::new(Some(factory.clone()), EngineConfig::default())
}

fn fatal(kind: EngineErrorKind) -> EngineEvent {
    EngineEvent::Error(EngineError::fatal(kind, "boom"))
}

#[tokio::test]
async fn test_native_mode_assigns_sink_directly() {
    let (mut sink, probe) = fake_sink();
    probe.set_native_hls(true);
    let factory = Arc::new(FakeEngineFactory::new());

    let mut handle = adapter(&factory).attach(&mut sink, LIVE).unwrap();

    assert_eq!(handle.mode(), AdapterMode::Native);
    assert_eq!(handle.url(), LIVE);
    assert_eq!(probe.source().as_deref(), Some(LIVE));
    assert_eq!(factory.created(), 0);
    assert_eq!(handle.next_event().await, None);
}

#[tokio::test]
async fn test_engine_mode_loads_then_attaches() {
    let (mut sink, probe) = fake_sink();
    let factory = Arc::new(FakeEngineFactory::new());

    let mut handle = adapter(&factory).attach(&mut sink, LIVE).unwrap();

    assert_eq!(handle.mode(), AdapterMode::Engine);
    assert_eq!(
        factory.last().calls(),
        vec![format!("load_source {}", LIVE), "attach_media".to_string()]
    );
    assert_eq!(probe.source().as_deref(), Some("blob:engine"));

    let event = handle.next_event().await.unwrap();
    assert_eq!(event, EngineEvent::ManifestParsed { levels: 1 });
    assert!(!handle.is_ready());
    assert_eq!(handle.handle_event(&event), EngineOutcome::Ready);
    assert!(handle.is_ready());
}

#[test]
fn test_no_path_is_unsupported() {
    init_logging();
    let (mut sink, _probe) = fake_sink();
    let expected = PlaybackError::UnsupportedStream {
        url: LIVE.to_string(),
    };

    let without_engine = HlsAdapter::new(None, EngineConfig::default());
    assert!(!without_engine.engine_supported());
    assert_eq!(
        without_engine.attach(&mut sink, LIVE).err(),
        Some(expected.clone())
    );

    let factory = Arc::new(FakeEngineFactory::unsupported());
    let unsupported = adapter(&factory);
    assert!(!unsupported.engine_supported());
    assert_eq!(unsupported.attach(&mut sink, LIVE).err(), Some(expected));
    assert_eq!(factory.created(), 0);
}

#[test]
fn test_non_fatal_errors_are_ignored() {
    let (mut sink, _probe) = fake_sink();
    let factory = Arc::new(FakeEngineFactory::new());
    let mut handle = adapter(&factory).attach(&mut sink, LIVE).unwrap();

    for kind in [
        EngineErrorKind::Network,
        EngineErrorKind::Media,
        EngineErrorKind::Other,
    ] {
        let event = EngineEvent::Error(EngineError::transient(kind, "hiccup"));
        assert_eq!(handle.handle_event(&event), EngineOutcome::Ignored);
    }
    assert!(!handle.is_destroyed());
    assert_eq!(factory.last().count("start_load"), 0);
}

#[test]
fn test_network_error_reloads_once() {
    let (mut sink, _probe) = fake_sink();
    let factory = Arc::new(FakeEngineFactory::new());
    let mut handle = adapter(&factory).attach(&mut sink, LIVE).unwrap();
    let engine = factory.last();

    assert_eq!(
        handle.handle_event(&fatal(EngineErrorKind::Network)),
        EngineOutcome::Reloading
    );
    assert_eq!(engine.count("start_load"), 1);

    let outcome = handle.handle_event(&fatal(EngineErrorKind::Network));
    assert!(matches!(
        outcome,
        EngineOutcome::Failed(PlaybackError::Media {
            stage: Stage::Load,
            ..
        })
    ));
    assert!(handle.is_destroyed());
    assert!(engine.is_destroyed());
    assert_eq!(engine.count("start_load"), 1);
}

#[test]
fn test_media_error_recovers_once_per_manifest() {
    let (mut sink, _probe) = fake_sink();
    let factory = Arc::new(FakeEngineFactory::new());
    let mut handle = adapter(&factory).attach(&mut sink, LIVE).unwrap();
    let engine = factory.last();
    let parsed = EngineEvent::ManifestParsed { levels: 3 };

    handle.handle_event(&parsed);
    assert_eq!(
        handle.handle_event(&fatal(EngineErrorKind::Media)),
        EngineOutcome::Recovering
    );
    handle.handle_event(&parsed);
    assert_eq!(
        handle.handle_event(&fatal(EngineErrorKind::Media)),
        EngineOutcome::Recovering
    );
    assert_eq!(engine.count("recover_media_error"), 2);

    let outcome = handle.handle_event(&fatal(EngineErrorKind::Media));
    assert!(matches!(
        outcome,
        EngineOutcome::Failed(PlaybackError::Media {
            stage: Stage::Playback,
            ..
        })
    ));
}

#[test]
fn test_other_fatal_error_fails_immediately() {
    let (mut sink, _probe) = fake_sink();
    let factory = Arc::new(FakeEngineFactory::new());
    let mut handle = adapter(&factory).attach(&mut sink, LIVE).unwrap();

    let outcome = handle.handle_event(&fatal(EngineErrorKind::Other));

    match outcome {
        EngineOutcome::Failed(PlaybackError::Media { url, message, .. }) => {
            assert_eq!(url, LIVE);
            assert!(message.contains("boom"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(factory.last().is_destroyed());
}

#[test]
fn test_destroy_is_idempotent_and_detaches_sink() {
    let (mut sink, probe) = fake_sink();
    let factory = Arc::new(FakeEngineFactory::new());
    let mut handle = adapter(&factory).attach(&mut sink, LIVE).unwrap();

    handle.destroy(&mut sink);
    handle.destroy(&mut sink);

    assert!(handle.is_destroyed());
    assert_eq!(factory.last().count("destroy"), 1);
    assert_eq!(probe.count("clear_source"), 1);
    assert_eq!(probe.source(), None);
    assert_eq!(handle.try_next_event(), None);
}

#[test]
fn test_destroy_after_failure_still_detaches() {
    let (mut sink, probe) = fake_sink();
    let factory = Arc::new(FakeEngineFactory::new());
    let mut handle = adapter(&factory).attach(&mut sink, LIVE).unwrap();

    handle.handle_event(&fatal(EngineErrorKind::Other));
    handle.destroy(&mut sink);

    assert_eq!(factory.last().count("destroy"), 1);
    assert_eq!(probe.source(), None);
}

#[test]
fn test_dropping_handle_releases_engine() {
    let (mut sink, _probe) = fake_sink();
    let factory = Arc::new(FakeEngineFactory::new());
    let handle = adapter(&factory).attach(&mut sink, LIVE).unwrap();

    drop(handle);

    assert!(factory.last().is_destroyed());
}
