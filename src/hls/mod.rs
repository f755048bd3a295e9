// ABOUTME: HLS module wrapping an external adaptive-streaming engine
// ABOUTME: Provides the engine contract and the adapter the controller uses

mod adapter;
mod engine;

pub use adapter::{AdapterHandle, AdapterMode, EngineOutcome, HlsAdapter};
pub use engine::{
    EngineConfig, EngineError, EngineErrorKind, EngineEvent, EngineFactory, StreamingEngine,
};
