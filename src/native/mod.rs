// ABOUTME: Native desktop playback
// ABOUTME: A PlaybackSink backed by symphonia decoding and cpal output

mod decoder;
mod output;
mod sink;

pub use decoder::{DecodeError, StreamDecoder};
pub use output::OutputError;
pub use sink::NativeSink;
