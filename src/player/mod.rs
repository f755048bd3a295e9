// ABOUTME: Player module: the playback controller and what it talks to
// ABOUTME: Provides the sink abstraction, status/notice types and observers

mod controller;
mod events;
mod observers;
mod sink;

pub use controller::{ControllerBuilder, PlaybackController};
pub use events::{PlaybackStatus, PlayerNotice};
pub use observers::{ObserverList, Subscription};
pub use sink::{PlayRejection, PlaybackSink, SinkEvent};
