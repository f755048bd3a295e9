// ABOUTME: Playlist module for M3U/M3U8 text playlists
// ABOUTME: Provides fetching, parsing and resolution into media entries

mod fetch;
mod parser;
mod resolver;

pub use fetch::{HttpFetcher, PlaylistFetcher};
pub use parser::{is_likely_audio, parse_playlist, PlaylistEntry};
pub use resolver::{PlaylistResolver, DEFAULT_FETCH_TIMEOUT};
