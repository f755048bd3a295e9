// ABOUTME: Source classification for playback URLs
// ABOUTME: Sorts a URL into direct audio, HLS stream or M3U playlist

use serde::Serialize;
use std::fmt;
use url::Url;

/// Schemes treated as already absolute when resolving playlist entries
const ABSOLUTE_SCHEMES: [&str; 4] = ["http://", "https://", "rtmp://", "rtsp://"];

/// Kind of playback source behind a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Plain audio resource handed straight to the sink
    Direct,
    /// HLS manifest (`.m3u8`)
    Hls,
    /// Legacy M3U playlist (`.m3u`)
    M3u,
}

impl SourceKind {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Direct => "direct",
            SourceKind::Hls => "hls",
            SourceKind::M3u => "m3u",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified URL for one play attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSource {
    /// Source kind
    pub kind: SourceKind,
    /// URL as handed to the sink or resolver
    pub url: String,
    /// Playlist the URL was resolved from, if any
    pub playlist_url: Option<String>,
}

impl PlaybackSource {
    /// Classify `url`
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            kind: classify(&url),
            url,
            playlist_url: None,
        }
    }

    /// Classify `url`, remembering the playlist it came from
    pub fn from_playlist(url: impl Into<String>, playlist_url: impl Into<String>) -> Self {
        Self {
            playlist_url: Some(playlist_url.into()),
            ..Self::new(url)
        }
    }

    /// Whether `url` names this source or the playlist it was resolved from
    pub fn matches(&self, url: &str) -> bool {
        self.url == url || self.playlist_url.as_deref() == Some(url)
    }
}

/// Classify a URL by the suffix of its path, ignoring query and fragment.
///
/// Strings that do not parse as URLs fall back to a plain suffix check, so
/// relative paths such as `/live/list.m3u` still classify.
pub fn classify(url: &str) -> SourceKind {
    let path = match Url::parse(url.trim()) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => strip_query(url.trim()).to_ascii_lowercase(),
    };

    let kind = if path.ends_with(".m3u8") {
        SourceKind::Hls
    } else if path.ends_with(".m3u") {
        SourceKind::M3u
    } else {
        SourceKind::Direct
    };

    log::debug!("Classified {} as {}", url, kind);
    kind
}

/// Everything before the first `?` or `#`
pub(crate) fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Whether `url` starts with a scheme playlist entries may use verbatim
pub fn has_absolute_scheme(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    ABSOLUTE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Make a possibly relative URL absolute against `origin`.
///
/// Absolute URLs (anything that parses with a scheme) and calls without an
/// origin are returned unchanged. A leading `/` is kept; otherwise a leading
/// `./` is dropped and the path is joined with `origin + '/'`.
pub fn absolutize(url: &str, origin: Option<&str>) -> String {
    let url = url.trim();
    let Some(origin) = origin else {
        return url.to_string();
    };
    if Url::parse(url).is_ok() {
        return url.to_string();
    }

    let origin = origin.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        let relative = url.strip_prefix("./").unwrap_or(url);
        format!("{origin}/{relative}")
    }
}

/// Resolve a playlist entry against the playlist's own URL
pub fn resolve_entry(candidate: &str, playlist_url: &str) -> String {
    if has_absolute_scheme(candidate) {
        return candidate.to_string();
    }

    match Url::parse(playlist_url).and_then(|base| base.join(candidate)) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            log::debug!(
                "Could not resolve entry {} against {}: {}",
                candidate,
                playlist_url,
                e
            );
            candidate.to_string()
        }
    }
}
