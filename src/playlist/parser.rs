// ABOUTME: M3U/M3U8 text playlist parser
// ABOUTME: Turns playlist text into ordered media entries with titles

use crate::source::{resolve_entry, strip_query};
use serde::Serialize;

/// Extensions of containers that usually carry video (or may)
const VIDEO_LIKE_EXTENSIONS: [&str; 8] =
    [".m3u8", ".mp4", ".mkv", ".avi", ".mov", ".flv", ".wmv", ".ts"];

/// Extensions that are unambiguously audio
const AUDIO_EXTENSIONS: [&str; 6] = [".mp3", ".aac", ".ogg", ".opus", ".wav", ".m4a"];

const EXTINF_PREFIX: &str = "#EXTINF:";

/// One playable entry of a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistEntry {
    /// Absolute media URL
    pub media_url: String,
    /// Title from `#EXTINF`, or `Track {n}`
    pub title: String,
}

/// Parse playlist text, resolving entries against `playlist_url`.
///
/// Entries keep file order. A `#EXTINF:` line contributes the text after its
/// first comma as the title of the next URL line; every other `#` line is
/// ignored. Entries failing [`is_likely_audio`] are dropped.
pub fn parse_playlist(text: &str, playlist_url: &str) -> Vec<PlaylistEntry> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut pending_title: Option<String> = None;
    let mut parsed: Vec<(String, Option<String>)> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(info) = line.strip_prefix(EXTINF_PREFIX) {
            pending_title = info
                .split_once(',')
                .map(|(_, title)| title.trim().to_string())
                .filter(|title| !title.is_empty());
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let title = pending_title.take();
        let media_url = resolve_entry(line, playlist_url);
        if !is_likely_audio(&media_url) {
            log::debug!("Skipping non-audio playlist entry {}", media_url);
            continue;
        }
        parsed.push((media_url, title));
    }

    parsed
        .into_iter()
        .enumerate()
        .map(|(index, (media_url, title))| PlaylistEntry {
            media_url,
            title: title.unwrap_or_else(|| format!("Track {}", index + 1)),
        })
        .collect()
}

/// Heuristic audio filter for playlist entries.
///
/// Keeps an entry when it is not a video-like container, or has an audio
/// extension, or mentions "audio", or does not mention "video".
pub fn is_likely_audio(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    let path = strip_query(&lower);

    let video_like = VIDEO_LIKE_EXTENSIONS.iter().any(|ext| path.ends_with(ext));
    let audio_like = AUDIO_EXTENSIONS.iter().any(|ext| path.ends_with(ext));

    !video_like || audio_like || lower.contains("audio") || !lower.contains("video")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://radio.example/lists/stations.m3u";

    #[test]
    fn test_title_keeps_commas_after_the_first() {
        let text = "#EXTINF:-1,Station with multiple, commas, in title\nhttp://x/a.mp3";
        let entries = parse_playlist(text, BASE);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Station with multiple, commas, in title");
        assert_eq!(entries[0].media_url, "http://x/a.mp3");
    }

    #[test]
    fn test_default_titles_follow_file_order() {
        let text = "#EXTM3U\n\nhttp://x/one.mp3\n#EXTINF:-1,Named\nhttp://x/two.mp3\r\nhttp://x/three.aac\n";
        let entries = parse_playlist(text, BASE);

        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Track 1", "Named", "Track 3"]);
    }

    #[test]
    fn test_relative_entries_resolve_against_playlist() {
        let entries = parse_playlist("stream.mp3\n/abs/stream.ogg\n", BASE);

        assert_eq!(entries[0].media_url, "http://radio.example/lists/stream.mp3");
        assert_eq!(entries[1].media_url, "http://radio.example/abs/stream.ogg");
    }

    #[test]
    fn test_comment_only_playlist_is_empty() {
        let entries = parse_playlist("#EXTM3U\n#EXTINF:-1,Lonely title\n", BASE);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_extinf_without_comma_has_no_title() {
        let entries = parse_playlist("#EXTINF:-1\nhttp://x/a.mp3", BASE);
        assert_eq!(entries[0].title, "Track 1");
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let entries = parse_playlist("\u{feff}http://x/a.mp3", BASE);
        assert_eq!(entries[0].media_url, "http://x/a.mp3");
    }

    #[test]
    fn test_video_entries_are_filtered() {
        let text = "http://x/video/clip.mp4\nhttp://x/radio.mp3\nhttp://x/video/live.m3u8";
        let entries = parse_playlist(text, BASE);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].media_url, "http://x/radio.mp3");
        // Filtered entries do not consume track numbers
        assert_eq!(entries[0].title, "Track 1");
    }

    #[test]
    fn test_likely_audio_heuristic() {
        assert!(is_likely_audio("http://x/stream"));
        assert!(is_likely_audio("http://x/live.m3u8"));
        assert!(is_likely_audio("http://x/video/track.mp3"));
        assert!(is_likely_audio("http://x/video-audio/clip.mp4"));
        assert!(!is_likely_audio("http://x/video/clip.mkv"));
        assert!(!is_likely_audio("http://x/VIDEO/Clip.TS?x=1"));
    }
}
