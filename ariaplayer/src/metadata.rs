//! ICY/demuxer metadata parsing for direct and local streams

use std::collections::HashMap;

/// Display fields extracted from engine-exposed stream metadata
#[derive(Debug, Default, PartialEq)]
pub struct ParsedMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub stream_name: Option<String>,
}

/// Pick title/artist/stream-name out of the raw metadata map.
///
/// Keys vary by container (`icy-title`, `title`, `TITLE`, …), so any key
/// containing "title"/"artist" counts; `icy-name` is the station name.
/// Values are HTML-entity-decoded, as webradios routinely escape them.
pub fn parse_metadata(metadata: &HashMap<String, String>) -> ParsedMetadata {
    let mut parsed = ParsedMetadata::default();
    for (key, value) in metadata {
        let key = key.to_lowercase();
        if key == "icy-name" {
            parsed.stream_name = Some(unescape(value));
        }
        if key.contains("title") {
            parsed.title = Some(unescape(value));
        }
        if key.contains("artist") {
            parsed.artist = Some(unescape(value));
        }
    }
    parsed
}

/// Decode HTML entities, falling back to the raw string on malformed input
pub fn unescape(value: &str) -> String {
    htmlescape::decode_html(value).unwrap_or_else(|_| value.to_string())
}
