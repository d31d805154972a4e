//! `MusicService` implementation for YouTube

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use ariaconfig::Config;
use ariasource::{
    Artist, Error, MusicService, Result, SearchKind, SearchOptions, ServiceStatus, Track,
    TrackType,
};

use crate::config_ext::YtConfigExt;
use crate::error::YtError;
use crate::ytdlp::YtDlp;

/// `_type: url` entries can chain; don't follow them forever
const MAX_REDIRECTS: usize = 5;

fn as_str<'a>(info: &'a Value, key: &str) -> Option<&'a str> {
    info.get(key).and_then(Value::as_str)
}

/// A bare URL result that the extractor has not identified yet and wants
/// re-extracted
fn is_bare_url(info: &Value) -> bool {
    as_str(info, "_type") == Some("url") && as_str(info, "ie_key").unwrap_or("").is_empty()
}

fn search_target(limit: u32, query: &str) -> String {
    format!("ytsearch{limit}:{query}")
}

/// One dynamic track per extractor entry, carrying the entry JSON for
/// later resolution
fn entry_to_track(service: &Arc<dyn MusicService>, entry: Value) -> Track {
    let title = as_str(&entry, "title").unwrap_or_default().to_string();
    let artists = as_str(&entry, "channel")
        .or_else(|| as_str(&entry, "uploader"))
        .map(|channel| vec![Artist::new(channel)])
        .unwrap_or_default();
    let url = as_str(&entry, "url")
        .or_else(|| as_str(&entry, "webpage_url"))
        .unwrap_or_default()
        .to_string();
    Track::new(
        title,
        artists,
        url,
        Some(service.clone()),
        entry,
        "",
        TrackType::Dynamic,
    )
}

/// A fully extracted stream to a playable track
fn prepared_from_stream(info: &Value) -> Result<Track> {
    let url = as_str(info, "url")
        .or_else(|| {
            info.get("requested_downloads")
                .and_then(Value::as_array)
                .and_then(|downloads| downloads.first())
                .and_then(|download| download.get("url"))
                .and_then(Value::as_str)
        })
        .ok_or(YtError::MissingField("url"))?;

    let title = as_str(info, "title").unwrap_or_default().to_string();
    let artists = as_str(info, "uploader")
        .or_else(|| as_str(info, "channel"))
        .map(|uploader| vec![Artist::new(uploader)])
        .unwrap_or_default();
    let format = as_str(info, "ext").unwrap_or("m4a").to_string();
    let track_type = if info.get("is_live").and_then(Value::as_bool).unwrap_or(false) {
        TrackType::Live
    } else {
        TrackType::Default
    };

    Ok(Track::new(
        title,
        artists,
        url,
        None,
        Value::Null,
        format,
        track_type,
    ))
}

/// The YouTube backend.
///
/// No hostnames are declared: YouTube links reach this service through
/// the manager's fallback dispatch, and the extractor itself decides what
/// it can handle.
#[derive(Debug)]
pub struct YtService {
    status: ServiceStatus,
    ytdlp: YtDlp,
    search_limit: u32,
}

impl YtService {
    pub fn new(config: &Config) -> Self {
        Self {
            status: ServiceStatus::new(config.yt_enabled()),
            ytdlp: YtDlp::new(config.yt_binary()),
            search_limit: config.yt_search_limit(),
        }
    }
}

fn tracks_from_info(service: &Arc<YtService>, info: Value) -> Vec<Track> {
    let service: Arc<dyn MusicService> = service.clone();
    if as_str(&info, "_type") == Some("playlist") {
        let entries = match info.get("entries") {
            Some(Value::Array(entries)) => entries.clone(),
            _ => Vec::new(),
        };
        entries
            .into_iter()
            .map(|entry| entry_to_track(&service, entry))
            .collect()
    } else {
        vec![entry_to_track(&service, info)]
    }
}

#[async_trait]
impl MusicService for YtService {
    fn key(&self) -> &'static str {
        "yt"
    }

    fn name(&self) -> &'static str {
        "YouTube"
    }

    fn status(&self) -> &ServiceStatus {
        &self.status
    }

    async fn initialize(&self) -> Result<()> {
        debug!("Initializing YT service");
        debug!("YT service has been initialized");
        Ok(())
    }

    async fn get_tracks(self: Arc<Self>, url: &str) -> Result<Vec<Track>> {
        let mut info = self.ytdlp.extract_flat(url).await.map_err(Error::from)?;
        for _ in 0..MAX_REDIRECTS {
            if !is_bare_url(&info) {
                break;
            }
            let next = as_str(&info, "url")
                .ok_or(YtError::MissingField("url"))?
                .to_string();
            info = self.ytdlp.extract_flat(&next).await.map_err(Error::from)?;
        }
        Ok(tracks_from_info(&self, info))
    }

    async fn search(
        self: Arc<Self>,
        query: &str,
        _kind: SearchKind,
        _options: SearchOptions,
    ) -> Result<Vec<Track>> {
        let target = search_target(self.search_limit, query);
        let info = self.ytdlp.extract_flat(&target).await.map_err(Error::from)?;
        let tracks = tracks_from_info(&self, info);
        if tracks.is_empty() {
            return Err(Error::NothingFound);
        }
        Ok(tracks)
    }

    async fn prepare_track(&self, track: &Track) -> Result<Track> {
        let target = as_str(&track.extra_info, "webpage_url")
            .or_else(|| as_str(&track.extra_info, "url"))
            .or_else(|| as_str(&track.extra_info, "original_url"))
            .map(str::to_string)
            .or_else(|| (!track.url.is_empty()).then(|| track.url.clone()))
            .ok_or_else(|| Error::service("track carries no extractor target"))?;

        let info = self.ytdlp.extract_full(&target).await.map_err(Error::from)?;
        prepared_from_stream(&info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariaconfig::Config as AriaConfig;
    use serde_json::json;

    fn service() -> Arc<YtService> {
        let dir = tempfile::tempdir().unwrap();
        let config = AriaConfig::load_config(dir.path().to_str().unwrap()).unwrap();
        Arc::new(YtService::new(&config))
    }

    #[test]
    fn playlists_become_one_track_per_entry() {
        let service = service();
        let info = json!({
            "_type": "playlist",
            "title": "Mix",
            "entries": [
                {"_type": "url", "ie_key": "Youtube", "title": "First",
                 "url": "https://www.youtube.com/watch?v=a", "channel": "Chan A"},
                {"_type": "url", "ie_key": "Youtube", "title": "Second",
                 "url": "https://www.youtube.com/watch?v=b"}
            ]
        });

        let tracks = tracks_from_info(&service, info);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "First");
        assert_eq!(tracks[0].track_type, TrackType::Dynamic);
        assert_eq!(tracks[0].artists[0].name, "Chan A");
        assert!(tracks[0].service.is_some());
        assert!(tracks[1].artists.is_empty());
    }

    #[test]
    fn single_videos_become_one_dynamic_track() {
        let service = service();
        let info = json!({
            "id": "abc123",
            "title": "Single",
            "webpage_url": "https://www.youtube.com/watch?v=abc123",
            "uploader": "Someone"
        });

        let tracks = tracks_from_info(&service, info);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "Single");
        assert_eq!(tracks[0].track_type, TrackType::Dynamic);
        assert_eq!(
            as_str(&tracks[0].extra_info, "id"),
            Some("abc123")
        );
    }

    #[test]
    fn bare_url_results_are_detected() {
        assert!(is_bare_url(&json!({"_type": "url", "url": "https://x"})));
        assert!(is_bare_url(&json!({"_type": "url", "ie_key": "", "url": "https://x"})));
        assert!(!is_bare_url(
            &json!({"_type": "url", "ie_key": "Youtube", "url": "https://x"})
        ));
        assert!(!is_bare_url(&json!({"title": "plain video"})));
    }

    #[test]
    fn prepared_streams_map_all_display_fields() {
        let info = json!({
            "title": "Live Show",
            "url": "https://cdn.example/audio.m4a",
            "uploader": "Broadcaster",
            "ext": "m4a",
            "is_live": true
        });

        let track = prepared_from_stream(&info).unwrap();
        assert_eq!(track.title, "Live Show");
        assert_eq!(track.url, "https://cdn.example/audio.m4a");
        assert_eq!(track.artists[0].name, "Broadcaster");
        assert_eq!(track.format, "m4a");
        assert_eq!(track.track_type, TrackType::Live);
    }

    #[test]
    fn prepared_streams_fall_back_to_requested_downloads() {
        let info = json!({
            "title": "T",
            "requested_downloads": [{"url": "https://cdn.example/picked.m4a"}]
        });
        let track = prepared_from_stream(&info).unwrap();
        assert_eq!(track.url, "https://cdn.example/picked.m4a");
        assert_eq!(track.track_type, TrackType::Default);
    }

    #[test]
    fn missing_stream_url_is_an_error() {
        assert!(prepared_from_stream(&json!({"title": "T"})).is_err());
    }

    #[test]
    fn search_targets_use_the_extractor_prefix() {
        assert_eq!(search_target(300, "some song"), "ytsearch300:some song");
    }
}
