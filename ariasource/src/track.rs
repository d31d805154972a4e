//! The common track representation shared by every backend

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::artist::Artist;
use crate::error::{Error, Result};
use crate::service::MusicService;
use crate::utils::clean_file_name;

/// How a track's URL is to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackType {
    /// A resolved, directly playable track from a backend
    #[default]
    Default,
    /// A live stream resolved by a backend
    Live,
    /// A local file
    Local,
    /// A raw URL handed to the player as-is, owned by no service
    Direct,
    /// The playable URL is not known yet; the owning service resolves it
    /// on demand
    Dynamic,
}

/// A playable item.
///
/// Dynamic tracks follow a two-phase contract: the service that built the
/// track leaves `url` empty and stashes its resolution payload in
/// `extra_info`; the consumer calls [`Track::resolve`] once before first
/// use. Repeated `resolve` calls never hit the backend again.
#[derive(Clone, Default)]
pub struct Track {
    pub title: String,
    pub artists: Vec<Artist>,
    pub url: String,
    /// Back-reference to the owning service, not ownership
    pub service: Option<Arc<dyn MusicService>>,
    /// Opaque service-specific resolution payload (`Null` when absent)
    pub extra_info: serde_json::Value,
    /// File extension / codec hint, e.g. `"mp3"`
    pub format: String,
    pub track_type: TrackType,
    /// Stream name reported by ICY metadata, for display only
    pub stream_name: Option<String>,
    fetched: bool,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        artists: Vec<Artist>,
        url: impl Into<String>,
        service: Option<Arc<dyn MusicService>>,
        extra_info: serde_json::Value,
        format: impl Into<String>,
        track_type: TrackType,
    ) -> Self {
        Self {
            title: title.into(),
            artists,
            url: url.into(),
            service,
            extra_info,
            format: format.into(),
            track_type,
            stream_name: None,
            fetched: false,
        }
    }

    /// A raw, already-playable URL owned by no service
    pub fn direct(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            track_type: TrackType::Direct,
            ..Self::default()
        }
    }

    /// A track is usable for playback iff it has an owning service or a
    /// non-empty URL
    pub fn is_valid(&self) -> bool {
        self.service.is_some() || !self.url.is_empty()
    }

    /// Whether the backend resolution has already happened
    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    fn has_extra_info(&self) -> bool {
        match &self.extra_info {
            serde_json::Value::Null => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }

    /// Resolve the playable URL, calling the owning service at most once.
    ///
    /// For a dynamic, not-yet-fetched track this asks the owning service —
    /// `prepare_track` when a resolution payload is present, otherwise the
    /// first result of `get_tracks` on the stored URL — then caches the
    /// returned URL. Every other track (and every later call) returns the
    /// cached URL without touching the backend. Resolution errors
    /// propagate unchanged and leave the track unfetched.
    pub async fn resolve(&mut self) -> Result<&str> {
        if self.track_type == TrackType::Dynamic && !self.fetched {
            if let Some(service) = self.service.clone() {
                let prepared = if self.has_extra_info() {
                    service.prepare_track(self).await?
                } else {
                    let mut tracks = service.get_tracks(&self.url).await?;
                    if tracks.is_empty() {
                        return Err(Error::NothingFound);
                    }
                    tracks.swap_remove(0)
                };
                self.url = prepared.url;
                self.fetched = true;
            }
        }
        Ok(&self.url)
    }

    /// File name this track downloads to, before sanitization is applied
    /// to the artist/title part
    fn file_name(&self) -> String {
        let artists = self
            .artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join("&");
        clean_file_name(&format!("{} - {}.{}", artists, self.title, self.format))
    }

    /// Download the track into `directory`, returning the written path.
    ///
    /// Requires an owning service; byte transfer is delegated to the
    /// service's `download` implementation.
    pub async fn download(&mut self, directory: &Path) -> Result<PathBuf> {
        let service = self.service.clone().ok_or(Error::NotSupported)?;
        if !directory.is_dir() {
            return Err(Error::PathNotFound(directory.display().to_string()));
        }
        self.resolve().await?;
        let file_path = directory.join(self.file_name());
        service.download(self, &file_path).await?;
        Ok(file_path)
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("title", &self.title)
            .field("artists", &self.artists)
            .field("url", &self.url)
            .field("service", &self.service.as_ref().map(|s| s.key()))
            .field("format", &self.format)
            .field("track_type", &self.track_type)
            .field("fetched", &self.fetched)
            .finish()
    }
}
