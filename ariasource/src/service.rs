//! The capability contract implemented by every streaming backend

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::download;
use crate::error::{Error, Result};
use crate::playlist::Playlist;
use crate::track::Track;

/// What a search should look for.
///
/// `Tracks` and `PodcastEpisodes` narrow the search on backends that
/// distinguish them (Yandex Music); the others treat everything as
/// `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchKind {
    #[default]
    Default,
    Tracks,
    PodcastEpisodes,
}

/// Backend-interpreted search flags
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Disable query autocorrection on backends that support it
    pub nocorrect: bool,
}

/// Enabled/warning state shared between a service and the manager.
///
/// Each service embeds one of these; the manager flips `enabled` off when
/// initialization fails and records the failure message.
#[derive(Debug)]
pub struct ServiceStatus {
    enabled: AtomicBool,
    warning: Mutex<Option<String>>,
}

impl ServiceStatus {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            warning: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Disable the service and remember why
    pub fn disable(&self, reason: impl Into<String>) {
        self.set_enabled(false);
        self.set_warning(reason);
    }

    pub fn set_warning(&self, message: impl Into<String>) {
        *self.warning.lock().unwrap() = Some(message.into());
    }

    pub fn warning(&self) -> Option<String> {
        self.warning.lock().unwrap().clone()
    }
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self::new(true)
    }
}

/// A streaming backend.
///
/// The set of implementations is closed and selected by stable keys
/// (`"vk"`, `"yam"`, `"yt"`); there is no runtime plugin loading.
///
/// Methods that produce [`Track`]s take `self: Arc<Self>` so the built
/// tracks can carry a back-reference to their owning service for later
/// resolution and download.
#[async_trait]
pub trait MusicService: std::fmt::Debug + Send + Sync {
    /// Stable registry key, e.g. `"vk"`
    fn key(&self) -> &'static str;

    /// Human-readable service name
    fn name(&self) -> &'static str;

    /// Hostnames this service claims during URL dispatch
    fn hostnames(&self) -> &'static [&'static str] {
        &[]
    }

    /// Hidden services are skipped by user-facing service listings
    fn is_hidden(&self) -> bool {
        false
    }

    fn status(&self) -> &ServiceStatus;

    /// Build the backend client and probe authentication.
    ///
    /// Fails with [`Error::Service`] or [`Error::Login`] on auth or
    /// connectivity problems.
    async fn initialize(&self) -> Result<()>;

    /// Resolve a URL into an ordered list of tracks
    async fn get_tracks(self: Arc<Self>, url: &str) -> Result<Vec<Track>>;

    /// Free-text search
    async fn search(
        self: Arc<Self>,
        query: &str,
        kind: SearchKind,
        options: SearchOptions,
    ) -> Result<Vec<Track>>;

    /// Resolve a dynamic track's real URL
    async fn prepare_track(&self, _track: &Track) -> Result<Track> {
        Err(Error::NotSupported)
    }

    /// Fetch a track's bytes into `path`
    async fn download(&self, track: &Track, path: &Path) -> Result<()> {
        download::download_file(&track.url, path).await
    }

    /// Playlists of the authenticated user
    async fn get_my_playlists(&self) -> Result<Vec<Playlist>> {
        Err(Error::NotSupported)
    }

    /// Start background work, if any
    async fn run(&self) -> Result<()> {
        Ok(())
    }

    /// Release backend resources
    async fn close(&self) {}
}
