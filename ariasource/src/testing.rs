//! Hand-rolled service double shared by the unit tests in this crate

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::service::{MusicService, SearchKind, SearchOptions, ServiceStatus};
use crate::track::Track;

/// What `initialize` should do
#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum InitReply {
    #[default]
    Ok,
    ServiceError,
    Unexpected,
}

/// What `get_tracks` / `search` should return
#[derive(Debug, Clone, Default)]
pub(crate) enum TracksReply {
    #[default]
    NothingFound,
    Urls(Vec<&'static str>),
    ServiceError,
    Unexpected,
}

#[derive(Debug)]
pub(crate) struct MockService {
    key: &'static str,
    hostnames: &'static [&'static str],
    status: ServiceStatus,
    init_reply: InitReply,
    tracks_reply: TracksReply,
    prepare_url: Option<&'static str>,
    pub(crate) init_calls: AtomicUsize,
    pub(crate) get_tracks_calls: AtomicUsize,
    pub(crate) prepare_calls: AtomicUsize,
    pub(crate) ran: AtomicBool,
    pub(crate) closed: AtomicBool,
    pub(crate) downloaded: Mutex<Option<String>>,
}

impl MockService {
    pub(crate) fn new(key: &'static str) -> Self {
        Self {
            key,
            hostnames: &[],
            status: ServiceStatus::new(true),
            init_reply: InitReply::Ok,
            tracks_reply: TracksReply::NothingFound,
            prepare_url: None,
            init_calls: AtomicUsize::new(0),
            get_tracks_calls: AtomicUsize::new(0),
            prepare_calls: AtomicUsize::new(0),
            ran: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            downloaded: Mutex::new(None),
        }
    }

    pub(crate) fn with_hostnames(mut self, hostnames: &'static [&'static str]) -> Self {
        self.hostnames = hostnames;
        self
    }

    pub(crate) fn with_init(mut self, reply: InitReply) -> Self {
        self.init_reply = reply;
        self
    }

    pub(crate) fn with_tracks(mut self, reply: TracksReply) -> Self {
        self.tracks_reply = reply;
        self
    }

    pub(crate) fn with_prepare_url(mut self, url: &'static str) -> Self {
        self.prepare_url = Some(url);
        self
    }

    pub(crate) fn disabled(self) -> Self {
        self.status.set_enabled(false);
        self
    }

    fn reply(&self) -> Result<Vec<Track>> {
        match &self.tracks_reply {
            TracksReply::NothingFound => Err(Error::NothingFound),
            TracksReply::ServiceError => Err(Error::service("backend failed")),
            TracksReply::Unexpected => Err(Error::other("boom")),
            TracksReply::Urls(urls) => Ok(urls.iter().map(|u| Track::direct(*u)).collect()),
        }
    }
}

#[async_trait]
impl MusicService for MockService {
    fn key(&self) -> &'static str {
        self.key
    }

    fn name(&self) -> &'static str {
        self.key
    }

    fn hostnames(&self) -> &'static [&'static str] {
        self.hostnames
    }

    fn status(&self) -> &ServiceStatus {
        &self.status
    }

    async fn initialize(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        match self.init_reply {
            InitReply::Ok => Ok(()),
            InitReply::ServiceError => Err(Error::service("init failed")),
            InitReply::Unexpected => Err(Error::other("boom")),
        }
    }

    async fn get_tracks(self: Arc<Self>, _url: &str) -> Result<Vec<Track>> {
        self.get_tracks_calls.fetch_add(1, Ordering::SeqCst);
        self.reply()
    }

    async fn search(
        self: Arc<Self>,
        _query: &str,
        _kind: SearchKind,
        _options: SearchOptions,
    ) -> Result<Vec<Track>> {
        self.reply()
    }

    async fn prepare_track(&self, track: &Track) -> Result<Track> {
        self.prepare_calls.fetch_add(1, Ordering::SeqCst);
        match self.prepare_url {
            Some(url) => Ok(Track::new(
                track.title.clone(),
                track.artists.clone(),
                url,
                None,
                serde_json::Value::Null,
                track.format.clone(),
                crate::track::TrackType::Default,
            )),
            None => Err(Error::service("nothing to prepare")),
        }
    }

    async fn download(&self, track: &Track, _path: &Path) -> Result<()> {
        *self.downloaded.lock().unwrap() = Some(track.url.clone());
        Ok(())
    }

    async fn run(&self) -> Result<()> {
        self.ran.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
