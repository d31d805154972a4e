//! `MusicService` implementation for VK

use std::path::Path;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{debug, error};
use url::Url;

use ariaconfig::Config;
use ariasource::{
    Artist, Error, MusicService, Result, SearchKind, SearchOptions, ServiceStatus, Track,
    TrackType, download,
};

use crate::client::VkClient;
use crate::config_ext::VkConfigExt;
use crate::models::Audio;

const SEARCH_COUNT: u32 = 300;
const PROFILE_AUDIO_COUNT: u32 = 6000;

/// What a VK URL path points at
#[derive(Debug, PartialEq)]
enum VkUrlKind {
    /// Video links are not playable audio
    Video,
    /// `music/album/{owner}_{album}` and friends
    Album { owner_id: i64, album_id: i64 },
    /// `audio{owner}_{id}` single-audio links
    AudioIds(String),
    /// Anything else is treated as a user/community screen name
    Profile(String),
}

fn classify_path(path: &str) -> Result<VkUrlKind> {
    if path.starts_with("video_") {
        return Ok(VkUrlKind::Video);
    }
    if path.contains("music/") {
        let id = path.rsplit('/').next().unwrap_or_default();
        let mut parts = id.split('_');
        let owner_id = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(|| Error::service(format!("unrecognized VK album link: {path}")))?;
        let album_id = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(|| Error::service(format!("unrecognized VK album link: {path}")))?;
        return Ok(VkUrlKind::Album { owner_id, album_id });
    }
    if let Some(ids) = path.strip_prefix("audio") {
        if !ids.is_empty() {
            return Ok(VkUrlKind::AudioIds(ids.to_string()));
        }
    }
    Ok(VkUrlKind::Profile(path.to_string()))
}

/// The VK audio backend
#[derive(Debug)]
pub struct VkService {
    status: ServiceStatus,
    token: String,
    /// Engine binary used for HLS capture in [`MusicService::download`]
    record_binary: String,
    client: OnceLock<VkClient>,
}

impl VkService {
    pub fn new(config: &Config) -> Self {
        Self {
            status: ServiceStatus::new(config.vk_enabled()),
            token: config.vk_token(),
            record_binary: config.get_str_or(&["engine", "mpv_binary"], "mpv"),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&VkClient> {
        self.client
            .get()
            .ok_or_else(|| Error::service("VK service is not initialized"))
    }
}

/// Audios to tracks, skipping items without a playable URL
fn audios_to_tracks(service: &Arc<VkService>, audios: Vec<Audio>) -> Result<Vec<Track>> {
    let service: Arc<dyn MusicService> = service.clone();
    let tracks: Vec<Track> = audios
        .into_iter()
        .filter(|audio| !audio.url.is_empty())
        .map(|audio| {
            Track::new(
                audio.title,
                vec![Artist::new(audio.artist)],
                audio.url,
                Some(service.clone()),
                serde_json::Value::Null,
                "mp3",
                TrackType::Default,
            )
        })
        .collect();
    if tracks.is_empty() {
        return Err(Error::NothingFound);
    }
    Ok(tracks)
}

#[async_trait]
impl MusicService for VkService {
    fn key(&self) -> &'static str {
        "vk"
    }

    fn name(&self) -> &'static str {
        "VK"
    }

    fn hostnames(&self) -> &'static [&'static str] {
        &[
            "vk.com",
            "www.vk.com",
            "vkontakte.ru",
            "www.vkontakte.ru",
            "m.vk.com",
            "m.vkontakte.ru",
        ]
    }

    fn status(&self) -> &ServiceStatus {
        &self.status
    }

    async fn initialize(&self) -> Result<()> {
        debug!("Initializing VK service");
        let client = VkClient::new(&self.token).map_err(|err| Error::service(err.to_string()))?;
        if let Err(err) = client.account_get_info().await {
            error!(error = %err, "VK auth probe failed");
            return Err(err.into());
        }
        let _ = self.client.set(client);
        debug!("VK service has been initialized");
        Ok(())
    }

    async fn get_tracks(self: Arc<Self>, url: &str) -> Result<Vec<Track>> {
        let parsed = Url::parse(url)?;
        let path = parsed.path().trim_start_matches('/');
        let client = self.client()?;

        let audios = match classify_path(path)? {
            VkUrlKind::Video => {
                return Err(Error::service("video links are not supported"));
            }
            VkUrlKind::Album { owner_id, album_id } => {
                client.audio_get(owner_id, Some(album_id), None).await?
            }
            VkUrlKind::AudioIds(ids) => {
                let items = client.audio_get_by_id(&ids).await?;
                crate::models::AudioList {
                    count: items.len() as u64,
                    items,
                }
            }
            VkUrlKind::Profile(screen_name) => {
                let object = client.resolve_screen_name(&screen_name).await?;
                let owner_id = if object.object_type == "group" {
                    -object.object_id
                } else {
                    object.object_id
                };
                client
                    .audio_get(owner_id, None, Some(PROFILE_AUDIO_COUNT))
                    .await?
            }
        };

        if audios.count == 0 {
            return Err(Error::NothingFound);
        }
        audios_to_tracks(&self, audios.items)
    }

    async fn search(
        self: Arc<Self>,
        query: &str,
        _kind: SearchKind,
        _options: SearchOptions,
    ) -> Result<Vec<Track>> {
        let results = self.client()?.audio_search(query, SEARCH_COUNT).await?;
        if results.count == 0 {
            return Err(Error::NothingFound);
        }
        audios_to_tracks(&self, results.items)
    }

    async fn download(&self, track: &Track, path: &Path) -> Result<()> {
        if !track.url.contains(".m3u8") {
            return download::download_file(&track.url, path).await;
        }
        // Segmented stream; a plain GET would fetch the playlist file.
        ariaengine::record_stream(&self.record_binary, &track.url, path)
            .await
            .map_err(|err| Error::service(err.to_string()))
    }
}
