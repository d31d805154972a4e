//! HTTP client for the Yandex Music API

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, YamError};
use crate::models::{
    AccountStatus, AlbumWithTracks, ArtistTracks, DownloadInfo, DownloadInfoXml, ResultEnvelope,
    SearchResult, UserPlaylist, YamTrack,
};
use crate::signing::direct_link;

/// Default Yandex Music API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.music.yandex.net";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth-token-authenticated Yandex Music client
#[derive(Debug, Clone)]
pub struct YamClient {
    http: Client,
    base_url: String,
}

impl YamClient {
    pub fn new(token: impl AsRef<str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let token = token.as_ref();
        if !token.is_empty() {
            let value = HeaderValue::from_str(&format!("OAuth {token}"))
                .map_err(|_| YamError::Api("token contains invalid characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(path, "Calling Yandex Music API");
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(YamError::Unauthorized(format!(
                    "token rejected for {path}"
                )));
            }
            status if !status.is_success() => {
                return Err(YamError::Api(format!("{path} answered {status}")));
            }
            _ => {}
        }

        let envelope: ResultEnvelope<T> = response.json().await?;
        envelope
            .result
            .ok_or_else(|| YamError::Api(format!("{path} returned an empty result")))
    }

    pub async fn account_status(&self) -> Result<AccountStatus> {
        self.get("/account/status", &[]).await
    }

    /// Tracks by `{id}` or `{id}:{album_id}` identifiers
    pub async fn tracks(&self, track_ids: &str) -> Result<Vec<YamTrack>> {
        self.get(
            "/tracks",
            &[("track-ids", track_ids.to_string())],
        )
        .await
    }

    pub async fn album_with_tracks(&self, album_id: &str) -> Result<AlbumWithTracks> {
        self.get(&format!("/albums/{album_id}/with-tracks"), &[])
            .await
    }

    pub async fn artist_tracks(&self, artist_id: &str) -> Result<ArtistTracks> {
        self.get(&format!("/artists/{artist_id}/tracks"), &[])
            .await
    }

    pub async fn user_playlist(&self, user_id: &str, kind: &str) -> Result<UserPlaylist> {
        self.get(&format!("/users/{user_id}/playlists/{kind}"), &[])
            .await
    }

    pub async fn search(
        &self,
        text: &str,
        search_type: &str,
        nocorrect: bool,
    ) -> Result<SearchResult> {
        self.get(
            "/search",
            &[
                ("text", text.to_string()),
                ("type", search_type.to_string()),
                ("nocorrect", nocorrect.to_string()),
                ("page", "0".to_string()),
            ],
        )
        .await
    }

    /// The signed MP3 URL for a track.
    ///
    /// Picks the best MP3 variant from the download-info list, fetches
    /// its XML descriptor, and derives the storage link.
    pub async fn direct_link(&self, track_id: &str) -> Result<String> {
        let infos: Vec<DownloadInfo> = self
            .get(&format!("/tracks/{track_id}/download-info"), &[])
            .await?;

        let info = infos
            .iter()
            .filter(|info| info.codec.as_deref() == Some("mp3"))
            .max_by_key(|info| info.bitrate_in_kbps.unwrap_or(0))
            .or_else(|| infos.first())
            .ok_or_else(|| {
                YamError::DownloadInfo(format!("no download info for track {track_id}"))
            })?;
        let info_url = info.download_info_url.as_deref().ok_or_else(|| {
            YamError::DownloadInfo(format!("download info for track {track_id} has no URL"))
        })?;

        let xml = self.http.get(info_url).send().await?.text().await?;
        let parsed: DownloadInfoXml = quick_xml::de::from_str(&xml)
            .map_err(|err| YamError::DownloadInfo(err.to_string()))?;
        Ok(direct_link(&parsed))
    }
}
