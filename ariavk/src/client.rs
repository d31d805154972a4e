//! HTTP client for the VK audio API
//!
//! The audio methods are only served to requests that look like the
//! official mobile client, hence the pinned User-Agent.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, VkError};
use crate::models::{AccountInfo, AudioList, Audio, Envelope, ResolvedObject};

/// Default VK API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.vk.com";

/// API version the audio methods are pinned to
pub const API_VERSION: &str = "5.131";

/// Mobile client fingerprint required by the audio API
pub const USER_AGENT: &str =
    "VKAndroidApp/6.2-5091 (Android 9; SDK 28; samsungexynos7870; samsung j6lte; 720x1450)";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Token-authenticated VK API client
#[derive(Debug, Clone)]
pub struct VkClient {
    http: Client,
    base_url: String,
    token: String,
}

impl VkClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
        })
    }

    async fn method<T: DeserializeOwned>(
        &self,
        name: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        debug!(method = name, "Calling VK API");
        let envelope: Envelope<T> = self
            .http
            .get(format!("{}/method/{}", self.base_url, name))
            .query(&[
                ("access_token", self.token.as_str()),
                ("v", API_VERSION),
            ])
            .query(params)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = envelope.error {
            return Err(VkError::Api {
                code: error.error_code,
                message: error.error_msg,
            });
        }
        envelope.response.ok_or(VkError::Api {
            code: -1,
            message: "empty response".to_string(),
        })
    }

    /// Auth probe used during service initialization
    pub async fn account_get_info(&self) -> Result<AccountInfo> {
        self.method("account.getInfo", &[]).await
    }

    /// Audios of a user, community or album
    pub async fn audio_get(
        &self,
        owner_id: i64,
        album_id: Option<i64>,
        count: Option<u32>,
    ) -> Result<AudioList> {
        let mut params = vec![("owner_id", owner_id.to_string())];
        if let Some(album_id) = album_id {
            params.push(("album_id", album_id.to_string()));
        }
        if let Some(count) = count {
            params.push(("count", count.to_string()));
        }
        self.method("audio.get", &params).await
    }

    /// Audios by `{owner}_{id}` identifiers
    pub async fn audio_get_by_id(&self, ids: &str) -> Result<Vec<Audio>> {
        self.method("audio.getById", &[("audios", ids.to_string())])
            .await
    }

    pub async fn audio_search(&self, query: &str, count: u32) -> Result<AudioList> {
        self.method(
            "audio.search",
            &[
                ("q", query.to_string()),
                ("count", count.to_string()),
                ("sort", "0".to_string()),
            ],
        )
        .await
    }

    /// Resolves a short name into a user or community id
    pub async fn resolve_screen_name(&self, screen_name: &str) -> Result<ResolvedObject> {
        self.method(
            "utils.resolveScreenName",
            &[("screen_name", screen_name.to_string())],
        )
        .await
    }
}
