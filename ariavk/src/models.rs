//! Serde models for the VK API payloads we consume

use serde::Deserialize;

/// Every VK method call answers with either `response` or `error`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: Option<T>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error_code: i64,
    pub error_msg: String,
}

/// One audio item; `url` is empty for region-locked or removed tracks
#[derive(Debug, Clone, Deserialize)]
pub struct Audio {
    pub id: i64,
    pub owner_id: i64,
    pub artist: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub duration: u32,
}

#[derive(Debug, Deserialize)]
pub struct AudioList {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub items: Vec<Audio>,
}

/// `utils.resolveScreenName` result
#[derive(Debug, Deserialize)]
pub struct ResolvedObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub object_id: i64,
}

/// Minimal `account.getInfo` shape, used only as an auth probe
#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub country: Option<String>,
}
