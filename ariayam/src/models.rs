//! Serde models for the Yandex Music API payloads we consume.
//!
//! Every field a response can omit is an `Option`; the API is
//! inconsistent about null fields across account types, so the models
//! assume nothing.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ResultEnvelope<T> {
    pub result: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    #[serde(default)]
    pub account: Option<Account>,
    #[serde(default)]
    pub plus: Option<Plus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub uid: Option<u64>,
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plus {
    #[serde(default)]
    pub has_plus: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YamTrack {
    /// Track ids arrive as numbers or strings depending on the endpoint
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<YamArtist>>,
    #[serde(default)]
    pub albums: Option<Vec<YamAlbum>>,
}

impl YamTrack {
    /// The canonical `{id}:{album_id}` identifier, or the bare id when
    /// the track carries no album
    pub fn track_id(&self) -> Option<String> {
        let id = match self.id.as_ref()? {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let album = self
            .albums
            .as_ref()
            .and_then(|albums| albums.first())
            .and_then(|album| album.id);
        match album {
            Some(album) => Some(format!("{id}:{album}")),
            None => Some(id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YamArtist {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YamAlbum {
    #[serde(default)]
    pub id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumWithTracks {
    #[serde(default)]
    pub volumes: Option<Vec<Vec<YamTrack>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistTracks {
    #[serde(default)]
    pub tracks: Option<Vec<YamTrack>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPlaylist {
    #[serde(default)]
    pub tracks: Option<Vec<PlaylistEntry>>,
}

/// A playlist entry; short entries carry the full track inline
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    #[serde(default)]
    pub track: Option<YamTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub tracks: Option<SearchBlock>,
    #[serde(default)]
    pub podcast_episodes: Option<SearchBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBlock {
    #[serde(default)]
    pub results: Option<Vec<YamTrack>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfo {
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub bitrate_in_kbps: Option<u32>,
    #[serde(default)]
    pub download_info_url: Option<String>,
}

/// The XML payload behind `download_info_url`
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename = "download-info")]
pub struct DownloadInfoXml {
    pub host: String,
    pub path: String,
    pub ts: String,
    pub s: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_id_combines_id_and_album() {
        let track: YamTrack = serde_json::from_value(serde_json::json!({
            "id": 10994777,
            "title": "Song",
            "albums": [{"id": 1193829}]
        }))
        .unwrap();
        assert_eq!(track.track_id().as_deref(), Some("10994777:1193829"));
    }

    #[test]
    fn track_id_without_albums_is_the_bare_id() {
        let track: YamTrack = serde_json::from_value(serde_json::json!({
            "id": "10994777",
            "title": "Song"
        }))
        .unwrap();
        assert_eq!(track.track_id().as_deref(), Some("10994777"));
    }

    #[test]
    fn download_info_xml_parses() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<download-info>
  <host>s99.storage.yandex.net</host>
  <path>/get-mp3/1/2/file.mp3</path>
  <ts>0005f00</ts>
  <region>-1</region>
  <s>secretvalue</s>
</download-info>"#;
        let parsed: DownloadInfoXml = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.host, "s99.storage.yandex.net");
        assert_eq!(parsed.path, "/get-mp3/1/2/file.mp3");
        assert_eq!(parsed.ts, "0005f00");
        assert_eq!(parsed.s, "secretvalue");
    }

    #[test]
    fn account_status_tolerates_missing_blocks() {
        let status: AccountStatus = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(status.account.is_none());
        assert!(status.plus.is_none());
    }
}
