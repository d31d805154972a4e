//! `MusicService` implementation for Yandex Music

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use ariaconfig::Config;
use ariasource::{
    Artist, Error, MusicService, Result, SearchKind, SearchOptions, ServiceStatus, Track,
    TrackType,
};

use crate::client::YamClient;
use crate::config_ext::YamConfigExt;
use crate::models::YamTrack;

/// What a Yandex Music URL path points at
#[derive(Debug, PartialEq)]
enum YamUrlKind {
    /// `/album/{album}/track/{track}`
    AlbumTrack { album: String, track: String },
    /// `/album/{album}`
    Album(String),
    /// `/artist/{artist}`
    Artist(String),
    /// `/users/{user}/playlists/{kind}`
    UserPlaylist { user: String, kind: String },
    Unsupported,
}

fn classify_path(path: &str) -> YamUrlKind {
    let segments: Vec<&str> = path.split('/').collect();
    let segment = |i: usize| segments.get(i).copied().unwrap_or_default().to_string();

    if path.contains("/album/") && path.contains("/track/") && segments.len() > 4 {
        YamUrlKind::AlbumTrack {
            album: segment(2),
            track: segment(4),
        }
    } else if path.contains("/album/") && segments.len() > 2 {
        YamUrlKind::Album(segment(2))
    } else if path.contains("/artist/") && segments.len() > 2 {
        YamUrlKind::Artist(segment(2))
    } else if path.contains("users") && path.contains("playlist") && segments.len() > 4 {
        YamUrlKind::UserPlaylist {
            user: segment(2),
            kind: segment(4),
        }
    } else {
        YamUrlKind::Unsupported
    }
}

/// Search type parameter for a [`SearchKind`]
fn search_type_param(kind: SearchKind) -> &'static str {
    match kind {
        SearchKind::Default => "all",
        SearchKind::Tracks => "tracks",
        SearchKind::PodcastEpisodes => "podcast_episode",
    }
}

/// The Yandex Music backend
#[derive(Debug)]
pub struct YamService {
    status: ServiceStatus,
    token: String,
    client: OnceLock<YamClient>,
}

impl YamService {
    pub fn new(config: &Config) -> Self {
        Self {
            status: ServiceStatus::new(config.yam_enabled()),
            token: config.yam_token(),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&YamClient> {
        self.client
            .get()
            .ok_or_else(|| Error::service("Yandex Music service is not initialized"))
    }
}

/// API tracks to dynamic Aria tracks carrying only their identifier; the
/// MP3 URL is derived later through `prepare_track`
fn tracks_to_dynamic(service: &Arc<YamService>, yam_tracks: Vec<YamTrack>) -> Vec<Track> {
    let service: Arc<dyn MusicService> = service.clone();
    yam_tracks
        .into_iter()
        .filter_map(|yam_track| {
            let track_id = yam_track.track_id()?;
            let artists = yam_track
                .artists
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|artist| {
                    let name = artist.name.clone().unwrap_or_default();
                    match &artist.id {
                        Some(id) => Artist::with_id(
                            name,
                            id.as_str()
                                .map(str::to_string)
                                .unwrap_or_else(|| id.to_string()),
                            Some(service.clone()),
                        ),
                        None => Artist::new(name),
                    }
                })
                .collect();
            Some(Track::new(
                yam_track.title.clone().unwrap_or_default(),
                artists,
                "",
                Some(service.clone()),
                serde_json::json!({ "track_id": track_id }),
                "",
                TrackType::Dynamic,
            ))
        })
        .collect()
}

fn track_id_from_extra(extra_info: &serde_json::Value) -> Result<&str> {
    extra_info
        .get("track_id")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| Error::service("track carries no Yandex Music identifier"))
}

#[async_trait]
impl MusicService for YamService {
    fn key(&self) -> &'static str {
        "yam"
    }

    fn name(&self) -> &'static str {
        "Yandex Music"
    }

    fn hostnames(&self) -> &'static [&'static str] {
        &["music.yandex.ru"]
    }

    fn status(&self) -> &ServiceStatus {
        &self.status
    }

    async fn initialize(&self) -> Result<()> {
        debug!("Initializing Yandex Music service");
        let client =
            YamClient::new(&self.token).map_err(|err| Error::service(err.to_string()))?;
        let account_status = client.account_status().await.map_err(Error::from)?;

        let uid = account_status
            .account
            .as_ref()
            .and_then(|account| account.uid);
        if uid.is_none() {
            self.status.set_warning("Token is not provided");
        } else if !account_status
            .plus
            .as_ref()
            .and_then(|plus| plus.has_plus)
            .unwrap_or(false)
        {
            self.status.set_warning("You don't have Yandex Plus");
        }

        let _ = self.client.set(client);
        debug!("Yandex Music service has been initialized");
        Ok(())
    }

    async fn get_tracks(self: Arc<Self>, url: &str) -> Result<Vec<Track>> {
        let parsed = Url::parse(url)?;
        let client = self.client()?;

        let yam_tracks: Vec<YamTrack> = match classify_path(parsed.path()) {
            YamUrlKind::AlbumTrack { album, track } => {
                let tracks = client.tracks(&format!("{track}:{album}")).await?;
                tracks.into_iter().take(1).collect()
            }
            YamUrlKind::Album(album) => {
                let album = client.album_with_tracks(&album).await?;
                let volumes = album.volumes.unwrap_or_default();
                if volumes.first().map_or(true, |volume| volume.is_empty()) {
                    return Err(Error::service("album has no tracks"));
                }
                volumes.into_iter().flatten().collect()
            }
            YamUrlKind::Artist(artist) => client
                .artist_tracks(&artist)
                .await?
                .tracks
                .ok_or_else(|| Error::service("artist has no tracks"))?,
            YamUrlKind::UserPlaylist { user, kind } => client
                .user_playlist(&user, &kind)
                .await?
                .tracks
                .ok_or_else(|| Error::service("playlist has no tracks"))?
                .into_iter()
                .filter_map(|entry| entry.track)
                .collect(),
            YamUrlKind::Unsupported => {
                return Err(Error::service("this link is not supported"));
            }
        };

        Ok(tracks_to_dynamic(&self, yam_tracks))
    }

    async fn search(
        self: Arc<Self>,
        query: &str,
        kind: SearchKind,
        options: SearchOptions,
    ) -> Result<Vec<Track>> {
        let result = self
            .client()?
            .search(query, search_type_param(kind), options.nocorrect)
            .await?;

        let block = match kind {
            SearchKind::PodcastEpisodes => result.podcast_episodes,
            _ => result.tracks,
        };
        let yam_tracks = block
            .and_then(|block| block.results)
            .ok_or(Error::NothingFound)?;

        let tracks = tracks_to_dynamic(&self, yam_tracks);
        if tracks.is_empty() {
            return Err(Error::NothingFound);
        }
        Ok(tracks)
    }

    async fn prepare_track(&self, track: &Track) -> Result<Track> {
        let track_id = track_id_from_extra(&track.extra_info)?;
        let client = self.client()?;

        // Re-fetch to make sure the track still exists before signing.
        let yam_tracks = client.tracks(track_id).await?;
        if yam_tracks.is_empty() {
            return Err(Error::service(format!("track {track_id} is gone")));
        }
        let url = client.direct_link(track_id).await?;

        Ok(Track::new(
            track.title.clone(),
            track.artists.clone(),
            url,
            None,
            serde_json::Value::Null,
            "mp3",
            TrackType::Default,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariaconfig::Config as AriaConfig;

    fn service() -> Arc<YamService> {
        let dir = tempfile::tempdir().unwrap();
        let config = AriaConfig::load_config(dir.path().to_str().unwrap()).unwrap();
        Arc::new(YamService::new(&config))
    }

    #[test]
    fn album_track_paths_combine_both_ids() {
        assert_eq!(
            classify_path("/album/1193829/track/10994777"),
            YamUrlKind::AlbumTrack {
                album: "1193829".to_string(),
                track: "10994777".to_string()
            }
        );
    }

    #[test]
    fn album_artist_and_playlist_paths_are_recognized() {
        assert_eq!(
            classify_path("/album/1193829"),
            YamUrlKind::Album("1193829".to_string())
        );
        assert_eq!(
            classify_path("/artist/41052"),
            YamUrlKind::Artist("41052".to_string())
        );
        assert_eq!(
            classify_path("/users/some.login/playlists/3"),
            YamUrlKind::UserPlaylist {
                user: "some.login".to_string(),
                kind: "3".to_string()
            }
        );
    }

    #[test]
    fn other_paths_are_unsupported() {
        assert_eq!(classify_path("/home"), YamUrlKind::Unsupported);
        assert_eq!(classify_path("/"), YamUrlKind::Unsupported);
    }

    #[test]
    fn search_kinds_map_to_api_type_params() {
        assert_eq!(search_type_param(SearchKind::Default), "all");
        assert_eq!(search_type_param(SearchKind::Tracks), "tracks");
        assert_eq!(
            search_type_param(SearchKind::PodcastEpisodes),
            "podcast_episode"
        );
    }

    #[test]
    fn dynamic_tracks_carry_the_resolution_payload() {
        let service = service();
        let yam_track: YamTrack = serde_json::from_value(serde_json::json!({
            "id": 10994777,
            "title": "Song",
            "artists": [{"id": 41052, "name": "Somebody"}],
            "albums": [{"id": 1193829}]
        }))
        .unwrap();

        let tracks = tracks_to_dynamic(&service, vec![yam_track]);
        assert_eq!(tracks.len(), 1);

        let track = &tracks[0];
        assert_eq!(track.track_type, TrackType::Dynamic);
        assert_eq!(track.title, "Song");
        assert!(track.url.is_empty());
        assert_eq!(
            track_id_from_extra(&track.extra_info).unwrap(),
            "10994777:1193829"
        );
        assert_eq!(track.artists[0].name, "Somebody");
        assert_eq!(track.artists[0].id.as_deref(), Some("41052"));
        assert!(track.artists[0].service.is_some());
    }

    #[test]
    fn tracks_without_ids_are_dropped() {
        let service = service();
        let yam_track: YamTrack =
            serde_json::from_value(serde_json::json!({"title": "No id"})).unwrap();
        assert!(tracks_to_dynamic(&service, vec![yam_track]).is_empty());
    }

    #[test]
    fn missing_resolution_payload_is_a_service_error() {
        assert!(matches!(
            track_id_from_extra(&serde_json::Value::Null),
            Err(Error::Service(_))
        ));
    }
}
