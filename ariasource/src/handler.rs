//! Dispatches an input URL to the backend claiming its hostname

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::manager::ServiceManager;
use crate::track::{Track, TrackType};

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "rtmp", "rtsp"];

/// Routes a URL to the first service whose hostnames claim it, or to the
/// manager's fallback service, degrading to direct playback when even the
/// fallback cannot make sense of it.
pub struct UrlHandler {
    manager: Arc<ServiceManager>,
}

impl UrlHandler {
    pub fn new(manager: Arc<ServiceManager>) -> Self {
        Self { manager }
    }

    /// Resolve `url` into a track list.
    ///
    /// Services are tried in registration order; the first one whose
    /// hostnames contain the URL's hostname wins, or the fallback service
    /// once iteration reaches it. A service-level error moves on to the
    /// next candidate; an unexpected error on the fallback returns the
    /// raw-URL placeholder instead. A single resolved track whose URL
    /// merely extends the input URL means the backend resolved nothing
    /// new, so the placeholder is returned as well.
    pub async fn get_tracks(&self, url: &str) -> Result<Vec<Track>> {
        let parsed =
            Url::parse(url).map_err(|_| Error::IncorrectProtocol(url.to_string()))?;
        if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
            return Err(Error::IncorrectProtocol(parsed.scheme().to_string()));
        }

        let placeholder = Track::direct(url);
        let hostname = parsed.host_str().unwrap_or_default();

        let mut fetched = vec![placeholder.clone()];
        for (key, service) in self.manager.services() {
            let is_fallback = key == self.manager.fallback_key();
            if !service.hostnames().contains(&hostname) && !is_fallback {
                continue;
            }
            match service.clone().get_tracks(url).await {
                Ok(tracks) => {
                    fetched = tracks;
                    break;
                }
                Err(err) if err.is_service_error() => {
                    debug!(service = key, error = %err, "Service could not resolve URL");
                    continue;
                }
                Err(err) => {
                    warn!(service = key, error = %err, "Unexpected resolution error");
                    if is_fallback {
                        return Ok(vec![placeholder]);
                    }
                }
            }
        }

        if fetched.len() == 1 && fetched[0].url.starts_with(&placeholder.url) {
            Ok(vec![placeholder])
        } else {
            Ok(fetched)
        }
    }
}
