//! Direct-link derivation for Yandex Music downloads
//!
//! The storage host hands out the real MP3 only when the request path
//! carries an MD5 signature over a fixed salt, the storage path and the
//! per-request secret from the download-info XML.

use md5::{Digest, Md5};

use crate::models::DownloadInfoXml;

const SIGN_SALT: &str = "XGRlBW9FXlekgbPrRHuSiA";

/// Builds the signed `get-mp3` URL from a parsed download-info payload
pub fn direct_link(info: &DownloadInfoXml) -> String {
    // The first character of the storage path is excluded from the hash.
    let hashed_path = info.path.strip_prefix('/').unwrap_or(&info.path);

    let mut hasher = Md5::new();
    hasher.update(SIGN_SALT.as_bytes());
    hasher.update(hashed_path.as_bytes());
    hasher.update(info.s.as_bytes());
    let sign = hex::encode(hasher.finalize());

    format!("https://{}/get-mp3/{}/{}{}", info.host, sign, info.ts, info.path)
}
