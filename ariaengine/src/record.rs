//! One-shot stream capture through a throwaway engine process

use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Capture `url` into `path` by playing it through a silent mpv instance
/// with `--stream-record`.
///
/// Used for sources that only expose segmented streams (HLS playlists)
/// where a plain HTTP fetch would download a playlist file instead of the
/// audio. Blocks until the stream ends; the null audio output runs
/// untimed, so a finite stream is captured much faster than realtime.
pub async fn record_stream(binary: &str, url: &str, path: &Path) -> EngineResult<()> {
    debug!(url, target = %path.display(), "Recording stream");
    let status = Command::new(binary)
        .arg("--no-terminal")
        .arg("--video=no")
        .arg("--ao=null")
        .arg("--ao-null-untimed=yes")
        .arg("--demuxer-lavf-o=http_persistent=false")
        .arg(format!("--stream-record={}", path.display()))
        .arg(url)
        .status()
        .await?;

    if !status.success() {
        return Err(EngineError::command(
            "stream-record",
            format!("engine exited with {status}"),
        ));
    }
    debug!(target = %path.display(), "Stream recorded");
    Ok(())
}
