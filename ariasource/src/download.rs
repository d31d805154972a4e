//! Generic HTTP file fetch used by services without a dedicated
//! download path

use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::Result;

/// Stream `url` into `path`.
///
/// This is the default byte transfer behind
/// [`crate::MusicService::download`]; services override it only when the
/// backend needs something other than a plain HTTP GET.
pub async fn download_file(url: &str, path: &Path) -> Result<()> {
    debug!(url, path = %path.display(), "Downloading file");
    let response = reqwest::get(url).await?.error_for_status()?;

    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    debug!(path = %path.display(), "Download finished");
    Ok(())
}
