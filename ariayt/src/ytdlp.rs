//! Thin wrapper around the `yt-dlp` binary

use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, YtError};

/// Audio-first format selection, matching what the player can stream
pub const FORMAT_SELECTION: &str = "m4a/bestaudio/best";

const SOCKET_TIMEOUT_SECS: u32 = 5;

/// Runs `yt-dlp` and parses its JSON dumps
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn dump_json(&self, extra_args: &[&str], target: &str) -> Result<Value> {
        debug!(target, "Running yt-dlp");
        let output = Command::new(&self.binary)
            .arg("-J")
            .arg("--no-warnings")
            .arg("--socket-timeout")
            .arg(SOCKET_TIMEOUT_SECS.to_string())
            .args(extra_args)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.lines().last().unwrap_or("unknown error");
            return Err(YtError::Extractor(reason.to_string()));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    /// Fast extraction: playlists stay flat, no format resolution
    pub async fn extract_flat(&self, target: &str) -> Result<Value> {
        self.dump_json(&["--flat-playlist"], target).await
    }

    /// Full extraction with audio format selection; yields a playable URL
    pub async fn extract_full(&self, target: &str) -> Result<Value> {
        self.dump_json(&["-f", FORMAT_SELECTION], target).await
    }
}
