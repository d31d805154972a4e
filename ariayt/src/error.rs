//! Error types for the yt-dlp wrapper

/// Result type alias for extractor operations
pub type Result<T> = std::result::Result<T, YtError>;

/// Errors raised by the yt-dlp wrapper
#[derive(Debug, thiserror::Error)]
pub enum YtError {
    /// The extractor binary could not be started
    #[error("failed to run yt-dlp: {0}")]
    Io(#[from] std::io::Error),

    /// The extractor exited with an error
    #[error("yt-dlp failed: {0}")]
    Extractor(String),

    /// The extractor output was not the JSON we expect
    #[error("unexpected yt-dlp output: {0}")]
    Json(#[from] serde_json::Error),

    /// The info JSON lacks a required field
    #[error("yt-dlp info is missing '{0}'")]
    MissingField(&'static str),
}

impl From<YtError> for ariasource::Error {
    fn from(err: YtError) -> Self {
        match err {
            YtError::Io(err) => ariasource::Error::Io(err),
            other => ariasource::Error::Service(other.to_string()),
        }
    }
}
