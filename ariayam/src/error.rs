//! Error types for the Yandex Music client

/// Result type alias for Yandex Music client operations
pub type Result<T> = std::result::Result<T, YamError>;

/// Errors raised by the Yandex Music API client
#[derive(Debug, thiserror::Error)]
pub enum YamError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The token was rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The API answered with a non-success status
    #[error("Yandex Music API error: {0}")]
    Api(String),

    /// The download-info XML could not be parsed
    #[error("invalid download info: {0}")]
    DownloadInfo(String),

    /// The service was used before `initialize`
    #[error("Yandex Music service is not initialized")]
    NotInitialized,
}

impl From<YamError> for ariasource::Error {
    fn from(err: YamError) -> Self {
        match err {
            YamError::Unauthorized(message) => ariasource::Error::Login(message),
            YamError::Http(err) => ariasource::Error::Http(err),
            YamError::Api(message) | YamError::DownloadInfo(message) => {
                ariasource::Error::Service(message)
            }
            YamError::NotInitialized => {
                ariasource::Error::service("Yandex Music service is not initialized")
            }
        }
    }
}
