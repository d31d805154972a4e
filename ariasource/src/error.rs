//! Error types shared by the music services and the URL dispatch layer

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the service layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backend-level failure: auth, connectivity, unsupported link
    #[error("service error: {0}")]
    Service(String),

    /// A query or URL resolution produced zero usable results
    #[error("nothing found")]
    NothingFound,

    /// Authentication against a backend failed
    #[error("login failed: {0}")]
    Login(String),

    /// The requested service key is not registered
    #[error("service not found: {0}")]
    ServiceNotFound(String),

    /// The requested service is disabled
    #[error("service is disabled: {0}")]
    ServiceIsDisabled(String),

    /// The URL scheme is not playable
    #[error("unsupported protocol: {0}")]
    IncorrectProtocol(String),

    /// A download target directory does not exist
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// The operation is not supported by this service
    #[error("not supported")]
    NotSupported,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a service-level error from a message
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Create a generic error from a message
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// True for failures a backend reports about itself (auth,
    /// connectivity, unsupported link, empty result). The dispatch and
    /// degrade policies of [`crate::UrlHandler`] and
    /// [`crate::ServiceManager`] key off this classification; anything
    /// else is treated as unexpected.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            Self::Service(_) | Self::NothingFound | Self::Login(_) | Self::ServiceIsDisabled(_)
        )
    }
}
