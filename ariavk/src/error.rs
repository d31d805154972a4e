//! Error types for the VK client

/// Result type alias for VK client operations
pub type Result<T> = std::result::Result<T, VkError>;

/// VK authorization failures carry this API error code
const AUTH_ERROR_CODE: i64 = 5;

/// Errors raised by the VK API client
#[derive(Debug, thiserror::Error)]
pub enum VkError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error payload
    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },

    /// The service was used before `initialize`
    #[error("VK service is not initialized")]
    NotInitialized,
}

impl From<VkError> for ariasource::Error {
    fn from(err: VkError) -> Self {
        match err {
            VkError::Api { code, message } if code == AUTH_ERROR_CODE => {
                ariasource::Error::Login(message)
            }
            VkError::Api { code, message } => {
                ariasource::Error::Service(format!("VK API error {code}: {message}"))
            }
            VkError::Http(err) => ariasource::Error::Http(err),
            VkError::NotInitialized => ariasource::Error::service("VK service is not initialized"),
        }
    }
}
