//! Error types for the playback engine layer

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors raised by the playback engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Spawning or talking to the engine process failed
    #[error("engine IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A protocol message could not be encoded or decoded
    #[error("engine protocol error: {0}")]
    Json(#[from] serde_json::Error),

    /// The IPC channel is gone (engine exited, reader task dropped)
    #[error("engine IPC channel closed: {0}")]
    Ipc(String),

    /// The engine rejected a command
    #[error("engine command '{command}' failed: {message}")]
    Command { command: String, message: String },

    /// A property has no value right now (e.g. position while idle)
    #[error("engine property unavailable: {0}")]
    PropertyUnavailable(String),

    /// The engine did not answer in time
    #[error("engine request timed out")]
    Timeout,
}

impl EngineError {
    pub fn ipc(msg: impl Into<String>) -> Self {
        Self::Ipc(msg.into())
    }

    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }
}
