//! Error types for playback control

use ariaengine::EngineError;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the player state machine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Already at the end of the track list
    #[error("no next track")]
    NoNextTrack,

    /// Already at the beginning of the track list
    #[error("no previous track")]
    NoPreviousTrack,

    /// Index outside the current track list
    #[error("incorrect track index")]
    IncorrectTrackIndex,

    /// Negative playback position
    #[error("incorrect position")]
    IncorrectPosition,

    /// Out-of-range speed, step or similar input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Track resolution through the owning service failed
    #[error(transparent)]
    Source(#[from] ariasource::Error),

    /// The underlying engine failed
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}
