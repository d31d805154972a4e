//! # AriaPlayer
//!
//! The playback state machine on top of an [`ariaengine::AudioEngine`].
//!
//! [`Player`] owns the engine handle exclusively, the current track list,
//! the playback mode axis (single track, repeat, track list, repeat list,
//! random) and the target volume. Engine events (end-of-file, metadata
//! changes) are funneled through a channel consumed by a single task, so
//! state transitions from the engine and from caller commands serialize
//! on the same lock and never race.

pub mod config_ext;
pub mod error;
pub mod metadata;
pub mod player;
pub mod state;

pub use config_ext::{PlayerConfigExt, PlayerSettings};
pub use error::{Error, Result};
pub use player::Player;
pub use state::{Mode, State};
