//! # AriaEngine
//!
//! The playback engine contract and its mpv implementation.
//!
//! The [`AudioEngine`] trait is everything the player layer knows about
//! the underlying media engine: transport controls, property access, and
//! a broadcast stream of [`EngineEvent`]s (end-of-file, metadata
//! changes). The production implementation, [`MpvEngine`], spawns an mpv
//! process and speaks its newline-delimited JSON IPC protocol over a Unix
//! socket.
//!
//! [`record_stream`] is a one-shot capture helper used to rip stream URLs
//! (e.g. HLS playlists) to a file through a throwaway mpv process.

pub mod error;
pub mod mpv;
pub mod record;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::broadcast;

pub use error::{EngineError, EngineResult};
pub use mpv::MpvEngine;
pub use record::record_stream;

/// Seek reference point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    Relative,
    Absolute,
}

/// Events pushed by the engine's own worker thread
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The current file finished or playback was aborted
    EndOfFile,
    /// Stream metadata or the media title changed
    MetadataChanged,
}

/// Kind of an audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundDeviceType {
    Output,
    Input,
}

/// An audio device as enumerated by the engine
#[derive(Debug, Clone)]
pub struct SoundDevice {
    /// Engine-internal device identifier
    pub id: String,
    /// Human-readable description
    pub description: String,
    pub device_type: SoundDeviceType,
}

/// The playback engine as seen by the player layer.
///
/// All engine specifics (construction options, wire protocol, error
/// details) stay behind this trait; the player only issues transport
/// commands, reads properties, and consumes [`EngineEvent`]s.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Start playing `url`, replacing whatever is loaded
    async fn play(&self, url: &str) -> EngineResult<()>;

    /// Stop playback and unload the current file
    async fn stop(&self) -> EngineResult<()>;

    async fn set_pause(&self, paused: bool) -> EngineResult<()>;

    async fn is_paused(&self) -> EngineResult<bool>;

    /// Whether the engine has nothing loaded
    async fn is_idle(&self) -> EngineResult<bool>;

    async fn seek(&self, target: f64, mode: SeekMode) -> EngineResult<()>;

    /// Playback position in seconds
    async fn position(&self) -> EngineResult<f64>;

    /// Duration of the current file in seconds
    async fn duration(&self) -> EngineResult<f64>;

    async fn speed(&self) -> EngineResult<f64>;

    async fn set_speed(&self, speed: f64) -> EngineResult<()>;

    async fn volume(&self) -> EngineResult<f64>;

    async fn set_volume(&self, volume: f64) -> EngineResult<()>;

    /// Current stream metadata as exposed by the demuxer
    async fn metadata(&self) -> EngineResult<HashMap<String, String>>;

    /// Engine's display title for the current stream
    async fn media_title(&self) -> EngineResult<Option<String>>;

    async fn output_devices(&self) -> EngineResult<Vec<SoundDevice>>;

    async fn set_output_device(&self, device_id: &str) -> EngineResult<()>;

    /// Subscribe to engine events
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;

    /// Terminate the engine process and release resources
    async fn shutdown(&self) -> EngineResult<()>;
}
