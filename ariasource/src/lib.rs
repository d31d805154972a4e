//! # AriaSource
//!
//! Common traits and types for Aria music services.
//!
//! This crate provides the foundational abstractions shared by the
//! streaming backends (VK, Yandex Music, YouTube):
//!
//! - **Track model**: [`Track`], [`Artist`] and [`Playlist`] value types,
//!   including the two-phase resolution contract for dynamic tracks.
//! - **Service contract**: the [`MusicService`] capability trait
//!   implemented by every backend.
//! - **Service manager**: [`ServiceManager`] owns the backend instances,
//!   tracks which are enabled, and selects the current/fallback service.
//! - **URL dispatch**: [`UrlHandler`] routes an input URL to the backend
//!   that claims its hostname, degrading to direct playback when nothing
//!   matches.
//!
//! Backends live in their own crates (`ariavk`, `ariayam`, `ariayt`) and
//! only depend on this one.

pub mod artist;
pub mod download;
pub mod error;
pub mod handler;
pub mod manager;
pub mod playlist;
pub mod service;
pub mod track;
pub mod utils;

pub use artist::Artist;
pub use error::{Error, Result};
pub use handler::UrlHandler;
pub use manager::ServiceManager;
pub use playlist::Playlist;
pub use service::{MusicService, SearchKind, SearchOptions, ServiceStatus};
pub use track::{Track, TrackType};
pub use utils::clean_file_name;

#[cfg(test)]
pub(crate) mod testing;
