//! # AriaYam
//!
//! Yandex Music backend for Aria.
//!
//! A thin REST client for the Yandex Music API (OAuth-token
//! authenticated) plus the [`YamService`] implementation of
//! `ariasource::MusicService`. Resolved tracks are dynamic: the list
//! operations only carry track identifiers, and the real MP3 URL is
//! derived on demand from the download-info XML with the classic MD5
//! signing scheme.

pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;
pub mod signing;
pub mod source;

pub use client::YamClient;
pub use config_ext::YamConfigExt;
pub use error::YamError;
pub use source::YamService;
