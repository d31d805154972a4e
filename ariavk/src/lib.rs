//! # AriaVK
//!
//! VK audio backend for Aria.
//!
//! A thin REST client for the VK audio API (token-authenticated, mobile
//! client fingerprint) plus the [`VkService`] implementation of
//! `ariasource::MusicService`: URL resolution for album, audio and
//! profile/community links, free-text search, and an HLS-aware download
//! path.

pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;
pub mod source;

pub use client::VkClient;
pub use config_ext::VkConfigExt;
pub use error::VkError;
pub use source::VkService;
