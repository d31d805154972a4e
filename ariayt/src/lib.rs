//! # AriaYt
//!
//! YouTube backend for Aria, built on the `yt-dlp` extractor.
//!
//! Extraction runs the `yt-dlp` binary with JSON output; the service
//! never talks to YouTube itself. URL resolution and search both produce
//! dynamic tracks carrying the extractor's info JSON, and the real audio
//! URL is extracted on demand in `prepare_track`.

pub mod config_ext;
pub mod error;
pub mod source;
pub mod ytdlp;

pub use config_ext::YtConfigExt;
pub use error::YtError;
pub use source::YtService;
pub use ytdlp::YtDlp;
