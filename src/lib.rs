//! # Triptych Stitcher
//!
//! Crop vertical bands out of several source videos and stitch the bands
//! side-by-side into a single "triptych" video.
//!
//! All decoding and encoding is done by the external `ffmpeg` and `ffprobe`
//! programs; this crate plans the crops, normalizes durations and drives the
//! tools in sequence.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use triptych_stitcher::{config::Config, composition::TriptychEngine};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let output = TriptychEngine::new(config).run().await?;
//! println!("{}x{} for {:.2}s", output.width, output.height, output.duration);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`video`] - Probing, section extraction, duration normalization, row composition
//! - [`composition`] - The engine that runs the pipeline end to end
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! ## Section layouts
//!
//! Bands are plain pixel ranges and are applied positionally, range *i* to
//! input *i*. Two named layouts for 1280px sources are built in:
//!
//! ```rust
//! use triptych_stitcher::video::{expected_width, SectionPreset};
//!
//! let floor = SectionPreset::Floor.ranges();
//! assert_eq!(floor[1].end, 853);
//! assert_eq!(expected_width(&floor), 1280);
//! ```

pub mod composition;
pub mod config;
pub mod error;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::TriptychEngine,
    config::Config,
    error::{Result, TriptychError},
    video::{ComposedOutput, SectionPreset, SectionRange},
};
