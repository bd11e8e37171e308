//! # Video Processing Module
//!
//! Probing, band extraction, duration normalization and row composition,
//! all carried out by the external `ffmpeg`/`ffprobe` tools.

pub mod composer;
pub mod extractor;
pub mod ffmpeg;
pub mod normalizer;
pub mod probe;
pub mod types;

pub use composer::{build_filter_graph, ArrayComposer, FilterGraph};
pub use extractor::{CropPlan, SectionExtractor};
pub use ffmpeg::FfmpegTools;
pub use normalizer::DurationNormalizer;
pub use probe::probe_video;
pub use types::{
    expected_frame_count, expected_width, ComposedOutput, ExtractedClip, FrameRate,
    NormalizedClip, SectionPreset, SectionRange, VideoMetadata,
};
