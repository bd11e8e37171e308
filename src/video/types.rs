use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A vertical crop band, `start..end` in horizontal pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRange {
    pub start: u32,
    pub end: u32,
}

impl SectionRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Width of the band in pixels (zero for an inverted range)
    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the band fits inside a frame of the given width
    pub fn fits_within(&self, frame_width: u32) -> bool {
        self.start < self.end && self.end <= frame_width
    }
}

impl fmt::Display for SectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Named boundary sets for splitting a 1280px frame into thirds
///
/// The two historical layouts disagree on where the middle band ends, so
/// both are kept selectable rather than picking one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SectionPreset {
    /// `0..426, 426..853, 853..1280`
    Floor,
    /// `0..426, 426..854, 854..1280`
    Rounded,
}

impl SectionPreset {
    pub fn ranges(&self) -> Vec<SectionRange> {
        match self {
            Self::Floor => vec![
                SectionRange::new(0, 426),
                SectionRange::new(426, 853),
                SectionRange::new(853, 1280),
            ],
            Self::Rounded => vec![
                SectionRange::new(0, 426),
                SectionRange::new(426, 854),
                SectionRange::new(854, 1280),
            ],
        }
    }
}

/// Total width of a row built from the given bands
pub fn expected_width(ranges: &[SectionRange]) -> u32 {
    ranges.iter().map(SectionRange::width).sum()
}

/// Number of frames a clip of `duration` seconds holds at `frame_rate`
pub fn expected_frame_count(duration: f64, frame_rate: FrameRate) -> u64 {
    (duration * frame_rate.as_f64()).round().max(0.0) as u64
}

/// Rational frame rate as reported by ffprobe (`30000/1001`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    pub fn as_f64(&self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            self.num as f64 / self.den as f64
        }
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for FrameRate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((num, den)) => (num, den),
            None => (s, "1"),
        };

        let num = num
            .parse::<u32>()
            .map_err(|e| format!("invalid frame rate numerator '{}': {}", num, e))?;
        let den = den
            .parse::<u32>()
            .map_err(|e| format!("invalid frame rate denominator '{}': {}", den, e))?;

        if num == 0 || den == 0 {
            return Err(format!("degenerate frame rate '{}'", s));
        }

        Ok(Self { num, den })
    }
}

/// Properties of a video file read back from the file itself
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub path: PathBuf,
    /// Duration in seconds
    pub duration: f64,
    pub frame_rate: FrameRate,
    pub width: u32,
    pub height: u32,
    pub codec: String,
    /// Frame count from the container, when it records one
    pub frame_count: Option<u64>,
    pub has_audio: bool,
}

/// One input cropped to one section range, on disk
#[derive(Debug, Clone)]
pub struct ExtractedClip {
    /// Position of the source in the input list
    pub index: usize,
    pub path: PathBuf,
    pub section: SectionRange,
    /// Metadata of the original input, not of the intermediate file
    pub source: VideoMetadata,
}

/// An extracted clip reloaded and truncated to the common duration
#[derive(Debug, Clone)]
pub struct NormalizedClip {
    pub index: usize,
    pub path: PathBuf,
    /// Truncation duration in seconds
    pub duration: f64,
    /// Metadata of the intermediate file
    pub metadata: VideoMetadata,
}

impl NormalizedClip {
    pub fn frame_rate(&self) -> FrameRate {
        self.metadata.frame_rate
    }

    pub fn has_audio(&self) -> bool {
        self.metadata.has_audio
    }
}

/// The rendered triptych, as probed after encoding
#[derive(Debug, Clone)]
pub struct ComposedOutput {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub frame_rate: FrameRate,
    pub frame_count: u64,
    pub file_size: u64,
}
