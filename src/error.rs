use thiserror::Error;

/// Main error type for the triptych stitcher
#[derive(Error, Debug)]
pub enum TriptychError {
    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while probing, cropping or encoding a single video
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to load video file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to probe {path}: {reason}")]
    ProbeFailed { path: String, reason: String },

    #[error("Section {start}..{end} exceeds the {width}px frame width of {path}")]
    SectionOutOfBounds {
        path: String,
        start: u32,
        end: u32,
        width: u32,
    },

    #[error("External tool not available: {tool}")]
    ToolUnavailable { tool: String },

    #[error("{tool} exited with status {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("Failed to run {tool}: {reason}")]
    SpawnFailed { tool: String, reason: String },
}

/// Errors raised while normalizing or composing the row of clips
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("No clips to compose")]
    NoClips,

    #[error("Cannot determine a common duration: {reason}")]
    DurationUnavailable { reason: String },

    #[error("Output generation failed: {reason}")]
    OutputFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using TriptychError
pub type Result<T> = std::result::Result<T, TriptychError>;

impl TriptychError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Video(VideoError::LoadFailed { path }) => {
                format!("Could not load video file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Video(VideoError::ToolUnavailable { tool }) => {
                format!("'{}' was not found. Install FFmpeg or point the configuration at its binaries.", tool)
            }
            Self::Video(VideoError::SectionOutOfBounds { path, end, width, .. }) => {
                format!("Section end {}px is past the right edge of '{}' ({}px wide).", end, path, width)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
