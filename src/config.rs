use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    video::{FfmpegTools, SectionPreset, SectionRange},
};

/// Main configuration for the triptych stitcher
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input, output and intermediate file locations
    pub pipeline: PipelineConfig,

    /// Crop bands, applied positionally to the inputs
    pub sections: SectionsConfig,

    /// Encoder settings shared by extraction and composition
    pub encoding: EncodingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;
        Ok(content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        self.sections.validate(self.pipeline.inputs.len())?;
        self.encoding.validate()?;
        Ok(())
    }

    pub fn tools(&self) -> FfmpegTools {
        FfmpegTools::new(&self.encoding.ffmpeg_path, &self.encoding.ffprobe_path)
    }
}

/// File locations for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source videos, in left-to-right order
    pub inputs: Vec<PathBuf>,

    /// Final triptych file
    pub output: PathBuf,

    /// Directory for the per-section intermediate files
    pub intermediate_dir: PathBuf,

    pub intermediate_prefix: String,

    pub intermediate_extension: String,

    /// Leave the per-section files on disk after composing
    pub keep_intermediates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inputs: vec![
                PathBuf::from("input/video1.mov"),
                PathBuf::from("input/video2.mov"),
                PathBuf::from("input/video3.mov"),
            ],
            output: PathBuf::from("output/triptych_output.mov"),
            intermediate_dir: PathBuf::from("."),
            intermediate_prefix: "section_video_".to_string(),
            intermediate_extension: "mov".to_string(),
            keep_intermediates: true,
        }
    }
}

impl PipelineConfig {
    /// Positional path of the intermediate file for input `index`
    pub fn intermediate_path(&self, index: usize) -> PathBuf {
        self.intermediate_dir.join(format!(
            "{}{}.{}",
            self.intermediate_prefix, index, self.intermediate_extension
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(ConfigError::MissingKey {
                key: "pipeline.inputs".to_string(),
            }
            .into());
        }

        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::MissingKey {
                key: "pipeline.output".to_string(),
            }
            .into());
        }

        if self.intermediate_extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.intermediate_extension".to_string(),
                value: String::new(),
            }
            .into());
        }

        Ok(())
    }
}

/// Crop band configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionsConfig {
    /// Named boundary set; takes precedence over `ranges` when set
    pub preset: Option<SectionPreset>,

    /// Explicit bands, one per input
    pub ranges: Vec<SectionRange>,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            preset: None,
            ranges: SectionPreset::Floor.ranges(),
        }
    }
}

impl SectionsConfig {
    /// The bands that will actually be applied
    pub fn resolved(&self) -> Vec<SectionRange> {
        match self.preset {
            Some(preset) => preset.ranges(),
            None => self.ranges.clone(),
        }
    }

    fn validate(&self, input_count: usize) -> Result<()> {
        let ranges = self.resolved();

        if ranges.len() != input_count {
            return Err(ConfigError::InvalidValue {
                key: "sections.ranges".to_string(),
                value: format!("{} ranges for {} inputs", ranges.len(), input_count),
            }
            .into());
        }

        // Bounds against the real frame width are checked at extraction time
        for (i, range) in ranges.iter().enumerate() {
            if range.start >= range.end {
                return Err(ConfigError::InvalidValue {
                    key: format!("sections.ranges[{}]", i),
                    value: range.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// How the composed output's audio track is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    /// Mix the audio of every clip that has some
    Mix,
    /// Use the audio of the first clip that has some
    First,
    /// Write a silent output
    None,
}

/// Encoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub video_codec: String,

    pub audio_codec: String,

    pub audio: AudioMode,

    /// Scale every band to the first input's height after cropping
    pub resize_to_common_height: bool,

    /// Forces a pixel format instead of picking one from the frame size
    pub pixel_format: Option<String>,

    /// Encoder threads handed to ffmpeg
    pub threads: usize,

    pub ffmpeg_path: PathBuf,

    pub ffprobe_path: PathBuf,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            audio: AudioMode::Mix,
            resize_to_common_height: true,
            pixel_format: None,
            threads: num_cpus::get(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
        }
    }
}

impl EncodingConfig {
    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("encoding.video_codec", &self.video_codec),
            ("encoding.audio_codec", &self.audio_codec),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                }
                .into());
            }
        }

        if self.threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "encoding.threads".to_string(),
                value: self.threads.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.inputs.len(), 3);
        assert_eq!(config.sections.resolved(), SectionPreset::Floor.ranges());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("triptych.toml");

        let mut original = Config::default();
        original.sections.preset = Some(SectionPreset::Rounded);
        original.encoding.audio = AudioMode::First;

        original.save_to_file(&file_path).unwrap();
        let loaded = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded.pipeline.inputs, original.pipeline.inputs);
        assert_eq!(loaded.sections.preset, Some(SectionPreset::Rounded));
        assert_eq!(loaded.encoding.audio, AudioMode::First);
        assert_eq!(loaded.encoding.threads, original.encoding.threads);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(
            &file_path,
            r#"
[sections]
ranges = [{ start = 0, end = 100 }, { start = 100, end = 250 }, { start = 300, end = 310 }]

[encoding]
resize_to_common_height = false
"#,
        )
        .unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.sections.resolved()[2], SectionRange::new(300, 310));
        assert!(!config.encoding.resize_to_common_height);
        assert_eq!(config.encoding.video_codec, "libx264");
        assert_eq!(config.pipeline.output, PathBuf::from("output/triptych_output.mov"));
    }

    #[test]
    fn test_preset_overrides_ranges() {
        let mut sections = SectionsConfig::default();
        sections.ranges = vec![SectionRange::new(0, 1)];
        sections.preset = Some(SectionPreset::Rounded);
        assert_eq!(sections.resolved(), SectionPreset::Rounded.ranges());
    }

    #[test]
    fn test_mismatched_section_count() {
        let mut config = Config::default();
        config.pipeline.inputs.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_section_rejected() {
        let mut config = Config::default();
        config.sections.ranges[1] = SectionRange::new(500, 500);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let mut config = Config::default();
        config.encoding.threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::from_file("/no/such/triptych.toml").is_err());
    }

    #[test]
    fn test_intermediate_paths_are_positional() {
        let pipeline = PipelineConfig::default();
        assert_eq!(pipeline.intermediate_path(0), PathBuf::from("./section_video_0.mov"));
        assert_eq!(pipeline.intermediate_path(2), PathBuf::from("./section_video_2.mov"));
    }
}
