use std::path::Path;

use tracing::{debug, info};

use crate::config::EncodingConfig;
use crate::error::{Result, VideoError};
use crate::video::ffmpeg::FfmpegTools;
use crate::video::probe::probe_video;
use crate::video::types::{ExtractedClip, SectionRange, VideoMetadata};

/// Geometry of one crop, checked against the source frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropPlan {
    pub x: u32,
    pub width: u32,
    pub height: u32,
    /// Target size when the band is rescaled to a common height
    pub scale_to: Option<(u32, u32)>,
}

impl CropPlan {
    /// Build a plan, refusing bands that run past the frame edge
    pub fn new(
        source: &VideoMetadata,
        section: SectionRange,
        common_height: Option<u32>,
    ) -> Result<Self> {
        if !section.fits_within(source.width) {
            return Err(VideoError::SectionOutOfBounds {
                path: source.path.display().to_string(),
                start: section.start,
                end: section.end,
                width: source.width,
            }
            .into());
        }

        let width = section.width();
        let scale_to = common_height
            .filter(|&h| h != source.height && source.height > 0)
            .map(|h| {
                let scaled = (width as f64 * h as f64 / source.height as f64).round() as u32;
                (scaled.max(1), h)
            });

        Ok(Self {
            x: section.start,
            width,
            height: source.height,
            scale_to,
        })
    }

    /// Frame size written to the intermediate file
    pub fn output_size(&self) -> (u32, u32) {
        self.scale_to.unwrap_or((self.width, self.height))
    }

    /// Video filter chain for this crop
    ///
    /// Going through 4:4:4 first keeps odd widths and offsets exact; the
    /// crop filter otherwise rounds them to the chroma grid.
    pub fn filter(&self) -> String {
        let mut filter = format!(
            "format=yuv444p,crop={}:{}:{}:0:exact=1",
            self.width, self.height, self.x
        );
        if let Some((w, h)) = self.scale_to {
            filter.push_str(&format!(",scale={}:{}", w, h));
        }
        filter
    }
}

/// Pixel format for an encoded frame of the given size
///
/// 4:2:0 needs even dimensions; anything else stays 4:4:4.
pub fn pixel_format_for(width: u32, height: u32, forced: Option<&str>) -> String {
    match forced {
        Some(format) => format.to_string(),
        None if width % 2 == 0 && height % 2 == 0 => "yuv420p".to_string(),
        None => "yuv444p".to_string(),
    }
}

/// Crops one input to one band and writes the band to disk
pub struct SectionExtractor {
    tools: FfmpegTools,
    encoding: EncodingConfig,
}

impl SectionExtractor {
    pub fn new(tools: FfmpegTools, encoding: EncodingConfig) -> Self {
        Self { tools, encoding }
    }

    /// Probe `input`, then crop it to `section` and write to `output`
    pub async fn extract(
        &self,
        index: usize,
        input: &Path,
        output: &Path,
        section: SectionRange,
        common_height: Option<u32>,
    ) -> Result<ExtractedClip> {
        info!("Extracting section {} from {:?}", section, input);

        let source = probe_video(&self.tools, input).await?;
        self.extract_probed(index, source, output, section, common_height)
            .await
    }

    /// Same as [`extract`](Self::extract) for an input that was already probed
    pub async fn extract_probed(
        &self,
        index: usize,
        source: VideoMetadata,
        output: &Path,
        section: SectionRange,
        common_height: Option<u32>,
    ) -> Result<ExtractedClip> {
        let plan = CropPlan::new(&source, section, common_height)?;
        debug!("Crop plan for {:?}: {:?}", source.path, plan);

        let args = self.build_args(&source, output, &plan);
        self.tools.run_ffmpeg(args).await?;

        let (width, height) = plan.output_size();
        info!("   Wrote {}x{} section to {:?}", width, height, output);

        Ok(ExtractedClip {
            index,
            path: output.to_path_buf(),
            section,
            source,
        })
    }

    fn build_args(&self, source: &VideoMetadata, output: &Path, plan: &CropPlan) -> Vec<String> {
        let (width, height) = plan.output_size();
        let pix_fmt = pixel_format_for(width, height, self.encoding.pixel_format.as_deref());

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-i".into(),
            source.path.display().to_string(),
            "-vf".into(),
            plan.filter(),
            "-c:v".into(),
            self.encoding.video_codec.clone(),
            "-pix_fmt".into(),
            pix_fmt,
            "-threads".into(),
            self.encoding.threads.to_string(),
        ];

        if source.has_audio {
            args.extend(["-c:a".into(), self.encoding.audio_codec.clone()]);
        } else {
            args.push("-an".into());
        }

        args.push(output.display().to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriptychError;
    use crate::video::types::FrameRate;
    use std::path::PathBuf;

    fn source(width: u32, height: u32) -> VideoMetadata {
        VideoMetadata {
            path: PathBuf::from("input/video2.mov"),
            duration: 10.0,
            frame_rate: FrameRate::new(30, 1),
            width,
            height,
            codec: "h264".to_string(),
            frame_count: Some(300),
            has_audio: false,
        }
    }

    #[test]
    fn test_crop_keeps_full_height() {
        let plan = CropPlan::new(&source(1280, 720), SectionRange::new(426, 853), None).unwrap();
        assert_eq!(plan.x, 426);
        assert_eq!(plan.output_size(), (427, 720));
        assert_eq!(plan.filter(), "format=yuv444p,crop=427:720:426:0:exact=1");
    }

    #[test]
    fn test_band_past_right_edge_fails() {
        let err = CropPlan::new(&source(1280, 720), SectionRange::new(853, 1281), None).unwrap_err();
        match err {
            TriptychError::Video(VideoError::SectionOutOfBounds { end, width, .. }) => {
                assert_eq!(end, 1281);
                assert_eq!(width, 1280);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_height_is_not_rescaled() {
        let plan = CropPlan::new(&source(1280, 720), SectionRange::new(0, 426), Some(720)).unwrap();
        assert_eq!(plan.scale_to, None);
    }

    #[test]
    fn test_rescale_to_common_height_keeps_aspect() {
        let plan = CropPlan::new(&source(1920, 1080), SectionRange::new(0, 640), Some(720)).unwrap();
        assert_eq!(plan.scale_to, Some((427, 720)));
        assert!(plan.filter().ends_with(",scale=427:720"));
    }

    #[test]
    fn test_pixel_format_selection() {
        assert_eq!(pixel_format_for(426, 720, None), "yuv420p");
        assert_eq!(pixel_format_for(427, 720, None), "yuv444p");
        assert_eq!(pixel_format_for(427, 720, Some("yuv422p")), "yuv422p");
    }

    #[test]
    fn test_args_drop_audio_when_source_is_silent() {
        let extractor = SectionExtractor::new(FfmpegTools::default(), EncodingConfig::default());
        let src = source(1280, 720);
        let plan = CropPlan::new(&src, SectionRange::new(853, 1280), None).unwrap();
        let args = extractor.build_args(&src, Path::new("section_video_2.mov"), &plan);

        assert!(args.contains(&"-an".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.first().map(String::as_str), Some("-y"));
        assert_eq!(args.last().map(String::as_str), Some("section_video_2.mov"));
    }

    #[tokio::test]
    async fn test_extract_missing_input() {
        let extractor = SectionExtractor::new(FfmpegTools::default(), EncodingConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("section_video_0.mov");

        let err = extractor
            .extract(0, Path::new("/no/such/video1.mov"), &output, SectionRange::new(0, 426), None)
            .await
            .unwrap_err();

        assert!(matches!(err, TriptychError::Video(VideoError::LoadFailed { .. })));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_extract_writes_exact_band() {
        let tools = FfmpegTools::default();
        if tools.check_available().is_err() {
            eprintln!("skipping: ffmpeg not available");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("video1.mov");
        let status = std::process::Command::new("ffmpeg")
            .args(["-y", "-loglevel", "error", "-f", "lavfi", "-i"])
            .arg("testsrc=size=320x120:rate=25:duration=1")
            .args(["-c:v", "mpeg4"])
            .arg(&input)
            .status()
            .unwrap();
        assert!(status.success());

        let mut encoding = EncodingConfig::default();
        encoding.video_codec = "mpeg4".to_string();
        encoding.pixel_format = Some("yuv420p".to_string());
        encoding.threads = 1;
        let extractor = SectionExtractor::new(tools.clone(), encoding);

        let output = dir.path().join("section_video_0.mov");
        let clip = extractor
            .extract(0, &input, &output, SectionRange::new(100, 260), None)
            .await
            .unwrap();

        assert_eq!(clip.source.width, 320);
        assert_eq!(clip.section, SectionRange::new(100, 260));
        let written = probe_video(&tools, &output).await.unwrap();
        assert_eq!((written.width, written.height), (160, 120));
    }

    #[test]
    fn test_args_keep_audio() {
        let extractor = SectionExtractor::new(FfmpegTools::default(), EncodingConfig::default());
        let mut src = source(1280, 720);
        src.has_audio = true;
        let plan = CropPlan::new(&src, SectionRange::new(0, 426), None).unwrap();
        let args = extractor.build_args(&src, Path::new("out.mov"), &plan);

        let pos = args.iter().position(|a| a == "-c:a").unwrap();
        assert_eq!(args[pos + 1], "aac");
    }
}
