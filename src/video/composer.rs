use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{AudioMode, EncodingConfig};
use crate::error::{CompositionError, Result};
use crate::video::extractor::pixel_format_for;
use crate::video::ffmpeg::FfmpegTools;
use crate::video::probe::probe_video;
use crate::video::types::{expected_frame_count, ComposedOutput, NormalizedClip};

/// `filter_complex` graph plus the labels to map into the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGraph {
    pub graph: String,
    pub video_label: String,
    pub audio_label: Option<String>,
}

/// Build the graph that trims each clip and lays the clips out in one row
pub fn build_filter_graph(clips: &[NormalizedClip], audio: AudioMode) -> Result<FilterGraph> {
    if clips.is_empty() {
        return Err(CompositionError::NoClips.into());
    }

    let mut chains = Vec::new();

    for (i, clip) in clips.iter().enumerate() {
        chains.push(format!(
            "[{i}:v]trim=duration={:.6},setpts=PTS-STARTPTS[v{i}]",
            clip.duration
        ));
    }

    let video_label = if clips.len() == 1 {
        "v0".to_string()
    } else {
        let pads: String = (0..clips.len()).map(|i| format!("[v{i}]")).collect();
        chains.push(format!("{pads}hstack=inputs={}[vout]", clips.len()));
        "vout".to_string()
    };

    let with_audio: Vec<usize> = clips
        .iter()
        .enumerate()
        .filter(|(_, clip)| clip.has_audio())
        .map(|(i, _)| i)
        .collect();

    let audio_sources: &[usize] = match audio {
        AudioMode::None => &[],
        AudioMode::First => &with_audio[..with_audio.len().min(1)],
        AudioMode::Mix => &with_audio,
    };

    let audio_label = match audio_sources {
        [] => None,
        [single] => {
            chains.push(format!(
                "[{single}:a]atrim=duration={:.6},asetpts=PTS-STARTPTS[aout]",
                clips[*single].duration
            ));
            Some("aout".to_string())
        }
        many => {
            for &i in many {
                chains.push(format!(
                    "[{i}:a]atrim=duration={:.6},asetpts=PTS-STARTPTS[a{i}]",
                    clips[i].duration
                ));
            }
            let pads: String = many.iter().map(|i| format!("[a{i}]")).collect();
            chains.push(format!(
                "{pads}amix=inputs={}:duration=longest:normalize=0[aout]",
                many.len()
            ));
            Some("aout".to_string())
        }
    };

    Ok(FilterGraph {
        graph: chains.join(";"),
        video_label,
        audio_label,
    })
}

/// Stacks normalized clips horizontally into the final file
pub struct ArrayComposer {
    tools: FfmpegTools,
    encoding: EncodingConfig,
}

impl ArrayComposer {
    pub fn new(tools: FfmpegTools, encoding: EncodingConfig) -> Self {
        Self { tools, encoding }
    }

    /// Render `clips` left to right into `output` at the first clip's frame rate
    pub async fn compose(&self, clips: &[NormalizedClip], output: &Path) -> Result<ComposedOutput> {
        let args = self.build_args(clips, output)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!("Composing {} clips into {:?}", clips.len(), output);
        self.tools.run_ffmpeg(args).await?;

        let metadata = probe_video(&self.tools, output).await.map_err(|e| {
            CompositionError::OutputFailed {
                reason: format!("could not read back {}: {}", output.display(), e),
            }
        })?;
        let file_size = tokio::fs::metadata(output).await?.len();

        let frame_count = metadata
            .frame_count
            .unwrap_or_else(|| expected_frame_count(metadata.duration, metadata.frame_rate));

        let composed = ComposedOutput {
            path: output.to_path_buf(),
            width: metadata.width,
            height: metadata.height,
            duration: metadata.duration,
            frame_rate: metadata.frame_rate,
            frame_count,
            file_size,
        };
        debug!("Composed output: {:?}", composed);
        Ok(composed)
    }

    fn build_args(&self, clips: &[NormalizedClip], output: &Path) -> Result<Vec<String>> {
        let graph = build_filter_graph(clips, self.encoding.audio)?;
        let first = &clips[0];

        if clips
            .iter()
            .any(|c| c.metadata.height != first.metadata.height)
        {
            warn!("Clips differ in height; hstack will refuse to stack them");
        }

        let width: u32 = clips.iter().map(|c| c.metadata.width).sum();
        let height = first.metadata.height;
        let pix_fmt = pixel_format_for(width, height, self.encoding.pixel_format.as_deref());

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
        ];
        for clip in clips {
            args.extend(["-i".into(), clip.path.display().to_string()]);
        }

        args.extend([
            "-filter_complex".into(),
            graph.graph,
            "-map".into(),
            format!("[{}]", graph.video_label),
        ]);

        match graph.audio_label {
            Some(label) => args.extend([
                "-map".into(),
                format!("[{}]", label),
                "-c:a".into(),
                self.encoding.audio_codec.clone(),
            ]),
            None => args.push("-an".into()),
        }

        args.extend([
            "-c:v".into(),
            self.encoding.video_codec.clone(),
            "-pix_fmt".into(),
            pix_fmt,
            "-r".into(),
            first.frame_rate().to_string(),
            "-threads".into(),
            self.encoding.threads.to_string(),
            output.display().to_string(),
        ]);

        Ok(args)
    }
}
