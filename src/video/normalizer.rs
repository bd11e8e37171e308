use tracing::{debug, info};

use crate::error::{CompositionError, Result};
use crate::video::ffmpeg::FfmpegTools;
use crate::video::probe::probe_video;
use crate::video::types::{ExtractedClip, NormalizedClip};

/// Truncates every extracted clip to the shortest original input
#[derive(Debug, Clone, Copy)]
pub struct DurationNormalizer {
    target: f64,
}

impl DurationNormalizer {
    /// Take the minimum of the original input durations
    pub fn from_durations(durations: &[f64]) -> Result<Self> {
        if let Some(bad) = durations.iter().find(|d| !d.is_finite() || **d <= 0.0) {
            return Err(CompositionError::DurationUnavailable {
                reason: format!("invalid input duration {}", bad),
            }
            .into());
        }

        let target = durations
            .iter()
            .copied()
            .reduce(f64::min)
            .ok_or_else(|| CompositionError::DurationUnavailable {
                reason: "no input durations".to_string(),
            })?;

        debug!("Normalizing {} clips to {:.3}s", durations.len(), target);
        Ok(Self { target })
    }

    /// Shortest original duration, in seconds
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Reload an extracted clip from disk and pin it to the target duration
    pub async fn normalize(
        &self,
        tools: &FfmpegTools,
        clip: &ExtractedClip,
    ) -> Result<NormalizedClip> {
        let metadata = probe_video(tools, &clip.path).await?;
        info!(
            "   Section {} reloaded: {:.3}s -> {:.3}s",
            clip.index, metadata.duration, self.target
        );

        Ok(NormalizedClip {
            index: clip.index,
            path: clip.path.clone(),
            duration: self.target,
            metadata,
        })
    }
}
