use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::Result,
    video::{
        expected_width, ArrayComposer, ComposedOutput, DurationNormalizer, ExtractedClip,
        FfmpegTools, NormalizedClip, SectionExtractor, SectionRange,
    },
};

/// Runs the whole crop → normalize → stack pipeline for one configuration
///
/// The engine follows a fixed sequence:
/// 1. Section Extraction - crop each input to its band and write it to disk
/// 2. Duration Normalization - truncate every band to the shortest input
/// 3. Array Composition - stack the bands left to right into the output
///
/// Every step finishes, intermediate files included, before the next starts.
pub struct TriptychEngine {
    config: Config,
    tools: FfmpegTools,
}

impl TriptychEngine {
    pub fn new(config: Config) -> Self {
        let tools = config.tools();
        Self { config, tools }
    }

    /// Main pipeline method
    pub async fn run(&self) -> Result<ComposedOutput> {
        self.config.validate()?;
        self.tools.check_available()?;

        let sections = self.config.sections.resolved();
        let output_path = &self.config.pipeline.output;

        info!("🎬 Starting triptych composition");
        info!("   Inputs: {:?}", self.config.pipeline.inputs);
        info!("   Sections: {}", describe(&sections));
        info!("   Output: {:?}", output_path);

        // Step 1
        let extracted = self.extract_sections(&sections).await?;

        // Step 2
        let durations: Vec<f64> = extracted.iter().map(|clip| clip.source.duration).collect();
        let normalizer = DurationNormalizer::from_durations(&durations)?;
        let normalized = self.normalize_durations(&normalizer, &extracted).await?;

        // Step 3
        let composed = self.compose_row(&normalized, output_path).await?;

        if !self.config.pipeline.keep_intermediates {
            self.remove_intermediates(&extracted).await;
        }

        info!(
            "🎉 Triptych complete: {}x{}, {:.3}s, {} frames @ {} fps -> {:?}",
            composed.width,
            composed.height,
            composed.duration,
            composed.frame_count,
            composed.frame_rate,
            composed.path
        );
        Ok(composed)
    }

    // ==========================================
    // PIPELINE STEP 1: SECTION EXTRACTION
    // ==========================================

    async fn extract_sections(&self, sections: &[SectionRange]) -> Result<Vec<ExtractedClip>> {
        info!("✂️  Step 1: Extracting {} sections...", sections.len());

        let pipeline = &self.config.pipeline;
        let extractor = SectionExtractor::new(self.tools.clone(), self.config.encoding.clone());
        let mut common_height = None;
        let mut extracted = Vec::with_capacity(sections.len());

        for (i, (input, &section)) in pipeline.inputs.iter().zip(sections).enumerate() {
            let clip = extractor
                .extract(i, input, &pipeline.intermediate_path(i), section, common_height)
                .await?;

            // The first input sets the row height; its own band never rescales
            if i == 0 && self.config.encoding.resize_to_common_height {
                common_height = Some(clip.source.height);
                debug!("Common height: {}px", clip.source.height);
            }
            extracted.push(clip);
        }

        info!("   ✅ Extracted {} sections", extracted.len());
        Ok(extracted)
    }

    // ==========================================
    // PIPELINE STEP 2: DURATION NORMALIZATION
    // ==========================================

    async fn normalize_durations(
        &self,
        normalizer: &DurationNormalizer,
        extracted: &[ExtractedClip],
    ) -> Result<Vec<NormalizedClip>> {
        info!(
            "⏱️  Step 2: Normalizing to the shortest input ({:.3}s)...",
            normalizer.target()
        );

        let mut normalized = Vec::with_capacity(extracted.len());
        for clip in extracted {
            normalized.push(normalizer.normalize(&self.tools, clip).await?);
        }
        Ok(normalized)
    }

    // ==========================================
    // PIPELINE STEP 3: ARRAY COMPOSITION
    // ==========================================

    async fn compose_row(&self, clips: &[NormalizedClip], output: &Path) -> Result<ComposedOutput> {
        info!("🧩 Step 3: Composing {} clips side by side...", clips.len());

        let composer = ArrayComposer::new(self.tools.clone(), self.config.encoding.clone());
        composer.compose(clips, output).await
    }

    async fn remove_intermediates(&self, extracted: &[ExtractedClip]) {
        for clip in extracted {
            match tokio::fs::remove_file(&clip.path).await {
                Ok(()) => debug!("Removed intermediate {:?}", clip.path),
                Err(e) => warn!("Failed to remove intermediate {:?}: {}", clip.path, e),
            }
        }
    }
}

fn describe(sections: &[SectionRange]) -> String {
    let bands: Vec<String> = sections.iter().map(|s| s.to_string()).collect();
    format!("{} ({}px total)", bands.join(", "), expected_width(sections))
}
