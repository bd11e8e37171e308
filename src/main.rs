use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use triptych_stitcher::{
    composition::TriptychEngine,
    config::{AudioMode, Config},
    video::SectionPreset,
};

#[derive(Parser)]
#[command(
    name = "triptych-stitcher",
    version,
    about = "Crop vertical bands out of source videos and stitch them into a triptych",
    long_about = "Triptych-Stitcher crops one pixel band out of each input video, trims every band to the shortest input and lays the bands out side by side in a single output video. With no arguments it reads input/video1.mov, input/video2.mov and input/video3.mov and writes output/triptych_output.mov."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input video, in left-to-right order (repeat for each input)
    #[arg(short, long = "input")]
    inputs: Vec<PathBuf>,

    /// Output video file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Named section layout to use instead of the configured ranges
    #[arg(short, long, value_enum)]
    preset: Option<SectionPreset>,

    /// How to build the output audio track
    #[arg(long, value_enum)]
    audio: Option<AudioMode>,

    /// Skip rescaling bands to the first input's height
    #[arg(long)]
    no_resize: bool,

    /// Delete the per-section intermediate files after composing
    #[arg(long, conflicts_with = "keep_intermediates")]
    clean: bool,

    /// Keep the per-section intermediate files after composing
    #[arg(long)]
    keep_intermediates: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if !self.inputs.is_empty() {
            config.pipeline.inputs = self.inputs.clone();
        }
        if let Some(output) = &self.output {
            config.pipeline.output = output.clone();
        }
        if let Some(preset) = self.preset {
            config.sections.preset = Some(preset);
        }
        if let Some(audio) = self.audio {
            config.encoding.audio = audio;
        }
        if self.no_resize {
            config.encoding.resize_to_common_height = false;
        }
        if self.clean {
            config.pipeline.keep_intermediates = false;
        }
        if self.keep_intermediates {
            config.pipeline.keep_intermediates = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };
    cli.apply(&mut config);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("Starting Triptych-Stitcher v{}", env!("CARGO_PKG_VERSION"));

    let engine = TriptychEngine::new(config);
    match engine.run().await {
        Ok(output) => {
            info!(
                "Output saved to: {:?} ({:.1} KB)",
                output.path,
                output.file_size as f64 / 1024.0
            );
            Ok(())
        }
        Err(e) => {
            error!("{}", e.user_message());
            Err(e.into())
        }
    }
}
