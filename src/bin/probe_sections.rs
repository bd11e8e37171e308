// Probe the configured inputs and check every section band against them

use triptych_stitcher::{
    config::Config,
    video::{expected_width, probe_video, CropPlan},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    config.validate()?;

    let tools = config.tools();
    tools.check_available()?;

    let sections = config.sections.resolved();
    println!("🔍 Probing {} inputs", config.pipeline.inputs.len());

    let mut heights = Vec::new();
    for (i, (input, section)) in config.pipeline.inputs.iter().zip(&sections).enumerate() {
        let metadata = probe_video(&tools, input).await?;

        println!("\n{}. {}", i + 1, input.display());
        println!("   Size:      {}x{}", metadata.width, metadata.height);
        println!("   Duration:  {:.3}s", metadata.duration);
        println!("   Frame rate: {} ({:.3} fps)", metadata.frame_rate, metadata.frame_rate.as_f64());
        println!("   Codec:     {}", metadata.codec);
        println!("   Audio:     {}", if metadata.has_audio { "yes" } else { "no" });

        match CropPlan::new(&metadata, *section, None) {
            Ok(plan) => println!("   Section:   {} -> {}px band ✅", section, plan.width),
            Err(e) => {
                println!("   Section:   {} ❌", section);
                return Err(e.into());
            }
        }
        heights.push(metadata.height);
    }

    println!("\nRow width: {}px", expected_width(&sections));
    if heights.windows(2).any(|pair| pair[0] != pair[1]) {
        println!("⚠️  Inputs differ in height: {:?}", heights);
        if !config.encoding.resize_to_common_height {
            println!("   Enable encoding.resize_to_common_height or the row cannot be stacked");
        }
    }

    Ok(())
}
