use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use topo_core::geometry::{ContentImage, FitMode, Size};
use topo_core::io::{FsImageProcessor, ImageProcessor, ImageUri};

use super::config::load_or_default;
use super::script::parse_size;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image
    pub file: PathBuf,

    /// Viewport size to fit against, as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size, default_value = "390x844")]
    pub viewport: Size,

    /// Engine configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config = load_or_default(args.config.as_ref())?;
    let processor = FsImageProcessor::new(std::env::temp_dir())?;
    let uri = ImageUri::new(&args.file);

    let (width, height) = processor
        .measure(&uri)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let bytes = processor.file_size(&uri)?;

    println!("File:       {}", args.file.display());
    println!("Dimensions: {}x{}", width, height);
    println!(
        "Pixels:     {:.1} MP ({} bytes on disk)",
        (width as f64 * height as f64) / 1e6,
        bytes
    );

    for mode in [FitMode::Contain, FitMode::Cover] {
        let content = ContentImage::fit(width, height, args.viewport, mode)?;
        println!(
            "Fit {:<8}{:.1}x{:.1} in {}x{} viewport",
            mode.to_string(),
            content.display_width,
            content.display_height,
            args.viewport.width,
            args.viewport.height
        );
    }

    let budget = &config.downscale;
    if budget.needs_downscale(width, height, bytes) {
        let plan = budget.plan(width, height);
        println!(
            "{} over budget, {} resize step(s) to {}x{} (ratio {:.4})",
            style("Downscale:").yellow().bold(),
            plan.steps.len(),
            plan.width,
            plan.height,
            plan.ratio
        );
        for (i, step) in plan.steps.iter().enumerate() {
            println!(
                "  {:>2}. {}x{} (x{:.3})",
                i + 1,
                step.width,
                step.height,
                step.factor
            );
        }
    } else {
        println!("{} within budget", style("Downscale:").green().bold());
    }

    Ok(())
}
