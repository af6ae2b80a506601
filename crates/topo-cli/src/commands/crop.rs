use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use topo_core::crop::{resolve_crop, CropRequest, CropStage, CropWorker, ProgressReporter};
use topo_core::geometry::Size;
use topo_core::gesture::ViewportEngine;
use topo_core::io::{FsImageProcessor, ImageProcessor, ImageUri};
use topo_core::transform::TransformState;

use super::config::load_or_default;
use super::script::{parse_size, GestureScript};

#[derive(Args)]
pub struct CropArgs {
    /// Input photo
    pub file: PathBuf,

    /// Output file (auto-generated if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Space available for the crop frame, as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size, default_value = "400x300")]
    pub viewport: Size,

    /// Frame aspect ratio (width / height), overriding the config
    #[arg(long)]
    pub aspect: Option<f64>,

    /// Gesture script whose events frame the photo
    #[arg(long, conflicts_with_all = ["scale", "tx", "ty"])]
    pub script: Option<PathBuf>,

    /// Scale to frame at
    #[arg(long)]
    pub scale: Option<f64>,

    /// Horizontal translation in screen units
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub tx: f64,

    /// Vertical translation in screen units
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub ty: f64,

    /// Directory for intermediate images
    #[arg(long)]
    pub scratch: Option<PathBuf>,

    /// Engine configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

struct BarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: CropStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(1) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
    }
}

pub fn run(args: &CropArgs) -> Result<()> {
    let mut config = load_or_default(args.config.as_ref())?;
    if let Some(aspect) = args.aspect {
        config.crop.frame_aspect = aspect;
        config.validate()?;
    }

    let scratch = args
        .scratch
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("topo"));
    let processor = Arc::new(FsImageProcessor::new(&scratch)?);
    info!(scratch = %scratch.display(), "Using scratch directory");
    let source = ImageUri::new(&args.file);
    let (width, height) = processor
        .measure(&source)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let frame = config.crop.frame_for(args.viewport)?;
    let mut engine = ViewportEngine::new(frame, config.crop.view_config())?;
    engine.load_image(width, height)?;

    if let Some(ref path) = args.script {
        let script = GestureScript::load(path)?;
        for event in script.events {
            if let Some(change) = engine.handle(event) {
                debug!(%event, ?change, "Script event applied");
            }
        }
    } else if let Some(scale) = args.scale {
        engine.restore(TransformState::new(scale, args.tx, args.ty))?;
    }

    let snapshot = engine.snapshot()?;
    let preview = resolve_crop(&snapshot.transform, &frame, &snapshot.content)?;
    println!(
        "Crop: {} ({}x{}), frame {:.0}x{:.0}, scale {:.3}",
        args.file.display(),
        width,
        height,
        frame.width,
        frame.height,
        snapshot.transform.scale
    );
    println!("Selection: {}", preview);

    let bar = ProgressBar::new(1);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:<18} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let mut worker = CropWorker::new(processor.clone())
        .with_reporter(Arc::new(BarReporter { bar: bar.clone() }));

    let handle = worker.submit(CropRequest {
        source,
        snapshot,
        frame,
        budget: config.downscale.clone(),
    })?;
    let output = handle.wait()?;
    bar.finish_and_clear();

    if output.scale_ratio < 1.0 {
        println!(
            "Downscaled by {:.4}, selection now {}",
            output.scale_ratio, output.rect
        );
    }

    let output_path = args.output.clone().unwrap_or_else(|| {
        crop_output_path(
            &args.file,
            output.image.path(),
            output.rect.width,
            output.rect.height,
        )
    });
    std::fs::copy(output.image.path(), &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    processor.remove(&output.image)?;

    println!("Saved to {}", output_path.display());
    Ok(())
}

/// `<stem>_crop<w>x<h>.<ext>` next to the source, in the format the processor wrote.
fn crop_output_path(source: &Path, cropped: &Path, w: u32, h: u32) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = cropped
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png");
    let parent = source.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_crop{w}x{h}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_output_path_uses_written_format() {
        let p = crop_output_path(
            Path::new("/photos/wall.bmp"),
            Path::new("/tmp/topo-1-0-crop.png"),
            400,
            300,
        );
        assert_eq!(p, PathBuf::from("/photos/wall_crop400x300.png"));
    }
}
