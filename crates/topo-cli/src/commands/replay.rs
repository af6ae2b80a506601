use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use topo_core::gesture::{ViewEvent, ViewportEngine};
use topo_core::io::{FsImageProcessor, ImageProcessor, ImageUri};
use topo_core::marker::marker_to_screen;

use super::config::load_or_default;
use super::script::GestureScript;

#[derive(Args)]
pub struct ReplayArgs {
    /// Gesture script (TOML)
    pub script: PathBuf,

    /// Image to take dimensions from, overriding the script's `image`
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Use the crop settings instead of the viewing settings
    #[arg(long)]
    pub crop: bool,

    /// Engine configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &ReplayArgs) -> Result<()> {
    let config = load_or_default(args.config.as_ref())?;
    let script = GestureScript::load(&args.script)?;

    let (width, height) = match (&args.image, script.image) {
        (Some(path), _) => FsImageProcessor::new(std::env::temp_dir())?
            .measure(&ImageUri::new(path))
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, Some(dims)) => (dims.width, dims.height),
        (None, None) => anyhow::bail!("Script has no `image` and no --image was given"),
    };

    let view_config = if args.crop {
        config.crop.view_config()
    } else {
        config.view.clone()
    };
    let mut engine = ViewportEngine::new(script.viewport, view_config)?;
    engine.load_image(width, height)?;

    let t = engine.transform();
    println!(
        "{} scale {:.3}, translate ({:.2}, {:.2})",
        style("start").dim(),
        t.scale,
        t.translate_x,
        t.translate_y
    );

    let mut taps = Vec::new();
    for event in &script.events {
        match engine.handle(*event) {
            Some(ViewEvent::TransformChanged(t)) => println!(
                "{:<32} scale {:.3}, translate ({:.2}, {:.2})",
                event.to_string(),
                t.scale,
                t.translate_x,
                t.translate_y
            ),
            Some(ViewEvent::Settled(t)) => println!(
                "{:<32} {} scale {:.3}, translate ({:.2}, {:.2})",
                event.to_string(),
                style("settled").cyan(),
                t.scale,
                t.translate_x,
                t.translate_y
            ),
            Some(ViewEvent::Tapped(p)) => {
                println!(
                    "{:<32} {} ({:.4}, {:.4})",
                    event.to_string(),
                    style("marker").green(),
                    p.x,
                    p.y
                );
                taps.push(p);
            }
            None => println!("{:<32} {}", event.to_string(), style("-").dim()),
        }
    }

    let snapshot = engine.snapshot()?;
    println!(
        "{} scale {:.3}, translate ({:.2}, {:.2}), phase {}",
        style("final").bold(),
        snapshot.transform.scale,
        snapshot.transform.translate_x,
        snapshot.transform.translate_y,
        engine.session().phase()
    );

    for (i, p) in taps.iter().enumerate() {
        let s = marker_to_screen(*p, &snapshot.transform, &snapshot.viewport, &snapshot.content)?;
        println!(
            "  marker {}: ({:.4}, {:.4}) -> screen ({:.1}, {:.1}), size {:.2}",
            i + 1,
            p.x,
            p.y,
            s.x,
            s.y,
            snapshot.transform.effective_marker_scale(24.0)
        );
    }

    Ok(())
}
