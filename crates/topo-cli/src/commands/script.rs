use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use topo_core::geometry::Size;
use topo_core::gesture::GestureEvent;

/// A recorded interaction: the view it happened in and the classified events.
#[derive(Debug, Deserialize)]
pub struct GestureScript {
    pub viewport: Size,
    /// Pixel size of the image; omitted when a real image is supplied.
    pub image: Option<ImageDims>,
    #[serde(default)]
    pub events: Vec<GestureEvent>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

impl GestureScript {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read gesture script {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Invalid gesture script {}", path.display()))
    }
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("invalid width '{w}'"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("invalid height '{h}'"))?;
    if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
        return Err(format!("size must be positive, got '{s}'"));
    }
    Ok(Size::new(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        let s = parse_size("400x300").unwrap();
        assert_eq!((s.width, s.height), (400.0, 300.0));
        assert!(parse_size("400").is_err());
        assert!(parse_size("0x300").is_err());
    }

    #[test]
    fn test_script_parses_events() {
        let script: GestureScript = toml::from_str(
            r#"
            viewport = { width = 400.0, height = 300.0 }
            image = { width = 1600, height = 1200 }

            [[events]]
            type = "PinchStart"
            focal_x = 200.0
            focal_y = 150.0

            [[events]]
            type = "PinchUpdate"
            scale_factor = 2.0
            focal_x = 200.0
            focal_y = 150.0

            [[events]]
            type = "PinchEnd"
            "#,
        )
        .unwrap();
        assert_eq!(script.events.len(), 3);
        assert_eq!(script.events[2], GestureEvent::PinchEnd);
        assert_eq!(script.image.unwrap().width, 1600);
    }
}
