use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_FRAME_ASPECT;
use crate::crop::DownscaleBudget;
use crate::error::{Result, TopoError};
use crate::geometry::{CropFrame, FitMode, Viewport};
use crate::transform::ScaleLimits;

/// Per-call-site settings for every surface using the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub view: ViewConfig,
    pub crop: CropConfig,
    pub downscale: DownscaleBudget,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| TopoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TopoError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.view.validate()?;
        self.crop.validate()?;
        self.downscale.validate()
    }
}

/// Pan/zoom viewing surfaces (map view, route markers).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub limits: ScaleLimits,
    pub fit: FitMode,
    /// How far below `limits.min` a pinch may go before settling back, as a fraction.
    pub pinch_overshoot: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            limits: ScaleLimits::default(),
            fit: FitMode::Cover,
            pinch_overshoot: 0.0,
        }
    }
}

impl ViewConfig {
    pub fn validate(&self) -> Result<()> {
        self.limits.validate()?;
        if !(self.pinch_overshoot.is_finite() && (0.0..1.0).contains(&self.pinch_overshoot)) {
            return Err(TopoError::Config(format!(
                "pinch_overshoot must be in [0, 1), got {}",
                self.pinch_overshoot
            )));
        }
        Ok(())
    }
}

/// Cropping surfaces. The crop view's viewport is the crop frame itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub limits: ScaleLimits,
    pub fit: FitMode,
    /// Output aspect ratio, width / height.
    pub frame_aspect: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            limits: ScaleLimits::default(),
            fit: FitMode::Cover,
            frame_aspect: DEFAULT_FRAME_ASPECT,
        }
    }
}

impl CropConfig {
    pub fn validate(&self) -> Result<()> {
        self.limits.validate()?;
        if !(self.frame_aspect.is_finite() && self.frame_aspect > 0.0) {
            return Err(TopoError::Config(format!(
                "frame_aspect must be positive, got {}",
                self.frame_aspect
            )));
        }
        Ok(())
    }

    /// Largest frame of `frame_aspect` that fits in `available`.
    pub fn frame_for(&self, available: Viewport) -> Result<CropFrame> {
        available.inscribed(self.frame_aspect)
    }

    /// Settings for the engine driving the crop frame.
    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            limits: self.limits,
            fit: self.fit,
            pinch_overshoot: 0.0,
        }
    }
}
