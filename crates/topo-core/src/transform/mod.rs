//! Per-viewport scale/translate state and the pure math around it.
//!
//! Convention: `translate` is the screen offset of the content center from the
//! viewport center, applied after scaling about the content center. At the
//! identity transform both centers coincide.

pub mod bounds;
pub mod mapper;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE};
use crate::error::{Result, TopoError};
use crate::geometry::{ContentImage, Viewport};

pub use bounds::{max_translate, PanBounds};
pub use mapper::{normalized_to_screen, screen_to_normalized};

/// Scale and translation of one viewport instance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformState {
    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
        }
    }

    /// `scale = 1`, no translation.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Centered at the lowest allowed scale, used when content must cover a frame.
    pub fn reset_for(limits: &ScaleLimits) -> Self {
        Self::new(limits.min, 0.0, 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.translate_x.is_finite() && self.translate_y.is_finite()
    }

    /// Reject states the mapper and resolver cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.is_finite() {
            return Err(TopoError::InvalidGeometry(format!(
                "non-finite transform (scale {}, translate {}, {})",
                self.scale, self.translate_x, self.translate_y
            )));
        }
        if self.scale <= 0.0 {
            return Err(TopoError::InvalidGeometry(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    /// Size to draw a marker of `base_size` inside the transformed layer so it
    /// keeps a constant on-screen size at any zoom.
    pub fn effective_marker_scale(&self, base_size: f64) -> f64 {
        if self.scale > 0.0 && self.scale.is_finite() {
            base_size / self.scale
        } else {
            base_size
        }
    }

    /// Clamp both translation axes to the bounds of the current scale.
    pub fn clamp_translation(&self, content: &ContentImage, viewport: &Viewport) -> Self {
        let bounds = max_translate(self.scale, content, viewport);
        Self {
            scale: self.scale,
            translate_x: bounds.clamp_x(self.translate_x),
            translate_y: bounds.clamp_y(self.translate_y),
        }
    }

    /// Clamp scale into `limits`, then translation into the new scale's bounds.
    pub fn clamped(&self, limits: &ScaleLimits, content: &ContentImage, viewport: &Viewport) -> Self {
        Self {
            scale: limits.clamp(self.scale),
            ..*self
        }
        .clamp_translation(content, viewport)
    }

    /// True when scale is within `limits` and translation within its bounds.
    pub fn is_within(&self, limits: &ScaleLimits, content: &ContentImage, viewport: &Viewport) -> bool {
        let bounds = max_translate(self.scale, content, viewport);
        limits.contains(self.scale) && bounds.contains(self.translate_x, self.translate_y)
    }
}

/// Allowed scale range for one call site.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_SCALE,
            max: DEFAULT_MAX_SCALE,
        }
    }
}

impl ScaleLimits {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let limits = Self { min, max };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min <= 0.0 {
            return Err(TopoError::Config(format!(
                "scale limits must be positive and finite, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(TopoError::Config(format!(
                "min scale {} exceeds max scale {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Never panics, even for limits that were built without [`Self::new`].
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }

    pub fn contains(&self, scale: f64) -> bool {
        (self.min..=self.max).contains(&scale)
    }
}
