use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::consts::{
    DEFAULT_MAX_BYTES, DEFAULT_MAX_PIXELS, DEFAULT_STEP_FACTOR, DEFAULT_STEP_THRESHOLD,
    DEFAULT_TARGET_LONG_SIDE, DEFAULT_TARGET_PIXELS, MAX_RESIZE_STEPS,
};
use crate::error::{Result, TopoError};
use crate::io::{ImageProcessor, ImageUri};

use super::cancel::CancelFlag;
use super::types::{CropStage, ProgressReporter};

/// Limits above which a photo is shrunk before cropping, and the size it is
/// shrunk to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownscaleBudget {
    pub max_pixels: u64,
    pub max_bytes: u64,
    pub target_long_side: u32,
    pub target_pixels: u64,
    /// Factor applied per coarse step, in `(0, 1)`.
    pub step_factor: f64,
    /// Coarse steps continue while the long side exceeds
    /// `step_threshold * target_long_side`.
    pub step_threshold: f64,
}

impl Default for DownscaleBudget {
    fn default() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
            max_bytes: DEFAULT_MAX_BYTES,
            target_long_side: DEFAULT_TARGET_LONG_SIDE,
            target_pixels: DEFAULT_TARGET_PIXELS,
            step_factor: DEFAULT_STEP_FACTOR,
            step_threshold: DEFAULT_STEP_THRESHOLD,
        }
    }
}

impl DownscaleBudget {
    pub fn validate(&self) -> Result<()> {
        if self.max_pixels == 0 || self.max_bytes == 0 {
            return Err(TopoError::Config("downscale budgets must be > 0".into()));
        }
        if self.target_long_side == 0 || self.target_pixels == 0 {
            return Err(TopoError::Config("downscale targets must be > 0".into()));
        }
        if !(self.step_factor > 0.0 && self.step_factor < 1.0) {
            return Err(TopoError::Config(format!(
                "step_factor must be in (0, 1), got {}",
                self.step_factor
            )));
        }
        if !(self.step_threshold.is_finite() && self.step_threshold >= 1.0) {
            return Err(TopoError::Config(format!(
                "step_threshold must be >= 1, got {}",
                self.step_threshold
            )));
        }
        Ok(())
    }

    /// Whether a `width` x `height` image of `bytes` bytes exceeds the budget.
    pub fn needs_downscale(&self, width: u32, height: u32, bytes: u64) -> bool {
        width as u64 * height as u64 > self.max_pixels || bytes > self.max_bytes
    }

    /// Resize steps that bring `width` x `height` within the targets.
    pub fn plan(&self, width: u32, height: u32) -> DownscalePlan {
        let mut steps = Vec::new();
        let mut ratio = 1.0;
        let (mut w, mut h) = (width, height);

        let ceiling = self.step_threshold * self.target_long_side as f64;
        while w.max(h) as f64 > ceiling && steps.len() < MAX_RESIZE_STEPS {
            let factor = self.step_factor;
            w = scale_dim(w, factor);
            h = scale_dim(h, factor);
            ratio *= factor;
            steps.push(ResizeStep {
                width: w,
                height: h,
                factor,
            });
        }

        let by_side = self.target_long_side as f64 / w.max(h) as f64;
        let by_pixels = (self.target_pixels as f64 / (w as f64 * h as f64)).sqrt();
        let factor = by_side.min(by_pixels);
        if factor < 1.0 {
            w = scale_dim(w, factor);
            h = scale_dim(h, factor);
            ratio *= factor;
            steps.push(ResizeStep {
                width: w,
                height: h,
                factor,
            });
        }

        DownscalePlan {
            steps,
            ratio,
            width: w,
            height: h,
        }
    }
}

fn scale_dim(v: u32, factor: f64) -> u32 {
    ((v as f64 * factor).round() as u32).max(1)
}

/// One resize of the image produced by the previous step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeStep {
    pub width: u32,
    pub height: u32,
    pub factor: f64,
}

/// Ordered resize steps and their combined effect.
#[derive(Clone, Debug, PartialEq)]
pub struct DownscalePlan {
    pub steps: Vec<ResizeStep>,
    /// Product of every step factor.
    pub ratio: f64,
    pub width: u32,
    pub height: u32,
}

impl DownscalePlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Result of running a plan.
#[derive(Clone, Debug)]
pub struct Downscaled {
    pub image: ImageUri,
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
}

/// Execute `plan` against `source`, checking `cancel` before every step.
///
/// Intermediate images are removed as soon as the next step has consumed them.
/// On failure or cancellation everything written so far is removed; the source
/// is never touched. A failed step surfaces as [`TopoError::ResizeFailure`].
pub fn run_plan(
    source: &ImageUri,
    plan: &DownscalePlan,
    processor: &dyn ImageProcessor,
    cancel: &CancelFlag,
    reporter: &dyn ProgressReporter,
) -> Result<Downscaled> {
    reporter.begin_stage(CropStage::Downscaling, Some(plan.steps.len()));

    let mut current: Option<ImageUri> = None;
    for (i, step) in plan.steps.iter().enumerate() {
        if let Err(e) = cancel.check() {
            discard(processor, current.as_ref());
            return Err(e);
        }

        let input = current.as_ref().unwrap_or(source);
        let resized = match processor.resize(input, step.width, step.height) {
            Ok(uri) => uri,
            Err(e) => {
                discard(processor, current.as_ref());
                return Err(TopoError::ResizeFailure(format!(
                    "step {} of {} ({}x{}): {e}",
                    i + 1,
                    plan.steps.len(),
                    step.width,
                    step.height
                )));
            }
        };
        info!(
            step = i + 1,
            width = step.width,
            height = step.height,
            factor = step.factor,
            "Resized"
        );

        discard(processor, current.as_ref());
        current = Some(resized);
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    if let Err(e) = cancel.check() {
        discard(processor, current.as_ref());
        return Err(e);
    }

    Ok(Downscaled {
        image: current.unwrap_or_else(|| source.clone()),
        width: plan.width,
        height: plan.height,
        ratio: plan.ratio,
    })
}

pub(crate) fn discard(processor: &dyn ImageProcessor, uri: Option<&ImageUri>) {
    if let Some(uri) = uri {
        if let Err(e) = processor.remove(uri) {
            warn!(%uri, error = %e, "Failed to remove intermediate image");
        }
    }
}
