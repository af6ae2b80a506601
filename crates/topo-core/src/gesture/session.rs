use tracing::debug;

use crate::error::{Result, TopoError};
use crate::geometry::{ContentImage, ScreenPoint, Viewport};
use crate::transform::{max_translate, ScaleLimits, TransformState};

/// Which interactions are currently live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Panning,
    Pinching,
    /// Pan and pinch recognized simultaneously.
    PanningAndPinching,
}

impl std::fmt::Display for GesturePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Panning => write!(f, "Panning"),
            Self::Pinching => write!(f, "Pinching"),
            Self::PanningAndPinching => write!(f, "Panning + Pinching"),
        }
    }
}

/// Geometry a session clamps against.
#[derive(Clone, Copy, Debug)]
pub struct SessionContext<'a> {
    pub limits: &'a ScaleLimits,
    pub content: &'a ContentImage,
    pub viewport: &'a Viewport,
    /// Fraction below `limits.min` a pinch may transiently reach.
    pub pinch_overshoot: f64,
}

impl SessionContext<'_> {
    fn lowest_pinch_scale(&self) -> f64 {
        let overshoot = if self.pinch_overshoot.is_finite() {
            self.pinch_overshoot.clamp(0.0, 0.9)
        } else {
            0.0
        };
        self.limits.min * (1.0 - overshoot)
    }
}

#[derive(Clone, Copy, Debug)]
struct PanTrack {
    start: TransformState,
}

#[derive(Clone, Copy, Debug)]
struct PinchTrack {
    start: TransformState,
    start_scale: f64,
    focal: ScreenPoint,
}

/// One live interaction: an optional pan and an optional pinch, each with its
/// own start snapshot.
///
/// Every update takes the current transform by value and returns the next
/// one. An `Err(InvalidGeometry)` means the event was rejected; the caller
/// keeps its previous state.
#[derive(Clone, Debug, Default)]
pub struct GestureSession {
    pan: Option<PanTrack>,
    pinch: Option<PinchTrack>,
}

impl GestureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        match (self.pan.is_some(), self.pinch.is_some()) {
            (false, false) => GesturePhase::Idle,
            (true, false) => GesturePhase::Panning,
            (false, true) => GesturePhase::Pinching,
            (true, true) => GesturePhase::PanningAndPinching,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == GesturePhase::Idle
    }

    /// Transform captured when the active pinch (or else pan) began.
    pub fn start_transform(&self) -> Option<TransformState> {
        self.pinch
            .map(|p| p.start)
            .or_else(|| self.pan.map(|p| p.start))
    }

    /// Focal point of the active pinch, as last reported.
    pub fn focal(&self) -> Option<ScreenPoint> {
        self.pinch.map(|p| p.focal)
    }

    pub fn pan_start(&mut self, current: TransformState) -> Result<()> {
        current.validate()?;
        self.pan = Some(PanTrack { start: current });
        Ok(())
    }

    pub fn pan_update(
        &mut self,
        current: TransformState,
        dx: f64,
        dy: f64,
        ctx: &SessionContext<'_>,
    ) -> Result<TransformState> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(TopoError::InvalidGeometry(format!(
                "non-finite pan delta ({dx}, {dy})"
            )));
        }
        current.validate()?;

        let track = *self.pan.get_or_insert(PanTrack { start: current });
        let bounds = max_translate(current.scale, ctx.content, ctx.viewport);

        Ok(TransformState {
            scale: current.scale,
            translate_x: bounds.clamp_x(track.start.translate_x + dx),
            translate_y: bounds.clamp_y(track.start.translate_y + dy),
        })
    }

    pub fn pan_end(&mut self) {
        self.pan = None;
    }

    pub fn pinch_start(&mut self, current: TransformState, focal: ScreenPoint) -> Result<()> {
        check_focal(focal)?;
        current.validate()?;
        self.pinch = Some(PinchTrack {
            start: current,
            start_scale: current.scale,
            focal,
        });
        Ok(())
    }

    /// Scale about `focal`, then clamp translation to the new scale's bounds.
    ///
    /// Compensation runs before clamping: clamping against the old bounds
    /// first makes the content jump.
    pub fn pinch_update(
        &mut self,
        current: TransformState,
        scale_factor: f64,
        focal: ScreenPoint,
        ctx: &SessionContext<'_>,
    ) -> Result<TransformState> {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(TopoError::InvalidGeometry(format!(
                "pinch factor must be positive and finite, got {scale_factor}"
            )));
        }
        check_focal(focal)?;
        current.validate()?;

        let track = self.pinch.get_or_insert(PinchTrack {
            start: current,
            start_scale: current.scale,
            focal,
        });
        track.focal = focal;

        let new_scale =
            (track.start_scale * scale_factor)
                .max(ctx.lowest_pinch_scale())
                .min(ctx.limits.max);
        let k = new_scale / current.scale - 1.0;
        let center = ctx.viewport.center();

        let compensated_x = current.translate_x - (focal.x - center.x) * k;
        let compensated_y = current.translate_y - (focal.y - center.y) * k;

        let bounds = max_translate(new_scale, ctx.content, ctx.viewport);
        let next = TransformState {
            scale: new_scale,
            translate_x: bounds.clamp_x(compensated_x),
            translate_y: bounds.clamp_y(compensated_y),
        };

        // A concurrent pan computes from its own snapshot; carry the focal
        // shift into it so the next pan update keeps it.
        if let Some(pan) = self.pan.as_mut() {
            pan.start.translate_x += next.translate_x - current.translate_x;
            pan.start.translate_y += next.translate_y - current.translate_y;
        }

        Ok(next)
    }

    pub fn pinch_end(&mut self) {
        self.pinch = None;
    }

    /// Drop all tracks without settling.
    pub fn cancel(&mut self) {
        self.pan = None;
        self.pinch = None;
    }

    /// Resting state once every interaction has ended: scale back into limits,
    /// translation re-clamped.
    pub fn settle(&self, current: TransformState, ctx: &SessionContext<'_>) -> TransformState {
        if !current.is_finite() || current.scale <= 0.0 {
            debug!(?current, "Settling from invalid transform, resetting");
            return TransformState::reset_for(ctx.limits).clamp_translation(ctx.content, ctx.viewport);
        }
        current.clamped(ctx.limits, ctx.content, ctx.viewport)
    }
}

fn check_focal(focal: ScreenPoint) -> Result<()> {
    if focal.is_finite() {
        Ok(())
    } else {
        Err(TopoError::InvalidGeometry(format!(
            "non-finite focal point ({}, {})",
            focal.x, focal.y
        )))
    }
}
