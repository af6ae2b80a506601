//! Classified gesture events and the state machine that turns them into
//! transform updates.

pub mod engine;
pub mod session;

use serde::{Deserialize, Serialize};

pub use engine::{spawn_event_loop, EventLoop, ViewEvent, ViewSnapshot, ViewportEngine};
pub use session::{GesturePhase, GestureSession, SessionContext};

/// One event from the gesture recognizer. Pan deltas are cumulative since
/// `PanStart`; `scale_factor` is relative to the scale at `PinchStart`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GestureEvent {
    PanStart,
    PanUpdate {
        dx: f64,
        dy: f64,
    },
    PanEnd,
    PinchStart {
        focal_x: f64,
        focal_y: f64,
    },
    PinchUpdate {
        scale_factor: f64,
        focal_x: f64,
        focal_y: f64,
    },
    PinchEnd,
    Tap {
        x: f64,
        y: f64,
    },
}

impl std::fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PanStart => write!(f, "pan start"),
            Self::PanUpdate { dx, dy } => write!(f, "pan ({dx:.1}, {dy:.1})"),
            Self::PanEnd => write!(f, "pan end"),
            Self::PinchStart { focal_x, focal_y } => {
                write!(f, "pinch start @ ({focal_x:.1}, {focal_y:.1})")
            }
            Self::PinchUpdate {
                scale_factor,
                focal_x,
                focal_y,
            } => write!(f, "pinch x{scale_factor:.3} @ ({focal_x:.1}, {focal_y:.1})"),
            Self::PinchEnd => write!(f, "pinch end"),
            Self::Tap { x, y } => write!(f, "tap ({x:.1}, {y:.1})"),
        }
    }
}
