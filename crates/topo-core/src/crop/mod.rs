//! Crop rectangle derivation and the off-thread crop flow.

pub mod cancel;
pub mod downscale;
pub mod finalize;
pub mod rect;
pub mod resolver;
pub mod types;
pub mod worker;

pub use cancel::CancelFlag;
pub use downscale::{run_plan, DownscaleBudget, DownscalePlan, Downscaled, ResizeStep};
pub use finalize::{finalize_crop, CropOutput, CropRequest};
pub use rect::CropRect;
pub use resolver::resolve_crop;
pub use types::{CropStage, NoOpReporter, ProgressReporter};
pub use worker::{CropHandle, CropWorker};
