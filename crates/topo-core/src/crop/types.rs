/// Crop finalization stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CropStage {
    Measuring,
    Resolving,
    Downscaling,
    Cropping,
}

impl std::fmt::Display for CropStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Measuring => write!(f, "Measuring source"),
            Self::Resolving => write!(f, "Resolving crop"),
            Self::Downscaling => write!(f, "Downscaling"),
            Self::Cropping => write!(f, "Cropping"),
        }
    }
}

/// Thread-safe progress reporting for crop finalization.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of steps in it, if known.
    fn begin_stage(&self, _stage: CropStage, _total_items: Option<usize>) {}

    /// One step within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
