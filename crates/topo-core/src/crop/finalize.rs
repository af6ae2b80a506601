use tracing::{info, warn};

use crate::error::{Result, TopoError};
use crate::geometry::{ContentImage, CropFrame};
use crate::gesture::ViewSnapshot;
use crate::io::{ImageProcessor, ImageUri};

use super::cancel::CancelFlag;
use super::downscale::{discard, run_plan, DownscaleBudget};
use super::rect::CropRect;
use super::resolver::resolve_crop;
use super::types::{CropStage, ProgressReporter};

/// Everything needed to turn a confirmed framing into a cropped image.
#[derive(Clone, Debug)]
pub struct CropRequest {
    pub source: ImageUri,
    /// Geometry frozen when the user confirmed the crop.
    pub snapshot: ViewSnapshot,
    pub frame: CropFrame,
    pub budget: DownscaleBudget,
}

/// A cropped image ready for upload.
#[derive(Clone, Debug)]
pub struct CropOutput {
    pub image: ImageUri,
    /// The rectangle actually cut, in the coordinates of the image it was cut
    /// from (downscaled when `scale_ratio < 1`).
    pub rect: CropRect,
    /// Rect as resolved against the original photo.
    pub original_rect: CropRect,
    /// Combined downscale factor, 1.0 when the photo was within budget.
    pub scale_ratio: f64,
    pub generation: u64,
}

impl CropOutput {
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        self.image.read_bytes()
    }
}

/// Measure, resolve, downscale if over budget, and crop.
///
/// The crop rectangle is resolved once against the original dimensions and
/// then rescaled by the downscale ratio, so the framing the user chose is
/// preserved. Intermediate files are removed on every exit path.
pub fn finalize_crop(
    request: &CropRequest,
    processor: &dyn ImageProcessor,
    cancel: &CancelFlag,
    reporter: &dyn ProgressReporter,
) -> Result<CropOutput> {
    cancel.check()?;

    reporter.begin_stage(CropStage::Measuring, None);
    let (width, height) = processor.measure(&request.source)?;
    let bytes = processor.file_size(&request.source)?;
    reporter.finish_stage();

    let snapshot = &request.snapshot;
    if (width, height) != (snapshot.content.original_width, snapshot.content.original_height) {
        warn!(
            measured_width = width,
            measured_height = height,
            expected_width = snapshot.content.original_width,
            expected_height = snapshot.content.original_height,
            "Source dimensions differ from the laid-out image, resolving against measured size"
        );
    }
    let content = ContentImage {
        original_width: width,
        original_height: height,
        ..snapshot.content
    };

    reporter.begin_stage(CropStage::Resolving, None);
    let original_rect = resolve_crop(&snapshot.transform, &request.frame, &content)?;
    reporter.finish_stage();
    info!(rect = %original_rect, width, height, bytes, "Crop resolved");

    cancel.check()?;

    let plan = request
        .budget
        .needs_downscale(width, height, bytes)
        .then(|| request.budget.plan(width, height));
    if plan.as_ref().is_some_and(|p| p.is_empty()) {
        warn!(
            width,
            height,
            bytes,
            max_bytes = request.budget.max_bytes,
            "Source over budget but already within target size, cropping without downscale"
        );
    }

    let (working, rect, scale_ratio) = if let Some(plan) = plan.filter(|p| !p.is_empty()) {
        info!(
            steps = plan.steps.len(),
            ratio = plan.ratio,
            target_width = plan.width,
            target_height = plan.height,
            "Source over budget, downscaling"
        );
        let downscaled = run_plan(&request.source, &plan, processor, cancel, reporter)?;
        let rect = match original_rect.rescaled(downscaled.ratio, downscaled.width, downscaled.height) {
            Ok(r) => r,
            Err(e) => {
                discard_working(processor, &request.source, &downscaled.image);
                return Err(e);
            }
        };
        (downscaled.image, rect, downscaled.ratio)
    } else {
        (request.source.clone(), original_rect, 1.0)
    };

    if let Err(e) = cancel.check() {
        discard_working(processor, &request.source, &working);
        info!("Crop cancelled before the final cut");
        return Err(e);
    }

    reporter.begin_stage(CropStage::Cropping, None);
    let cropped = processor.crop(&working, &rect);
    discard_working(processor, &request.source, &working);
    let image = cropped?;
    reporter.finish_stage();

    if cancel.is_cancelled() {
        discard(processor, Some(&image));
        return Err(TopoError::Cancelled);
    }

    Ok(CropOutput {
        image,
        rect,
        original_rect,
        scale_ratio,
        generation: snapshot.generation,
    })
}

fn discard_working(processor: &dyn ImageProcessor, source: &ImageUri, working: &ImageUri) {
    if working != source {
        discard(processor, Some(working));
    }
}
