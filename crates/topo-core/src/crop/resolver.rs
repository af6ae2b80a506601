use tracing::debug;

use crate::error::{Result, TopoError};
use crate::geometry::{ContentImage, CropFrame};
use crate::transform::TransformState;

use super::rect::CropRect;

/// Source-pixel rectangle visible through `frame`.
///
/// The frame is centered in the viewport, so the part of the scaled image hidden
/// to its left is half the overflow minus the translation.
pub fn resolve_crop(
    transform: &TransformState,
    frame: &CropFrame,
    content: &ContentImage,
) -> Result<CropRect> {
    transform.validate()?;
    if content.original_width == 0 || content.original_height == 0 {
        return Err(TopoError::NotReady(format!(
            "image has no measured dimensions ({}x{})",
            content.original_width, content.original_height
        )));
    }
    if !frame.is_measured() {
        return Err(TopoError::NotReady(format!(
            "crop frame has no measured size ({}x{})",
            frame.width, frame.height
        )));
    }

    let displayed_width = content.display_width * transform.scale;
    let displayed_height = content.display_height * transform.scale;
    if !(displayed_width.is_finite() && displayed_width > 0.0)
        || !(displayed_height.is_finite() && displayed_height > 0.0)
    {
        return Err(TopoError::NotReady(format!(
            "image not laid out (displayed {displayed_width}x{displayed_height})"
        )));
    }

    let hidden_left = (displayed_width - frame.width) / 2.0 - transform.translate_x;
    let hidden_top = (displayed_height - frame.height) / 2.0 - transform.translate_y;

    let ratio_x = content.original_width as f64 / displayed_width;
    let ratio_y = content.original_height as f64 / displayed_height;

    let origin_x = (hidden_left * ratio_x).round() as i64;
    let origin_y = (hidden_top * ratio_y).round() as i64;
    let width = (frame.width * ratio_x).round() as i64;
    let height = (frame.height * ratio_y).round() as i64;

    debug!(
        origin_x,
        origin_y,
        width,
        height,
        ratio_x,
        ratio_y,
        "Resolved unclamped crop"
    );

    if width < 1 || height < 1 {
        return Err(TopoError::CropOutOfBounds(format!(
            "frame covers less than one source pixel ({width}x{height})"
        )));
    }
    let src_w = content.original_width as i64;
    let src_h = content.original_height as i64;
    if origin_x >= src_w || origin_y >= src_h || origin_x + width <= 0 || origin_y + height <= 0 {
        return Err(TopoError::CropOutOfBounds(format!(
            "frame ({origin_x},{origin_y} {width}x{height}) does not overlap the image ({src_w}x{src_h})"
        )));
    }

    CropRect::clamped(
        origin_x,
        origin_y,
        width,
        height,
        content.original_width,
        content.original_height,
    )
}
