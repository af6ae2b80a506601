//! Screen space <-> normalized image space.
//!
//! Screen points are measured from the viewport's top-left corner. The content
//! is laid out with its center at `viewport center + translate`, scaled by
//! `scale` about that center.

use crate::error::{Result, TopoError};
use crate::geometry::{ContentImage, NormalizedPoint, ScreenPoint, Viewport};

use super::TransformState;

/// Map a screen point to a fraction of the image's width and height.
///
/// Points outside the image produce coordinates outside `[0, 1]`; use
/// [`NormalizedPoint::is_within_image`] before persisting.
pub fn screen_to_normalized(
    point: ScreenPoint,
    transform: &TransformState,
    viewport: &Viewport,
    content: &ContentImage,
) -> Result<NormalizedPoint> {
    check_inputs(transform, viewport, content)?;
    if !point.is_finite() {
        return Err(TopoError::InvalidGeometry(format!(
            "non-finite screen point ({}, {})",
            point.x, point.y
        )));
    }

    let (image_x, image_y) = screen_to_display(point, transform, viewport, content);
    Ok(NormalizedPoint {
        x: image_x / content.display_width,
        y: image_y / content.display_height,
    })
}

/// Exact inverse of [`screen_to_normalized`].
pub fn normalized_to_screen(
    point: NormalizedPoint,
    transform: &TransformState,
    viewport: &Viewport,
    content: &ContentImage,
) -> Result<ScreenPoint> {
    check_inputs(transform, viewport, content)?;
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(TopoError::InvalidGeometry(format!(
            "non-finite normalized point ({}, {})",
            point.x, point.y
        )));
    }

    let image_x = point.x * content.display_width;
    let image_y = point.y * content.display_height;
    let center = viewport.center();

    Ok(ScreenPoint {
        x: (image_x - content.display_width / 2.0) * transform.scale + center.x + transform.translate_x,
        y: (image_y - content.display_height / 2.0) * transform.scale + center.y + transform.translate_y,
    })
}

/// Screen point to unscaled display units, origin at the image's top-left.
fn screen_to_display(
    point: ScreenPoint,
    transform: &TransformState,
    viewport: &Viewport,
    content: &ContentImage,
) -> (f64, f64) {
    let center = viewport.center();
    (
        (point.x - center.x - transform.translate_x) / transform.scale + content.display_width / 2.0,
        (point.y - center.y - transform.translate_y) / transform.scale + content.display_height / 2.0,
    )
}

fn check_inputs(transform: &TransformState, viewport: &Viewport, content: &ContentImage) -> Result<()> {
    transform.validate()?;
    content.ensure_measured()?;
    if !viewport.is_measured() {
        return Err(TopoError::NotReady("viewport has no measured size".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> ContentImage {
        ContentImage {
            original_width: 1600,
            original_height: 1200,
            display_width: 800.0,
            display_height: 600.0,
        }
    }

    #[test]
    fn test_screen_to_display_identity_centers_image() {
        let viewport = Viewport::new(400.0, 300.0);
        let (x, y) = screen_to_display(
            viewport.center(),
            &TransformState::identity(),
            &viewport,
            &content(),
        );
        assert!((x - 400.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_check_inputs_rejects_unmeasured_viewport() {
        let err = check_inputs(
            &TransformState::identity(),
            &Viewport::new(0.0, 300.0),
            &content(),
        )
        .unwrap_err();
        assert!(matches!(err, TopoError::NotReady(_)));
    }
}
