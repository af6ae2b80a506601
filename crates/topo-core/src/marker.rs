//! Route-marker placement: taps to persisted points and back.

use crate::error::{Result, TopoError};
use crate::geometry::{ContentImage, NormalizedPoint, ScreenPoint, Viewport};
use crate::transform::{normalized_to_screen, screen_to_normalized, TransformState};

/// Convert a tap into a point suitable for persistence.
///
/// Taps that miss the image (letterbox of a contain-fit view) are rejected
/// with [`TopoError::OutsideImage`].
pub fn place_marker(
    tap: ScreenPoint,
    transform: &TransformState,
    viewport: &Viewport,
    content: &ContentImage,
) -> Result<NormalizedPoint> {
    let p = screen_to_normalized(tap, transform, viewport, content)?;
    NormalizedPoint::new(p.x, p.y)
}

/// Screen position of a persisted marker under the current transform.
pub fn marker_to_screen(
    marker: NormalizedPoint,
    transform: &TransformState,
    viewport: &Viewport,
    content: &ContentImage,
) -> Result<ScreenPoint> {
    if !marker.is_within_image() {
        return Err(TopoError::OutsideImage {
            x: marker.x,
            y: marker.y,
        });
    }
    normalized_to_screen(marker, transform, viewport, content)
}

/// Markers that currently fall inside the viewport, with their screen
/// positions. Indices refer to `markers`; invalid markers are skipped.
pub fn visible_markers(
    markers: &[NormalizedPoint],
    transform: &TransformState,
    viewport: &Viewport,
    content: &ContentImage,
) -> Vec<(usize, ScreenPoint)> {
    markers
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            let p = marker_to_screen(*m, transform, viewport, content).ok()?;
            let inside = (0.0..=viewport.width).contains(&p.x) && (0.0..=viewport.height).contains(&p.y);
            inside.then_some((i, p))
        })
        .collect()
}
