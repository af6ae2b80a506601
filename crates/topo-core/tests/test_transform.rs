mod common;

use approx::assert_relative_eq;

use common::scenario_geometry;
use topo_core::error::TopoError;
use topo_core::geometry::{ContentImage, FitMode, Viewport};
use topo_core::transform::{max_translate, ScaleLimits, TransformState};

#[test]
fn test_max_translate_at_identity() {
    let (viewport, content) = scenario_geometry();
    let b = max_translate(1.0, &content, &viewport);
    assert_relative_eq!(b.max_x, 200.0);
    assert_relative_eq!(b.max_y, 150.0);
}

#[test]
fn test_max_translate_grows_with_scale() {
    let (viewport, content) = scenario_geometry();
    let b = max_translate(2.0, &content, &viewport);
    assert_relative_eq!(b.max_x, 600.0);
    assert_relative_eq!(b.max_y, 450.0);
}

#[test]
fn test_max_translate_zero_when_content_smaller() {
    let viewport = Viewport::new(400.0, 300.0);
    let content = ContentImage::fit(1000, 1000, viewport, FitMode::Contain).unwrap();
    let b = max_translate(1.0, &content, &viewport);
    assert_eq!(b.max_x, 0.0);
    assert_eq!(b.max_y, 0.0);
    assert_eq!(b.clamp_x(37.0), 0.0);
}

#[test]
fn test_fit_contain_and_cover() {
    let viewport = Viewport::new(400.0, 300.0);
    let contain = ContentImage::fit(2000, 1000, viewport, FitMode::Contain).unwrap();
    assert_relative_eq!(contain.display_width, 400.0);
    assert_relative_eq!(contain.display_height, 200.0);

    let cover = ContentImage::fit(2000, 1000, viewport, FitMode::Cover).unwrap();
    assert_relative_eq!(cover.display_width, 600.0);
    assert_relative_eq!(cover.display_height, 300.0);
}

#[test]
fn test_fit_rejects_unmeasured_image() {
    let err = ContentImage::fit(0, 1000, Viewport::new(400.0, 300.0), FitMode::Cover).unwrap_err();
    assert!(matches!(err, TopoError::NotReady(_)));
}

#[test]
fn test_clamped_pulls_scale_and_translation_in() {
    let (viewport, content) = scenario_geometry();
    let limits = ScaleLimits::default();
    let t = TransformState::new(9.0, 10_000.0, -10_000.0).clamped(&limits, &content, &viewport);
    assert_eq!(t.scale, 4.0);
    assert_relative_eq!(t.translate_x, (3200.0 - 400.0) / 2.0);
    assert_relative_eq!(t.translate_y, -(2400.0 - 300.0) / 2.0);
    assert!(t.is_within(&limits, &content, &viewport));
}

#[test]
fn test_reset_for_uses_min_scale() {
    let limits = ScaleLimits::new(1.5, 4.0).unwrap();
    assert_eq!(TransformState::reset_for(&limits), TransformState::new(1.5, 0.0, 0.0));
    assert_eq!(TransformState::default(), TransformState::identity());
}

#[test]
fn test_validate_rejects_bad_scale() {
    for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = TransformState::new(scale, 0.0, 0.0).validate().unwrap_err();
        assert!(matches!(err, TopoError::InvalidGeometry(_)), "scale {scale}");
    }
    assert!(TransformState::new(1.0, f64::NAN, 0.0).validate().is_err());
}

#[test]
fn test_scale_limits_validation() {
    assert!(ScaleLimits::new(2.0, 1.0).is_err());
    assert!(ScaleLimits::new(0.0, 1.0).is_err());
    assert!(ScaleLimits::new(1.0, f64::INFINITY).is_err());
    assert!(ScaleLimits::new(1.0, 1.0).is_ok());
}

#[test]
fn test_effective_marker_scale() {
    assert_relative_eq!(TransformState::new(2.0, 0.0, 0.0).effective_marker_scale(24.0), 12.0);
    assert_relative_eq!(TransformState::identity().effective_marker_scale(24.0), 24.0);
    assert_relative_eq!(TransformState::new(0.0, 0.0, 0.0).effective_marker_scale(24.0), 24.0);
}

#[test]
fn test_inscribed_frame() {
    let available = Viewport::new(400.0, 300.0);
    let square = available.inscribed(1.0).unwrap();
    assert_relative_eq!(square.width, 300.0);
    assert_relative_eq!(square.height, 300.0);

    let wide = available.inscribed(2.0).unwrap();
    assert_relative_eq!(wide.width, 400.0);
    assert_relative_eq!(wide.height, 200.0);

    assert!(available.inscribed(0.0).is_err());
}
