mod common;

use approx::assert_relative_eq;

use common::MockProcessor;
use topo_core::crop::{run_plan, CancelFlag, DownscaleBudget, NoOpReporter};
use topo_core::error::TopoError;
use topo_core::io::ImageUri;

#[test]
fn test_needs_downscale() {
    let budget = DownscaleBudget::default();
    assert!(budget.needs_downscale(9000, 6000, 1_000_000));
    assert!(!budget.needs_downscale(4000, 3000, 1_000_000));
    assert!(budget.needs_downscale(4000, 3000, 30 * 1024 * 1024));
}

#[test]
fn test_plan_large_photo() {
    let plan = DownscaleBudget::default().plan(9000, 6000);
    // One coarse 0.6 step to 5400x3600, then a precise step to the 4096 ceiling.
    assert_eq!(plan.steps.len(), 2);
    assert_eq!((plan.steps[0].width, plan.steps[0].height), (5400, 3600));
    assert_relative_eq!(plan.steps[0].factor, 0.6);
    assert_eq!((plan.width, plan.height), (4096, 2731));
    assert_relative_eq!(plan.ratio, 0.6 * 4096.0 / 5400.0, epsilon = 1e-12);
}

#[test]
fn test_plan_pixel_budget_binds_for_square() {
    let plan = DownscaleBudget::default().plan(5000, 5000);
    // 5000 < 1.6 * 4096: no coarse step. sqrt(16e6 / 25e6) = 0.8 < 4096/5000.
    assert_eq!(plan.steps.len(), 1);
    assert_eq!((plan.width, plan.height), (4000, 4000));
    assert!(plan.width as u64 * plan.height as u64 <= 16_000_000);
}

#[test]
fn test_plan_within_targets_is_empty() {
    let plan = DownscaleBudget::default().plan(3000, 2000);
    assert!(plan.is_empty());
    assert_eq!(plan.ratio, 1.0);
    assert_eq!((plan.width, plan.height), (3000, 2000));
}

#[test]
fn test_plan_huge_photo_has_several_coarse_steps() {
    let plan = DownscaleBudget::default().plan(40_000, 30_000);
    assert!(plan.steps.len() > 3);
    assert!(plan.width.max(plan.height) <= 4096);
    for pair in plan.steps.windows(2) {
        assert!(pair[1].width <= pair[0].width);
    }
}

#[test]
fn test_budget_validation() {
    assert!(DownscaleBudget::default().validate().is_ok());
    let bad = DownscaleBudget {
        step_factor: 1.0,
        ..DownscaleBudget::default()
    };
    assert!(matches!(bad.validate(), Err(TopoError::Config(_))));
    let bad = DownscaleBudget {
        target_long_side: 0,
        ..DownscaleBudget::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn test_run_plan_keeps_only_final_image() {
    let processor = MockProcessor::new(9000, 6000, 1);
    let plan = DownscaleBudget::default().plan(9000, 6000);
    let source = ImageUri::new("photo.jpg");

    let out = run_plan(&source, &plan, &processor, &CancelFlag::new(), &NoOpReporter).unwrap();
    assert_eq!(processor.resize_calls(), 2);
    assert_eq!(processor.live_images(), vec![out.image.clone()]);
    assert_eq!((out.width, out.height), (4096, 2731));
    assert_relative_eq!(out.ratio, plan.ratio);
}

#[test]
fn test_run_plan_failure_cleans_up() {
    let mut processor = MockProcessor::new(40_000, 30_000, 1);
    processor.fail_resize_at = Some(3);
    let plan = DownscaleBudget::default().plan(40_000, 30_000);

    let err = run_plan(
        &ImageUri::new("photo.jpg"),
        &plan,
        &processor,
        &CancelFlag::new(),
        &NoOpReporter,
    )
    .unwrap_err();
    assert!(matches!(err, TopoError::ResizeFailure(_)));
    assert!(err.is_retryable());
    assert!(processor.live_images().is_empty());
}

#[test]
fn test_run_plan_cancel_between_steps() {
    let cancel = CancelFlag::new();
    let mut processor = MockProcessor::new(40_000, 30_000, 1);
    processor.cancel_after_resize = Some((2, cancel.clone()));
    let plan = DownscaleBudget::default().plan(40_000, 30_000);

    let err = run_plan(&ImageUri::new("photo.jpg"), &plan, &processor, &cancel, &NoOpReporter)
        .unwrap_err();
    assert!(err.is_silent());
    assert_eq!(processor.resize_calls(), 2);
    assert!(processor.live_images().is_empty());
}

#[test]
fn test_run_plan_cancelled_up_front() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let processor = MockProcessor::new(9000, 6000, 1);
    let plan = DownscaleBudget::default().plan(9000, 6000);

    let err = run_plan(&ImageUri::new("photo.jpg"), &plan, &processor, &cancel, &NoOpReporter)
        .unwrap_err();
    assert!(matches!(err, TopoError::Cancelled));
    assert_eq!(processor.resize_calls(), 0);
}

#[test]
fn test_run_empty_plan_returns_source() {
    let processor = MockProcessor::new(100, 100, 1);
    let plan = DownscaleBudget::default().plan(100, 100);
    let source = ImageUri::new("small.png");
    let out = run_plan(&source, &plan, &processor, &CancelFlag::new(), &NoOpReporter).unwrap();
    assert_eq!(out.image, source);
    assert_eq!(out.ratio, 1.0);
}
