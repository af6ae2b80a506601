use topo_core::config::{CropConfig, EngineConfig, ViewConfig};
use topo_core::error::TopoError;
use topo_core::geometry::{FitMode, Viewport};
use topo_core::transform::ScaleLimits;

#[test]
fn test_default_config_round_trips_through_toml() {
    let config = EngineConfig::default();
    let text = config.to_toml_string().unwrap();
    let parsed = EngineConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_config_uses_defaults() {
    let config = EngineConfig::from_toml_str(
        r#"
        [view]
        fit = "Contain"

        [downscale]
        max_pixels = 1000
        "#,
    )
    .unwrap();
    assert_eq!(config.view.fit, FitMode::Contain);
    assert_eq!(config.view.limits, ScaleLimits::default());
    assert_eq!(config.downscale.max_pixels, 1000);
    assert_eq!(config.downscale.target_long_side, 4096);
    assert_eq!(config.crop, CropConfig::default());
}

#[test]
fn test_invalid_limits_rejected() {
    let err = EngineConfig::from_toml_str(
        r#"
        [crop.limits]
        min = 3.0
        max = 2.0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, TopoError::Config(_)));
}

#[test]
fn test_malformed_toml_rejected() {
    let err = EngineConfig::from_toml_str("[view\nfit = ").unwrap_err();
    assert!(matches!(err, TopoError::Config(_)));
}

#[test]
fn test_overshoot_range() {
    let view = ViewConfig {
        pinch_overshoot: 1.0,
        ..ViewConfig::default()
    };
    assert!(view.validate().is_err());
}

#[test]
fn test_crop_frame_for_aspect() {
    let crop = CropConfig {
        frame_aspect: 4.0 / 3.0,
        ..CropConfig::default()
    };
    let frame = crop.frame_for(Viewport::new(390.0, 844.0)).unwrap();
    assert!((frame.width - 390.0).abs() < 1e-9);
    assert!((frame.height - 292.5).abs() < 1e-9);
    assert_eq!(crop.view_config().limits, crop.limits);
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topo.toml");
    std::fs::write(&path, "[crop]\nframe_aspect = 0.75\n").unwrap();
    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.crop.frame_aspect, 0.75);

    assert!(matches!(
        EngineConfig::load(&dir.path().join("missing.toml")),
        Err(TopoError::Io(_))
    ));
}
