/// Relative tolerance for screen/image round trips.
pub const ROUND_TRIP_EPSILON: f64 = 1e-6;

/// Default lower scale limit for viewing and cropping.
pub const DEFAULT_MIN_SCALE: f64 = 1.0;

/// Default upper scale limit for viewing and cropping.
pub const DEFAULT_MAX_SCALE: f64 = 4.0;

/// Default crop frame aspect ratio (width / height).
pub const DEFAULT_FRAME_ASPECT: f64 = 1.0;

/// Pixel count above which a source photo is downscaled before cropping.
pub const DEFAULT_MAX_PIXELS: u64 = 40_000_000;

/// File size above which a source photo is downscaled before cropping. Default: 20 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 20 * 1024 * 1024;

/// Long side the final precise resize aims for.
pub const DEFAULT_TARGET_LONG_SIDE: u32 = 4096;

/// Pixel count the final precise resize aims for.
pub const DEFAULT_TARGET_PIXELS: u64 = 16_000_000;

/// Per-step factor of the coarse halving loop.
pub const DEFAULT_STEP_FACTOR: f64 = 0.6;

/// Coarse steps run while the long side exceeds this multiple of the target.
pub const DEFAULT_STEP_THRESHOLD: f64 = 1.6;

/// Upper bound on coarse resize steps, reached only by absurd inputs.
pub const MAX_RESIZE_STEPS: usize = 32;

/// Name prefix of intermediate files written by the image processor.
pub const SCRATCH_PREFIX: &str = "topo-";
