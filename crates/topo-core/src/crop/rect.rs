use serde::{Deserialize, Serialize};

use crate::error::{Result, TopoError};

/// A rectangle in original-image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub origin_x: u32,
    pub origin_y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(origin_x: u32, origin_y: u32, width: u32, height: u32) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// Clamp a rounded, possibly out-of-range rectangle into a `src_w` x `src_h`
    /// image: origin first, then size, per axis.
    ///
    /// Clamping in this order keeps `origin + size <= extent` whatever the
    /// rounding did, and never yields an empty side.
    pub fn clamped(origin_x: i64, origin_y: i64, width: i64, height: i64, src_w: u32, src_h: u32) -> Result<Self> {
        if src_w == 0 || src_h == 0 {
            return Err(TopoError::NotReady(format!(
                "image has no measured dimensions ({src_w}x{src_h})"
            )));
        }
        let (origin_x, width) = clamp_axis(origin_x, width, src_w);
        let (origin_y, height) = clamp_axis(origin_y, height, src_h);
        Ok(Self::new(origin_x, origin_y, width, height))
    }

    /// Validate the rect against source dimensions without correcting it.
    pub fn validated(&self, src_w: u32, src_h: u32) -> Result<CropRect> {
        if self.width == 0 || self.height == 0 {
            return Err(TopoError::CropOutOfBounds(
                "crop width and height must be > 0".into(),
            ));
        }

        if !self.fits_within(src_w, src_h) {
            return Err(TopoError::CropOutOfBounds(format!(
                "crop region ({},{} {}x{}) exceeds source dimensions ({src_w}x{src_h})",
                self.origin_x, self.origin_y, self.width, self.height
            )));
        }

        Ok(*self)
    }

    pub fn fits_within(&self, src_w: u32, src_h: u32) -> bool {
        self.right() <= src_w as u64 && self.bottom() <= src_h as u64
    }

    pub fn right(&self) -> u64 {
        self.origin_x as u64 + self.width as u64
    }

    pub fn bottom(&self) -> u64 {
        self.origin_y as u64 + self.height as u64
    }

    /// Carry the rect over to a copy of the image resized by `ratio`, whose
    /// dimensions are now `src_w` x `src_h`.
    pub fn rescaled(&self, ratio: f64, src_w: u32, src_h: u32) -> Result<CropRect> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(TopoError::InvalidGeometry(format!(
                "rescale ratio must be positive and finite, got {ratio}"
            )));
        }
        let scale = |v: u32| (v as f64 * ratio).round() as i64;
        Self::clamped(
            scale(self.origin_x),
            scale(self.origin_y),
            scale(self.width),
            scale(self.height),
            src_w,
            src_h,
        )
    }
}

impl std::fmt::Display for CropRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.origin_x, self.origin_y
        )
    }
}

/// `extent` must be at least 1.
fn clamp_axis(origin: i64, len: i64, extent: u32) -> (u32, u32) {
    let extent = extent as i64;
    let origin = origin.clamp(0, extent - 1);
    let len = len.clamp(1, extent - origin);
    (origin as u32, len as u32)
}
