use serde::{Deserialize, Serialize};

use crate::error::{Result, TopoError};

/// A point in screen space, relative to the top-left corner of the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A zoom/pan independent location in image space.
///
/// Coordinates are fractions of the image width and height. The mapper may
/// produce values outside `[0, 1]` for screen points that miss the image;
/// only in-bounds points are ever persisted.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Build a point that is safe to persist.
    pub fn new(x: f64, y: f64) -> Result<Self> {
        let p = Self { x, y };
        if !x.is_finite() || !y.is_finite() {
            return Err(TopoError::InvalidGeometry(format!(
                "non-finite normalized point ({x}, {y})"
            )));
        }
        if !p.is_within_image() {
            return Err(TopoError::OutsideImage { x, y });
        }
        Ok(p)
    }

    pub fn is_within_image(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Width and height of an on-screen area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides finite and strictly positive.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

/// The fixed on-screen frame an image is viewed through.
pub type Viewport = Size;

/// The crop window. Its aspect ratio is the aspect of the output image.
pub type CropFrame = Size;

impl Size {
    /// Largest frame with the given aspect (width / height) that fits inside `self`.
    pub fn inscribed(&self, aspect: f64) -> Result<Size> {
        if !self.is_measured() {
            return Err(TopoError::NotReady("viewport has no measured size".into()));
        }
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(TopoError::InvalidGeometry(format!(
                "frame aspect must be positive, got {aspect}"
            )));
        }
        if self.width / self.height > aspect {
            Ok(Size::new(self.height * aspect, self.height))
        } else {
            Ok(Size::new(self.width, self.width / aspect))
        }
    }
}

/// How an image is fitted against a viewport at `scale = 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitMode {
    /// Whole image visible, letterboxed on one axis.
    Contain,
    /// Image fills the viewport, overflow hidden.
    #[default]
    Cover,
}

impl std::fmt::Display for FitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contain => write!(f, "contain"),
            Self::Cover => write!(f, "cover"),
        }
    }
}

/// The image being panned and zoomed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentImage {
    pub original_width: u32,
    pub original_height: u32,
    /// Size the image occupies on screen at `scale = 1`.
    pub display_width: f64,
    pub display_height: f64,
}

impl ContentImage {
    /// Fit an image of the given pixel size against `viewport`.
    pub fn fit(
        original_width: u32,
        original_height: u32,
        viewport: Viewport,
        mode: FitMode,
    ) -> Result<Self> {
        if original_width == 0 || original_height == 0 {
            return Err(TopoError::NotReady(format!(
                "image has no measured dimensions ({original_width}x{original_height})"
            )));
        }
        if !viewport.is_measured() {
            return Err(TopoError::NotReady("viewport has no measured size".into()));
        }

        let fx = viewport.width / original_width as f64;
        let fy = viewport.height / original_height as f64;
        let factor = match mode {
            FitMode::Contain => fx.min(fy),
            FitMode::Cover => fx.max(fy),
        };

        Ok(Self {
            original_width,
            original_height,
            display_width: original_width as f64 * factor,
            display_height: original_height as f64 * factor,
        })
    }

    /// Display size is known and positive.
    pub fn is_measured(&self) -> bool {
        self.original_width > 0
            && self.original_height > 0
            && Size::new(self.display_width, self.display_height).is_measured()
    }

    pub(crate) fn ensure_measured(&self) -> Result<()> {
        if self.is_measured() {
            Ok(())
        } else {
            Err(TopoError::NotReady(format!(
                "content dimensions unset (original {}x{}, display {}x{})",
                self.original_width, self.original_height, self.display_width, self.display_height
            )))
        }
    }

    pub fn display_size(&self) -> Size {
        Size::new(self.display_width, self.display_height)
    }
}
