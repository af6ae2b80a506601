use crate::geometry::{ContentImage, Viewport};

/// Largest allowed `|translate|` per axis at one scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanBounds {
    pub max_x: f64,
    pub max_y: f64,
}

impl PanBounds {
    pub fn clamp_x(&self, translate_x: f64) -> f64 {
        translate_x.clamp(-self.max_x, self.max_x)
    }

    pub fn clamp_y(&self, translate_y: f64) -> f64 {
        translate_y.clamp(-self.max_y, self.max_y)
    }

    pub fn contains(&self, translate_x: f64, translate_y: f64) -> bool {
        translate_x.abs() <= self.max_x && translate_y.abs() <= self.max_y
    }
}

/// Pan bounds that keep the scaled content covering the viewport.
///
/// An axis where the scaled content is narrower than the viewport gets a bound
/// of zero, which keeps the content centered on it. Bounds depend on scale and
/// must be recomputed after every scale change.
pub fn max_translate(scale: f64, content: &ContentImage, viewport: &Viewport) -> PanBounds {
    let scaled_width = content.display_width * scale;
    let scaled_height = content.display_height * scale;

    PanBounds {
        max_x: non_negative((scaled_width - viewport.width) / 2.0),
        max_y: non_negative((scaled_height - viewport.height) / 2.0),
    }
}

// NaN and infinite spans collapse to zero.
fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative_rejects_degenerate_spans() {
        assert_eq!(non_negative(f64::NAN), 0.0);
        assert_eq!(non_negative(f64::INFINITY), 0.0);
        assert_eq!(non_negative(-3.0), 0.0);
        assert_eq!(non_negative(2.5), 2.5);
    }
}
