use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel space.
///
/// Corners are `f64` because drag and scroll events arrive with fractional
/// coordinates; the fill engine itself walks integer pixels inside
/// `[left, right) × [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// An axis-aligned rectangle on the complex plane.
///
/// Always produced in a matching pair with a [`PixelRect`] so corresponding
/// corners map to each other under the viewport transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Plane-space framing used to seed the fractal rectangle before any pan or
/// zoom has been applied, kept bit-for-bit for compatibility with persisted
/// configurations.
pub const SEED_FRAME: PlaneRect = PlaneRect {
    left: -2.0,
    top: -1.0,
    right: 1.0,
    bottom: 1.0,
};

impl PixelRect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// A rect covering a full `width × height` image, anchored at the origin.
    pub fn full_image(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

impl PlaneRect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}
