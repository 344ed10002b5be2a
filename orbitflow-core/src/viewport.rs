use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;
use crate::rect::{PixelRect, PlaneRect};

/// Multiplier applied to `scale` for one step of zooming in.
pub const ZOOM_IN_FACTOR: f64 = 1.05;

/// Multiplier applied to `scale` for one step of zooming out.
pub const ZOOM_OUT_FACTOR: f64 = 0.95;

/// The affine mapping between pixel space and the complex plane.
///
/// `offset` is the plane coordinate sitting under the pixel origin;
/// `scale` is pixels per plane unit and is strictly positive. Pan and zoom
/// mutate these two fields only; a render pass snapshots the viewport at
/// frame start and never races with it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// Plane coordinate at pixel `(0, 0)`.
    pub offset: Complex,

    /// Pixels per plane unit. Invariant: `scale > 0` and finite.
    scale: f64,
}

/// Deserialization re-validates so a hand-edited session file cannot smuggle
/// in a non-positive scale.
impl<'de> Deserialize<'de> for Viewport {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            offset: Complex,
            scale: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Viewport::new(raw.offset, raw.scale).map_err(serde::de::Error::custom)
    }
}

impl Viewport {
    /// Default pan offset, locked in so persisted view configurations keep
    /// meaning the same place.
    pub const DEFAULT_OFFSET: Complex = Complex { re: -4.0, im: -2.0 };

    /// Default zoom: 120 pixels per plane unit.
    pub const DEFAULT_SCALE: f64 = 120.0;

    pub fn new(offset: Complex, scale: f64) -> crate::Result<Self> {
        if scale <= 0.0 || !scale.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("scale must be positive and finite, got {scale}"),
            });
        }
        Ok(Self { offset, scale })
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Map a pixel coordinate to its point on the complex plane.
    ///
    /// This is the single source-of-truth transform:
    /// `plane = pixel / scale + offset`. No inverse exists because pan and
    /// zoom operate on `offset` and `scale` directly.
    #[inline]
    pub fn to_plane(&self, px: f64, py: f64) -> Complex {
        Complex::new(px / self.scale + self.offset.re, py / self.scale + self.offset.im)
    }

    /// Shift the view by a pixel delta, as accumulated during a drag.
    ///
    /// `dx`/`dy` are the per-event movement, not a gesture total; dragging
    /// content rightward moves the visible plane window leftward.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset.re -= dx / self.scale;
        self.offset.im -= dy / self.scale;
    }

    /// Zoom by `factor`, keeping the plane point under `(px, py)` fixed on
    /// screen.
    ///
    /// The anchor point is sampled before and after the scale change, and
    /// the drift between the two is folded back into `offset`. The second
    /// sample must use the new scale; sampling both with the old scale
    /// cancels the correction and makes the zoom slide toward the origin.
    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) -> crate::Result<()> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(CoreError::InvalidZoomFactor(factor));
        }
        let before = self.to_plane(px, py);
        self.scale *= factor;
        let after = self.to_plane(px, py);
        self.offset += before - after;
        Ok(())
    }

    /// Build the matching full-frame rectangle pair for a `width × height`
    /// image: the pixel rect's corners and the plane rect's corners map to
    /// each other under this viewport.
    pub fn frame_rects(&self, width: u32, height: u32) -> (PixelRect, PlaneRect) {
        let pixel = PixelRect::full_image(width, height);
        let top_left = self.to_plane(pixel.left, pixel.top);
        let bottom_right = self.to_plane(pixel.right, pixel.bottom);
        let plane = PlaneRect::new(top_left.re, top_left.im, bottom_right.re, bottom_right.im);
        (pixel, plane)
    }
}

impl Default for Viewport {
    /// The initial view of the set.
    fn default() -> Self {
        Self {
            offset: Self::DEFAULT_OFFSET,
            scale: Self::DEFAULT_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn default_view_constants() {
        let vp = Viewport::default();
        assert_eq!(vp.offset, Complex::new(-4.0, -2.0));
        assert_eq!(vp.scale(), 120.0);
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(Viewport::new(Complex::ZERO, 0.0).is_err());
        assert!(Viewport::new(Complex::ZERO, -1.0).is_err());
        assert!(Viewport::new(Complex::ZERO, f64::NAN).is_err());
        assert!(Viewport::new(Complex::ZERO, f64::INFINITY).is_err());
    }

    #[test]
    fn to_plane_at_origin() {
        let vp = Viewport::new(Complex::new(-2.0, -1.0), 2.0).unwrap();
        let p = vp.to_plane(0.0, 0.0);
        assert!((p.re - (-2.0)).abs() < EPSILON);
        assert!((p.im - (-1.0)).abs() < EPSILON);
    }

    #[test]
    fn to_plane_scales_pixels() {
        let vp = Viewport::new(Complex::new(-2.0, -1.0), 2.0).unwrap();
        let p = vp.to_plane(3.0, 3.0);
        assert!((p.re - (-0.5)).abs() < EPSILON);
        assert!((p.im - 0.5).abs() < EPSILON);
    }

    #[test]
    fn pan_moves_offset_against_drag() {
        let mut vp = Viewport::new(Complex::ZERO, 100.0).unwrap();
        vp.pan(50.0, -25.0);
        assert!((vp.offset.re - (-0.5)).abs() < EPSILON);
        assert!((vp.offset.im - 0.25).abs() < EPSILON);
    }

    #[test]
    fn pan_accumulates_incrementally() {
        // Two half-deltas must equal one full delta.
        let mut a = Viewport::default();
        let mut b = Viewport::default();
        a.pan(30.0, 10.0);
        b.pan(15.0, 5.0);
        b.pan(15.0, 5.0);
        assert!((a.offset.re - b.offset.re).abs() < EPSILON);
        assert!((a.offset.im - b.offset.im).abs() < EPSILON);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut vp = Viewport::default();
        let anchor = (321.0, 123.0);
        let before = vp.to_plane(anchor.0, anchor.1);
        vp.zoom_at(anchor.0, anchor.1, ZOOM_IN_FACTOR).unwrap();
        let after = vp.to_plane(anchor.0, anchor.1);
        assert!((before.re - after.re).abs() < EPSILON);
        assert!((before.im - after.im).abs() < EPSILON);
    }

    #[test]
    fn zoom_round_trip_restores_view() {
        let mut vp = Viewport::default();
        let original = vp;
        for factor in [ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR, 2.0, 0.125] {
            vp.zoom_at(200.5, 77.25, factor).unwrap();
            vp.zoom_at(200.5, 77.25, 1.0 / factor).unwrap();
            assert!((vp.scale() - original.scale()).abs() < EPSILON);
            assert!((vp.offset.re - original.offset.re).abs() < EPSILON);
            assert!((vp.offset.im - original.offset.im).abs() < EPSILON);
            vp = original;
        }
    }

    #[test]
    fn zoom_changes_scale_multiplicatively() {
        let mut vp = Viewport::default();
        vp.zoom_at(0.0, 0.0, 1.05).unwrap();
        assert!((vp.scale() - 126.0).abs() < EPSILON);
    }

    #[test]
    fn zoom_rejects_bad_factors() {
        let mut vp = Viewport::default();
        assert!(vp.zoom_at(0.0, 0.0, 0.0).is_err());
        assert!(vp.zoom_at(0.0, 0.0, -1.0).is_err());
        assert!(vp.zoom_at(0.0, 0.0, f64::NAN).is_err());
        // A rejected zoom must leave the viewport untouched.
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn frame_rects_corners_correspond() {
        let vp = Viewport::new(Complex::new(-2.0, -1.0), 2.0).unwrap();
        let (pixel, plane) = vp.frame_rects(4, 4);
        assert_eq!(pixel.width(), 4.0);
        assert!((plane.left - (-2.0)).abs() < EPSILON);
        assert!((plane.top - (-1.0)).abs() < EPSILON);
        assert!((plane.right - 0.0).abs() < EPSILON);
        assert!((plane.bottom - 1.0).abs() < EPSILON);
    }

    #[test]
    fn serde_round_trip() {
        let mut vp = Viewport::default();
        vp.pan(12.0, -7.0);
        vp.zoom_at(100.0, 100.0, 1.05).unwrap();
        let json = serde_json::to_string(&vp).unwrap();
        let back: Viewport = serde_json::from_str(&json).unwrap();
        assert_eq!(vp, back);
    }

    #[test]
    fn serde_rejects_invalid_scale() {
        let json = r#"{"offset":{"re":0.0,"im":0.0},"scale":-2.0}"#;
        assert!(serde_json::from_str::<Viewport>(json).is_err());
    }
}
