use tracing::warn;

use orbitflow_core::{escape_time, Complex, PixelRect, PlaneRect};

/// Per-axis plane units per pixel, derived from a matching rect pair.
#[inline]
fn region_scales(pixel: &PixelRect, plane: &PlaneRect) -> (f64, f64) {
    (
        plane.width() / pixel.width(),
        plane.height() / pixel.height(),
    )
}

/// The plane point sampled for integer pixel `(x, y)`.
///
/// Interpolates directly between the rect pair's corners — deliberately
/// independent of `Viewport`, so sub-regions of one frame compute without
/// re-deriving offset/scale. Every fill path goes through this one
/// expression; that is what makes a strip fill bit-identical to the same
/// columns of a whole-frame fill.
#[inline]
fn point_at(x: i64, y: i64, x_scale: f64, y_scale: f64, plane: &PlaneRect) -> Complex {
    Complex::new(
        x as f64 * x_scale + plane.left,
        y as f64 * y_scale + plane.top,
    )
}

/// Evaluate escape times for every integer pixel of `pixel`, writing them
/// into `grid` at `y * grid_width + x`.
///
/// An index that would fall outside the grid — possible from float/int
/// rounding at region edges — is dropped with a diagnostic. One missing
/// pixel is visually negligible and gets refilled next frame; aborting the
/// pass would not be.
pub fn fill_region(
    pixel: &PixelRect,
    plane: &PlaneRect,
    max_iterations: u32,
    grid: &mut [u32],
    grid_width: usize,
) {
    let (x_scale, y_scale) = region_scales(pixel, plane);
    for y in pixel.top as i64..pixel.bottom as i64 {
        for x in pixel.left as i64..pixel.right as i64 {
            let n = escape_time(point_at(x, y, x_scale, y_scale, plane), max_iterations);
            let pos = y * grid_width as i64 + x;
            match usize::try_from(pos).ok().and_then(|p| grid.get_mut(p)) {
                Some(cell) => *cell = n,
                None => warn!(x, y, pos, "dropping out-of-range grid write"),
            }
        }
    }
}

/// Evaluate escape times for a full-height column strip of a frame,
/// returning them in a strip-local row-major buffer (stride = strip width).
///
/// Scales and the per-pixel expression derive from the *frame* rect pair
/// with absolute pixel coordinates, never from the strip alone: deriving
/// them per strip would shift every sample by a rounding error and make
/// tiled output diverge from a naive fill.
pub fn fill_strip(
    frame_pixel: &PixelRect,
    frame_plane: &PlaneRect,
    strip: &PixelRect,
    max_iterations: u32,
) -> Vec<u32> {
    let (x_scale, y_scale) = region_scales(frame_pixel, frame_plane);
    let strip_w = (strip.right as i64 - strip.left as i64).max(0) as usize;
    let strip_h = (strip.bottom as i64 - strip.top as i64).max(0) as usize;
    let mut data = Vec::with_capacity(strip_w * strip_h);
    for y in strip.top as i64..strip.bottom as i64 {
        for x in strip.left as i64..strip.right as i64 {
            data.push(escape_time(
                point_at(x, y, x_scale, y_scale, frame_plane),
                max_iterations,
            ));
        }
    }
    data
}
