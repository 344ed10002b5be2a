use orbitflow_core::{PixelRect, PlaneRect};

/// An immutable unit of tiled work: one full-height column strip of a frame.
///
/// Jobs of one frame cover disjoint pixel columns, which is the safety
/// argument for letting them run concurrently — no two jobs ever produce
/// data for the same grid index. Each job carries the frame rect pair it
/// was cut from so the fill derives its mapping exactly as a whole-frame
/// pass would (see `engine::fill_strip`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileJob {
    /// The columns this job fills, in absolute frame pixels.
    pub strip: PixelRect,
    /// Pixel rect of the whole frame.
    pub frame_pixel: PixelRect,
    /// Plane rect matching `frame_pixel`.
    pub frame_plane: PlaneRect,
    pub max_iterations: u32,
}

impl TileJob {
    pub fn pixel_count(&self) -> usize {
        (self.strip.width() as usize) * (self.strip.height() as usize)
    }
}

/// Cut a frame into `workers` disjoint, contiguous, equal-width column
/// strips; the last strip absorbs the remainder. Degenerate cases (more
/// workers than columns) collapse to fewer strips rather than producing
/// empty jobs.
pub fn build_column_jobs(
    frame_pixel: &PixelRect,
    frame_plane: &PlaneRect,
    workers: usize,
    max_iterations: u32,
) -> Vec<TileJob> {
    let width = frame_pixel.width().max(0.0) as u32;
    let count = (workers.max(1) as u32).min(width.max(1));
    let base_width = width / count;

    (0..count)
        .map(|i| {
            let left = frame_pixel.left + (i * base_width) as f64;
            let right = if i == count - 1 {
                frame_pixel.right
            } else {
                frame_pixel.left + ((i + 1) * base_width) as f64
            };
            TileJob {
                strip: PixelRect::new(left, frame_pixel.top, right, frame_pixel.bottom),
                frame_pixel: *frame_pixel,
                frame_plane: *frame_plane,
                max_iterations,
            }
        })
        .collect()
}
