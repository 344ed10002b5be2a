use orbitflow_core::PixelRect;

/// Per-pixel escape-time counts for a full frame, row-major.
///
/// The grid is sized once at startup and reused across frames; each frame
/// fully overwrites the cells its fill pass covers before the frame is
/// colorized. Keeping raw counts separate from colored pixels means a color
/// mode switch never forces a recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationGrid {
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl IterationGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            data: vec![0; size],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// The count stored for pixel `(x, y)`.
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> u32 {
        self.data[(y * self.width + x) as usize]
    }

    /// Copy a full-height column strip into its place in the grid.
    ///
    /// `strip_data` is row-major with stride `strip.width()`. Rows or
    /// columns falling outside the grid are clipped.
    pub fn blit_columns(&mut self, strip: &PixelRect, strip_data: &[u32]) {
        let x0 = (strip.left.max(0.0) as usize).min(self.width as usize);
        let x1 = (strip.right.max(0.0) as usize).min(self.width as usize);
        let strip_w = strip.width() as usize;
        if x1 <= x0 || strip_w == 0 {
            return;
        }
        let copy_w = x1 - x0;
        for (row, src_row) in strip_data.chunks_exact(strip_w).enumerate() {
            if row >= self.height as usize {
                break;
            }
            let dst_start = row * self.width as usize + x0;
            self.data[dst_start..dst_start + copy_w].copy_from_slice(&src_row[..copy_w]);
        }
    }
}
