/// Fully opaque black, the color a fresh buffer is filled with.
pub const OPAQUE_BLACK: u32 = 0xFF00_0000;

/// A row-major ARGB8888 pixel buffer representing a rendered frame.
///
/// Owned by the frame loop, handed out by reference to the display sink and,
/// on a save request, to the persistence sink. Sized once; resizing the
/// render surface is out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pub(crate) data: Vec<u32>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            data: vec![OPAQUE_BLACK; size],
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

    /// The packed ARGB pixels, row-major.
    #[inline]
    pub fn as_argb(&self) -> &[u32] {
        &self.data
    }

    /// The pixel at `(x, y)`.
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> u32 {
        self.data[(y * self.width + x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_black_opaque() {
        let buf = PixelBuffer::new(4, 4);
        assert_eq!(buf.as_argb().len(), 16);
        for &px in buf.as_argb() {
            assert_eq!(px, OPAQUE_BLACK);
        }
    }

    #[test]
    fn at_indexes_row_major() {
        let mut buf = PixelBuffer::new(3, 2);
        buf.data[4] = 0xFFAB_CDEF;
        assert_eq!(buf.at(1, 1), 0xFFAB_CDEF);
    }
}
