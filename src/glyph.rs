/// A rendered glyph, row-major RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// horizontal cursor step
    pub advance: i32,
    /// texels above the baseline
    pub ascent: i32,
    /// margin baked in by the producing stage
    pub padding: u32,
}

impl GlyphBitmap {
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
        advance: i32,
        ascent: i32,
        padding: u32,
    ) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * 4,
            "glyph buffer doesn't match {}x{} RGBA",
            width,
            height
        );
        Self {
            width,
            height,
            data,
            advance,
            ascent,
            padding,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ]
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_and_row_addressing() {
        let data = (0..2 * 2 * 4).map(|v| v as u8).collect();
        let glyph = GlyphBitmap::new(2, 2, data, 2, 2, 0);
        assert_eq!(glyph.pixel(1, 1), [12, 13, 14, 15]);
        assert_eq!(glyph.row(1), &[8, 9, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    #[should_panic]
    fn mismatched_buffer_panics() {
        GlyphBitmap::new(3, 3, vec![0; 4], 0, 0, 0);
    }
}
