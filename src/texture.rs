use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::{atlas::PackedLayout, config::Background, glyph::GlyphBitmap};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    pub background: Background,
    pub mirror_x: bool,
    pub mirror_y: bool,
}

/// Row-major RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            data,
            width,
            height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = self.offset(x, y);
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ]
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Copies `glyph` in verbatim with its top-left at (x, y). No blending.
    pub fn blit(&mut self, glyph: &GlyphBitmap, x: u32, y: u32) {
        assert!(
            x + glyph.width <= self.width && y + glyph.height <= self.height,
            "{}x{} glyph at ({}, {}) leaves the {}x{} texture",
            glyph.width,
            glyph.height,
            x,
            y,
            self.width,
            self.height
        );
        let row_len = glyph.width as usize * 4;
        for row in 0..glyph.height {
            let offset = self.offset(x, y + row);
            self.data[offset..offset + row_len].copy_from_slice(glyph.row(row));
        }
    }

    /// Reflects the whole image left to right.
    pub fn mirror_x(&mut self) {
        let stride = self.width as usize * 4;
        for row in self.data.chunks_exact_mut(stride.max(1)) {
            let width = row.len() / 4;
            for x in 0..width / 2 {
                let (left, right) = (x * 4, (width - 1 - x) * 4);
                for c in 0..4 {
                    row.swap(left + c, right + c);
                }
            }
        }
    }

    /// Reflects the whole image top to bottom.
    pub fn mirror_y(&mut self) {
        let stride = self.width as usize * 4;
        let height = self.height as usize;
        for y in 0..height / 2 {
            let (top, bottom) = self.data.split_at_mut((height - 1 - y) * stride);
            top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
        }
    }

    /// Renders the atlas: background, every glyph at its packed position, then
    /// any mirroring applied to the image as a whole.
    pub fn from_layout(
        layout: &PackedLayout,
        glyphs: &[GlyphBitmap],
        options: &ComposeOptions,
    ) -> Self {
        assert_eq!(
            layout.positions.len(),
            glyphs.len(),
            "layout and glyph count differ"
        );
        let mut texture = Self::filled(layout.width, layout.height, options.background.pixel());
        for (glyph, &(x, y)) in glyphs.iter().zip(&layout.positions) {
            texture.blit(glyph, x, y);
        }
        if options.mirror_x {
            texture.mirror_x();
        }
        if options.mirror_y {
            texture.mirror_y();
        }
        texture
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let image = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or(anyhow!("texture buffer doesn't match {}x{}", self.width, self.height))?;
        image
            .save(path)
            .with_context(|| format!("write atlas image {:?}", path))?;
        log::info!("wrote {}x{} atlas to {:?}", self.width, self.height, path);
        Ok(())
    }
}
