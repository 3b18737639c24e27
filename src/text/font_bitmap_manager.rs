use std::collections::HashMap;

use anyhow::{anyhow, Result};
use fontdue::{Font, FontSettings, Metrics};
use glyphatlas_asset::Loader;

use crate::{config::Background, glyph::GlyphBitmap};

use super::source::{Fill, GlyphRequest, GlyphSource};

/// horizontal shift per texel above the baseline for faux italic
const ITALIC_SLANT: f64 = 0.2;

// one parsed font per loaded family; glyphs are rasterized on request and not kept
pub struct FontBitmapManager {
    fonts: HashMap<String, Font>,
}

impl FontBitmapManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Parses every family the loader holds.
    pub fn from_loader(loader: &Loader) -> Result<Self> {
        let mut manager = Self::new();
        for family in loader.families() {
            let asset = loader.get_font_by_family(family)?;
            manager.add_font(family, asset.bytes)?;
        }
        Ok(manager)
    }

    pub fn add_font(&mut self, family: &str, bytes: Vec<u8>) -> Result<()> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|err| anyhow!("Couldn't parse font '{}': {}", family, err))?;
        self.fonts.insert(family.to_string(), font);
        Ok(())
    }

    fn font(&self, family: &str) -> Result<&Font> {
        self.fonts
            .get(family)
            .ok_or(anyhow!("Font family '{}' isn't loaded", family))
    }

    pub fn rasterize(&self, request: &GlyphRequest) -> Result<GlyphBitmap> {
        let font = self.font(&request.font_name)?;
        if font.lookup_glyph_index(request.character) == 0 && !request.character.is_whitespace() {
            return Err(anyhow!(
                "'{}' has no glyph for '{}'",
                request.font_name,
                request.character
            ));
        }

        let (metrics, coverage) = font.rasterize(request.character, request.size);
        let coverage = Coverage::new(&metrics, coverage, request);

        let padding = request.padding;
        let base_width = metrics.advance_width.ceil() as f64;
        let ink_width = (base_width * request.scale_x).ceil() as u32;
        let ink_height = (metrics.height as f64 * request.scale_y).ceil() as u32;
        let width = ink_width + padding;
        let height = ink_height + padding;

        let data = paint(&coverage, request, width, height);

        let advance = match request.fill {
            Fill::DistanceField => width as i32,
            Fill::Plain { .. } => ink_width as i32,
        };
        log::debug!(
            "rasterized '{}' at {}px: {}x{}, ascent {}",
            request.character,
            request.size,
            width,
            height,
            coverage.ascent
        );

        Ok(GlyphBitmap::new(width, height, data, advance, coverage.ascent, padding))
    }
}

impl Default for FontBitmapManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphSource for FontBitmapManager {
    fn has_font(&self, font_name: &str) -> bool {
        self.fonts.contains_key(font_name)
    }

    async fn render(&self, request: &GlyphRequest) -> Result<GlyphBitmap> {
        self.rasterize(request)
    }
}

/// fontdue coverage positioned relative to the glyph's advance box, top at the ink top
struct Coverage {
    data: Vec<u8>,
    width: usize,
    height: usize,
    xmin: i32,
    ascent: i32,
    bold: bool,
    italic: bool,
}

impl Coverage {
    fn new(metrics: &Metrics, data: Vec<u8>, request: &GlyphRequest) -> Self {
        Self {
            data,
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ascent: metrics.ymin + metrics.height as i32,
            bold: request.bold,
            italic: request.italic,
        }
    }

    // nearest neighbour in unscaled glyph space
    fn sample(&self, x: f64, y: f64) -> u8 {
        let gy = y.floor() as i64;
        let mut gx = x - self.xmin as f64;
        if self.italic {
            gx -= (self.height as f64 - gy as f64) * ITALIC_SLANT;
        }
        let gx = gx.floor() as i64;
        let value = self.at(gx, gy);
        if self.bold {
            value.max(self.at(gx - 1, gy))
        } else {
            value
        }
    }

    fn at(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }
}

// the ink origin sits at (padding / 2, padding / 2); overhang left of it lands in the padding
fn paint(coverage: &Coverage, request: &GlyphRequest, width: u32, height: u32) -> Vec<u8> {
    let origin = (request.padding / 2) as f64;
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let local_x = (x as f64 - origin) / request.scale_x;
            let local_y = (y as f64 - origin) / request.scale_y;
            data.extend_from_slice(&shade(request.fill, coverage.sample(local_x, local_y)));
        }
    }
    data
}

fn shade(fill: Fill, coverage: u8) -> [u8; 4] {
    match fill {
        Fill::DistanceField => [coverage, coverage, coverage, coverage],
        Fill::Plain { color, background } => {
            let blend = |channel: u8| (channel as u32 * coverage as u32 + 127) / 255;
            match background {
                Background::Transparent => [color.r, color.g, color.b, coverage],
                Background::Black => [
                    blend(color.r) as u8,
                    blend(color.g) as u8,
                    blend(color.b) as u8,
                    255,
                ],
            }
        }
    }
}
