use serde::{Deserialize, Serialize};

use crate::{atlas::PackedLayout, config::AtlasConfig, glyph::GlyphBitmap};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Placement of one glyph: where it lives in the atlas and where its quad goes
/// relative to the text cursor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphRecord {
    /// codepoint
    pub index: u32,
    /// normalized, V = 0 at the bottom of the atlas; height is negative
    pub uv: Rect,
    /// relative to the cursor on the baseline, Y up; height is negative
    pub vert: Rect,
    pub advance: i32,
    /// glyphs are never rotated in the atlas
    pub flipped: bool,
}

impl GlyphRecord {
    pub fn new(
        character: char,
        glyph: &GlyphBitmap,
        (x, y): (u32, u32),
        layout: &PackedLayout,
        config: &AtlasConfig,
    ) -> Self {
        let (atlas_width, atlas_height) = (layout.width as f64, layout.height as f64);
        let (width, height) = (glyph.width as f64, glyph.height as f64);

        // where the glyph ends up once the whole atlas has been mirrored
        let pixel_x = if config.mirror_x {
            atlas_width - (x as f64 + width)
        } else {
            x as f64
        };
        let pixel_y = if config.mirror_y {
            atlas_height - (y as f64 + height)
        } else {
            y as f64
        };

        let v_top = 1.0 - pixel_y / atlas_height;
        let v_bottom = 1.0 - (pixel_y + height) / atlas_height;
        let half_padding = glyph.padding as f64 / 2.0;

        Self {
            index: character as u32,
            uv: Rect {
                x: pixel_x / atlas_width,
                y: v_top,
                width: width / atlas_width,
                height: v_bottom - v_top,
            },
            vert: Rect {
                x: -half_padding,
                y: half_padding + glyph.ascent as f64 * config.scale_y,
                width,
                height: -height,
            },
            advance: glyph.advance,
            flipped: false,
        }
    }
}

/// One record per character, in character order.
pub fn emit(
    layout: &PackedLayout,
    glyphs: &[GlyphBitmap],
    characters: &[char],
    config: &AtlasConfig,
) -> Vec<GlyphRecord> {
    assert!(
        characters.len() == glyphs.len() && glyphs.len() == layout.positions.len(),
        "characters, glyphs and positions must line up"
    );
    characters
        .iter()
        .zip(glyphs)
        .zip(&layout.positions)
        .map(|((&character, glyph), &position)| {
            GlyphRecord::new(character, glyph, position, layout, config)
        })
        .collect()
}

pub fn to_json(records: &[GlyphRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
