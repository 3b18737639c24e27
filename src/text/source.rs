use crate::{
    config::{AtlasConfig, Background, Color},
    glyph::GlyphBitmap,
};

/// Padding baked into glyphs rendered for a plain (non distance field) atlas.
pub const PLAIN_PADDING: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    /// white coverage on transparent black, for the distance field stage
    DistanceField,
    Plain { color: Color, background: Background },
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRequest {
    pub character: char,
    pub font_name: String,
    /// pixel size to rasterize at, already supersampled when needed
    pub size: f32,
    pub scale_x: f64,
    pub scale_y: f64,
    pub bold: bool,
    pub italic: bool,
    pub padding: u32,
    pub fill: Fill,
}

impl GlyphRequest {
    /// Builds the request the pipeline sends for `character`. Distance field
    /// glyphs are rendered at twice the font size with `2 * falloff` padding.
    pub fn for_config(character: char, config: &AtlasConfig) -> Self {
        let (size, padding, fill) = if config.use_distance_field {
            (config.font_size * 2, config.falloff * 2, Fill::DistanceField)
        } else {
            (
                config.font_size,
                PLAIN_PADDING,
                Fill::Plain {
                    color: config.font_color,
                    background: config.normal_background,
                },
            )
        };
        Self {
            character,
            font_name: config.font_name.clone(),
            size: size as f32,
            scale_x: config.scale_x,
            scale_y: config.scale_y,
            bold: config.bold,
            italic: config.italic,
            padding,
            fill,
        }
    }
}

/// Produces rendered glyph bitmaps. Rendering may wait on font loading, so it's async.
#[allow(async_fn_in_trait)]
pub trait GlyphSource {
    fn has_font(&self, font_name: &str) -> bool;

    async fn render(&self, request: &GlyphRequest) -> anyhow::Result<GlyphBitmap>;
}
