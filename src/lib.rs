pub mod atlas;
pub mod config;
pub mod generator;
pub mod glyph;
pub mod text;
pub mod texture;

pub use atlas::PackedLayout;
pub use config::{AtlasConfig, Background, CharacterSet, Color, ConfigError};
pub use generator::{GenerateError, GeneratedAtlas, Generator};
pub use glyph::GlyphBitmap;
pub use text::{
    metadata::GlyphRecord,
    source::{GlyphRequest, GlyphSource},
};
pub use texture::Texture;

// pipeline:
// characters -> GlyphSource -> bitmaps -> (distance field) -> pack -> compose + metadata
//
// everything after glyph acquisition is synchronous and stateless; the generator
// only keeps a flag so two runs can't interleave.
