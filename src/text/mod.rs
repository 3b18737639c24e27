// glyph side of the pipeline:
// - a source turns characters into bitmaps (fontdue by default)
// - bitmaps optionally become distance fields
// - packed bitmaps get placement records for the renderer

pub mod font_bitmap_manager;
pub mod metadata;
pub mod sdf;
pub mod source;
