use crate::glyph::GlyphBitmap;

/// Converts a glyph rendered at twice the target resolution into a half-size
/// signed distance field.
///
/// A texel is inside when its red channel is above 127. Distances are searched
/// only within a `falloff` window around each texel; anything farther from the
/// boundary saturates at `2 * falloff`. The result is grey with full alpha,
/// brighter inside the glyph, and crosses 127/128 on the outline.
pub fn to_distance_field(glyph: &GlyphBitmap, falloff: u32) -> GlyphBitmap {
    assert!(falloff > 0, "distance field falloff must be positive");

    let distances = signed_distances(glyph, falloff);
    let max_dist = (falloff * 2) as f64;
    let full = distances
        .iter()
        .flat_map(|&distance| {
            let value = normalize(distance as f64, max_dist);
            [value, value, value, 255]
        })
        .collect::<Vec<u8>>();

    let (data, width, height) = downsample(&full, glyph.width, glyph.height);
    let advance = width as i32 - (falloff * 2) as i32;
    log::debug!(
        "distance field {}x{} -> {}x{}, advance {}",
        glyph.width,
        glyph.height,
        width,
        height,
        advance
    );

    GlyphBitmap::new(width, height, data, advance, glyph.ascent, glyph.padding)
}

/// Bounded-radius signed distance per texel: negative inside, positive outside.
pub fn signed_distances(glyph: &GlyphBitmap, falloff: u32) -> Vec<f32> {
    let width = glyph.width as i64;
    let height = glyph.height as i64;
    let radius = falloff as i64;
    let max_dist = (falloff * 2) as f32;

    let inside = glyph
        .data
        .chunks_exact(4)
        .map(|pixel| pixel[0] > 127)
        .collect::<Vec<bool>>();

    let mut distances = Vec::with_capacity(inside.len());
    for y in 0..height {
        for x in 0..width {
            let here = inside[(y * width + x) as usize];
            let mut min_dist = max_dist;

            // window clipped to the bitmap, no wraparound
            for ny in (y - radius).max(0)..=(y + radius).min(height - 1) {
                for nx in (x - radius).max(0)..=(x + radius).min(width - 1) {
                    if inside[(ny * width + nx) as usize] == here {
                        continue;
                    }
                    let (dx, dy) = ((nx - x) as f32, (ny - y) as f32);
                    min_dist = min_dist.min((dx * dx + dy * dy).sqrt());
                }
            }

            distances.push(if here { -min_dist } else { min_dist });
        }
    }
    distances
}

/// Maps a signed distance onto 0..=255, inverted so the inside is bright.
pub fn normalize(distance: f64, max_dist: f64) -> u8 {
    let value = 255.0 - ((distance / max_dist) * 0.5 + 0.5) * 255.0;
    value.round().clamp(0.0, 255.0) as u8
}

/// 2x2 box filter, per channel. A trailing odd row or column is dropped.
pub fn downsample(data: &[u8], width: u32, height: u32) -> (Vec<u8>, u32, u32) {
    let new_width = width >> 1;
    let new_height = height >> 1;
    let stride = width as usize * 4;
    let mut result = vec![0u8; new_width as usize * new_height as usize * 4];

    for y in 0..new_height as usize {
        for x in 0..new_width as usize {
            let i = (y * new_width as usize + x) * 4;
            let src = y * 2 * stride + x * 2 * 4;
            for c in 0..4 {
                let sum = data[src + c] as u32
                    + data[src + 4 + c] as u32
                    + data[src + stride + c] as u32
                    + data[src + stride + 4 + c] as u32;
                // round half up
                result[i + c] = ((sum + 2) / 4) as u8;
            }
        }
    }

    (result, new_width, new_height)
}
