use crate::glyph::GlyphBitmap;

/// Where each bitmap went, in the order the bitmaps were added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedLayout {
    pub width: u32,
    pub height: u32,
    pub positions: Vec<(u32, u32)>,
}

/// Shelf packer: left to right, wrapping onto a new row when the seeded width runs out.
///
/// Rects are laid out in insertion order with `padding` texels between them and
/// `padding / 2` around the border. The width is seeded from the square root of
/// the padded area and is not revisited once placement starts.
#[derive(Debug)]
pub struct Atlas {
    rects: Vec<Rect>,
    padding: u32,
    power_of_two: bool,
    pub width: u32,
    pub height: u32,
}

impl Atlas {
    pub fn new(padding: u32, power_of_two: bool) -> Self {
        Self {
            rects: Vec::new(),
            padding,
            power_of_two,
            width: 0,
            height: 0,
        }
    }

    pub fn add(&mut self, w: u32, h: u32) {
        self.rects.push(Rect { x: 0, y: 0, w, h });
    }

    pub fn seed_width(&self) -> u32 {
        let padding = self.padding as u64;
        let (total_area, max_width) = self.rects.iter().fold((0u64, 0u64), |(area, max_w), rect| {
            let w = rect.w as u64 + padding;
            let h = rect.h as u64 + padding;
            (area + w * h, max_w.max(w))
        });
        let width = max_width.max(ceil_sqrt(total_area)) as u32;
        if self.power_of_two {
            width.next_power_of_two()
        } else {
            width
        }
    }

    pub fn pack(&mut self) -> PackedLayout {
        let margin = self.padding / 2;
        self.width = self.seed_width();

        let mut x = margin;
        let mut y = margin;
        let mut row_height = 0;
        for rect in self.rects.iter_mut() {
            // a rect as wide as the seed wraps even from an empty row
            if x + rect.w + self.padding > self.width {
                x = margin;
                y += row_height + self.padding;
                row_height = 0;
            }
            rect.x = x;
            rect.y = y;
            x += rect.w + self.padding;
            row_height = row_height.max(rect.h);
        }

        self.height = y + row_height + margin;
        if self.power_of_two {
            self.height = self.height.next_power_of_two();
        }
        log::debug!(
            "packed {} rects into {}x{}",
            self.rects.len(),
            self.width,
            self.height
        );

        PackedLayout {
            width: self.width,
            height: self.height,
            positions: self.rects.iter().map(|rect| (rect.x, rect.y)).collect(),
        }
    }
}

/// Packs glyph bitmaps by their dimensions, keeping input order.
pub fn pack(bitmaps: &[GlyphBitmap], padding: u32, power_of_two: bool) -> PackedLayout {
    let mut atlas = Atlas::new(padding, power_of_two);
    for bitmap in bitmaps {
        atlas.add(bitmap.width, bitmap.height);
    }
    atlas.pack()
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    /// Grows the rect by `amount` on every side, saturating at zero.
    pub fn padded(&self, amount: u32) -> Rect {
        let x = self.x.saturating_sub(amount);
        let y = self.y.saturating_sub(amount);
        Rect {
            x,
            y,
            w: self.x + self.w + amount - x,
            h: self.y + self.h + amount - y,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

fn ceil_sqrt(value: u64) -> u64 {
    let mut root = (value as f64).sqrt() as u64;
    while root * root < value {
        root += 1;
    }
    while root > 0 && (root - 1) * (root - 1) >= value {
        root -= 1;
    }
    root
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn three_glyph_shelf() {
        let mut atlas = Atlas::new(2, false);
        atlas.add(10, 10);
        atlas.add(20, 10);
        atlas.add(10, 10);

        // area = 12*12 + 22*12 + 12*12 = 552, ceil(sqrt) = 24 > max width 22
        assert_eq!(atlas.seed_width(), 24);
        let layout = atlas.pack();
        assert_eq!(layout.width, 24);
        // 13 + 20 + 2 > 24 wraps, then 23 + 10 + 2 > 24 wraps again
        assert_eq!(layout.positions, vec![(1, 1), (1, 13), (1, 25)]);
        assert_eq!(layout.height, 25 + 10 + 1);
    }

    #[test]
    fn width_never_below_widest_rect() {
        let mut atlas = Atlas::new(2, false);
        atlas.add(40, 1);
        atlas.add(1, 1);
        let layout = atlas.pack();
        assert_eq!(layout.width, 42);
        // 1 + 40 + 2 > 42, so even the first rect drops a row
        assert_eq!(layout.positions, vec![(1, 3), (1, 6)]);
        assert_eq!(layout.height, 6 + 1 + 1);
    }

    #[test]
    fn single_rect_wraps_off_the_empty_first_row() {
        let mut atlas = Atlas::new(2, false);
        atlas.add(10, 10);
        let layout = atlas.pack();
        assert_eq!(layout.width, 12);
        assert_eq!(layout.positions, vec![(1, 3)]);
        assert_eq!(layout.height, 14);
    }

    #[test]
    fn rows_fill_before_wrapping() {
        let mut atlas = Atlas::new(2, false);
        for _ in 0..4 {
            atlas.add(4, 4);
        }
        // 4 * 36 = 144 -> width 12, which fits only one 4+2 glyph after the border
        let layout = atlas.pack();
        assert_eq!(layout.width, 12);
        assert_eq!(layout.positions, vec![(1, 1), (1, 7), (1, 13), (1, 19)]);

        let mut atlas = Atlas::new(0, false);
        for _ in 0..4 {
            atlas.add(4, 4);
        }
        let layout = atlas.pack();
        assert_eq!(layout.width, 8);
        assert_eq!(layout.positions, vec![(0, 0), (4, 0), (0, 4), (4, 4)]);
        assert_eq!(layout.height, 8);
    }

    #[test]
    fn row_height_is_tallest_in_row() {
        let mut atlas = Atlas::new(0, false);
        atlas.add(3, 2);
        atlas.add(3, 5);
        atlas.add(6, 1);
        // area 6 + 15 + 6 = 27 -> width 6
        let layout = atlas.pack();
        assert_eq!(layout.width, 6);
        assert_eq!(layout.positions, vec![(0, 0), (3, 0), (0, 5)]);
        assert_eq!(layout.height, 6);
    }

    #[test]
    fn power_of_two_rounds_both_axes() {
        let mut atlas = Atlas::new(2, true);
        atlas.add(10, 10);
        atlas.add(20, 10);
        atlas.add(10, 10);
        let layout = atlas.pack();
        assert_eq!(layout.width, 32);
        // 13 + 22 > 32 wraps once, 23 + 12 > 32 wraps again
        assert_eq!(layout.positions, vec![(1, 1), (1, 13), (1, 25)]);
        assert_eq!(layout.height, 64);
    }

    #[test]
    fn ceil_sqrt_is_exact() {
        assert_eq!(ceil_sqrt(0), 0);
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(552), 24);
        assert_eq!(ceil_sqrt(576), 24);
        assert_eq!(ceil_sqrt(577), 25);
    }

    #[test]
    fn random_layouts_never_overlap_and_stay_inside() {
        let mut rng = StdRng::seed_from_u64(0x61746c6173);
        for round in 0..50 {
            let padding = rng.gen_range(0..6);
            let power_of_two = round % 2 == 0;
            let count = rng.gen_range(1..80);
            let mut atlas = Atlas::new(padding, power_of_two);
            for _ in 0..count {
                atlas.add(rng.gen_range(0..40), rng.gen_range(0..40));
            }
            let unrounded = Atlas {
                power_of_two: false,
                rects: atlas.rects.clone(),
                ..Atlas::new(padding, false)
            }
            .seed_width();
            let layout = atlas.pack();
            let placed = atlas.rects.clone();
            assert_eq!(placed.len(), count);

            for (i, rect) in placed.iter().enumerate() {
                assert_eq!((rect.x, rect.y), layout.positions[i]);
                assert!(rect.x + rect.w <= layout.width, "round {round} rect {i}");
                assert!(rect.y + rect.h <= layout.height, "round {round} rect {i}");
            }
            // each padded by half the gap must stay disjoint
            let half = padding / 2;
            for (i, a) in placed.iter().enumerate() {
                for b in placed.iter().skip(i + 1) {
                    if a.w == 0 || a.h == 0 || b.w == 0 || b.h == 0 {
                        continue;
                    }
                    assert!(!a.padded(half).intersects(&b.padded(half)), "{a:?} {b:?}");
                }
            }
            if power_of_two {
                assert!(layout.width.is_power_of_two());
                assert!(layout.height.is_power_of_two());
                assert!(layout.width >= unrounded && layout.width / 2 < unrounded.max(1));
            }
        }
    }

    #[test]
    fn pack_bitmaps_keeps_order() {
        let bitmaps = vec![
            GlyphBitmap::new(2, 3, vec![0; 24], 2, 3, 0),
            GlyphBitmap::new(1, 1, vec![0; 4], 1, 1, 0),
        ];
        let layout = pack(&bitmaps, 2, false);
        assert_eq!(layout.positions.len(), 2);
        assert_eq!(layout.positions[0], (1, 1));
    }
}
