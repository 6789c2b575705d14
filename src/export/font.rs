//! Glyph generation for raster export.
//!
//! Uses the Spleen bitmap font family. Every size is drawn from the closest
//! Spleen source (6×12, 8×16 or 12×24) scaled nearest-neighbour to a cell of
//! `size / 2 × size` pixels.

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};
use std::collections::HashMap;

/// Horizontal advance of one character at `size` px.
pub fn glyph_width(size: u32) -> u32 {
    (size / 2).max(1)
}

/// Height of a line of text at `size` px.
pub fn line_height(size: u32) -> u32 {
    size.saturating_add(size.div_ceil(4))
}

/// Width of `text` at `size` px. Bold text advances the same as regular.
pub fn text_width(text: &str, size: u32) -> u32 {
    u32::try_from(text.chars().count())
        .unwrap_or(u32::MAX)
        .saturating_mul(glyph_width(size))
}

/// A 1-bit glyph bitmap, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<bool>,
}

impl Glyph {
    pub fn is_on(&self, x: u32, y: u32) -> bool {
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy)]
struct Source {
    data: &'static [u8],
    width: usize,
    height: usize,
}

impl Source {
    fn for_size(size: u32) -> Self {
        match size {
            0..=12 => Source {
                data: FONT_6X12,
                width: 6,
                height: 12,
            },
            13..=16 => Source {
                data: FONT_8X16,
                width: 8,
                height: 16,
            },
            _ => Source {
                data: FONT_12X24,
                width: 12,
                height: 24,
            },
        }
    }
}

/// Glyph cache keyed by size and character.
#[derive(Debug, Default)]
pub struct GlyphCache {
    glyphs: HashMap<(u32, char), Glyph>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, size: u32, ch: char) -> &Glyph {
        self.glyphs
            .entry((size, ch))
            .or_insert_with(|| generate_glyph(size, ch))
    }
}

/// Generate the glyph for `ch` at `size` px. Characters the font does not
/// cover are drawn as a box outline.
pub fn generate_glyph(size: u32, ch: char) -> Glyph {
    let width = glyph_width(size) as usize;
    let height = size.max(1) as usize;
    let mut pixels = vec![false; width * height];

    if ch == ' ' {
        return Glyph {
            width: width as u32,
            height: height as u32,
            pixels,
        };
    }

    let source = Source::for_size(size);
    let mut src = vec![false; source.width * source.height];
    let mut found = false;

    if let Ok(mut font) = PSF2Font::new(source.data) {
        let utf8 = ch.to_string();
        if let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) {
            found = true;
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < source.height && col_x < source.width {
                        src[row_y * source.width + col_x] = on;
                    }
                }
            }
        }
    }

    if found {
        scale_bitmap(&src, source.width, source.height, &mut pixels, width, height);
    } else {
        draw_box(&mut pixels, width, height);
    }

    Glyph {
        width: width as u32,
        height: height as u32,
        pixels,
    }
}

/// Nearest-neighbour scale from `src` to `dst`.
fn scale_bitmap(
    src: &[bool],
    src_w: usize,
    src_h: usize,
    dst: &mut [bool],
    dst_w: usize,
    dst_h: usize,
) {
    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx * src_w / dst_w;
            let sy = dy * src_h / dst_h;
            if let (Some(&on), Some(out)) = (src.get(sy * src_w + sx), dst.get_mut(dy * dst_w + dx)) {
                *out = on;
            }
        }
    }
}

fn draw_box(pixels: &mut [bool], width: usize, height: usize) {
    if width == 0 || height == 0 {
        return;
    }
    for x in 0..width {
        pixels[x] = true;
        pixels[(height - 1) * width + x] = true;
    }
    for y in 0..height {
        pixels[y * width] = true;
        pixels[y * width + width - 1] = true;
    }
}
