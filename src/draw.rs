// src/draw.rs
// Bitmap text for the minifb windows, using font8x8's ASCII glyphs.

use font8x8::{UnicodeFonts, BASIC_FONTS};

use rsgif::constants::colors;

pub const LABEL_SCALE: i32 = 2;
pub const LABEL_PAD: i32 = 4;
/// Height of a one-line label box, padding included.
pub const LABEL_HEIGHT: i32 = 8 * LABEL_SCALE + 2 * LABEL_PAD;

/// True when every character has a glyph in the basic font.
pub fn is_drawable(s: &str) -> bool {
    s.chars().all(|ch| BASIC_FONTS.get(ch).is_some())
}

/// Draws `s` with its top-left corner at (x, y). Pixels outside the buffer are
/// dropped; characters without a glyph leave a blank cell.
pub fn draw_text(
    buffer: &mut [u32],
    width: usize,
    height: usize,
    (x, y): (i32, i32),
    s: &str,
    scale: i32,
    color: u32,
) {
    let mut cursor_x = x;
    for ch in s.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch) {
            for (row_idx, row) in glyph.iter().enumerate() {
                for col_idx in 0..8 {
                    if (row >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let gx = cursor_x + col_idx * scale;
                    let gy = y + row_idx as i32 * scale;
                    fill(buffer, width, height, (gx, gy), (scale, scale), color);
                }
            }
        }
        cursor_x += 8 * scale;
    }
}

/// 带底色的尺寸标签
pub fn draw_label(buffer: &mut [u32], width: usize, height: usize, x: i32, y: i32, label: &str) {
    let label_w = label.chars().count() as i32 * 8 * LABEL_SCALE + 2 * LABEL_PAD;
    fill(buffer, width, height, (x, y), (label_w, LABEL_HEIGHT), colors::LABEL_BG);
    draw_text(
        buffer,
        width,
        height,
        (x + LABEL_PAD, y + LABEL_PAD),
        label,
        LABEL_SCALE,
        colors::LABEL_TEXT,
    );
}

fn fill(
    buffer: &mut [u32],
    width: usize,
    height: usize,
    (x, y): (i32, i32),
    (w, h): (i32, i32),
    color: u32,
) {
    for py in y.max(0)..(y + h).min(height as i32) {
        for px in x.max(0)..(x + w).min(width as i32) {
            buffer[py as usize * width + px as usize] = color;
        }
    }
}
