//! Bitmap digit glyphs.
//!
//! A 5x7 font scaled into a cell image. Used for placeholder digit images
//! when a value was never observed, and as matching templates.

use super::frame::{CellImage, INK};

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;

/// Rows of each glyph, most significant of the low five bits is the leftmost column.
const GLYPHS: [[u8; GLYPH_HEIGHT]; 9] = [
    // 1
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    // 2
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    // 3
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    // 4
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    // 5
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    // 6
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    // 7
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    // 8
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    // 9
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

#[inline]
fn glyph_bit(digit: u8, gx: usize, gy: usize) -> bool {
    let row = GLYPHS[usize::from(digit - 1)][gy];
    row & (1 << (GLYPH_WIDTH - 1 - gx)) != 0
}

/// Renders `digit` (1..=9) onto `image`, leaving a margin of one fifth
/// of each side.
///
/// # Panics
///
/// Panics if `digit` is not in 1..=9.
pub fn draw_digit(image: &mut CellImage, digit: u8) {
    assert!((1..=9).contains(&digit), "glyph digit {digit} out of range");

    let width = image.width() as usize;
    let height = image.height() as usize;
    let (mx, my) = (width / 5, height / 5);
    let box_w = width.saturating_sub(2 * mx);
    let box_h = height.saturating_sub(2 * my);
    if box_w == 0 || box_h == 0 || !image.is_valid() {
        return;
    }

    let pixels = image.pixels_mut();
    for y in 0..box_h {
        let gy = y * GLYPH_HEIGHT / box_h;
        for x in 0..box_w {
            let gx = x * GLYPH_WIDTH / box_w;
            if glyph_bit(digit, gx, gy) {
                pixels[(my + y) * width + mx + x] = INK;
            }
        }
    }
}

/// A fresh background image with `digit` drawn on it.
pub fn render_digit(width: u32, height: u32, digit: u8) -> CellImage {
    let mut image = CellImage::blank(width, height);
    draw_digit(&mut image, digit);
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_digit_has_ink() {
        for digit in 1..=9 {
            let image = render_digit(20, 28, digit);
            assert!(image.is_valid());
            let ink = image.ink_ratio();
            assert!(ink > 0.05 && ink < 0.6, "digit {digit} ink {ink}");
        }
    }

    #[test]
    fn test_glyphs_are_distinct() {
        let images: Vec<CellImage> = (1..=9).map(|d| render_digit(20, 28, d)).collect();
        for (i, a) in images.iter().enumerate() {
            for b in &images[i + 1..] {
                assert!(a.mean_abs_diff(b).unwrap() > 0.0);
            }
        }
    }

    #[test]
    fn test_empty_image_untouched() {
        let image = render_digit(0, 0, 5);
        assert!(image.pixels().is_empty());
    }
}
