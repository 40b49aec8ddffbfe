//! Box outlines and bitmap-font labels drawn straight into BGR frames.
//!
//! Everything here clips silently at the frame edges.

use crate::frame::{BoundingBox, Frame};

pub const GREEN: [u8; 3] = [0, 255, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];
pub const LIGHT_GRAY: [u8; 3] = [200, 200, 200];

const GLYPH_W: i64 = 3;
const GLYPH_H: i64 = 5;

/// Draw a rectangle outline `thickness` pixels wide, inset from `bbox`.
pub fn draw_rect(frame: &mut Frame, bbox: BoundingBox, color: [u8; 3], thickness: u32) {
    if bbox.width == 0 || bbox.height == 0 {
        return;
    }
    let x0 = bbox.x as i64;
    let y0 = bbox.y as i64;
    let x1 = x0 + bbox.width as i64 - 1;
    let y1 = y0 + bbox.height as i64 - 1;
    let max_x = frame.width() as i64 - 1;
    let max_y = frame.height() as i64 - 1;

    for t in 0..thickness as i64 {
        let (xx0, yy0, xx1, yy1) = (x0 + t, y0 + t, x1 - t, y1 - t);
        if xx0 > xx1 || yy0 > yy1 {
            break;
        }
        for x in xx0.max(0)..=xx1.min(max_x) {
            put(frame, x, yy0, color);
            put(frame, x, yy1, color);
        }
        for y in yy0.max(0)..=yy1.min(max_y) {
            put(frame, xx0, y, color);
            put(frame, xx1, y, color);
        }
    }
}

/// Draw `text` with its bottom-left corner at (`x`, `y`).
///
/// Letters render upper-case from a 3x5 bitmap font; `scale` multiplies
/// each font pixel.
pub fn draw_text(frame: &mut Frame, x: i64, y: i64, text: &str, color: [u8; 3], scale: u32) {
    let scale = scale.max(1) as i64;
    let top = y - GLYPH_H * scale;
    let mut cx = x;
    for c in text.chars() {
        draw_glyph(frame, cx, top, glyph(c), color, scale);
        cx += (GLYPH_W + 1) * scale;
    }
}

fn draw_glyph(frame: &mut Frame, x: i64, y: i64, rows: [u8; 5], color: [u8; 3], scale: i64) {
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_W {
            if (bits >> (GLYPH_W - 1 - col)) & 1 == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    put(frame, x + col * scale + dx, y + row as i64 * scale + dy, color);
                }
            }
        }
    }
}

fn put(frame: &mut Frame, x: i64, y: i64, color: [u8; 3]) {
    if x < 0 || y < 0 || x > u32::MAX as i64 || y > u32::MAX as i64 {
        return;
    }
    frame.put_pixel(x as u32, y as u32, color);
}

fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        'A' => [0x2, 0x5, 0x7, 0x5, 0x5],
        'B' => [0x6, 0x5, 0x6, 0x5, 0x6],
        'C' => [0x3, 0x4, 0x4, 0x4, 0x3],
        'D' => [0x6, 0x5, 0x5, 0x5, 0x6],
        'E' => [0x7, 0x4, 0x6, 0x4, 0x7],
        'F' => [0x7, 0x4, 0x6, 0x4, 0x4],
        'G' => [0x3, 0x4, 0x5, 0x5, 0x3],
        'H' => [0x5, 0x5, 0x7, 0x5, 0x5],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'J' => [0x1, 0x1, 0x1, 0x5, 0x2],
        'K' => [0x5, 0x5, 0x6, 0x5, 0x5],
        'L' => [0x4, 0x4, 0x4, 0x4, 0x7],
        'M' => [0x5, 0x7, 0x7, 0x5, 0x5],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'O' => [0x2, 0x5, 0x5, 0x5, 0x2],
        'P' => [0x6, 0x5, 0x6, 0x4, 0x4],
        'Q' => [0x2, 0x5, 0x5, 0x6, 0x3],
        'R' => [0x6, 0x5, 0x6, 0x5, 0x5],
        'S' => [0x3, 0x4, 0x2, 0x1, 0x6],
        'T' => [0x7, 0x2, 0x2, 0x2, 0x2],
        'U' => [0x5, 0x5, 0x5, 0x5, 0x7],
        'V' => [0x5, 0x5, 0x5, 0x5, 0x2],
        'W' => [0x5, 0x5, 0x7, 0x7, 0x5],
        'X' => [0x5, 0x5, 0x2, 0x5, 0x5],
        'Y' => [0x5, 0x5, 0x2, 0x2, 0x2],
        'Z' => [0x7, 0x1, 0x2, 0x4, 0x7],
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        ' ' => [0x0, 0x0, 0x0, 0x0, 0x0],
        '.' => [0x0, 0x0, 0x0, 0x0, 0x2],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        '%' => [0x5, 0x1, 0x2, 0x4, 0x5],
        '(' => [0x2, 0x4, 0x4, 0x4, 0x2],
        ')' => [0x2, 0x1, 0x1, 0x1, 0x2],
        _ => [0x7, 0x1, 0x2, 0x0, 0x2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black(width: u32, height: u32) -> Frame {
        Frame::filled(width, height, [0, 0, 0]).unwrap()
    }

    #[test]
    fn rect_outline_leaves_interior_untouched() {
        let mut frame = black(20, 20);
        draw_rect(&mut frame, BoundingBox::new(2, 2, 10, 10), GREEN, 2);

        assert_eq!(frame.pixel(2, 2), Some(GREEN));
        assert_eq!(frame.pixel(3, 3), Some(GREEN));
        assert_eq!(frame.pixel(11, 11), Some(GREEN));
        assert_eq!(frame.pixel(6, 6), Some([0, 0, 0]));
        assert_eq!(frame.pixel(12, 12), Some([0, 0, 0]));
    }

    #[test]
    fn rect_past_frame_edge_is_clipped() {
        let mut frame = black(10, 10);
        draw_rect(&mut frame, BoundingBox::new(5, 5, 50, 50), GREEN, 2);
        assert_eq!(frame.width(), 10);
        assert_eq!(frame.pixel(9, 5), Some(GREEN));
        assert_eq!(frame.pixel(5, 9), Some(GREEN));
        assert_eq!(frame.pixel(8, 8), Some([0, 0, 0]));
    }

    #[test]
    fn text_above_top_edge_does_not_panic() {
        let mut frame = black(40, 10);
        draw_text(&mut frame, -3, 2, "happy (80%)", WHITE, 2);
        draw_text(&mut frame, 35, 200, "x", WHITE, 1);
    }

    #[test]
    fn text_is_drawn_above_origin() {
        let mut frame = black(20, 20);
        draw_text(&mut frame, 0, 10, "I", WHITE, 1);
        // Top bar of 'I' sits five rows above the baseline.
        assert_eq!(frame.pixel(0, 5), Some(WHITE));
        assert_eq!(frame.pixel(1, 7), Some(WHITE));
        assert_eq!(frame.pixel(0, 10), Some([0, 0, 0]));
    }
}
