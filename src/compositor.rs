//! Alpha compositing of persona images onto BGR frames.
//!
//! The overlay is resampled to the requested size with a Lanczos filter,
//! clipped against the frame, and blended in `f32` before truncating back
//! to 8 bits. Only pixels inside the visible part of the placement are
//! written; frame dimensions never change.

use image::imageops::FilterType;
use image::DynamicImage;

use crate::frame::{Frame, Rect, BGR_CHANNELS};

/// Composite `overlay` onto `frame` at `placement`.
///
/// - `None` overlay is a no-op.
/// - Zero width or height in `placement` draws nothing.
/// - `opacity` scales the overlay's own alpha and is clamped to [0, 1].
/// - Placements partly or fully outside the frame are clipped; an empty
///   intersection is a no-op.
///
/// Returns true when any frame pixel was written.
pub fn composite(
    frame: &mut Frame,
    overlay: Option<&DynamicImage>,
    placement: Rect,
    opacity: f32,
) -> bool {
    let Some(overlay) = overlay else {
        return false;
    };

    let Some(visible) = placement.clip_to(frame.width(), frame.height()) else {
        return false;
    };

    let has_alpha = overlay.color().has_alpha();
    let resized = overlay
        .resize_exact(
            placement.width.max(1),
            placement.height.max(1),
            FilterType::Lanczos3,
        )
        .to_rgba8();
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        1.0
    };

    // Offset into the resized overlay where the visible region starts.
    let ox = (visible.x - placement.x) as u32;
    let oy = (visible.y - placement.y) as u32;

    for row in 0..visible.height {
        let fy = (visible.y as u32) + row;
        let Some(dst) = frame.row_mut(fy) else {
            continue;
        };
        for col in 0..visible.width {
            let fx = visible.x as usize + col as usize;
            let src = resized.get_pixel(ox + col, oy + row);
            let alpha = if has_alpha { src[3] } else { u8::MAX };
            let mask = (alpha as f32 / 255.0) * opacity;

            // Overlay is RGB; frame is BGR.
            let overlay_bgr = [src[2], src[1], src[0]];
            let base = fx * BGR_CHANNELS;
            for c in 0..BGR_CHANNELS {
                dst[base + c] = blend(overlay_bgr[c], dst[base + c], mask);
            }
        }
    }
    true
}

fn blend(overlay: u8, target: u8, mask: f32) -> u8 {
    let value = overlay as f32 * mask + target as f32 * (1.0 - mask);
    value.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gray_frame(width: u32, height: u32) -> Frame {
        Frame::filled(width, height, [50, 60, 70]).unwrap()
    }

    fn opaque_overlay(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([200, 100, 0, 255])))
    }

    #[test]
    fn absent_overlay_is_noop() {
        let mut frame = gray_frame(10, 10);
        let before = frame.clone();
        assert!(!composite(&mut frame, None, Rect::new(0, 0, 5, 5), 1.0));
        assert_eq!(frame, before);
    }

    #[test]
    fn opaque_overlay_reproduces_pixels_and_leaves_rest_untouched() {
        let mut frame = gray_frame(40, 30);
        let before = frame.clone();
        let overlay = opaque_overlay(8, 8);

        assert!(composite(&mut frame, Some(&overlay), Rect::new(10, 5, 16, 12), 1.0));

        for y in 0..30 {
            for x in 0..40 {
                let inside = (10..26).contains(&x) && (5..17).contains(&y);
                let px = frame.pixel(x, y).unwrap();
                if inside {
                    assert_eq!(px, [0, 100, 200], "pixel ({x},{y})");
                } else {
                    assert_eq!(px, before.pixel(x, y).unwrap(), "pixel ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn negative_x_clips_to_visible_columns() {
        let mut frame = gray_frame(100, 40);
        let before = frame.clone();
        let overlay = opaque_overlay(20, 20);

        assert!(composite(&mut frame, Some(&overlay), Rect::new(-5, 10, 20, 20), 1.0));
        assert_eq!(frame.width(), 100);
        assert_eq!(frame.height(), 40);

        for y in 0..40 {
            for x in 0..100 {
                let changed = frame.pixel(x, y) != before.pixel(x, y);
                let expected = x < 15 && (10..30).contains(&y);
                assert_eq!(changed, expected, "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn fully_outside_placement_is_noop() {
        let mut frame = gray_frame(20, 20);
        let before = frame.clone();
        let overlay = opaque_overlay(4, 4);

        assert!(!composite(&mut frame, Some(&overlay), Rect::new(0, -40, 10, 10), 1.0));
        assert!(!composite(&mut frame, Some(&overlay), Rect::new(25, 0, 10, 10), 1.0));
        assert_eq!(frame, before);
    }

    #[test]
    fn zero_width_or_height_draws_nothing() {
        let mut frame = gray_frame(10, 10);
        let before = frame.clone();
        let overlay = opaque_overlay(4, 4);

        assert!(!composite(&mut frame, Some(&overlay), Rect::new(2, 2, 0, 5), 1.0));
        assert!(!composite(&mut frame, Some(&overlay), Rect::new(2, 2, 5, 0), 1.0));
        assert!(!composite(&mut frame, Some(&overlay), Rect::new(2, 2, 0, 0), 1.0));
        assert_eq!(frame, before);
    }

    #[test]
    fn clipped_placement_shows_matching_part_of_resampled_overlay() {
        let mut frame = gray_frame(30, 30);
        let overlay = DynamicImage::ImageRgba8(RgbaImage::from_fn(12, 12, |x, y| {
            Rgba([(x * 20) as u8, (y * 20) as u8, ((x + y) * 10) as u8, 255])
        }));
        let expected = overlay
            .resize_exact(20, 20, FilterType::Lanczos3)
            .to_rgba8();

        assert!(composite(&mut frame, Some(&overlay), Rect::new(-5, -3, 20, 20), 1.0));

        for y in 0..17 {
            for x in 0..15 {
                let src = expected.get_pixel(x + 5, y + 3);
                assert_eq!(
                    frame.pixel(x, y),
                    Some([src[2], src[1], src[0]]),
                    "pixel ({x},{y})"
                );
            }
        }
        assert_eq!(frame.pixel(15, 0), Some([50, 60, 70]));
        assert_eq!(frame.pixel(0, 17), Some([50, 60, 70]));
    }

    #[test]
    fn opacity_blends_halfway() {
        let mut frame = Frame::filled(4, 4, [0, 0, 0]).unwrap();
        let overlay =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([200, 200, 200, 255])));

        composite(&mut frame, Some(&overlay), Rect::new(0, 0, 4, 4), 0.5);
        assert_eq!(frame.pixel(1, 1), Some([100, 100, 100]));
    }

    #[test]
    fn transparent_pixels_keep_frame_color() {
        let mut frame = gray_frame(4, 4);
        let before = frame.clone();
        let overlay = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 0])));

        composite(&mut frame, Some(&overlay), Rect::new(0, 0, 4, 4), 1.0);
        assert_eq!(frame, before);
    }

    #[test]
    fn rgb_overlay_is_treated_as_opaque() {
        let mut frame = gray_frame(6, 6);
        let overlay = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([1, 2, 3])));

        composite(&mut frame, Some(&overlay), Rect::new(0, 0, 3, 3), 1.0);
        assert_eq!(frame.pixel(0, 0), Some([3, 2, 1]));
    }
}
