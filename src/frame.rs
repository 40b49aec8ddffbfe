//! BGR video frames.
//!
//! - `Frame`: owned pixel buffer in B, G, R byte order, row-major, no padding.
//! - `BoundingBox`: pixel-space face box reported by a classifier.
//! - `Rect`: signed placement rectangle used by the compositor.
//!
//! Frames are produced by the camera layer once per render iteration, then
//! decorated and handed to a display sink. Nothing here is persisted.

use anyhow::{anyhow, Result};

/// Number of bytes per pixel in a BGR frame.
pub const BGR_CHANNELS: usize = 3;

/// Owned BGR pixel buffer.
///
/// The buffer length always equals `width * height * 3`; the dimensions
/// never change after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Wrap an existing BGR buffer, validating its length.
    pub fn from_bgr(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = expected_len(width, height)?;
        if data.len() != expected {
            return Err(anyhow!(
                "BGR frame length mismatch: expected {}, got {}",
                expected,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Convert an RGB buffer (as delivered by most capture APIs) to BGR.
    pub fn from_rgb(rgb: &[u8], width: u32, height: u32) -> Result<Self> {
        let expected = expected_len(width, height)?;
        if rgb.len() != expected {
            return Err(anyhow!(
                "RGB frame length mismatch: expected {}, got {}",
                expected,
                rgb.len()
            ));
        }
        let mut data = Vec::with_capacity(expected);
        for px in rgb.chunks_exact(BGR_CHANNELS) {
            data.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Solid-color frame.
    pub fn filled(width: u32, height: u32, bgr: [u8; 3]) -> Result<Self> {
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        let data = bgr.repeat(pixels);
        Self::from_bgr(data, width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of a pixel. Callers must bounds-check first.
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BGR_CHANNELS
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Write a pixel. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, bgr: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.data[i..i + BGR_CHANNELS].copy_from_slice(&bgr);
    }

    /// Mutable view of one row.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width as usize * BGR_CHANNELS;
        let start = y as usize * stride;
        Some(&mut self.data[start..start + stride])
    }

    /// Mirror the frame left-to-right in place.
    pub fn flip_horizontal(&mut self) {
        let w = self.width as usize;
        for y in 0..self.height {
            if let Some(row) = self.row_mut(y) {
                for x in 0..w / 2 {
                    let a = x * BGR_CHANNELS;
                    let b = (w - 1 - x) * BGR_CHANNELS;
                    for c in 0..BGR_CHANNELS {
                        row.swap(a + c, b + c);
                    }
                }
            }
        }
    }

    /// RGB copy of the pixel data, for backends that expect RGB input.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(BGR_CHANNELS) {
            rgb.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        rgb
    }
}

fn expected_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(BGR_CHANNELS))
        .ok_or_else(|| anyhow!("frame dimensions overflow"))
}

/// Face bounding box in pixel coordinates at detection time.
///
/// A later frame may be smaller than the one the box was detected on, so
/// consumers must clip rather than assume the box lies inside the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Signed rectangle; `x`/`y` may be negative or past the frame edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.x + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height as i64
    }

    /// Intersection with `[0, width) x [0, height)`, or `None` when empty.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(width as i64);
        let y2 = self.bottom().min(height as i64);
        if x1 >= x2 || y1 >= y2 {
            return None;
        }
        Some(Rect::new(x1, y1, (x2 - x1) as u32, (y2 - y1) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb_swaps_channel_order() -> Result<()> {
        let frame = Frame::from_rgb(&[1, 2, 3, 4, 5, 6], 2, 1)?;
        assert_eq!(frame.as_bytes(), &[3, 2, 1, 6, 5, 4]);
        assert_eq!(frame.to_rgb(), vec![1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn from_bgr_validates_length() {
        assert!(Frame::from_bgr(vec![0u8; 5], 2, 1).is_err());
    }

    #[test]
    fn flip_horizontal_mirrors_rows() -> Result<()> {
        let mut frame = Frame::from_bgr(vec![1, 1, 1, 2, 2, 2, 3, 3, 3], 3, 1)?;
        frame.flip_horizontal();
        assert_eq!(frame.as_bytes(), &[3, 3, 3, 2, 2, 2, 1, 1, 1]);
        Ok(())
    }

    #[test]
    fn put_pixel_out_of_bounds_is_ignored() -> Result<()> {
        let mut frame = Frame::filled(2, 2, [0, 0, 0])?;
        frame.put_pixel(5, 0, [9, 9, 9]);
        assert_eq!(frame, Frame::filled(2, 2, [0, 0, 0])?);
        assert_eq!(frame.pixel(2, 0), None);
        Ok(())
    }

    #[test]
    fn rect_clip_handles_negative_origin() {
        let clipped = Rect::new(-5, 10, 20, 20).clip_to(100, 100).unwrap();
        assert_eq!(clipped, Rect::new(0, 10, 15, 20));
        assert!(Rect::new(-30, 0, 20, 20).clip_to(100, 100).is_none());
        assert!(Rect::new(100, 0, 20, 20).clip_to(100, 100).is_none());
    }
}
