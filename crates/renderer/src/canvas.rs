//! A minimal RGBA raster for drawing tiles.

use crate::png;
use crate::style::Color;

/// Square-or-rectangular RGBA buffer, row-major, top row first.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    /// A canvas filled with `background`.
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        let pixels = background.to_array().repeat(width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        let p = &self.pixels[i..i + 4];
        Some(Color::rgba(p[0], p[1], p[2], p[3]))
    }

    /// Source-over blend of `color` onto one pixel; out-of-range is ignored.
    pub fn blend(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.width || y >= self.height || color.a == 0 {
            return;
        }
        let i = (y * self.width + x) * 4;
        let dst = &mut self.pixels[i..i + 4];

        if color.a == 255 {
            dst.copy_from_slice(&color.to_array());
            return;
        }

        let src_a = color.a as u32;
        let dst_a = dst[3] as u32;
        let out_a = src_a + dst_a * (255 - src_a) / 255;
        if out_a == 0 {
            return;
        }
        for (c, s) in dst.iter_mut().take(3).zip([color.r, color.g, color.b]) {
            let blended = (s as u32 * src_a + *c as u32 * dst_a * (255 - src_a) / 255) / out_a;
            *c = blended.min(255) as u8;
        }
        dst[3] = out_a.min(255) as u8;
    }

    /// Vertical line `width` pixels wide, centred on column `x`.
    pub fn vertical_line(&mut self, x: f64, width: u32, color: Color) {
        for column in line_span(x, width, self.width) {
            for y in 0..self.height {
                self.blend(column, y, color);
            }
        }
    }

    /// Horizontal line `width` pixels wide, centred on row `y`.
    pub fn horizontal_line(&mut self, y: f64, width: u32, color: Color) {
        for row in line_span(y, width, self.height) {
            for x in 0..self.width {
                self.blend(x, row, color);
            }
        }
    }

    /// One pixel outline along the canvas edges.
    pub fn outline(&mut self, color: Color) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (right, bottom) = (self.width - 1, self.height - 1);
        for x in 0..self.width {
            self.blend(x, 0, color);
            if bottom > 0 {
                self.blend(x, bottom, color);
            }
        }
        for y in 1..bottom {
            self.blend(0, y, color);
            if right > 0 {
                self.blend(right, y, color);
            }
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, String> {
        png::create_png_auto(&self.pixels, self.width, self.height)
    }
}

/// Pixel indices covered by a line of `width` centred on `center`, clipped to `0..limit`.
fn line_span(center: f64, width: u32, limit: usize) -> std::ops::Range<usize> {
    let start = (center - width as f64 / 2.0).round();
    let end = start + width as f64;
    let clip = |v: f64| v.clamp(0.0, limit as f64) as usize;
    clip(start)..clip(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgba(255, 0, 0, 255);

    #[test]
    fn test_new_fills_background() {
        let canvas = Canvas::new(3, 2, Color::rgba(1, 2, 3, 4));
        assert_eq!(canvas.pixels().len(), 3 * 2 * 4);
        assert_eq!(canvas.pixel(2, 1), Some(Color::rgba(1, 2, 3, 4)));
        assert_eq!(canvas.pixel(3, 0), None);
    }

    #[test]
    fn test_vertical_line_is_clipped() {
        let mut canvas = Canvas::new(4, 4, Color::transparent());
        canvas.vertical_line(0.0, 2, RED);
        assert_eq!(canvas.pixel(0, 3), Some(RED));
        assert_eq!(canvas.pixel(1, 0), Some(Color::transparent()));
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = Canvas::new(4, 4, Color::transparent());
        canvas.horizontal_line(2.0, 2, RED);
        assert_eq!(canvas.pixel(0, 1), Some(RED));
        assert_eq!(canvas.pixel(3, 2), Some(RED));
        assert_eq!(canvas.pixel(0, 3), Some(Color::transparent()));
    }

    #[test]
    fn test_blend_half_alpha_over_white() {
        let mut canvas = Canvas::new(1, 1, Color::rgba(255, 255, 255, 255));
        canvas.blend(0, 0, Color::rgba(0, 0, 0, 128));
        let p = canvas.pixel(0, 0).unwrap();
        assert_eq!(p.a, 255);
        assert!(p.r > 120 && p.r < 135, "got {:?}", p);
    }

    #[test]
    fn test_outline() {
        let mut canvas = Canvas::new(3, 3, Color::transparent());
        canvas.outline(RED);
        assert_eq!(canvas.pixel(0, 0), Some(RED));
        assert_eq!(canvas.pixel(2, 2), Some(RED));
        assert_eq!(canvas.pixel(0, 1), Some(RED));
        assert_eq!(canvas.pixel(1, 1), Some(Color::transparent()));
    }
}
