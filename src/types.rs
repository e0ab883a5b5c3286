// Core types shared by the camera, canvas, menu and compositor.

use image::Rgb;

/// Brush / UI colour. Channels are in RGB order.
pub type Color = Rgb<u8>;

pub const RED: Color = Rgb([255, 0, 0]);
pub const GREEN: Color = Rgb([0, 255, 0]);
pub const BLUE: Color = Rgb([0, 0, 255]);
pub const YELLOW: Color = Rgb([255, 255, 0]);
pub const PURPLE: Color = Rgb([255, 0, 255]);
pub const CYAN: Color = Rgb([0, 255, 255]);
pub const WHITE: Color = Rgb([255, 255, 255]);
pub const BLACK: Color = Rgb([0, 0, 0]);

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// A frame filled with one colour.
    #[cfg(test)]
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        Self { width, height, pixels: vec![pack_rgb(color); width * height] }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn get(&self, x: usize, y: usize) -> Color {
        unpack_rgb(self.pixels[y * self.width + x])
    }

    /// Mirror the frame left-to-right (selfie view).
    pub fn flip_horizontal(&mut self) {
        for row in self.pixels.chunks_exact_mut(self.width) {
            row.reverse();
        }
    }
}

/// Pack an RGB colour as 0x00RRGGBB.
#[inline]
pub fn pack_rgb(c: Color) -> u32 {
    ((c[0] as u32) << 16) | ((c[1] as u32) << 8) | c[2] as u32
}

/// Split 0x00RRGGBB back into channels.
#[inline]
pub fn unpack_rgb(px: u32) -> Color {
    Rgb([((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8])
}

/// Integer pixel position in frame/canvas space. May lie outside the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared distance in i64, saturating at `i64::MAX` for opposite
    /// corners of the i32 plane.
    pub fn dist2(self, other: Point) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

/// Open axis-aligned rectangle: the edges themselves are outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn contains(&self, p: Point) -> bool {
        self.left < p.x && p.x < self.right && self.top < p.y && p.y < self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_keeps_channel_order() {
        let c = Rgb([0x12, 0x34, 0x56]);
        assert_eq!(pack_rgb(c), 0x0012_3456);
        assert_eq!(unpack_rgb(0x0012_3456), c);
    }

    #[test]
    fn flip_reverses_each_row() {
        let mut fb = FrameBuffer { width: 3, height: 2, pixels: vec![1, 2, 3, 4, 5, 6] };
        fb.flip_horizontal();
        assert_eq!(fb.pixels, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn dist2_of_far_off_points_does_not_overflow() {
        assert_eq!(Point::new(i32::MIN, 0).dist2(Point::new(80, 50)), (i32::MIN as i64 - 80).pow(2) + 2500);
        assert_eq!(Point::new(i32::MIN, i32::MIN).dist2(Point::new(i32::MAX, i32::MAX)), i64::MAX);
        assert_eq!(Point::new(3, 4).dist2(Point::new(0, 0)), 25);
    }

    #[test]
    fn bounds_exclude_edges() {
        let b = Bounds { left: 10, top: 10, right: 20, bottom: 20 };
        assert!(b.contains(Point::new(15, 15)));
        assert!(!b.contains(Point::new(10, 15)));
        assert!(!b.contains(Point::new(15, 20)));
    }
}
