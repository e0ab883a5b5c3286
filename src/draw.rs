// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the composited camera image.
// 2) Pointer input (mouse) that can stand in for a tracked hand.
// 3) Blended discs/lines for menu buttons and finger markers.
// 4) A tiny 5x7 bitmap font to render HUD text and button labels.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::Error;
use crate::raster;
use crate::types::{pack_rgb, unpack_rgb, Color, FrameBuffer, Point};

/// Mouse state for one frame, in window pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    pub pos: Option<(f32, f32)>,
    pub left: bool,
    pub right: bool,
}

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to the camera feed.
    pub fn new(title: &str, width: usize, height: usize, target_fps: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(target_fps);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// C clears the canvas.
    pub fn c_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
    }

    /// Mouse position and buttons. Position is `None` outside the window.
    pub fn pointer(&self) -> PointerInput {
        PointerInput {
            pos: self.window.get_mouse_pos(MouseMode::Discard),
            left: self.window.get_mouse_down(MouseButton::Left),
            right: self.window.get_mouse_down(MouseButton::Right),
        }
    }
}

/* ---------- Software drawing: pixels, discs, lines, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Mix `color` over the pixel at index `idx` with opacity `alpha`.
#[inline]
fn blend_at(fb: &mut FrameBuffer, idx: usize, color: Color, alpha: f32) {
    if alpha >= 1.0 {
        fb.pixels[idx] = pack_rgb(color);
        return;
    }
    let old = unpack_rgb(fb.pixels[idx]);
    let mut out = old;
    for c in 0..3 {
        out[c] = (old[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha).round() as u8;
    }
    fb.pixels[idx] = pack_rgb(out);
}

/// Filled disc, blended at `alpha` (1.0 = opaque).
pub fn fill_disc(fb: &mut FrameBuffer, center: Point, radius: u32, color: Color, alpha: f32) {
    let (w, h) = fb.dimensions();
    raster::disc(w, h, center, radius, |x, y| blend_at(fb, y * w + x, color, alpha));
}

/// Opaque circle outline.
pub fn ring(fb: &mut FrameBuffer, center: Point, radius: u32, thickness: u32, color: Color) {
    let (w, h) = fb.dimensions();
    let px = pack_rgb(color);
    raster::ring(w, h, center, radius, raster::half_width(thickness), |x, y| fb.pixels[y * w + x] = px);
}

/// Opaque line with round ends.
pub fn thick_line(fb: &mut FrameBuffer, a: Point, b: Point, thickness: u32, color: Color) {
    let (w, h) = fb.dimensions();
    let px = pack_rgb(color);
    raster::capsule(w, h, a, b, raster::half_width(thickness), |x, y| fb.pixels[y * w + x] = px);
}

/* ---------- 5x7 bitmap font (digits, the capitals our labels use, a little punctuation) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Capitals used by labels and the HUD
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        // Punctuation: space, vertical bar, colon, dot
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y), with a 1-pixel black shadow.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass, then the glyph itself
        for (dx, dy, c) in [(1, 1, 0x00000000), (0, 0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx as i32 + dx, y + ry as i32 + dy, c);
                    }
                }
            }
        }
    }
}

/// Pixel width of `text` when drawn with `draw_text_5x7`.
pub fn text_width_5x7(text: &str) -> i32 {
    text.chars().count() as i32 * 6
}

/// Draw a text string using 5x7 glyphs (5 px glyph + 1 px spacing).
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BLACK, RED, WHITE};

    #[test]
    fn half_alpha_disc_mixes_with_background() {
        let mut fb = FrameBuffer::filled(20, 20, BLACK);
        fill_disc(&mut fb, Point::new(10, 10), 3, WHITE, 0.5);
        assert_eq!(fb.get(10, 10), image::Rgb([128, 128, 128]));
        assert_eq!(fb.get(0, 0), BLACK);
    }

    #[test]
    fn text_stays_inside_the_frame() {
        let mut fb = FrameBuffer::new(30, 10);
        draw_text_5x7(&mut fb, 20, 5, "CIRCLE", 0x00FF_FFFF);
        assert!(fb.pixels.iter().any(|&p| p == 0x00FF_FFFF));
        assert_eq!(text_width_5x7("FPS: 30.0"), 54);
    }

    #[test]
    fn every_label_letter_has_a_glyph() {
        for ch in "BOARD COLORS SIZE ERASER CLEAR FREE LINE RECT CIRCLE IDLE DRAW DRAG FPS: 0123456789.|".chars() {
            assert!(glyph5x7(ch).is_some(), "missing glyph {ch:?}");
        }
    }

    #[test]
    fn ring_and_line_are_opaque() {
        let mut fb = FrameBuffer::new(40, 40);
        ring(&mut fb, Point::new(20, 20), 10, 2, RED);
        thick_line(&mut fb, Point::new(0, 0), Point::new(39, 0), 1, RED);
        assert_eq!(fb.get(30, 20), RED);
        assert_eq!(fb.get(15, 0), RED);
        assert_eq!(fb.get(20, 20), BLACK);
    }
}
