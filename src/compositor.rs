// Stacks the canvas layers over the live frame:
// frame, then persistent strokes, then the shape preview.
// out = frame * (1 - a) + layer * a, with a = alpha / 255, rounded per channel.

use crate::canvas::CanvasLayer;
use crate::error::Error;
use crate::types::FrameBuffer;

#[inline]
fn mix(base: u8, paint: u8, a: f32) -> u8 {
    (base as f32 * (1.0 - a) + paint as f32 * a).round().clamp(0.0, 255.0) as u8
}

fn check_size(what: &'static str, frame: &FrameBuffer, layer: &CanvasLayer) -> Result<(), Error> {
    if layer.dimensions() != frame.dimensions() {
        return Err(Error::SizeMismatch { what, expected: frame.dimensions(), actual: layer.dimensions() });
    }
    Ok(())
}

/// Blend one layer over `fb` in place. Pixels with zero alpha are untouched.
pub fn blend_layer_in_place(fb: &mut FrameBuffer, layer: &CanvasLayer) -> Result<(), Error> {
    check_size("blend_layer", fb, layer)?;

    for (dst, src) in fb.pixels.iter_mut().zip(layer.as_raw().chunks_exact(4)) {
        let a8 = src[3];
        if a8 == 0 { continue; }                  // keep raw live pixel
        if a8 == 255 {                            // fully painted
            *dst = ((src[0] as u32) << 16) | ((src[1] as u32) << 8) | src[2] as u32;
            continue;
        }

        let a = a8 as f32 / 255.0;
        let p = *dst;
        let r = mix(((p >> 16) & 0xFF) as u8, src[0], a) as u32;
        let g = mix(((p >> 8) & 0xFF) as u8, src[1], a) as u32;
        let b = mix((p & 0xFF) as u8, src[2], a) as u32;
        *dst = (r << 16) | (g << 8) | b;
    }
    Ok(())
}

/// Build the displayed frame into `out`. Inputs are only read.
pub fn composite(
    frame: &FrameBuffer,
    persistent: &CanvasLayer,
    preview: &CanvasLayer,
    out: &mut FrameBuffer,
) -> Result<(), Error> {
    check_size("composite/persistent", frame, persistent)?;
    check_size("composite/preview", frame, preview)?;

    if out.dimensions() != frame.dimensions() {
        out.width = frame.width;
        out.height = frame.height;
        out.pixels.resize(frame.pixels.len(), 0);
    }
    out.pixels.copy_from_slice(&frame.pixels);

    blend_layer_in_place(out, persistent)?;
    blend_layer_in_place(out, preview)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasStore, ShapeKind};
    use crate::types::{pack_rgb, Point, BLUE, RED};
    use image::Rgb;

    fn gradient(w: usize, h: usize) -> FrameBuffer {
        let mut fb = FrameBuffer::new(w, h);
        for (i, px) in fb.pixels.iter_mut().enumerate() {
            *px = pack_rgb(Rgb([(i % 251) as u8, (i * 7 % 256) as u8, (i * 13 % 256) as u8]));
        }
        fb
    }

    #[test]
    fn transparent_layers_leave_frame_untouched() {
        let frame = gradient(32, 24);
        let store = CanvasStore::new(32, 24);
        let mut out = FrameBuffer::new(32, 24);
        composite(&frame, store.persistent(), store.preview(), &mut out).unwrap();
        assert_eq!(out, frame);
    }

    #[test]
    fn clear_then_composite_matches_the_frame() {
        let frame = gradient(64, 48);
        let mut store = CanvasStore::new(64, 48);
        store.extend_stroke(Point::new(5, 5), Point::new(60, 40), RED, 8);
        store.clear();
        let mut out = FrameBuffer::new(64, 48);
        composite(&frame, store.persistent(), store.preview(), &mut out).unwrap();
        assert_eq!(out, frame);
    }

    #[test]
    fn preview_is_drawn_over_persistent() {
        let frame = FrameBuffer::new(40, 40);
        let mut store = CanvasStore::new(40, 40);
        store.extend_stroke(Point::new(0, 20), Point::new(39, 20), RED, 4);
        store.preview_shape(ShapeKind::Line, Point::new(20, 0), Point::new(20, 39), BLUE, 4);
        let mut out = FrameBuffer::new(40, 40);
        composite(&frame, store.persistent(), store.preview(), &mut out).unwrap();
        assert_eq!(out.get(20, 20), BLUE);
        assert_eq!(out.get(5, 20), RED);
        assert_eq!(out.get(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn opaque_preview_hides_frame_even_over_blank_persistent() {
        let frame = gradient(20, 20);
        let mut store = CanvasStore::new(20, 20);
        store.preview_shape(ShapeKind::Line, Point::new(0, 10), Point::new(19, 10), BLUE, 2);
        let mut out = FrameBuffer::new(20, 20);
        composite(&frame, store.persistent(), store.preview(), &mut out).unwrap();
        assert_eq!(out.get(10, 10), BLUE);
        assert_ne!(out, frame);
    }

    #[test]
    fn mix_rounds_to_nearest() {
        assert_eq!(mix(0, 255, 0.5), 128);
        assert_eq!(mix(100, 200, 0.0), 100);
        assert_eq!(mix(100, 200, 1.0), 200);
    }

    #[test]
    fn size_mismatch_is_reported() {
        let frame = FrameBuffer::new(10, 10);
        let store = CanvasStore::new(12, 10);
        let mut out = FrameBuffer::new(10, 10);
        let err = composite(&frame, store.persistent(), store.preview(), &mut out).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }));
    }
}
