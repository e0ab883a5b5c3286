// Canvas layer store: the persistent stroke layer plus the per-frame preview
// layer, both RGBA. Alpha is the only thing the compositor looks at to decide
// whether a pixel carries paint.

use image::{Rgba, RgbaImage};

use crate::raster;
use crate::types::{Color, Point, WHITE};

/// Colour + alpha of an unpainted pixel. Erasing and clearing restore this.
pub const BLANK: Rgba<u8> = Rgba([WHITE.0[0], WHITE.0[1], WHITE.0[2], 0]);

/// Shapes that are dragged out between an anchor and the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Circle,
}

/// One committed drawing primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stroke {
    /// Piece of a free-hand curve.
    Segment { from: Point, to: Point },
    /// Finished shape spanned by the drag anchor and the release point.
    Shape { kind: ShapeKind, anchor: Point, cursor: Point },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Brush {
    pub color: Color,
    pub thickness: u32,
}

/// Circle spanned by a drag: centred on the midpoint, diameter = drag length.
pub fn circle_from_drag(anchor: Point, cursor: Point) -> (Point, u32) {
    // The midpoint of two i32s always fits back into an i32.
    let mid = |a: i32, b: i32| (a as i64 + b as i64).div_euclid(2) as i32;
    let center = Point::new(mid(anchor.x, cursor.x), mid(anchor.y, cursor.y));
    let radius = ((anchor.dist2(cursor) as f64).sqrt() / 2.0) as u32;
    (center, radius)
}

/// Fixed-size RGBA raster owned by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasLayer {
    image: RgbaImage,
}

impl CanvasLayer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { image: RgbaImage::from_pixel(width as u32, height as u32, BLANK) }
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba<u8> {
        *self.image.get_pixel(x as u32, y as u32)
    }

    /// Raw RGBA bytes, row-major, 4 per pixel.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Reset every pixel to `BLANK`, keeping the allocation.
    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = BLANK;
        }
    }

    /// True if any pixel has non-zero alpha.
    #[cfg(test)]
    pub fn has_paint(&self) -> bool {
        self.image.pixels().any(|px| px[3] != 0)
    }

    #[inline]
    fn paint(&mut self, x: usize, y: usize, color: Color) {
        self.image.put_pixel(x as u32, y as u32, Rgba([color[0], color[1], color[2], 255]));
    }

    #[inline]
    fn blank(&mut self, x: usize, y: usize) {
        self.image.put_pixel(x as u32, y as u32, BLANK);
    }
}

/// Draw one stroke into a layer at full opacity. Degenerate strokes
/// (both points equal) draw nothing.
pub fn rasterize(stroke: &Stroke, brush: Brush, layer: &mut CanvasLayer) {
    let (w, h) = layer.dimensions();
    let hw = raster::half_width(brush.thickness);
    let color = brush.color;
    match *stroke {
        Stroke::Segment { from, to } => {
            if from == to {
                return;
            }
            raster::capsule(w, h, from, to, hw, |x, y| layer.paint(x, y, color));
        }
        Stroke::Shape { anchor, cursor, .. } if anchor == cursor => {}
        Stroke::Shape { kind: ShapeKind::Line, anchor, cursor } => {
            raster::capsule(w, h, anchor, cursor, hw, |x, y| layer.paint(x, y, color));
        }
        Stroke::Shape { kind: ShapeKind::Rectangle, anchor, cursor } => {
            raster::rect_outline(w, h, anchor, cursor, hw, |x, y| layer.paint(x, y, color));
        }
        Stroke::Shape { kind: ShapeKind::Circle, anchor, cursor } => {
            let (center, radius) = circle_from_drag(anchor, cursor);
            raster::ring(w, h, center, radius, hw, |x, y| layer.paint(x, y, color));
        }
    }
}

/// Owns both layers and the pending free-draw anchor.
pub struct CanvasStore {
    persistent: CanvasLayer,
    preview: CanvasLayer,
    anchor: Option<Point>,
}

impl CanvasStore {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            persistent: CanvasLayer::new(width, height),
            preview: CanvasLayer::new(width, height),
            anchor: None,
        }
    }

    pub fn persistent(&self) -> &CanvasLayer {
        &self.persistent
    }

    pub fn preview(&self) -> &CanvasLayer {
        &self.preview
    }

    #[cfg(test)]
    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Record the anchor a stroke starts from. Keeps an existing anchor.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.anchor.is_none() {
            self.anchor = Some(point);
        }
    }

    /// Draw from the anchor to `point` and move the anchor there.
    /// Without an anchor this only starts one.
    pub fn continue_stroke(&mut self, point: Point, brush: Brush) {
        match self.anchor {
            Some(from) => {
                self.extend_stroke(from, point, brush.color, brush.thickness);
                self.anchor = Some(point);
            }
            None => self.anchor = Some(point),
        }
    }

    /// Forget the anchor so the next stroke cannot join this one.
    pub fn end_stroke(&mut self) {
        self.anchor = None;
    }

    pub fn extend_stroke(&mut self, from: Point, to: Point, color: Color, thickness: u32) {
        rasterize(&Stroke::Segment { from, to }, Brush { color, thickness }, &mut self.persistent);
    }

    /// Blank every persistent pixel within `radius` of `point`.
    pub fn erase(&mut self, point: Point, radius: u32) {
        let (w, h) = self.persistent.dimensions();
        let layer = &mut self.persistent;
        raster::disc(w, h, point, radius, |x, y| layer.blank(x, y));
    }

    pub fn preview_shape(&mut self, kind: ShapeKind, anchor: Point, cursor: Point, color: Color, thickness: u32) {
        self.preview.clear();
        rasterize(&Stroke::Shape { kind, anchor, cursor }, Brush { color, thickness }, &mut self.preview);
    }

    pub fn commit_shape(&mut self, kind: ShapeKind, anchor: Point, cursor: Point, color: Color, thickness: u32) {
        rasterize(&Stroke::Shape { kind, anchor, cursor }, Brush { color, thickness }, &mut self.persistent);
        self.preview.clear();
    }

    pub fn clear_preview(&mut self) {
        self.preview.clear();
    }

    /// Wipe all committed strokes.
    pub fn clear(&mut self) {
        self.persistent.clear();
        self.anchor = None;
    }
}
