// Per-frame orchestration: classify hands, let the menu react, then paint,
// erase or drag a shape on the canvas. Owns every piece of mutable state so
// nothing lives in globals; only the interaction loop touches it.

use log::debug;

use crate::canvas::{Brush, CanvasStore, ShapeKind};
use crate::compositor;
use crate::config::Config;
use crate::draw;
use crate::error::Error;
use crate::gesture::{Finger, GestureClassifier, Hand, HandGesture};
use crate::menu::{ButtonRole, Menu, Tool, UiState};
use crate::types::{FrameBuffer, Point};
use image::Rgb;

const MARKER_RADIUS: u32 = 5;

/// What the hands are doing to the canvas right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeState {
    Idle,
    /// Free-drawing; the store holds the previous point as its anchor.
    Drawing,
    Erasing,
    /// Shape drag in progress, started at `anchor`.
    Dragging { kind: ShapeKind, anchor: Point },
}

impl StrokeState {
    pub fn label(self) -> &'static str {
        match self {
            StrokeState::Idle => "IDLE",
            StrokeState::Drawing => "DRAW",
            StrokeState::Erasing => "ERASE",
            StrokeState::Dragging { .. } => "DRAG",
        }
    }
}

/// Everything the loop learned about this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput<'a> {
    /// Hands in detector order; hand 0 drives the canvas and menu.
    pub hands: &'a [Hand],
    /// Click intent from the pinch/tap detector.
    pub clicking: bool,
}

/// A fingertip marker for the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Marker {
    at: Point,
    hollow: bool,
}

pub struct Session {
    width: usize,
    height: usize,
    classifier: GestureClassifier,
    canvas: CanvasStore,
    menu: Menu,
    ui: UiState,
    eraser_size: u32,
    state: StrokeState,
    markers: Vec<Marker>,
    click_held: bool,
    /// The current click press already fired a button.
    click_consumed: bool,
}

impl Session {
    pub fn new(width: usize, height: usize, cfg: &Config) -> Self {
        let ui = UiState::new(cfg.brush_color, cfg.brush_size);
        Self {
            width,
            height,
            classifier: GestureClassifier::new(ui.board_visible),
            canvas: CanvasStore::new(width, height),
            menu: Menu::new(width, height),
            ui,
            eraser_size: cfg.eraser_size,
            state: StrokeState::Idle,
            markers: Vec::new(),
            click_held: false,
            click_consumed: false,
        }
    }

    #[cfg(test)]
    pub fn canvas(&self) -> &CanvasStore {
        &self.canvas
    }

    #[cfg(test)]
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    #[cfg(test)]
    pub fn ui_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    #[cfg(test)]
    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    #[cfg(test)]
    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn clear_canvas(&mut self) {
        self.canvas.clear();
        debug!("canvas cleared");
    }

    /// Advance one frame. Returns the role of the button that fired, if any.
    pub fn step(&mut self, input: FrameInput<'_>) -> Option<ButtonRole> {
        self.canvas.clear_preview();

        self.classifier.set_drawing_enabled(self.ui.board_visible);
        let gestures = self.classifier.classify_all(input.hands);
        self.markers = markers(input.hands, &gestures, self.width, self.height);

        let primary = gestures.first();
        let finger = primary.and_then(|g| g.index_tip_px(self.width, self.height));

        // Buttons fire on the press, not on every frame the click is held.
        if !input.clicking {
            self.click_consumed = false;
        }
        let pressed = input.clicking && !self.click_held;
        self.click_held = input.clicking;

        let fired = self
            .menu
            .handle_interaction(&mut self.ui, &mut self.canvas, finger, pressed)
            .map(|b| b.role);
        if fired.is_some() {
            self.click_consumed = true;
        }

        // A toggle may have just hidden the board.
        let draw_intent = primary.is_some_and(|g| g.draw_intent) && self.ui.board_visible;
        let clicking = input.clicking && !self.click_consumed && self.ui.board_visible;
        // A drag starts on the press itself; sliding a held click onto the
        // board never starts one.
        let press = pressed && clicking;

        let next = if self.ui.eraser_active {
            self.erase_step(finger, draw_intent)
        } else {
            match self.ui.tool {
                Tool::FreeDraw => self.draw_step(finger, draw_intent),
                Tool::Shape(kind) => self.drag_step(kind, finger, clicking, press),
            }
        };
        if next != self.state {
            debug!("stroke state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
        fired
    }

    fn inside(&self, finger: Option<Point>) -> Option<Point> {
        let bounds = self.menu.canvas_bounds();
        finger.filter(|p| bounds.contains(*p))
    }

    fn brush(&self) -> Brush {
        Brush { color: self.ui.color, thickness: self.ui.brush_size }
    }

    fn draw_step(&mut self, finger: Option<Point>, draw_intent: bool) -> StrokeState {
        match self.inside(finger) {
            Some(p) if draw_intent => {
                if self.state == StrokeState::Drawing {
                    let brush = self.brush();
                    self.canvas.continue_stroke(p, brush);
                } else {
                    // Fresh anchor on (re-)entry: never bridge a gap.
                    self.canvas.end_stroke();
                    self.canvas.begin_stroke(p);
                }
                StrokeState::Drawing
            }
            _ => {
                self.canvas.end_stroke();
                StrokeState::Idle
            }
        }
    }

    fn erase_step(&mut self, finger: Option<Point>, draw_intent: bool) -> StrokeState {
        self.canvas.end_stroke();
        match self.inside(finger) {
            Some(p) if draw_intent => {
                self.canvas.erase(p, self.eraser_size);
                StrokeState::Erasing
            }
            _ => StrokeState::Idle,
        }
    }

    fn drag_step(&mut self, kind: ShapeKind, finger: Option<Point>, clicking: bool, press: bool) -> StrokeState {
        self.canvas.end_stroke();
        let brush = self.brush();

        match self.state {
            StrokeState::Dragging { kind: dragged, anchor } if clicking => {
                if let Some(cursor) = self.inside(finger) {
                    self.canvas.preview_shape(dragged, anchor, cursor, brush.color, brush.thickness);
                }
                StrokeState::Dragging { kind: dragged, anchor }
            }
            StrokeState::Dragging { kind: dragged, anchor } => {
                match self.inside(finger) {
                    Some(cursor) => self.canvas.commit_shape(dragged, anchor, cursor, brush.color, brush.thickness),
                    None => debug!("{dragged:?} released off the canvas, dropped"),
                }
                StrokeState::Idle
            }
            _ if press => match self.inside(finger) {
                Some(anchor) => StrokeState::Dragging { kind, anchor },
                None => StrokeState::Idle,
            },
            _ => StrokeState::Idle,
        }
    }

    /// Composite the canvas over `frame` into `out`, then draw the menu and
    /// fingertip markers on top.
    pub fn render(&self, frame: &FrameBuffer, out: &mut FrameBuffer) -> Result<(), Error> {
        compositor::composite(frame, self.canvas.persistent(), self.canvas.preview(), out)?;
        self.menu.render(&self.ui, out);
        for m in &self.markers {
            draw::ring(out, m.at, MARKER_RADIUS, 2, Rgb([200, 200, 200]));
            if !m.hollow {
                draw::fill_disc(out, m.at, MARKER_RADIUS - 1, Rgb([75, 75, 75]), 1.0);
            }
        }
        Ok(())
    }

    /// Short HUD text: stroke state and active tool.
    pub fn status_line(&self) -> String {
        let tool = if self.ui.eraser_active { "ERASER" } else { self.ui.tool.label() };
        format!("{} | {}", self.state.label(), tool)
    }
}

/// One marker per raised fingertip; the drawing index finger stays hollow.
fn markers(hands: &[Hand], gestures: &[HandGesture], width: usize, height: usize) -> Vec<Marker> {
    let mut out = Vec::new();
    for (hand, g) in hands.iter().zip(gestures) {
        for finger in Finger::ALL {
            if !g.fingers.is_raised(finger) {
                continue;
            }
            if let Some(tip) = hand.landmark(finger.tip()) {
                out.push(Marker {
                    at: Point::new((tip.x * width as f32).round() as i32, (tip.y * height as f32).round() as i32),
                    hollow: g.draw_intent && finger == Finger::Index,
                });
            }
        }
    }
    out
}
