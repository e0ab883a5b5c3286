// Circular buttons laid out over the video, their visibility rules,
// hit-testing and what each button does when clicked.

use image::Rgb;
use log::debug;

use crate::canvas::{CanvasStore, ShapeKind};
use crate::draw::{self, text_width_5x7};
use crate::raster;
use crate::types::{
    pack_rgb, Bounds, Color, FrameBuffer, Point, BLACK, BLUE, CYAN, GREEN, PURPLE, RED, WHITE, YELLOW,
};

/// Reference resolution the layout is designed in; scaled to the camera.
const REF_W: f32 = 1280.0;
const REF_H: f32 = 720.0;

const TOGGLE_RADIUS: f32 = 30.0;
const SWATCH_RADIUS: f32 = 25.0;

pub const PALETTE: [Color; 8] = [RED, GREEN, BLUE, YELLOW, PURPLE, CYAN, WHITE, BLACK];
pub const PEN_SIZES: [u32; 5] = [5, 10, 15, 20, 25];

/// Current drawing tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    FreeDraw,
    Shape(ShapeKind),
}

impl Tool {
    pub fn label(self) -> &'static str {
        match self {
            Tool::FreeDraw => "FREE",
            Tool::Shape(ShapeKind::Line) => "LINE",
            Tool::Shape(ShapeKind::Rectangle) => "RECT",
            Tool::Shape(ShapeKind::Circle) => "CIRCLE",
        }
    }
}

pub const TOOLS: [Tool; 4] = [
    Tool::FreeDraw,
    Tool::Shape(ShapeKind::Line),
    Tool::Shape(ShapeKind::Rectangle),
    Tool::Shape(ShapeKind::Circle),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// Parent of everything else; also gates drawing.
    Board,
    Colors,
    Sizes,
    Eraser,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonRole {
    Toggle(Toggle),
    Color(Color),
    Size(u32),
    Shape(Tool),
    Clear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Group {
    Board,
    Controls,
    Colors,
    Sizes,
    Shapes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonId {
    pub group: Group,
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    pub center: Point,
    pub radius: i32,
    pub role: ButtonRole,
    pub label: &'static str,
}

impl Button {
    fn new(center: Point, radius: i32, role: ButtonRole, label: &'static str) -> Self {
        Self { center, radius, role, label }
    }

    /// Strictly inside the circle; the rim itself is a miss.
    pub fn hit(&self, p: Point) -> bool {
        p.dist2(self.center) < (self.radius as i64) * (self.radius as i64)
    }
}

/// Brush and menu state, changed only by button dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct UiState {
    pub board_visible: bool,
    pub colors_visible: bool,
    pub sizes_visible: bool,
    pub eraser_active: bool,
    pub color: Color,
    pub brush_size: u32,
    pub tool: Tool,
    pub hovered: Option<ButtonId>,
}

impl UiState {
    pub fn new(color: Color, brush_size: u32) -> Self {
        Self {
            board_visible: true,
            colors_visible: false,
            sizes_visible: false,
            eraser_active: false,
            color,
            brush_size,
            tool: Tool::FreeDraw,
            hovered: None,
        }
    }

    fn toggle(&mut self, which: Toggle) {
        let flag = match which {
            Toggle::Board => &mut self.board_visible,
            Toggle::Colors => &mut self.colors_visible,
            Toggle::Sizes => &mut self.sizes_visible,
            Toggle::Eraser => &mut self.eraser_active,
        };
        *flag = !*flag;
    }

    fn is_on(&self, which: Toggle) -> bool {
        match which {
            Toggle::Board => self.board_visible,
            Toggle::Colors => self.colors_visible,
            Toggle::Sizes => self.sizes_visible,
            Toggle::Eraser => self.eraser_active,
        }
    }
}

/// Every button, grouped. Built once from the frame size and never resized.
#[derive(Clone, Debug)]
pub struct Menu {
    board: Vec<Button>,
    controls: Vec<Button>,
    colors: Vec<Button>,
    sizes: Vec<Button>,
    shapes: Vec<Button>,
    canvas_bounds: Bounds,
}

impl Menu {
    /// Lay the menu out for a `width x height` frame.
    pub fn new(width: usize, height: usize) -> Self {
        let sx = width as f32 / REF_W;
        let sy = height as f32 / REF_H;
        let s = sx.min(sy);
        let at = |x: f32, y: f32| Point::new((x * sx).round() as i32, (y * sy).round() as i32);
        let rad = |r: f32| ((r * s).round() as i32).max(3);

        let (board_x, top_y) = (80.0, 50.0);
        let pen_x = 1170.0;
        let clear_x = pen_x - 80.0;
        let eraser_x = clear_x - 80.0;
        let color_x = eraser_x - 80.0;

        let board = vec![Button::new(at(board_x, top_y), rad(TOGGLE_RADIUS), ButtonRole::Toggle(Toggle::Board), "BOARD")];

        let controls = vec![
            Button::new(at(pen_x, top_y), rad(TOGGLE_RADIUS), ButtonRole::Toggle(Toggle::Sizes), "SIZE"),
            Button::new(at(color_x, top_y), rad(TOGGLE_RADIUS), ButtonRole::Toggle(Toggle::Colors), "COLORS"),
            Button::new(at(eraser_x, top_y), rad(TOGGLE_RADIUS), ButtonRole::Toggle(Toggle::Eraser), "ERASER"),
            Button::new(at(clear_x, top_y), rad(TOGGLE_RADIUS), ButtonRole::Clear, "CLEAR"),
        ];

        let colors = PALETTE
            .iter()
            .enumerate()
            .map(|(i, &c)| Button::new(at(color_x - 60.0 - i as f32 * 55.0, top_y), rad(SWATCH_RADIUS), ButtonRole::Color(c), ""))
            .collect();

        let sizes = PEN_SIZES
            .iter()
            .enumerate()
            .map(|(i, &size)| Button::new(at(pen_x, top_y + 60.0 + i as f32 * 50.0), rad(size as f32), ButtonRole::Size(size), ""))
            .collect();

        let shapes = TOOLS
            .iter()
            .enumerate()
            .map(|(i, &tool)| {
                Button::new(
                    at(board_x + TOGGLE_RADIUS + 60.0 + i as f32 * 80.0, top_y),
                    rad(SWATCH_RADIUS),
                    ButtonRole::Shape(tool),
                    tool.label(),
                )
            })
            .collect();

        let tl = at(50.0, 120.0);
        let br = at(1070.0, 700.0);
        let canvas_bounds = Bounds { left: tl.x, top: tl.y, right: br.x, bottom: br.y };

        Self { board, controls, colors, sizes, shapes, canvas_bounds }
    }

    /// Open region where strokes may be drawn.
    pub fn canvas_bounds(&self) -> Bounds {
        self.canvas_bounds
    }

    fn group(&self, group: Group) -> &[Button] {
        match group {
            Group::Board => &self.board,
            Group::Controls => &self.controls,
            Group::Colors => &self.colors,
            Group::Sizes => &self.sizes,
            Group::Shapes => &self.shapes,
        }
    }

    pub fn button(&self, id: ButtonId) -> Option<&Button> {
        self.group(id.group).get(id.index)
    }

    /// Groups that can currently be hit or drawn, in hit priority order.
    fn visible_groups(ui: &UiState) -> Vec<Group> {
        let mut groups = vec![Group::Board];
        if ui.board_visible {
            groups.push(Group::Controls);
            if ui.colors_visible {
                groups.push(Group::Colors);
            }
            if ui.sizes_visible {
                groups.push(Group::Sizes);
            }
            groups.push(Group::Shapes);
        }
        groups
    }

    /// Visible buttons with their ids, toggles first.
    pub fn visible_buttons<'a>(&'a self, ui: &UiState) -> impl Iterator<Item = (ButtonId, &'a Button)> + 'a {
        Self::visible_groups(ui).into_iter().flat_map(move |group| {
            self.group(group).iter().enumerate().map(move |(index, b)| (ButtonId { group, index }, b))
        })
    }

    /// First visible button under `p`.
    pub fn hit_test(&self, ui: &UiState, p: Point) -> Option<ButtonId> {
        self.visible_buttons(ui).find(|(_, b)| b.hit(p)).map(|(id, _)| id)
    }

    /// Update hover from the finger and fire the hovered button on click.
    /// Returns the button that fired, if any.
    pub fn handle_interaction(
        &self,
        ui: &mut UiState,
        canvas: &mut CanvasStore,
        finger_pos: Option<Point>,
        is_clicking: bool,
    ) -> Option<&Button> {
        let Some(p) = finger_pos else {
            ui.hovered = None;
            return None;
        };

        let hit = self.hit_test(ui, p);
        ui.hovered = hit;
        let id = hit?;
        if !is_clicking {
            return None;
        }

        let button = self.button(id)?;
        dispatch(button.role, ui, canvas);
        debug!("button {:?} fired: {:?}", id, button.role);
        Some(button)
    }

    /// Draw every visible button onto the screen buffer.
    pub fn render(&self, ui: &UiState, fb: &mut FrameBuffer) {
        for (id, b) in self.visible_buttons(ui) {
            match b.role {
                ButtonRole::Toggle(which) => draw_toggle(fb, b, ui.is_on(which)),
                ButtonRole::Size(_) => {
                    draw::fill_disc(fb, b.center, (b.radius + 4) as u32, WHITE, 1.0);
                    draw::fill_disc(fb, b.center, b.radius as u32, Rgb([80, 80, 80]), 1.0);
                }
                ButtonRole::Color(c) => draw::fill_disc(fb, b.center, b.radius as u32, c, 0.5),
                ButtonRole::Clear => draw::fill_disc(fb, b.center, b.radius as u32, Rgb([100, 100, 100]), 0.5),
                ButtonRole::Shape(_) => draw::fill_disc(fb, b.center, b.radius as u32, Rgb([60, 60, 60]), 0.4),
            }

            let selected = match b.role {
                ButtonRole::Color(c) => c == ui.color && !ui.eraser_active,
                ButtonRole::Size(s) => s == ui.brush_size,
                ButtonRole::Shape(t) => t == ui.tool && !ui.eraser_active,
                _ => false,
            };
            if selected {
                draw_outline(fb, b, 2, WHITE);
            }
            if ui.hovered == Some(id) {
                draw_outline(fb, b, 4, YELLOW);
            }

            if !b.label.is_empty() {
                let x = b.center.x - text_width_5x7(b.label) / 2;
                let y = b.center.y + b.radius + 8;
                draw::draw_text_5x7(fb, x, y, b.label, pack_rgb(WHITE));
            }
        }
    }
}

fn dispatch(role: ButtonRole, ui: &mut UiState, canvas: &mut CanvasStore) {
    match role {
        ButtonRole::Toggle(which) => ui.toggle(which),
        ButtonRole::Color(c) => {
            ui.color = c;
            ui.eraser_active = false;
        }
        ButtonRole::Size(s) => ui.brush_size = s,
        ButtonRole::Shape(tool) => {
            ui.tool = tool;
            ui.eraser_active = false;
        }
        ButtonRole::Clear => canvas.clear(),
    }
}

fn draw_outline(fb: &mut FrameBuffer, b: &Button, gap: i32, color: Color) {
    let (w, h) = fb.dimensions();
    let px = pack_rgb(color);
    raster::ring(w, h, b.center, (b.radius + gap) as u32, 1.0, |x, y| fb.pixels[y * w + x] = px);
}

/// White disc with a grey rim, crossed out in red when on.
fn draw_toggle(fb: &mut FrameBuffer, b: &Button, on: bool) {
    draw::fill_disc(fb, b.center, b.radius as u32, WHITE, 1.0);
    draw_outline(fb, b, 0, Rgb([200, 200, 200]));
    if !on {
        return;
    }
    let o = (b.radius * 8 / 30).max(2);
    let (cx, cy) = (b.center.x, b.center.y);
    draw::thick_line(fb, Point::new(cx - o, cy - o), Point::new(cx + o, cy + o), 2, RED);
    draw::thick_line(fb, Point::new(cx + o, cy - o), Point::new(cx - o, cy + o), 2, RED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasStore;

    fn setup() -> (Menu, UiState, CanvasStore) {
        (Menu::new(1280, 720), UiState::new(RED, 10), CanvasStore::new(1280, 720))
    }

    fn center_of(menu: &Menu, role: ButtonRole) -> Point {
        [Group::Board, Group::Controls, Group::Colors, Group::Sizes, Group::Shapes]
            .into_iter()
            .flat_map(|g| menu.group(g).iter())
            .find(|b| b.role == role)
            .map(|b| b.center)
            .unwrap()
    }

    #[test]
    fn rim_is_not_a_hit() {
        let b = Button::new(Point::new(100, 100), 30, ButtonRole::Clear, "");
        assert!(b.hit(Point::new(129, 100)));
        assert!(!b.hit(Point::new(130, 100)));
        assert!(!b.hit(Point::new(100, 70)));
        assert!(!b.hit(Point::new(i32::MIN, i32::MAX)));
        assert!(!b.hit(Point::new(i32::MAX, 100)));
    }

    #[test]
    fn boundary_position_fires_nothing() {
        let (menu, mut ui, mut canvas) = setup();
        let board = &menu.board[0];
        let edge = Point::new(board.center.x + board.radius, board.center.y);
        assert!(menu.handle_interaction(&mut ui, &mut canvas, Some(edge), true).is_none());
        assert!(ui.board_visible);
        assert_eq!(ui.hovered, None);
    }

    #[test]
    fn hover_without_click_fires_nothing() {
        let (menu, mut ui, mut canvas) = setup();
        let p = center_of(&menu, ButtonRole::Toggle(Toggle::Eraser));
        assert!(menu.handle_interaction(&mut ui, &mut canvas, Some(p), false).is_none());
        assert_eq!(ui.hovered, Some(ButtonId { group: Group::Controls, index: 2 }));
        assert!(!ui.eraser_active);
    }

    #[test]
    fn missing_finger_clears_hover() {
        let (menu, mut ui, mut canvas) = setup();
        let p = center_of(&menu, ButtonRole::Clear);
        menu.handle_interaction(&mut ui, &mut canvas, Some(p), false);
        assert!(ui.hovered.is_some());
        assert!(menu.handle_interaction(&mut ui, &mut canvas, None, true).is_none());
        assert_eq!(ui.hovered, None);
    }

    #[test]
    fn hidden_groups_are_not_hit() {
        let (menu, mut ui, mut canvas) = setup();
        let green = center_of(&menu, ButtonRole::Color(GREEN));
        assert!(menu.handle_interaction(&mut ui, &mut canvas, Some(green), true).is_none());
        assert_eq!(ui.color, RED);

        ui.colors_visible = true;
        let fired = menu.handle_interaction(&mut ui, &mut canvas, Some(green), true);
        assert_eq!(fired.map(|b| b.role), Some(ButtonRole::Color(GREEN)));
        assert_eq!(ui.color, GREEN);

        // Board hidden hides its children even if their own toggle is on.
        ui.board_visible = false;
        assert!(menu.handle_interaction(&mut ui, &mut canvas, Some(green), true).is_none());
        let shape = center_of(&menu, ButtonRole::Shape(Tool::Shape(ShapeKind::Circle)));
        assert!(menu.handle_interaction(&mut ui, &mut canvas, Some(shape), true).is_none());
    }

    #[test]
    fn dispatch_by_role() {
        let (menu, mut ui, mut canvas) = setup();
        ui.colors_visible = true;
        ui.sizes_visible = true;

        let eraser = center_of(&menu, ButtonRole::Toggle(Toggle::Eraser));
        menu.handle_interaction(&mut ui, &mut canvas, Some(eraser), true);
        assert!(ui.eraser_active);

        let circle = center_of(&menu, ButtonRole::Shape(Tool::Shape(ShapeKind::Circle)));
        menu.handle_interaction(&mut ui, &mut canvas, Some(circle), true);
        assert_eq!(ui.tool, Tool::Shape(ShapeKind::Circle));
        assert!(!ui.eraser_active);

        let size = center_of(&menu, ButtonRole::Size(20));
        menu.handle_interaction(&mut ui, &mut canvas, Some(size), true);
        assert_eq!(ui.brush_size, 20);

        menu.handle_interaction(&mut ui, &mut canvas, Some(eraser), true);
        let blue = center_of(&menu, ButtonRole::Color(BLUE));
        menu.handle_interaction(&mut ui, &mut canvas, Some(blue), true);
        assert_eq!(ui.color, BLUE);
        assert!(!ui.eraser_active);

        let sizes = center_of(&menu, ButtonRole::Toggle(Toggle::Sizes));
        menu.handle_interaction(&mut ui, &mut canvas, Some(sizes), true);
        assert!(!ui.sizes_visible);
    }

    #[test]
    fn clear_button_wipes_canvas() {
        let (menu, mut ui, mut canvas) = setup();
        canvas.extend_stroke(Point::new(200, 300), Point::new(400, 300), RED, 10);
        assert!(canvas.persistent().has_paint());
        let clear = center_of(&menu, ButtonRole::Clear);
        menu.handle_interaction(&mut ui, &mut canvas, Some(clear), true);
        assert!(!canvas.persistent().has_paint());
    }

    #[test]
    fn layout_scales_and_stays_apart() {
        let menu = Menu::new(640, 480);
        let ui = UiState { colors_visible: true, sizes_visible: true, ..UiState::new(RED, 10) };
        let buttons: Vec<_> = menu.visible_buttons(&ui).map(|(_, b)| b.clone()).collect();
        assert_eq!(buttons.len(), 1 + 4 + 8 + 5 + 4);
        for (i, a) in buttons.iter().enumerate() {
            for b in &buttons[i + 1..] {
                assert!(a.center.dist2(b.center) >= ((a.radius + b.radius) as i64).pow(2) - 1, "{a:?} overlaps {b:?}");
            }
            assert!(!menu.canvas_bounds().contains(a.center), "{a:?} sits on the canvas");
        }
    }

    #[test]
    fn render_marks_toggle_on_screen() {
        let (menu, ui, _) = setup();
        let mut fb = FrameBuffer::new(1280, 720);
        menu.render(&ui, &mut fb);
        let b = &menu.board[0];
        assert_ne!(fb.pixels[b.center.y as usize * 1280 + b.center.x as usize], 0);
    }
}
