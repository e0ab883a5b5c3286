// What you SEE:
// • Live (mirrored) camera is always the base image.
// • Raise your index finger (middle finger down) inside the board to paint.
// • Pinch thumb + index to press buttons or drag out a line/rectangle/circle.
// • Toggles along the top show colours, pen sizes, the eraser and CLEAR.
// • Without a landmark model wired in, the mouse stands in for hand 0:
//   hold LMB = index raised, hold RMB = pinch.
// • C clears the canvas. ESC quits.

mod camera;
mod canvas;
mod compositor;
mod config;
mod draw;
mod error;
mod gesture;
mod menu;
mod raster;
mod session;
mod types;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use camera::FrameGrabber;
use config::Config;
use draw::{draw_text_5x7, Drawer, PointerInput};
use error::Error;
use gesture::{is_pinching, pointer_hand, Hand, PINCH_DISTANCE};
use session::{FrameInput, Session};
use types::{pack_rgb, FrameBuffer, WHITE};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Hand 0 synthesised from the mouse, plus its pinch state.
fn pointer_hands(pointer: PointerInput, width: usize, height: usize) -> (Vec<Hand>, bool) {
    let hands: Vec<Hand> = pointer
        .pos
        .map(|(x, y)| pointer_hand(x / width as f32, y / height as f32, pointer.left, pointer.right))
        .into_iter()
        .collect();
    let clicking = hands.first().is_some_and(|h| is_pinching(h, PINCH_DISTANCE));
    (hands, clicking)
}

fn run() -> Result<(), Error> {
    let cfg = Config::from_env()?;
    debug!("{cfg:?}");

    /* --- Camera ---
       Nothing on screen until the first frame arrives (or we give up). */
    let mut grabber = FrameGrabber::start_camera(&cfg)?;
    let (cam_w, cam_h) = grabber.resolution();
    if (cam_w, cam_h) != (cfg.width, cfg.height) {
        info!("asked for {}x{}, camera chose {cam_w}x{cam_h}", cfg.width, cfg.height);
    }
    info!("waiting up to {:?} for the first frame", cfg.startup_timeout);
    let first = grabber.wait_first_frame(cfg.startup_timeout)?;
    let (w, h) = first.frame.dimensions();

    /* --- Window + session sized to what the camera actually delivers --- */
    let mut drawer = Drawer::new("Air Canvas", w, h, cfg.fps as usize)?;
    let mut session = Session::new(w, h, &cfg);
    info!("window open at {w}x{h}");

    let mut live = first.frame;
    let mut seen = first.seq;
    let mut screen = FrameBuffer::new(w, h);

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Newest camera frame, or keep the last one if none arrived. */
        match grabber.latest_after(seen) {
            Ok(Some(snap)) => {
                seen = snap.seq;
                if snap.frame.dimensions() == (w, h) {
                    live = snap.frame;
                } else {
                    warn!("dropping {:?} frame, expected {w}x{h}", snap.frame.dimensions());
                }
            }
            Ok(None) => {}
            Err(e) => {
                grabber.stop();
                return Err(e);
            }
        }

        /* 2) Keyboard */
        if drawer.c_pressed_once() {
            session.clear_canvas();
        }

        /* 3) Hands -> menu / canvas */
        let (hands, clicking) = pointer_hands(drawer.pointer(), w, h);
        if let Some(role) = session.step(FrameInput { hands: &hands, clicking }) {
            info!("pressed {role:?}");
        }

        /* 4) Composite + overlays into the screen buffer, then show it whole. */
        session.render(&live, &mut screen)?;
        let hud = format!("{} | {}", session.status_line(), hud_fps_text);
        draw_text_5x7(&mut screen, 8, h as i32 - 14, &hud, pack_rgb(WHITE));
        drawer.present(&screen)?;

        /* 5) FPS counter (log + HUD once per second) */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            debug!("FPS: {fps:.1}");
            hud_fps_text = format!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    grabber.stop();
    info!("bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pointer_means_no_hands() {
        let (hands, clicking) = pointer_hands(PointerInput::default(), 640, 480);
        assert!(hands.is_empty());
        assert!(!clicking);
    }

    #[test]
    fn right_button_pinches() {
        let pointer = PointerInput { pos: Some((320.0, 240.0)), left: false, right: true };
        let (hands, clicking) = pointer_hands(pointer, 640, 480);
        assert_eq!(hands.len(), 1);
        assert!(clicking);
    }

    #[test]
    fn left_button_draws_through_the_session() {
        let mut session = Session::new(640, 480, &Config::default());
        for x in [200.0, 260.0] {
            let pointer = PointerInput { pos: Some((x, 240.0)), left: true, right: false };
            let (hands, clicking) = pointer_hands(pointer, 640, 480);
            session.step(FrameInput { hands: &hands, clicking });
        }
        assert!(session.canvas().persistent().has_paint());
    }
}
