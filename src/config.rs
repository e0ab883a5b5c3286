// Runtime knobs. Compiled-in defaults, each overridable from the environment:
//   AIR_CANVAS_CAMERA=1 AIR_CANVAS_WIDTH=1280 AIR_CANVAS_HEIGHT=720 air-canvas

use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;
use crate::types::{Color, RED};

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub camera_index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// How long startup waits for the first camera frame.
    pub startup_timeout: Duration,
    /// Consecutive failed reads before the camera counts as lost.
    pub max_frame_failures: u32,
    /// Flip frames left-to-right (selfie view).
    pub mirror: bool,
    pub brush_color: Color,
    pub brush_size: u32,
    pub eraser_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_index: 0,
            width: 640,
            height: 480,
            fps: 30,
            startup_timeout: Duration::from_secs(5),
            max_frame_failures: 3,
            mirror: true,
            brush_color: RED,
            brush_size: 10,
            eraser_size: 30,
        }
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key}={raw:?} is not a valid value")))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, Error> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{key}={raw:?} is not a boolean"))),
    }
}

impl Config {
    /// Defaults overridden by `AIR_CANVAS_*` variables from the process env.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut cfg = Self::default();

        if let Some(v) = lookup("AIR_CANVAS_CAMERA") {
            cfg.camera_index = parse("AIR_CANVAS_CAMERA", &v)?;
        }
        if let Some(v) = lookup("AIR_CANVAS_WIDTH") {
            cfg.width = parse("AIR_CANVAS_WIDTH", &v)?;
        }
        if let Some(v) = lookup("AIR_CANVAS_HEIGHT") {
            cfg.height = parse("AIR_CANVAS_HEIGHT", &v)?;
        }
        if let Some(v) = lookup("AIR_CANVAS_FPS") {
            cfg.fps = parse("AIR_CANVAS_FPS", &v)?;
        }
        if let Some(v) = lookup("AIR_CANVAS_STARTUP_TIMEOUT_MS") {
            cfg.startup_timeout = Duration::from_millis(parse("AIR_CANVAS_STARTUP_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = lookup("AIR_CANVAS_MAX_FRAME_FAILURES") {
            cfg.max_frame_failures = parse("AIR_CANVAS_MAX_FRAME_FAILURES", &v)?;
        }
        if let Some(v) = lookup("AIR_CANVAS_MIRROR") {
            cfg.mirror = parse_bool("AIR_CANVAS_MIRROR", &v)?;
        }
        if let Some(v) = lookup("AIR_CANVAS_BRUSH_SIZE") {
            cfg.brush_size = parse("AIR_CANVAS_BRUSH_SIZE", &v)?;
        }
        if let Some(v) = lookup("AIR_CANVAS_ERASER_SIZE") {
            cfg.eraser_size = parse("AIR_CANVAS_ERASER_SIZE", &v)?;
        }

        if cfg.width == 0 || cfg.height == 0 {
            return Err(Error::Config(format!("resolution {}x{} is empty", cfg.width, cfg.height)));
        }
        if cfg.fps == 0 {
            return Err(Error::Config("fps must be positive".into()));
        }
        Ok(cfg)
    }
}
