// One error type for the whole app.
// Every variant states *where* things went wrong.
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed
    #[error("No camera frame within {0:?}")]
    NoFrame(Duration), // Startup timed out before the first frame
    #[error("Camera lost: {0}")]
    CameraLost(String), // Capture thread gave up mid-run
    #[error("Size mismatch in {what}: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("Config error: {0}")]
    Config(String), // An AIR_CANVAS_* variable could not be parsed
}
