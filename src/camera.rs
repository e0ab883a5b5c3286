// Opens the camera on its own thread and publishes only the newest frame.
// The interaction loop copies that frame out under a short lock and never
// waits for a particular frame, except once at startup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use parking_lot::Mutex;

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};

use crate::config::Config;
use crate::error::Error;
use crate::types::FrameBuffer;

/// Anything that can hand out frames one at a time (blocking).
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<FrameBuffer, Error>;
    fn resolution(&self) -> (u32, u32);
}

// A small wrapper around nokhwa::Camera so the grabber stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
    mirror: bool,
}

impl CameraCapture {
    /// Open camera `index` near the requested resolution/fps (falls back if not exact).
    pub fn new(index: u32, width: u32, height: u32, fps: u32, mirror: bool) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            fps,
        );

        // Ask for RGB frames, closest to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req).map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream().map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        info!("camera {index} streaming at {}x{}", actual.width(), actual.height());

        Ok(Self { cam, width: actual.width(), height: actual.height(), mirror })
    }
}

impl FrameSource for CameraCapture {
    /// Grab one frame (blocks until the camera has one) as 0x00RRGGBB pixels.
    fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        let frame = self.cam.frame().map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        // Decode to ImageBuffer<Rgb<u8>, Vec<u8>> (handles the raw formats safely).
        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        let pixels = rgb_img
            .pixels()
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
            .collect();

        let mut fb = FrameBuffer { width: w as usize, height: h as usize, pixels };
        if self.mirror {
            fb.flip_horizontal();
        }
        Ok(fb)
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A copied-out frame and its publish number (1 = first frame).
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub seq: u64,
    pub frame: FrameBuffer,
}

#[derive(Default)]
struct Slot {
    latest: Option<FrameBuffer>,
    seq: u64,
    failure: Option<String>,
}

struct Shared {
    slot: Mutex<Slot>,
    running: AtomicBool,
}

/// Background capture thread with a last-write-wins frame slot.
pub struct FrameGrabber {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
    resolution: (u32, u32),
}

impl FrameGrabber {
    /// Open the configured camera on the capture thread.
    pub fn start_camera(cfg: &Config) -> Result<Self, Error> {
        let (index, w, h, fps, mirror) = (cfg.camera_index, cfg.width, cfg.height, cfg.fps, cfg.mirror);
        Self::spawn(move || CameraCapture::new(index, w, h, fps, mirror), cfg.max_frame_failures)
    }

    /// Run `open` on a new thread and keep publishing frames from what it returns.
    /// Once frames flow, `max_failures` consecutive read errors stop the thread for good.
    pub fn spawn<S, F>(open: F, max_failures: u32) -> Result<Self, Error>
    where
        S: FrameSource + 'static,
        F: FnOnce() -> Result<S, Error> + Send + 'static,
    {
        let shared = Arc::new(Shared { slot: Mutex::new(Slot::default()), running: AtomicBool::new(true) });
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("camera".into())
            .spawn(move || {
                // The source is created here so it never has to cross threads.
                let mut source = match open() {
                    Ok(s) => {
                        let _ = ready_tx.send(Ok(s.resolution()));
                        s
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                capture_loop(&mut source, &thread_shared, max_failures);
            })
            .map_err(|e| Error::CameraInit(format!("spawn capture thread: {e}")))?;

        let resolution = ready_rx
            .recv()
            .map_err(|_| Error::CameraInit("capture thread exited before opening".into()))??;

        Ok(Self { shared, handle: Some(handle), resolution })
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// Copy of the newest frame if it is newer than `seen`.
    /// Errors once the capture thread has given up.
    pub fn latest_after(&self, seen: u64) -> Result<Option<Snapshot>, Error> {
        let slot = self.shared.slot.lock();
        if let Some(reason) = &slot.failure {
            return Err(Error::CameraLost(reason.clone()));
        }
        Ok(match &slot.latest {
            Some(frame) if slot.seq > seen => Some(Snapshot { seq: slot.seq, frame: frame.clone() }),
            _ => None,
        })
    }

    /// Poll until the first frame lands or `timeout` passes.
    pub fn wait_first_frame(&self, timeout: Duration) -> Result<Snapshot, Error> {
        let start = Instant::now();
        loop {
            if let Some(snap) = self.latest_after(0)? {
                return Ok(snap);
            }
            if start.elapsed() >= timeout {
                return Err(Error::NoFrame(timeout));
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Ask the thread to stop and wait for it.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FrameGrabber {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read errors before the first frame are warm-up noise; only the startup
/// timeout in `wait_first_frame` can give up on them.
fn capture_loop<S: FrameSource>(source: &mut S, shared: &Shared, max_failures: u32) {
    let mut failures = 0u32;
    let mut streaming = false;
    while shared.running.load(Ordering::Relaxed) {
        match source.next_frame() {
            Ok(frame) => {
                failures = 0;
                streaming = true;
                let mut slot = shared.slot.lock();
                slot.latest = Some(frame);
                slot.seq += 1;
            }
            Err(e) if !streaming => {
                debug!("camera warming up: {e}");
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => {
                failures += 1;
                warn!("frame read failed ({failures}/{max_failures}): {e}");
                if failures >= max_failures {
                    shared.slot.lock().failure = Some(e.to_string());
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Plays back a script of results, then idles returning the last frame.
    struct Scripted {
        script: VecDeque<Result<FrameBuffer, Error>>,
        idle: FrameBuffer,
    }

    impl FrameSource for Scripted {
        fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
            thread::sleep(Duration::from_millis(1));
            self.script.pop_front().unwrap_or_else(|| Ok(self.idle.clone()))
        }

        fn resolution(&self) -> (u32, u32) {
            (self.idle.width as u32, self.idle.height as u32)
        }
    }

    fn frame(v: u32) -> FrameBuffer {
        FrameBuffer { width: 2, height: 1, pixels: vec![v, v] }
    }

    #[test]
    fn open_failure_is_reported() {
        let res = FrameGrabber::spawn(|| Err::<Scripted, _>(Error::CameraInit("no device".into())), 3);
        assert!(matches!(res, Err(Error::CameraInit(_))));
    }

    #[test]
    fn transient_failures_are_skipped() {
        let grabber = FrameGrabber::spawn(
            || {
                Ok(Scripted {
                    script: VecDeque::from([Err(Error::CameraFrame("glitch".into())), Ok(frame(7))]),
                    idle: frame(7),
                })
            },
            3,
        )
        .unwrap();
        assert_eq!(grabber.resolution(), (2, 1));
        let snap = grabber.wait_first_frame(Duration::from_secs(2)).unwrap();
        assert_eq!(snap.frame, frame(7));
        assert!(snap.seq >= 1);
    }

    #[test]
    fn repeated_failures_lose_the_camera() {
        let grabber = FrameGrabber::spawn(
            || {
                let mut script: VecDeque<_> = (0..5).map(|_| Err(Error::CameraFrame("unplugged".into()))).collect();
                script.push_front(Ok(frame(1)));
                Ok(Scripted { script, idle: frame(1) })
            },
            2,
        )
        .unwrap();
        let start = Instant::now();
        let err = loop {
            match grabber.latest_after(0) {
                Err(e) => break e,
                Ok(_) => assert!(start.elapsed() < Duration::from_secs(2), "camera never reported lost"),
            }
            thread::sleep(Duration::from_millis(2));
        };
        assert!(matches!(err, Error::CameraLost(_)));
    }

    #[test]
    fn warm_up_failures_do_not_lose_the_camera() {
        let grabber = FrameGrabber::spawn(
            || {
                let mut script: VecDeque<_> = (0..6).map(|_| Err(Error::CameraFrame("warming up".into()))).collect();
                script.push_back(Ok(frame(9)));
                Ok(Scripted { script, idle: frame(9) })
            },
            3,
        )
        .unwrap();
        let snap = grabber.wait_first_frame(Duration::from_secs(2)).unwrap();
        assert_eq!(snap.frame, frame(9));
    }

    #[test]
    fn no_frame_before_timeout() {
        struct Stuck;
        impl FrameSource for Stuck {
            fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
                thread::sleep(Duration::from_millis(5));
                Err(Error::CameraFrame("warming up".into()))
            }
            fn resolution(&self) -> (u32, u32) {
                (1, 1)
            }
        }
        let grabber = FrameGrabber::spawn(|| Ok(Stuck), 3).unwrap();
        let err = grabber.wait_first_frame(Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, Error::NoFrame(_)));
    }

    #[test]
    fn latest_after_only_returns_newer_frames() {
        let grabber = FrameGrabber::spawn(|| Ok(Scripted { script: VecDeque::new(), idle: frame(3) }), 3).unwrap();
        let first = grabber.wait_first_frame(Duration::from_secs(2)).unwrap();
        assert!(grabber.latest_after(u64::MAX).unwrap().is_none());
        // The source keeps publishing, so a newer one shows up eventually.
        let start = Instant::now();
        loop {
            if let Some(next) = grabber.latest_after(first.seq).unwrap() {
                assert!(next.seq > first.seq);
                break;
            }
            assert!(start.elapsed() < Duration::from_secs(2));
            thread::sleep(Duration::from_millis(2));
        }
    }
}
