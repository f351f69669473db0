// src/capture.rs
// Region grabbing and the fixed-cadence capture loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use image::RgbaImage;
use log::{debug, info};
use xcap::Monitor;

use crate::selection_logic::Rect;

/// A single grab that went wrong. The capture loop skips these and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("No monitor found")]
    NoMonitor,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),

    #[error("Region {rect} lies outside the {width}x{height} screen")]
    OutOfBounds { rect: Rect, width: u32, height: u32 },
}

/// "Capture region as bitmap". Implementations must be callable from the
/// capture thread.
pub trait RegionCapturer: Send + Sync {
    fn capture(&self, rect: Rect) -> Result<RgbaImage, FrameError>;
}

/// 按时间顺序保存录制帧
#[derive(Debug, Default)]
pub struct CaptureBuffer {
    frames: Vec<RgbaImage>,
    skipped: usize,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: RgbaImage) {
        self.frames.push(frame);
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of iterations whose grab failed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }
}

/// Grabs `rect` every `interval` until `stop` is set.
///
/// The flag is checked once at the top of each iteration, so nothing is
/// captured after it is observed. Spacing between frames is the interval plus
/// however long the grab took.
pub fn run_capture_loop(
    capturer: &dyn RegionCapturer,
    rect: Rect,
    interval: Duration,
    stop: &AtomicBool,
) -> CaptureBuffer {
    let mut buffer = CaptureBuffer::new();

    while !stop.load(Ordering::Acquire) {
        match capturer.capture(rect) {
            Ok(frame) => buffer.push(frame),
            Err(e) => {
                debug!("skipping frame {}: {}", buffer.len() + buffer.skipped(), e);
                buffer.record_skip();
            }
        }
        thread::sleep(interval);
    }

    info!(
        "capture of {} stopped: {} frames, {} skipped",
        rect,
        buffer.len(),
        buffer.skipped()
    );
    buffer
}

/// Grabs the first monitor through `xcap`, the same one the overlay shows.
#[derive(Debug, Clone, Copy, Default)]
pub struct XcapCapturer;

impl XcapCapturer {
    pub fn screenshot() -> Result<RgbaImage, FrameError> {
        let monitors = Monitor::all().map_err(|e| FrameError::MonitorEnumeration(e.to_string()))?;
        let monitor = monitors.first().ok_or(FrameError::NoMonitor)?;
        let img = monitor
            .capture_image()
            .map_err(|e| FrameError::CaptureFailed(e.to_string()))?;

        // xcap ships its own image version; go through raw bytes
        let (w, h) = (img.width(), img.height());
        let raw = img.into_raw();
        RgbaImage::from_raw(w, h, raw)
            .ok_or_else(|| FrameError::CaptureFailed("pixel buffer size mismatch".to_string()))
    }
}

impl RegionCapturer for XcapCapturer {
    fn capture(&self, rect: Rect) -> Result<RgbaImage, FrameError> {
        let full = Self::screenshot()?;
        crop_region(&full, rect)
    }
}

/// Crops `rect` out of a full-screen image, clipped to the image bounds.
pub fn crop_region(image: &RgbaImage, rect: Rect) -> Result<RgbaImage, FrameError> {
    let (width, height) = image.dimensions();
    let clip = |v: i32, max: u32| v.clamp(0, max as i32) as u32;

    let (x1, x2) = (clip(rect.x1(), width), clip(rect.x2(), width));
    let (y1, y2) = (clip(rect.y1(), height), clip(rect.y2(), height));
    if x2 <= x1 || y2 <= y1 {
        return Err(FrameError::OutOfBounds { rect, width, height });
    }

    Ok(image::imageops::crop_imm(image, x1, y1, x2 - x1, y2 - y1).to_image())
}
