// src/constants.rs
// Tuning values shared by the recorder core and the windows.

use std::time::Duration;

/// 录制节奏
pub const CAPTURE_INTERVAL: Duration = Duration::from_millis(50);
/// GIF 每帧显示时长，与采集间隔相同
pub const FRAME_DELAY: Duration = Duration::from_millis(50);

pub const OUTPUT_DIR_NAME: &str = "output_gifs";
pub const OUTPUT_FILE_PREFIX: &str = "GIF_";
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Free-form drags smaller than this on either axis are discarded.
pub const MIN_SELECTION_SIZE: i32 = 10;

pub const FIXED_RATIO_MIN_WIDTH: f64 = 50.0;
pub const FIXED_RATIO_INITIAL_WIDTH: f64 = 400.0;
pub const ZOOM_IN_FACTOR: f64 = 1.1;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

pub const DEFAULT_RATIO: &str = "16:9";

/// Overlay / control window colors (0RGB, as minifb expects)
pub mod colors {
    pub const BORDER: u32 = 0xFFFFFF;
    pub const LABEL_BG: u32 = 0x202020;
    pub const LABEL_TEXT: u32 = 0xFFFFFF;

    pub const STATUS_READY: u32 = 0x808080;
    pub const STATUS_SELECTING: u32 = 0x3070C0;
    pub const STATUS_RECORDING: u32 = 0xD03030;
    pub const STATUS_PROCESSING: u32 = 0x2050E0;
    pub const STATUS_SAVED: u32 = 0x30A050;
    pub const STATUS_ERROR: u32 = 0x901010;
}

pub const CONTROL_WINDOW_WIDTH: usize = 500;
pub const CONTROL_WINDOW_HEIGHT: usize = 120;
