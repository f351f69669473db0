// src/config.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{CAPTURE_INTERVAL, FRAME_DELAY, OUTPUT_DIR_NAME};
use crate::selection_logic::SelectionSettings;

/// Everything a recording session needs besides its collaborators.
///
/// Capture interval and frame delay are fixed at the same nominal value;
/// playback speed follows whatever real spacing the grabs ended up with.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfig {
    pub output_dir: PathBuf,
    pub capture_interval: Duration,
    pub frame_delay: Duration,
    pub selection: SelectionSettings,
}

impl RecorderConfig {
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        RecorderConfig { output_dir: output_dir.into(), ..Self::default() }
    }
}

impl Default for RecorderConfig {
    /// `./output_gifs` relative to the working directory.
    fn default() -> Self {
        RecorderConfig {
            output_dir: PathBuf::from(OUTPUT_DIR_NAME),
            capture_interval: CAPTURE_INTERVAL,
            frame_delay: FRAME_DELAY,
            selection: SelectionSettings::default(),
        }
    }
}
