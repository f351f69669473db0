// src/lib.rs
// Recorder core. The binary in main.rs adds the minifb windows on top.

pub mod capture;
pub mod config;
pub mod constants;
pub mod encoder;
pub mod i18n;
pub mod logging;
pub mod selection_logic;
pub mod session;

pub use capture::{CaptureBuffer, FrameError, RegionCapturer, XcapCapturer};
pub use config::RecorderConfig;
pub use encoder::{FrameEncoder, GifFileEncoder, SessionOutcome};
pub use selection_logic::{PointerEvent, Rect, ScreenSize, SelectionKind};
pub use session::{SessionController, SessionState, Status, UiEvent};
