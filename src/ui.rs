// src/ui.rs
// Control window and the foreground side of the session's event queue.

use std::path::Path;
use std::process::Command;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use rfd::{MessageDialog, MessageLevel};

use rsgif::constants::{colors, CONTROL_WINDOW_HEIGHT, CONTROL_WINDOW_WIDTH};
use rsgif::i18n::{saved_message, status_text, text, Lang, Text};
use rsgif::selection_logic::{Rect, ScreenSize, SelectionKind};
use rsgif::session::SessionError;
use rsgif::{SessionController, SessionOutcome, SessionState, Status, UiEvent, XcapCapturer};

use crate::draw::{draw_text, is_drawable};
use crate::selection::{run_overlay, OverlayExit};

/// Upper bound on waiting for an in-flight encode when the app quits.
const QUIT_ENCODE_WAIT: Duration = Duration::from_secs(60);

const HEADER_SCALE: i32 = 2;
const HEADER_POS: (i32, i32) = (12, 10);
const LEGEND_TOP: i32 = 44;
const LEGEND_LINE_HEIGHT: i32 = 14;

/// Key legend drawn in the control window. The bitmap font is ASCII only, so
/// the localized hint goes to the log and the window title instead.
const KEY_LEGEND: [&str; 4] = [
    "Enter  select region      F  fixed ratio",
    "Space  stop recording     O  open output folder",
    "L      switch language    Esc  quit",
    "Scroll resizes a fixed-ratio selection",
];

/// Everything the windows display, rebuilt from the session's `UiEvent`s.
pub struct Presenter {
    events: Receiver<UiEvent>,
    lang: Lang,
    status: Status,
    preview: Option<(Rect, String)>,
}

impl Presenter {
    pub fn new(events: Receiver<UiEvent>, lang: Lang) -> Self {
        Presenter { events, lang, status: Status::Ready, preview: None }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn preview(&self) -> Option<(Rect, &str)> {
        self.preview.as_ref().map(|(rect, label)| (*rect, label.as_str()))
    }

    pub fn selection_label(&self) -> Option<&str> {
        self.preview.as_ref().map(|(_, label)| label.as_str())
    }

    /// "简易屏幕 GIF 录制 - 准备就绪 ..."
    pub fn title(&self) -> String {
        format!(
            "{} - {}",
            text(self.lang, Text::WindowTitle),
            status_text(self.lang, self.status)
        )
    }

    /// Header line for the control window, in English when the current
    /// language has no glyphs in the bitmap font.
    pub fn header(&self) -> &'static str {
        let header = text(self.lang, Text::HeaderTitle);
        if is_drawable(header) {
            header
        } else {
            text(Lang::En, Text::HeaderTitle)
        }
    }

    /// Applies queued events and returns the ones that need a dialog.
    pub fn drain(&mut self) -> Vec<UiEvent> {
        let mut notices = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            match event {
                UiEvent::Status(status) => {
                    self.status = status;
                    if status != Status::Selecting {
                        self.preview = None;
                    }
                }
                UiEvent::SelectionChanged { rect, label } => self.preview = Some((rect, label)),
                UiEvent::SelectionCleared => self.preview = None,
                notice @ (UiEvent::InputRejected(_) | UiEvent::Finished(_)) => notices.push(notice),
            }
        }
        notices
    }

    /// 录制或合成时禁止切换语言
    pub fn toggle_lang(&mut self, state: SessionState) -> bool {
        if is_busy(state) {
            return false;
        }
        self.lang = self.lang.toggled();
        true
    }

    fn show_notice(&self, notice: &UiEvent) {
        match notice {
            UiEvent::Finished(SessionOutcome::Saved(path)) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                MessageDialog::new()
                    .set_level(MessageLevel::Info)
                    .set_title(text(self.lang, Text::MsgBoxTitle))
                    .set_description(saved_message(self.lang, &name))
                    .show();
            }
            UiEvent::InputRejected(message) => {
                MessageDialog::new()
                    .set_level(MessageLevel::Warning)
                    .set_title(text(self.lang, Text::InvalidRatioTitle))
                    .set_description(message)
                    .show();
            }
            // Empty and failed sessions only change the status line.
            _ => {}
        }
    }
}

fn is_busy(state: SessionState) -> bool {
    matches!(state, SessionState::Recording | SessionState::Encoding)
}

/// Opening the folder while a file is still being written is refused.
pub fn open_folder_allowed(state: SessionState) -> bool {
    !is_busy(state)
}

fn status_color(status: Status) -> u32 {
    match status {
        Status::Ready => colors::STATUS_READY,
        Status::Selecting => colors::STATUS_SELECTING,
        Status::Recording => colors::STATUS_RECORDING,
        Status::Processing => colors::STATUS_PROCESSING,
        Status::Saved => colors::STATUS_SAVED,
        Status::Error => colors::STATUS_ERROR,
    }
}

/// Status color background with the header and the key legend on top.
pub fn render_control(buffer: &mut [u32], width: usize, height: usize, presenter: &Presenter) {
    buffer.fill(status_color(presenter.status()));
    let text_color = colors::LABEL_TEXT;
    draw_text(buffer, width, height, HEADER_POS, presenter.header(), HEADER_SCALE, text_color);
    for (i, line) in KEY_LEGEND.iter().enumerate() {
        let y = LEGEND_TOP + i as i32 * LEGEND_LINE_HEIGHT;
        draw_text(buffer, width, height, (HEADER_POS.0, y), line, 1, text_color);
    }
}

/// Main loop of the control window. Returns when the window is closed or Esc
/// is pressed; an in-flight recording is still saved before returning.
pub fn run(
    controller: &mut SessionController,
    presenter: &mut Presenter,
    ratio: &str,
) -> Result<()> {
    let mut window = Window::new(
        &presenter.title(),
        CONTROL_WINDOW_WIDTH,
        CONTROL_WINDOW_HEIGHT,
        WindowOptions::default(),
    )?;
    window.set_target_fps(30);
    let mut buffer = vec![0u32; CONTROL_WINDOW_WIDTH * CONTROL_WINDOW_HEIGHT];
    let mut shown_title = presenter.title();

    info!("{}", text(presenter.lang(), Text::Hint));

    while window.is_open() && !window.is_key_down(Key::Escape) {
        controller.pump();
        for notice in presenter.drain() {
            presenter.show_notice(&notice);
        }

        for key in window.get_keys_pressed(KeyRepeat::No) {
            match key {
                Key::Enter => select_region(controller, presenter, SelectionKind::FreeForm, ratio)?,
                Key::F => select_region(controller, presenter, SelectionKind::FixedRatio, ratio)?,
                Key::Space => {
                    controller.stop();
                }
                Key::L => {
                    presenter.toggle_lang(controller.state());
                    info!("{}", text(presenter.lang(), Text::Hint));
                }
                Key::O if open_folder_allowed(controller.state()) => {
                    open_output_folder(&controller.config().output_dir)
                }
                Key::O => info!("output folder stays closed until the GIF is written"),
                _ => {}
            }
        }

        let title = presenter.title();
        if title != shown_title {
            window.set_title(&title);
            shown_title = title;
        }
        render_control(&mut buffer, CONTROL_WINDOW_WIDTH, CONTROL_WINDOW_HEIGHT, presenter);
        window.update_with_buffer(&buffer, CONTROL_WINDOW_WIDTH, CONTROL_WINDOW_HEIGHT)?;
    }

    if controller.stop() {
        info!("saving the running recording before exit");
        controller.wait_for_outcome(QUIT_ENCODE_WAIT);
        for notice in presenter.drain() {
            presenter.show_notice(&notice);
        }
    }
    Ok(())
}

fn select_region(
    controller: &mut SessionController,
    presenter: &mut Presenter,
    kind: SelectionKind,
    ratio: &str,
) -> Result<()> {
    if controller.state() != SessionState::Idle {
        return Ok(());
    }

    let screenshot = match XcapCapturer::screenshot() {
        Ok(img) => img,
        Err(e) => {
            warn!("cannot start selection: {}", e);
            MessageDialog::new()
                .set_level(MessageLevel::Error)
                .set_title(status_text(presenter.lang(), Status::Error))
                .set_description(e.to_string())
                .show();
            return Ok(());
        }
    };
    let screen = ScreenSize { width: screenshot.width(), height: screenshot.height() };

    match controller.start_selection(kind, ratio, screen) {
        Ok(()) => {}
        Err(SessionError::InvalidRatio(_)) => {
            for notice in presenter.drain() {
                presenter.show_notice(&notice);
            }
            return Ok(());
        }
        Err(e) => {
            warn!("{}", e);
            return Ok(());
        }
    }

    if run_overlay(controller, presenter, &screenshot)? == OverlayExit::Cancelled {
        info!("selection cancelled by user");
    }
    Ok(())
}

/// Best effort; failures are only logged.
fn open_output_folder(dir: &Path) {
    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let opener = "xdg-open";

    if let Err(e) = Command::new(opener).arg(dir).spawn() {
        warn!("could not open {}: {}", dir.display(), e);
    }
}
