// src/session.rs
// Session controller: Idle -> Selecting -> Recording -> Encoding -> Idle.
//
// All state lives here and is only touched from the foreground (the window
// loop). Capture and encode run on their own threads; the encode thread
// reports back through `inbox`, which the foreground drains with `pump()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::capture::{run_capture_loop, CaptureBuffer, RegionCapturer};
use crate::config::RecorderConfig;
use crate::encoder::{encode_session, FrameEncoder, SessionOutcome};
use crate::selection_logic::{
    PointerEvent, RatioError, Rect, ScreenSize, SelectionKind, SelectionMode, Selector,
    SelectorUpdate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Selecting,
    Recording,
    Encoding,
}

/// Status line shown by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Selecting,
    Recording,
    Processing,
    Saved,
    Error,
}

/// Everything the controller tells the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Status(Status),
    SelectionChanged { rect: Rect, label: String },
    /// A too-small drag was dropped; erase the live rectangle.
    SelectionCleared,
    InputRejected(String),
    Finished(SessionOutcome),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("A session is already in progress ({0:?})")]
    Busy(SessionState),

    #[error(transparent)]
    InvalidRatio(#[from] RatioError),
}

enum TaskMessage {
    EncodeFinished(SessionOutcome),
}

pub struct SessionController {
    config: RecorderConfig,
    capturer: Arc<dyn RegionCapturer>,
    encoder: Arc<dyn FrameEncoder>,
    ui: Sender<UiEvent>,
    inbox_tx: Sender<TaskMessage>,
    inbox: Receiver<TaskMessage>,

    state: SessionState,
    selector: Option<Selector>,
    stop_flag: Arc<AtomicBool>,
    capture_task: Option<JoinHandle<CaptureBuffer>>,
}

impl SessionController {
    pub fn new(
        config: RecorderConfig,
        capturer: Arc<dyn RegionCapturer>,
        encoder: Arc<dyn FrameEncoder>,
        ui: Sender<UiEvent>,
    ) -> Self {
        let (inbox_tx, inbox) = mpsc::channel();
        SessionController {
            config,
            capturer,
            encoder,
            ui,
            inbox_tx,
            inbox,
            state: SessionState::Idle,
            selector: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            capture_task: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    fn emit(&self, event: UiEvent) {
        // A closed presentation layer is not the session's problem.
        let _ = self.ui.send(event);
    }

    fn set_status(&self, status: Status) {
        self.emit(UiEvent::Status(status));
    }

    /// Idle -> Selecting. A bad ratio is reported to the user and leaves the
    /// session Idle.
    pub fn start_selection(
        &mut self,
        kind: SelectionKind,
        ratio_text: &str,
        screen: ScreenSize,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::Busy(self.state));
        }

        let mode = match SelectionMode::resolve(kind, ratio_text) {
            Ok(mode) => mode,
            Err(e) => {
                warn!("selection aborted: {}", e);
                self.emit(UiEvent::InputRejected(e.to_string()));
                self.set_status(Status::Ready);
                return Err(e.into());
            }
        };

        info!("selecting region ({:?}) on {}x{} screen", mode, screen.width, screen.height);
        self.selector = Some(Selector::new(mode, screen, &self.config.selection));
        self.state = SessionState::Selecting;
        self.set_status(Status::Selecting);
        Ok(())
    }

    /// Feeds one pointer event to the active selector. Ignored outside of
    /// Selecting.
    pub fn pointer(&mut self, event: PointerEvent) -> SelectorUpdate {
        if self.state != SessionState::Selecting {
            return SelectorUpdate::Unchanged;
        }
        let Some(selector) = self.selector.as_mut() else {
            return SelectorUpdate::Unchanged;
        };

        let update = selector.handle(event);
        match update {
            SelectorUpdate::Preview(rect) => self.emit(UiEvent::SelectionChanged {
                rect,
                label: rect.size_label(),
            }),
            SelectorUpdate::Discarded => self.emit(UiEvent::SelectionCleared),
            SelectorUpdate::Confirmed(rect) => self.begin_recording(rect),
            SelectorUpdate::Unchanged => {}
        }
        update
    }

    /// Selecting -> Idle.
    pub fn cancel_selection(&mut self) -> bool {
        if self.state != SessionState::Selecting {
            return false;
        }
        info!("selection cancelled");
        self.selector = None;
        self.state = SessionState::Idle;
        self.set_status(Status::Ready);
        true
    }

    fn begin_recording(&mut self, rect: Rect) {
        self.selector = None;

        let stop = Arc::new(AtomicBool::new(false));
        self.stop_flag = Arc::clone(&stop);
        let capturer = Arc::clone(&self.capturer);
        let interval = self.config.capture_interval;

        let spawned = thread::Builder::new()
            .name("rsgif-capture".to_string())
            .spawn(move || run_capture_loop(capturer.as_ref(), rect, interval, &stop));

        match spawned {
            Ok(handle) => {
                info!("recording {} ({})", rect, rect.size_label());
                self.capture_task = Some(handle);
                self.state = SessionState::Recording;
                self.set_status(Status::Recording);
            }
            Err(e) => {
                error!("could not start capture thread: {}", e);
                self.finish(SessionOutcome::Failed(e.to_string()));
            }
        }
    }

    /// Recording -> Encoding. Returns immediately; the outcome arrives through
    /// `pump()`. Calling it again once the session has left Recording does
    /// nothing and returns `false`.
    pub fn stop(&mut self) -> bool {
        if self.state != SessionState::Recording {
            debug!("stop ignored in {:?}", self.state);
            return false;
        }

        self.stop_flag.store(true, Ordering::Release);
        self.state = SessionState::Encoding;
        self.set_status(Status::Processing);

        let capture = self.capture_task.take();
        let encoder = Arc::clone(&self.encoder);
        let output_dir = self.config.output_dir.clone();
        let inbox = self.inbox_tx.clone();

        let spawned = thread::Builder::new()
            .name("rsgif-encode".to_string())
            .spawn(move || {
                // Joining hands the buffer over only once capture has ended.
                let outcome = match capture.map(JoinHandle::join) {
                    Some(Ok(buffer)) => encode_session(&buffer, &output_dir, encoder.as_ref()),
                    Some(Err(_)) => SessionOutcome::Failed("capture thread panicked".to_string()),
                    None => SessionOutcome::Empty,
                };
                let _ = inbox.send(TaskMessage::EncodeFinished(outcome));
            });

        if let Err(e) = spawned {
            error!("could not start encode thread: {}", e);
            self.finish(SessionOutcome::Failed(e.to_string()));
        }
        true
    }

    /// Applies completions queued by background tasks. Call from the
    /// foreground loop; returns the last outcome applied, if any.
    pub fn pump(&mut self) -> Option<SessionOutcome> {
        let mut last = None;
        while let Ok(message) = self.inbox.try_recv() {
            last = Some(self.handle_message(message));
        }
        last
    }

    /// Like `pump()` but blocks up to `timeout` for an encode to finish.
    pub fn wait_for_outcome(&mut self, timeout: Duration) -> Option<SessionOutcome> {
        if self.state != SessionState::Encoding {
            return self.pump();
        }
        match self.inbox.recv_timeout(timeout) {
            Ok(message) => Some(self.handle_message(message)),
            Err(_) => None,
        }
    }

    fn handle_message(&mut self, message: TaskMessage) -> SessionOutcome {
        match message {
            TaskMessage::EncodeFinished(outcome) => {
                self.finish(outcome.clone());
                outcome
            }
        }
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        self.state = SessionState::Idle;
        self.selector = None;
        self.capture_task = None;

        let status = match &outcome {
            SessionOutcome::Saved(_) => Status::Saved,
            SessionOutcome::Empty => Status::Ready,
            SessionOutcome::Failed(_) => Status::Error,
        };
        info!("session finished: {:?}", outcome);
        self.set_status(status);
        self.emit(UiEvent::Finished(outcome));
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
    }
}
