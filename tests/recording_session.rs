//! End-to-end session: free-form drag, three captured frames, stop, GIF on disk.

use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Rgba, RgbaImage};
use tempfile::TempDir;

use rsgif::capture::FrameError;
use rsgif::constants::OUTPUT_DIR_NAME;
use rsgif::{
    GifFileEncoder, PointerEvent, RecorderConfig, Rect, RegionCapturer, ScreenSize,
    SelectionKind, SessionController, SessionOutcome, SessionState, Status, UiEvent,
};

const SCREEN: ScreenSize = ScreenSize { width: 1920, height: 1080 };

/// Delivers `frames` good grabs, then reports transient failures so the
/// buffer stops growing while the loop keeps spinning.
struct ThreeFrameScreen {
    frames: usize,
    grabs: AtomicUsize,
    done: Mutex<Option<Sender<()>>>,
}

impl RegionCapturer for ThreeFrameScreen {
    fn capture(&self, rect: Rect) -> Result<RgbaImage, FrameError> {
        let n = self.grabs.fetch_add(1, Ordering::SeqCst);
        if n >= self.frames {
            if let Some(done) = self.done.lock().unwrap().take() {
                let _ = done.send(());
            }
            return Err(FrameError::CaptureFailed("screen locked".to_string()));
        }
        let shade = 60 * n as u8;
        Ok(RgbaImage::from_pixel(
            rect.width() as u32,
            rect.height() as u32,
            Rgba([shade, shade, 255, 255]),
        ))
    }
}

fn recorder(root: &TempDir) -> (SessionController, Receiver<UiEvent>, Receiver<()>) {
    let (done_tx, done_rx) = mpsc::channel();
    let capturer = ThreeFrameScreen {
        frames: 3,
        grabs: AtomicUsize::new(0),
        done: Mutex::new(Some(done_tx)),
    };

    let mut config = RecorderConfig::with_output_dir(root.path().join(OUTPUT_DIR_NAME));
    config.capture_interval = Duration::from_millis(5);
    let encoder = GifFileEncoder::new(config.frame_delay);

    let (tx, rx) = mpsc::channel();
    let controller = SessionController::new(config, Arc::new(capturer), Arc::new(encoder), tx);
    (controller, rx, done_rx)
}

#[test]
fn drag_record_three_frames_and_save() {
    let root = TempDir::new().unwrap();
    let (mut controller, events, frames_done) = recorder(&root);

    controller.start_selection(SelectionKind::FreeForm, "", SCREEN).unwrap();
    controller.pointer(PointerEvent::Down { x: 100, y: 100 });
    controller.pointer(PointerEvent::Drag { x: 200, y: 180 });
    controller.pointer(PointerEvent::Drag { x: 300, y: 250 });
    controller.pointer(PointerEvent::Up { x: 300, y: 250 });
    assert_eq!(controller.state(), SessionState::Recording);

    frames_done.recv_timeout(Duration::from_secs(10)).expect("three frames captured");
    assert!(controller.stop());
    assert!(!controller.stop());

    let outcome = controller
        .wait_for_outcome(Duration::from_secs(30))
        .expect("encode finished");
    let SessionOutcome::Saved(path) = outcome else {
        panic!("expected Saved, got {outcome:?}");
    };
    assert_eq!(controller.state(), SessionState::Idle);

    // output_gifs/GIF_YYYYMMDD_HHMMSS.gif
    assert_eq!(path.parent(), Some(root.path().join(OUTPUT_DIR_NAME).as_path()));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert_eq!(name.len(), "GIF_20240101_120000.gif".len());
    assert!(name.starts_with("GIF_") && name.ends_with(".gif"));
    assert_eq!(&name[12..13], "_");
    assert!(name[4..12].chars().chain(name[13..19].chars()).all(|c| c.is_ascii_digit()));

    let reader = BufReader::new(File::open(&path).unwrap());
    let frames = GifDecoder::new(reader).unwrap().into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 3);
    for frame in &frames {
        assert_eq!(frame.buffer().dimensions(), (200, 150));
        let (numer, denom) = frame.delay().numer_denom_ms();
        assert_eq!(numer as f64 / denom as f64, 50.0);
    }

    // NETSCAPE2.0 application extension, loop count 0 (forever)
    let bytes = std::fs::read(&path).unwrap();
    let tag = b"NETSCAPE2.0";
    let at = bytes.windows(tag.len()).position(|w| w == tag).expect("loop extension") + tag.len();
    assert_eq!(&bytes[at..at + 4], &[0x03u8, 0x01, 0x00, 0x00]);

    let statuses: Vec<Status> = events
        .try_iter()
        .filter_map(|e| match e {
            UiEvent::Status(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![Status::Selecting, Status::Recording, Status::Processing, Status::Saved]
    );
}

#[test]
fn rejected_ratio_leaves_no_session_behind() {
    let root = TempDir::new().unwrap();
    let (mut controller, events, _frames_done) = recorder(&root);

    assert!(controller.start_selection(SelectionKind::FixedRatio, "wide", SCREEN).is_err());
    assert_eq!(controller.state(), SessionState::Idle);
    assert!(events.try_iter().any(|e| matches!(e, UiEvent::InputRejected(_))));
    assert!(!root.path().join(OUTPUT_DIR_NAME).exists());
}
