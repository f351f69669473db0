// src/encoder.rs
// Turns a finished capture buffer into one looping GIF on disk.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use log::{error, info};

use crate::capture::CaptureBuffer;
use crate::constants::{OUTPUT_FILE_PREFIX, OUTPUT_TIMESTAMP_FORMAT};

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not create output directory: {0}")]
    OutputDir(#[from] fs_extra::error::Error),

    #[error("GIF encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// How a recording session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Saved(PathBuf),
    /// Nothing was captured; no file was written.
    Empty,
    Failed(String),
}

/// "Encode an ordered sequence of bitmaps into an animated image file".
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frames: &[RgbaImage], path: &Path) -> Result<(), EncodeError>;
}

/// 所有帧使用同一延迟，无限循环
#[derive(Debug, Clone)]
pub struct GifFileEncoder {
    frame_delay: Duration,
}

impl GifFileEncoder {
    pub fn new(frame_delay: Duration) -> Self {
        GifFileEncoder { frame_delay }
    }
}

impl FrameEncoder for GifFileEncoder {
    fn encode(&self, frames: &[RgbaImage], path: &Path) -> Result<(), EncodeError> {
        let file = BufWriter::new(File::create(path)?);
        let mut encoder = GifEncoder::new(file);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = Delay::from_saturating_duration(self.frame_delay);
        encoder.encode_frames(
            frames
                .iter()
                .map(|f| Frame::from_parts(f.clone(), 0, 0, delay)),
        )?;
        Ok(())
    }
}

/// `GIF_YYYYMMDD_HHMMSS.gif`
pub fn output_file_name(at: &DateTime<Local>) -> String {
    format!("{}{}.gif", OUTPUT_FILE_PREFIX, at.format(OUTPUT_TIMESTAMP_FORMAT))
}

/// Creates the output directory if it does not exist yet; never clears it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), EncodeError> {
    if !dir.is_dir() {
        fs_extra::dir::create_all(dir, false)?;
        info!("created output directory {}", dir.display());
    }
    Ok(())
}

/// Writes the buffer to `output_dir`, named by the time encoding starts.
///
/// An empty buffer writes nothing. A failed encode may leave a partial file
/// behind.
pub fn encode_session(
    buffer: &CaptureBuffer,
    output_dir: &Path,
    encoder: &dyn FrameEncoder,
) -> SessionOutcome {
    if buffer.is_empty() {
        info!("nothing captured, skipping encode");
        return SessionOutcome::Empty;
    }

    let path = output_dir.join(output_file_name(&Local::now()));
    let result = ensure_output_dir(output_dir).and_then(|_| encoder.encode(buffer.frames(), &path));
    match result {
        Ok(()) => {
            info!("saved {} frames to {}", buffer.len(), path.display());
            SessionOutcome::Saved(path)
        }
        Err(e) => {
            error!("failed to write {}: {}", path.display(), e);
            SessionOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba};
    use std::io::BufReader;
    use tempfile::TempDir;

    struct FailingEncoder;

    impl FrameEncoder for FailingEncoder {
        fn encode(&self, _frames: &[RgbaImage], _path: &Path) -> Result<(), EncodeError> {
            Err(EncodeError::Io(std::io::Error::other("disk full")))
        }
    }

    /// Loop count from the NETSCAPE2.0 application extension; 0 means forever.
    fn netscape_loop_count(bytes: &[u8]) -> Option<u16> {
        let tag = b"NETSCAPE2.0";
        let at = bytes.windows(tag.len()).position(|w| w == tag)? + tag.len();
        match bytes.get(at..at + 4)? {
            [0x03, 0x01, lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
            _ => None,
        }
    }

    fn gif_encoder() -> GifFileEncoder {
        GifFileEncoder::new(Duration::from_millis(50))
    }

    fn buffer_of(n: u8) -> CaptureBuffer {
        let mut buffer = CaptureBuffer::new();
        for i in 0..n {
            buffer.push(RgbaImage::from_pixel(16, 8, Rgba([i * 40, 0, 0, 255])));
        }
        buffer
    }

    #[test]
    fn file_name_uses_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(output_file_name(&at), "GIF_20240307_090502.gif");
    }

    #[test]
    fn gif_has_every_frame_with_fixed_delay() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.gif");
        let buffer = buffer_of(4);

        gif_encoder().encode(buffer.frames(), &path).unwrap();

        let reader = BufReader::new(File::open(&path).unwrap());
        let frames = GifDecoder::new(reader).unwrap().into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 4);
        for frame in &frames {
            let (numer, denom) = frame.delay().numer_denom_ms();
            assert_eq!(numer as f64 / denom as f64, 50.0);
            assert_eq!(frame.buffer().dimensions(), (16, 8));
        }
    }

    #[test]
    fn gif_loops_forever() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loop.gif");

        gif_encoder().encode(buffer_of(2).frames(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(netscape_loop_count(&bytes), Some(0));
    }

    #[test]
    fn loop_count_reader_rejects_missing_extension() {
        assert_eq!(netscape_loop_count(b"GIF89a no extension here"), None);
        assert_eq!(netscape_loop_count(b"NETSCAPE2.0\x03\x01\x05\x00"), Some(5));
    }

    #[test]
    fn empty_buffer_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("output_gifs");

        let outcome = encode_session(&CaptureBuffer::new(), &out, &gif_encoder());

        assert_eq!(outcome, SessionOutcome::Empty);
        assert!(!out.exists());
    }

    #[test]
    fn saves_into_created_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("output_gifs");

        let outcome = encode_session(&buffer_of(2), &out, &gif_encoder());

        let SessionOutcome::Saved(path) = outcome else {
            panic!("expected Saved, got {outcome:?}");
        };
        assert_eq!(path.parent(), Some(out.as_path()));
        assert!(path.is_file());
    }

    #[test]
    fn encoder_failure_becomes_failed_outcome() {
        let dir = TempDir::new().unwrap();
        let outcome = encode_session(&buffer_of(1), dir.path(), &FailingEncoder);
        assert!(matches!(outcome, SessionOutcome::Failed(msg) if msg.contains("disk full")));
    }

    #[test]
    fn ensure_output_dir_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        let kept = dir.path().join("old.gif");
        std::fs::write(&kept, b"x").unwrap();

        ensure_output_dir(dir.path()).unwrap();

        assert!(kept.exists());
    }
}
