//! Frame capture.
//!
//! A [`FrameSink`] receives a copy of every finished frame and, once the
//! render loop ends, turns the capture into its final form. `finalize` takes
//! the sink by value, so it runs at most once.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use tracing::{debug, info};

use crate::error::{ExportError, ExportResult};
use crate::render::RasterSurface;

/// Default time each GIF frame is shown.
pub const DEFAULT_FRAME_DELAY_MS: u32 = 40;

/// Colour quantizer speed passed to the GIF encoder (1 = best, 30 = fastest).
const GIF_QUANTIZER_SPEED: i32 = 10;

/// Receiver for rendered frames.
pub trait FrameSink {
    /// What a successful [`FrameSink::finalize`] produces.
    type Output;

    /// Copy the surface as it is now. Later changes to the surface do not
    /// affect the captured frame.
    fn append(&mut self, surface: &RasterSurface);

    /// Number of frames captured so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finish the capture.
    fn finalize(self) -> ExportResult<Self::Output>;
}

/// Summary of a written animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifReport {
    pub path: PathBuf,
    pub frames: usize,
    pub bytes: u64,
}

/// Collects frames in memory and writes them as one looping animated GIF.
#[derive(Debug)]
pub struct GifSink {
    path: PathBuf,
    delay_ms: u32,
    frames: Vec<RgbaImage>,
}

impl GifSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            delay_ms: DEFAULT_FRAME_DELAY_MS,
            frames: Vec::new(),
        }
    }

    /// Set how long each frame is shown.
    pub fn with_delay_ms(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }
}

impl FrameSink for GifSink {
    type Output = GifReport;

    fn append(&mut self, surface: &RasterSurface) {
        self.frames.push(surface.to_rgba_image());
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn finalize(self) -> ExportResult<GifReport> {
        let Self {
            path,
            delay_ms,
            frames,
        } = self;
        if frames.is_empty() {
            return Err(ExportError::NoFrames);
        }

        let frame_count = frames.len();
        debug!(
            path = %path.display(),
            frames = frame_count,
            delay_ms,
            "Encoding animation"
        );

        let io_error = |source| ExportError::Io {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        {
            let mut encoder = GifEncoder::new_with_speed(&mut writer, GIF_QUANTIZER_SPEED);
            encoder.set_repeat(Repeat::Infinite)?;
            let delay = Delay::from_numer_denom_ms(delay_ms, 1);
            encoder.encode_frames(
                frames
                    .into_iter()
                    .map(|image| Frame::from_parts(image, 0, 0, delay)),
            )?;
        }
        writer.flush().map_err(io_error)?;
        drop(writer);

        let bytes = std::fs::metadata(&path).map_err(io_error)?.len();

        info!(
            path = %path.display(),
            frames = frame_count,
            bytes,
            "Animation written"
        );

        Ok(GifReport {
            path,
            frames: frame_count,
            bytes,
        })
    }
}

/// Keeps captured frames in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Vec<RgbaImage>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }
}

impl FrameSink for MemorySink {
    type Output = Vec<RgbaImage>;

    fn append(&mut self, surface: &RasterSurface) {
        self.frames.push(surface.to_rgba_image());
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn finalize(self) -> ExportResult<Vec<RgbaImage>> {
        Ok(self.frames)
    }
}
