//! Render settings.
//!
//! [`RenderConfig`] gathers everything the engine and the frame sinks need,
//! with defaults matching a 558×590 viewport spinning about `(1, 1, 1)` at
//! one degree per frame. Setters return `&mut Self` for chaining:
//!
//! ```ignore
//! let mut config = RenderConfig::new();
//! config
//!     .set_viewport(400, 400)
//!     .set_step_degrees(2.0)
//!     .set_frame_limit(Some(180));
//! ```

use std::path::{Path, PathBuf};

use crate::colors;
use crate::math::Vec3;
use crate::projection::{Viewport, DEFAULT_OFFSET};
use crate::render::RasterizerType;
use crate::sink::DEFAULT_FRAME_DELAY_MS;
use crate::transform::{NormalMode, DEFAULT_AXIS, DEFAULT_STEP_DEGREES};

pub const DEFAULT_WIDTH: u32 = 558;
pub const DEFAULT_HEIGHT: u32 = 590;
pub const DEFAULT_OUTPUT: &str = "output.gif";

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    width: u32,
    height: u32,
    offset: f64,
    axis: Vec3,
    step_degrees: f64,
    background: u32,
    normal_mode: NormalMode,
    rasterizer: RasterizerType,
    frame_delay_ms: u32,
    output: PathBuf,
    frame_limit: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            offset: DEFAULT_OFFSET,
            axis: DEFAULT_AXIS,
            step_degrees: DEFAULT_STEP_DEGREES,
            background: colors::BACKGROUND,
            normal_mode: NormalMode::default(),
            rasterizer: RasterizerType::default(),
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            output: PathBuf::from(DEFAULT_OUTPUT),
            frame_limit: None,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Viewport ============

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// The viewport described by width, height and offset.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height, self.offset)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) -> &mut Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn set_offset(&mut self, offset: f64) -> &mut Self {
        self.offset = offset;
        self
    }

    // ============ Rotation ============

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Per-frame rotation increment in degrees.
    pub fn step_degrees(&self) -> f64 {
        self.step_degrees
    }

    pub fn set_axis(&mut self, axis: Vec3) -> &mut Self {
        self.axis = axis;
        self
    }

    pub fn set_step_degrees(&mut self, step_degrees: f64) -> &mut Self {
        self.step_degrees = step_degrees;
        self
    }

    pub fn normal_mode(&self) -> NormalMode {
        self.normal_mode
    }

    pub fn set_normal_mode(&mut self, mode: NormalMode) -> &mut Self {
        self.normal_mode = mode;
        self
    }

    // ============ Drawing ============

    /// Opaque ARGB colour every frame starts from.
    pub fn background(&self) -> u32 {
        self.background
    }

    pub fn set_background(&mut self, color: u32) -> &mut Self {
        self.background = color;
        self
    }

    pub fn rasterizer(&self) -> RasterizerType {
        self.rasterizer
    }

    pub fn set_rasterizer(&mut self, rasterizer: RasterizerType) -> &mut Self {
        self.rasterizer = rasterizer;
        self
    }

    // ============ Output ============

    pub fn frame_delay_ms(&self) -> u32 {
        self.frame_delay_ms
    }

    pub fn set_frame_delay_ms(&mut self, delay_ms: u32) -> &mut Self {
        self.frame_delay_ms = delay_ms;
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn set_output<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.output = path.into();
        self
    }

    /// Stop after this many frames. `None` runs until stopped.
    pub fn frame_limit(&self) -> Option<u64> {
        self.frame_limit
    }

    pub fn set_frame_limit(&mut self, limit: Option<u64>) -> &mut Self {
        self.frame_limit = limit;
        self
    }
}
