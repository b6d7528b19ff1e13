//! A CPU-based painter's-algorithm renderer for spinning quad meshes.
//!
//! A mesh is loaded once from an OBJ file, spun about a fixed axis one small
//! increment per frame, flat-shaded, sorted back to front and filled into a
//! software surface. Every frame is handed to a [`FrameSink`], which by
//! default writes an animated GIF when the run ends. SDL2 is used only to
//! show the frames while they are produced (feature `window`).
//!
//! # Quick Start
//!
//! ```ignore
//! use quadspin::prelude::*;
//!
//! let mesh = Mesh::from_obj("cube.obj")?;
//! let mut config = RenderConfig::new();
//! config.set_frame_limit(Some(360));
//!
//! let engine = Engine::new(mesh, &config);
//! let (report, gif) = RenderLoop::new(engine, StopToken::new())
//!     .with_frame_limit(config.frame_limit())
//!     .run(GifSink::new(config.output()))?;
//! ```

// Public API - exposed to library consumers
pub mod colors;
pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod mesh;
pub mod projection;
pub mod render;
pub mod shading;
pub mod sink;
pub mod transform;
#[cfg(feature = "window")]
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use config::RenderConfig;
pub use engine::{Engine, RenderLoop, RunReport, StopToken};
pub use error::{ExportError, FaceIndexError, ParseError, RenderError};
pub use mesh::{Face, Mesh};
pub use sink::{FrameSink, GifSink, MemorySink};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use quadspin::prelude::*;
/// ```
pub mod prelude {
    // Config
    pub use crate::config::RenderConfig;

    // Engine
    pub use crate::engine::{Engine, RenderLoop, RunReport, StopToken};

    // Mesh
    pub use crate::mesh::{Face, LoadStats, Mesh};

    // Math
    pub use crate::math::{Mat3, Point2, Vec3};

    // Rendering
    pub use crate::projection::Viewport;
    pub use crate::render::{FrameExchange, RasterSurface, RasterizerType};
    pub use crate::transform::{NormalMode, Spin};

    // Output
    pub use crate::sink::{FrameSink, GifReport, GifSink, MemorySink};

    // Window & Input
    #[cfg(feature = "window")]
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{CrossingRasterizer, RasterSurface, Rasterizer, ScanlineRasterizer};
}
