//! Pixel output: the raster surface, polygon fill and frame handoff.

pub mod exchange;
pub mod rasterizer;
pub mod surface;

pub use exchange::FrameExchange;
pub use rasterizer::{
    CrossingRasterizer, Rasterizer, RasterizerDispatcher, RasterizerType, ScanlineRasterizer,
};
pub use surface::RasterSurface;
