//! Crossing-number polygon rasterization.
//!
//! Every pixel in the polygon's bounding box is tested independently: a ray
//! is cast from the pixel centre towards +x and the polygon edges it crosses
//! are counted. An odd count means the centre is inside.
//!
//! ```text
//!        A-----------B
//!        |           |
//!    P ->|---x-------|--x->   two crossings: outside
//!        |   Q-------|--x->   one crossing:  inside
//!        D-----------C
//! ```
//!
//! Each pixel is independent of every other, which makes this the simplest
//! algorithm to reason about and the reference the scanline fill is checked
//! against.

use super::{edge_crossing_x, edges, vertex_bounds, Rasterizer};
use crate::math::Point2;
use crate::render::surface::RasterSurface;

/// Bounding box rasterizer using the crossing-number inside test.
///
/// # Characteristics
///
/// - **Simple**: one test per pixel, no per-row state
/// - **Wasteful on thin diagonals**: visits the whole bounding box
#[derive(Debug, Default)]
pub struct CrossingRasterizer;

impl CrossingRasterizer {
    /// Creates a new crossing-number rasterizer instance.
    pub fn new() -> Self {
        Self
    }

    /// Whether the centre of pixel `(x, y)` lies inside the polygon.
    #[inline]
    fn is_inside(points: &[Point2], x: i32, y: i32) -> bool {
        let centre_x = x as f64 + 0.5;
        let sample_y = y as f64 + 0.5;
        let crossings = edges(points)
            .filter_map(|(a, b)| edge_crossing_x(a, b, sample_y))
            .filter(|&cx| cx > centre_x)
            .count();
        crossings % 2 == 1
    }
}

impl Rasterizer for CrossingRasterizer {
    fn fill_polygon(&self, points: &[Point2], surface: &mut RasterSurface, color: u32) {
        let Some((min_x, min_y, max_x, max_y)) = vertex_bounds(points) else {
            return;
        };

        // Clip the bounding box to the surface.
        let x_start = min_x.max(0);
        let x_end = max_x.min(surface.width() as i32);
        let y_start = min_y.max(0);
        let y_end = max_y.min(surface.height() as i32);

        for y in y_start..y_end {
            for x in x_start..x_end {
                if Self::is_inside(points, x, y) {
                    surface.blend_pixel(x, y, color);
                }
            }
        }
    }
}
