//! World-to-screen mapping.
//!
//! There is no perspective divide: a rotated point keeps its x and y, gets
//! shifted by a fixed offset and has its y flipped, because raster row 0 is
//! the top of the image while world y grows upwards.
//!
//! ```text
//! screen_x = x + offset
//! screen_y = height - (y + offset)
//! ```
//!
//! Both are truncated toward zero to whole pixels.

use crate::math::{Point2, Vec3};

/// Shift applied to both axes before flipping y.
pub const DEFAULT_OFFSET: f64 = 100.0;

/// The drawable area and the offset that places the model inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    offset: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, offset: f64) -> Self {
        Self {
            width,
            height,
            offset,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Map a rotated world point to a pixel coordinate. Points outside the
    /// viewport are returned as-is and clipped later by the rasterizer;
    /// coordinates past the `i32` range saturate.
    #[inline]
    pub fn project(&self, point: Vec3) -> Point2 {
        let x = point.x + self.offset;
        let y = self.height as f64 - (point.y + self.offset);
        Point2::new(x as i32, y as i32)
    }

    /// Project the four corners of a face, in A, B, C, D order.
    #[inline]
    pub fn project_quad(&self, points: &[Vec3], corners: [usize; 4]) -> [Point2; 4] {
        corners.map(|i| self.project(points[i]))
    }

    /// Whether the world-space box `(min, max)` projects fully inside the viewport.
    pub fn contains_bounds(&self, min: Vec3, max: Vec3) -> bool {
        let top_left = self.project(Vec3::new(min.x, max.y, 0.0));
        let bottom_right = self.project(Vec3::new(max.x, min.y, 0.0));
        top_left.x >= 0
            && top_left.y >= 0
            && bottom_right.x <= self.width as i32
            && bottom_right.y <= self.height as i32
    }
}
