/// A pixel coordinate on the raster surface. Row 0 is the top of the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Point2 {
    pub x: i32,
    pub y: i32,
}

impl Point2 {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
