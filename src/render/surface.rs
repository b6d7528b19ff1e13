//! The pixel buffer every frame is drawn into.

use image::RgbaImage;

use crate::colors;

/// An owned ARGB8888 pixel buffer of fixed size.
///
/// Pixels are stored row-major with row 0 at the top. All writes are
/// bounds-checked and silently clipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterSurface {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl RasterSurface {
    /// Create a surface filled with [`colors::BACKGROUND`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![colors::BACKGROUND; pixel_count(width, height)],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrite a pixel.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Composite `color` over the pixel at (x, y).
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = colors::blend_over(color, self.pixels[i]);
        }
    }

    /// Composite `color` over the pixels `x_start..x_end` of row `y`.
    ///
    /// The span is clipped to the surface; an empty or fully clipped span is
    /// a no-op.
    #[inline]
    pub fn blend_span(&mut self, y: i32, x_start: i32, x_end: i32, color: u32) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let x_start = x_start.max(0);
        let x_end = x_end.min(self.width as i32);
        if x_start >= x_end {
            return;
        }

        let row = y as usize * self.width as usize;
        let span = &mut self.pixels[row + x_start as usize..row + x_end as usize];
        for pixel in span {
            *pixel = colors::blend_over(color, *pixel);
        }
    }

    /// Swap the pixel storage with `other`, which must hold `width * height` pixels.
    ///
    /// Used to hand a finished frame over without copying.
    pub fn swap_pixels(&mut self, other: &mut Vec<u32>) {
        debug_assert_eq!(
            other.len(),
            self.pixels.len(),
            "Swapped buffer size doesn't match surface dimensions"
        );
        std::mem::swap(&mut self.pixels, other);
    }

    /// The pixels as native-endian bytes, the layout an ARGB8888 texture expects.
    pub fn to_argb_bytes(&self) -> Vec<u8> {
        argb_bytes(&self.pixels)
    }

    /// Copy the surface into an RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        rgba_image(&self.pixels, self.width, self.height)
    }
}

/// Number of pixels in a `width` x `height` buffer, computed without `u32` overflow.
#[inline]
pub fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Flatten packed ARGB pixels into native-endian bytes.
pub fn argb_bytes(pixels: &[u32]) -> Vec<u8> {
    pixels.iter().flat_map(|p| p.to_ne_bytes()).collect()
}

/// Build an RGBA image from packed ARGB pixels.
pub fn rgba_image(pixels: &[u32], width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba(colors::to_rgba(pixels[y as usize * width as usize + x as usize]))
    })
}
