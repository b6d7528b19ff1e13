//! Handoff of finished frames from the render thread to the presenter.
//!
//! The render thread owns a back buffer (its [`RasterSurface`]). When a
//! frame is complete it swaps the back buffer with the shared front buffer
//! under a mutex, so the presenter only ever sees whole frames and the
//! worker never waits for a copy.
//!
//! ```text
//!   worker                      presenter
//!   ------                      ---------
//!   draw into back buffer
//!   publish()  --swap-->  [front, generation + 1]
//!                               read_if_newer() -> present
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::surface::{pixel_count, RasterSurface};
use crate::colors;

#[derive(Debug)]
struct Front {
    pixels: Vec<u32>,
    generation: u64,
}

/// Shared front buffer. Cloning yields another handle to the same buffer.
#[derive(Debug, Clone)]
pub struct FrameExchange {
    front: Arc<Mutex<Front>>,
    width: u32,
    height: u32,
}

impl FrameExchange {
    /// Create an exchange for frames of the given size. Until the first
    /// publish the front buffer holds the background colour.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            front: Arc::new(Mutex::new(Front {
                pixels: vec![colors::BACKGROUND; pixel_count(width, height)],
                generation: 0,
            })),
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

    // The front buffer is only ever replaced whole, so a poisoned lock
    // still guards a complete frame.
    fn lock(&self) -> MutexGuard<'_, Front> {
        self.front.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap `surface`'s pixels into the front buffer.
    ///
    /// Afterwards `surface` holds the previous front frame and must be
    /// cleared before it is drawn into again.
    pub fn publish(&self, surface: &mut RasterSurface) {
        let mut front = self.lock();
        surface.swap_pixels(&mut front.pixels);
        front.generation += 1;
    }

    /// Number of frames published so far.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Call `read` with the front buffer if a frame newer than `seen` has
    /// been published. Returns the generation that was read.
    pub fn read_if_newer<F>(&self, seen: u64, read: F) -> Option<u64>
    where
        F: FnOnce(&[u32]),
    {
        let front = self.lock();
        if front.generation > seen {
            read(&front.pixels);
            Some(front.generation)
        } else {
            None
        }
    }
}
