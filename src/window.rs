//! Live preview of a render in an SDL2 window.
//!
//! The render thread owns the pipeline. The window polls input, copies the
//! newest published frame from a [`FrameExchange`] into a streaming texture
//! and paces itself with a [`FrameLimiter`].

use std::thread;
use std::time::{Duration, Instant};

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::WindowContext;
use sdl2::EventPump;

use crate::render::surface::argb_bytes;
use crate::render::FrameExchange;

/// Repaint rate of the preview.
pub const PREVIEW_FPS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    /// Escape or the close button.
    Quit,
}

/// Sleeps between repaints so the preview loop runs at a fixed rate.
#[derive(Debug)]
pub struct FrameLimiter {
    interval: Duration,
    last: Instant,
}

impl FrameLimiter {
    /// A limiter for `fps` repaints per second (at least one).
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / fps.max(1),
            last: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left at `now` before the current interval is used up.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last))
    }

    /// Sleep out the rest of the interval and start the next one.
    pub fn wait(&mut self) {
        let remaining = self.remaining(Instant::now());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
        self.last = Instant::now();
    }
}

pub struct Window {
    canvas: Canvas<sdl2::video::Window>,
    // Borrows from `_texture_creator`, so it is declared (and dropped) first.
    texture: Texture<'static>,
    _texture_creator: Box<TextureCreator<WindowContext>>,
    event_pump: EventPump,
    pitch: usize,
    bytes: Vec<u8>,
    shown: u64,
}

impl Window {
    /// Open a fixed-size window whose texture matches the frame size.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video = sdl_context.video()?;

        let window = video
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: the creator is boxed, so its address is stable, and it is
        // stored in the same struct as the texture, which drops before it.
        let creator: &'static TextureCreator<WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture,
            _texture_creator: texture_creator,
            event_pump,
            pitch: width as usize * 4,
            bytes: Vec::new(),
            shown: 0,
        })
    }

    /// Drain pending input; `Quit` wins over anything else in the queue.
    pub fn poll_events(&mut self) -> WindowEvent {
        let mut result = WindowEvent::None;
        for event in self.event_pump.poll_iter() {
            if let Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } = event
            {
                result = WindowEvent::Quit;
            }
        }
        result
    }

    /// Show the exchange's front frame if it is newer than the one on screen.
    ///
    /// Returns whether a new frame was drawn.
    pub fn show_latest(&mut self, exchange: &FrameExchange) -> Result<bool, String> {
        let bytes = &mut self.bytes;
        let Some(generation) =
            exchange.read_if_newer(self.shown, |pixels| *bytes = argb_bytes(pixels))
        else {
            return Ok(false);
        };
        self.shown = generation;

        self.texture
            .update(None, &self.bytes, self.pitch)
            .map_err(|e| e.to_string())?;
        self.canvas.clear();
        self.canvas.copy(&self.texture, None, None)?;
        self.canvas.present();
        Ok(true)
    }
}
