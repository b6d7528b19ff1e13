//! Core rendering engine.
//!
//! The [`Engine`] owns the mesh and everything needed to turn it into one
//! frame: rotate, shade and sort, project, fill. [`RenderLoop`] drives an
//! engine frame after frame on its own thread, feeding a [`FrameSink`] and
//! optionally a [`FrameExchange`] for on-screen presentation, until a
//! [`StopToken`] fires or a frame limit is reached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::error::ExportResult;
use crate::math::Vec3;
use crate::mesh::Mesh;
use crate::projection::Viewport;
use crate::render::{
    FrameExchange, RasterSurface, Rasterizer, RasterizerDispatcher, RasterizerType,
};
use crate::shading::{FaceShader, ShadedFace};
use crate::sink::FrameSink;
use crate::transform::{NormalMode, Spin};

/// Cooperative cancellation flag shared between the render thread and
/// whoever wants it to stop.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop. The frame in progress, if any, still completes.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Statistics for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub frames: u64,
    pub elapsed: Duration,
}

impl RunReport {
    /// Mean wall time per frame, or `None` if nothing was rendered.
    pub fn average_frame_time(&self) -> Option<Duration> {
        u32::try_from(self.frames)
            .ok()
            .filter(|&frames| frames > 0)
            .map(|frames| self.elapsed / frames)
    }
}

pub struct Engine {
    mesh: Mesh,
    spin: Spin,
    normal_mode: NormalMode,
    rotated_normals: Vec<Vec3>,
    shader: FaceShader,
    viewport: Viewport,
    rasterizer: RasterizerDispatcher,
    surface: RasterSurface,
    background: u32,
}

impl Engine {
    pub fn new(mesh: Mesh, config: &RenderConfig) -> Self {
        let viewport = config.viewport();
        Self {
            mesh,
            spin: Spin::new(config.axis(), config.step_degrees()),
            normal_mode: config.normal_mode(),
            rotated_normals: Vec::new(),
            shader: FaceShader::new(),
            viewport,
            rasterizer: RasterizerDispatcher::new(config.rasterizer()),
            surface: RasterSurface::new(viewport.width(), viewport.height()),
            background: config.background(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    pub fn set_rasterizer(&mut self, rasterizer_type: RasterizerType) {
        self.rasterizer.set_type(rasterizer_type);
    }

    pub fn rasterizer(&self) -> RasterizerType {
        self.rasterizer.active_type()
    }

    pub fn set_normal_mode(&mut self, mode: NormalMode) {
        self.normal_mode = mode;
    }

    pub fn normal_mode(&self) -> NormalMode {
        self.normal_mode
    }

    /// The frame produced by the last [`Engine::render_frame`].
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Faces of the last frame in draw order.
    pub fn shaded_faces(&self) -> &[ShadedFace] {
        self.shader.faces()
    }

    /// Rotate by one increment and draw the result.
    pub fn render_frame(&mut self) -> &RasterSurface {
        self.surface.clear(self.background);

        self.spin.advance(self.mesh.points());
        let points = self.spin.points();

        let normals: &[Vec3] = match self.normal_mode {
            NormalMode::Fixed => self.mesh.normals(),
            NormalMode::Rotated => {
                let rotation = self.spin.rotation();
                self.rotated_normals.clear();
                self.rotated_normals
                    .extend(self.mesh.normals().iter().map(|&n| rotation * n));
                &self.rotated_normals
            }
        };

        // Back to front: nearer faces paint over farther ones.
        let faces = self.mesh.faces();
        for shaded in self.shader.shade(&self.mesh, points, normals) {
            let corners = self
                .viewport
                .project_quad(points, faces[shaded.face].indices());
            self.rasterizer
                .fill_polygon(&corners, &mut self.surface, shaded.color);
        }

        &self.surface
    }
}

/// Drives an [`Engine`] until stopped.
pub struct RenderLoop {
    engine: Engine,
    stop: StopToken,
    exchange: Option<FrameExchange>,
    frame_limit: Option<u64>,
}

impl RenderLoop {
    pub fn new(engine: Engine, stop: StopToken) -> Self {
        Self {
            engine,
            stop,
            exchange: None,
            frame_limit: None,
        }
    }

    /// Publish every finished frame to `exchange`.
    pub fn with_exchange(mut self, exchange: FrameExchange) -> Self {
        self.exchange = Some(exchange);
        self
    }

    /// Stop on its own after `limit` frames.
    pub fn with_frame_limit(mut self, limit: Option<u64>) -> Self {
        self.frame_limit = limit;
        self
    }

    /// Render until the stop token fires or the frame limit is reached, then
    /// finalize `sink`.
    ///
    /// The token is checked before each frame, so at most one frame completes
    /// after [`StopToken::stop`]. Every completed frame is appended to the
    /// sink, in order, and the sink is finalized exactly once.
    pub fn run<S: FrameSink>(mut self, mut sink: S) -> ExportResult<(RunReport, S::Output)> {
        info!(
            faces = self.engine.mesh().faces().len(),
            width = self.engine.viewport().width(),
            height = self.engine.viewport().height(),
            rasterizer = %self.engine.rasterizer(),
            frame_limit = ?self.frame_limit,
            "Render loop started"
        );

        let started = Instant::now();
        let mut frames: u64 = 0;

        while !self.stop.is_stopped() {
            if self.frame_limit.is_some_and(|limit| frames >= limit) {
                break;
            }

            self.engine.render_frame();
            sink.append(&self.engine.surface);
            if let Some(exchange) = &self.exchange {
                exchange.publish(&mut self.engine.surface);
            }

            frames += 1;
            debug!(frame = frames, "Frame rendered");
        }

        let report = RunReport {
            frames,
            elapsed: started.elapsed(),
        };
        info!(
            frames = report.frames,
            elapsed_ms = report.elapsed.as_millis() as u64,
            avg_frame_us = report
                .average_frame_time()
                .map_or(0, |t| t.as_micros() as u64),
            "Render loop stopped"
        );

        let output = sink.finalize()?;
        Ok((report, output))
    }

    /// Run on a dedicated thread.
    pub fn spawn<S>(
        self,
        sink: S,
    ) -> std::io::Result<JoinHandle<ExportResult<(RunReport, S::Output)>>>
    where
        S: FrameSink + Send + 'static,
        S::Output: Send + 'static,
    {
        thread::Builder::new()
            .name("render".into())
            .spawn(move || self.run(sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors;
    use crate::sink::MemorySink;

    // One quad in the z = -1 plane, corners at +/-10.
    const QUAD: &str = "v -10 -10 -1\nv 10 -10 -1\nv 10 10 -1\nv -10 10 -1\nf 1 2 3 4\n";

    fn still_config() -> RenderConfig {
        let mut config = RenderConfig::new();
        config.set_viewport(200, 200).set_step_degrees(0.0);
        config
    }

    /// Stops the token once it has seen `stop_at` frames.
    struct StoppingSink {
        inner: MemorySink,
        stop: StopToken,
        stop_at: usize,
    }

    impl FrameSink for StoppingSink {
        type Output = Vec<image::RgbaImage>;

        fn append(&mut self, surface: &RasterSurface) {
            self.inner.append(surface);
            if self.inner.len() == self.stop_at {
                self.stop.stop();
            }
        }

        fn len(&self) -> usize {
            self.inner.len()
        }

        fn finalize(self) -> ExportResult<Self::Output> {
            self.inner.finalize()
        }
    }

    #[test]
    fn test_stop_token_is_shared() {
        let token = StopToken::new();
        let other = token.clone();
        assert!(!token.is_stopped());
        other.stop();
        assert!(token.is_stopped());
    }

    #[test]
    fn test_single_quad_frame() {
        let mesh = Mesh::from_obj_str(QUAD).unwrap();
        assert_eq!(mesh.normals().len(), 1);

        let mut engine = Engine::new(mesh, &still_config());
        engine.render_frame();
        assert_eq!(engine.shaded_faces().len(), 1);

        let filled = colors::blend_over(engine.shaded_faces()[0].color, colors::BACKGROUND);
        let surface = engine.surface();
        // x: -10..10 -> 90..110, y: 200 - (10 + 100) = 90 .. 200 - (-10 + 100) = 110
        assert_eq!(surface.get_pixel(90, 90), Some(filled));
        assert_eq!(surface.get_pixel(109, 109), Some(filled));
        assert_eq!(surface.get_pixel(110, 100), Some(colors::BACKGROUND));
        assert_eq!(surface.get_pixel(100, 89), Some(colors::BACKGROUND));
        assert_eq!(surface.get_pixel(0, 0), Some(colors::BACKGROUND));
    }

    #[test]
    fn test_frames_start_from_background() {
        let mesh = Mesh::from_obj_str(QUAD).unwrap();
        let mut engine = Engine::new(mesh, &still_config());
        let first = engine.render_frame().clone();
        let second = engine.render_frame().clone();
        // Translucent fills would darken if the surface were not cleared.
        assert_eq!(first, second);
    }

    #[test]
    fn test_far_off_screen_quad_renders() {
        // Projects past the i32 range on the left once rotated.
        let wide = "v -3e9 -10 -1\nv 10 -10 -1\nv 10 10 -1\nv -3e9 10 -1\nf 1 2 3 4\n";
        let mut config = RenderConfig::new();
        config.set_viewport(64, 64);

        let mut surfaces = Vec::new();
        for kind in [RasterizerType::Scanline, RasterizerType::Crossing] {
            config.set_rasterizer(kind);
            let mut engine = Engine::new(Mesh::from_obj_str(wide).unwrap(), &config);
            engine.render_frame();
            surfaces.push(engine.render_frame().clone());
        }
        assert_eq!(surfaces[0], surfaces[1]);
    }

    #[test]
    fn test_rotated_normals_follow_spin() {
        let mesh = Mesh::from_obj_str(QUAD).unwrap();
        let mut config = still_config();
        config
            .set_step_degrees(90.0)
            .set_axis(Vec3::new(1.0, 0.0, 0.0))
            .set_normal_mode(NormalMode::Rotated);
        let mut engine = Engine::new(mesh, &config);

        engine.render_frame();
        // Derived normal (0, 0, -1) turned a quarter about x points along +y.
        approx::assert_relative_eq!(engine.shaded_faces()[0].alignment, 1.0, epsilon = 1e-9);

        engine.set_normal_mode(NormalMode::Fixed);
        engine.render_frame();
        assert_eq!(engine.shaded_faces()[0].alignment, 0.0);
    }

    #[test]
    fn test_loop_stops_after_token() {
        let mesh = Mesh::from_obj_str(QUAD).unwrap();
        let token = StopToken::new();
        let sink = StoppingSink {
            inner: MemorySink::new(),
            stop: token.clone(),
            stop_at: 4,
        };

        let engine = Engine::new(mesh, &still_config());
        let (report, frames) = RenderLoop::new(engine, token).run(sink).unwrap();
        assert_eq!(report.frames, 4);
        assert_eq!(frames.len(), 4);
    }

    #[test]
    fn test_loop_respects_frame_limit_and_exchange() {
        let mesh = Mesh::from_obj_str(QUAD).unwrap();
        let exchange = FrameExchange::new(200, 200);
        let engine = Engine::new(mesh, &still_config());

        let handle = RenderLoop::new(engine, StopToken::new())
            .with_exchange(exchange.clone())
            .with_frame_limit(Some(3))
            .spawn(MemorySink::new())
            .unwrap();
        let (report, frames) = handle.join().unwrap().unwrap();

        assert_eq!(report.frames, 3);
        assert_eq!(frames.len(), 3);
        assert_eq!(exchange.generation(), 3);

        // The published frame matches what the sink captured.
        let mut front = Vec::new();
        exchange.read_if_newer(0, |pixels| front.extend_from_slice(pixels));
        let captured: Vec<u32> = frames[2]
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                colors::pack_argb(a, r, g, b)
            })
            .collect();
        assert_eq!(front, captured);
    }

    #[test]
    fn test_already_stopped_renders_nothing() {
        let mesh = Mesh::from_obj_str(QUAD).unwrap();
        let token = StopToken::new();
        token.stop();
        let engine = Engine::new(mesh, &still_config());
        let (report, frames) = RenderLoop::new(engine, token)
            .run(MemorySink::new())
            .unwrap();
        assert_eq!(report.frames, 0);
        assert!(frames.is_empty());
        assert_eq!(report.average_frame_time(), None);
    }
}
