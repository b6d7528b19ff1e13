use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quadspin::config::{DEFAULT_HEIGHT, DEFAULT_OUTPUT, DEFAULT_WIDTH};
use quadspin::engine::{Engine, RenderLoop, RunReport, StopToken};
use quadspin::math::Vec3;
use quadspin::mesh::Mesh;
use quadspin::projection::DEFAULT_OFFSET;
use quadspin::render::RasterizerType;
use quadspin::sink::{GifReport, GifSink, DEFAULT_FRAME_DELAY_MS};
use quadspin::transform::{NormalMode, DEFAULT_STEP_DEGREES};
use quadspin::{RenderConfig, RenderError};

/// Frames rendered without a window when `--frames` is not given: one full turn
/// at the default step.
const HEADLESS_FRAMES: u64 = 360;

/// Spin a quad mesh and record it as an animated GIF.
#[derive(Parser, Debug)]
#[command(name = "quadspin", version, about, long_about = None)]
struct Cli {
    /// OBJ model with quad faces
    #[arg(name = "MODEL")]
    model: PathBuf,

    /// Where to write the animation
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Viewport width in pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Screen offset added to x and y before flipping y
    #[arg(long, default_value_t = DEFAULT_OFFSET, allow_negative_numbers = true)]
    offset: f64,

    /// Rotation per frame in degrees
    #[arg(long, default_value_t = DEFAULT_STEP_DEGREES, allow_negative_numbers = true)]
    step: f64,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Render without opening a window
    #[arg(long)]
    headless: bool,

    /// Rotate face normals with the mesh instead of keeping them fixed
    #[arg(long)]
    rotate_normals: bool,

    /// Polygon fill algorithm
    #[arg(long, value_enum, default_value_t = RasterizerArg::Scanline)]
    rasterizer: RasterizerArg,

    /// Time each GIF frame is shown, in milliseconds
    #[arg(long, default_value_t = DEFAULT_FRAME_DELAY_MS)]
    delay: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RasterizerArg {
    Scanline,
    Crossing,
}

impl From<RasterizerArg> for RasterizerType {
    fn from(arg: RasterizerArg) -> Self {
        match arg {
            RasterizerArg::Scanline => RasterizerType::Scanline,
            RasterizerArg::Crossing => RasterizerType::Crossing,
        }
    }
}

impl Cli {
    /// Whether the run has to go without a window.
    fn headless(&self) -> bool {
        self.headless || cfg!(not(feature = "window"))
    }

    fn to_config(&self) -> RenderConfig {
        let frame_limit = match self.frames {
            Some(frames) => Some(frames),
            None if self.headless() => Some(HEADLESS_FRAMES),
            None => None,
        };
        let normal_mode = if self.rotate_normals {
            NormalMode::Rotated
        } else {
            NormalMode::Fixed
        };

        let mut config = RenderConfig::new();
        config
            .set_viewport(self.width, self.height)
            .set_offset(self.offset)
            .set_step_degrees(self.step)
            .set_normal_mode(normal_mode)
            .set_rasterizer(self.rasterizer.into())
            .set_frame_delay_ms(self.delay)
            .set_output(&self.output)
            .set_frame_limit(frame_limit);
        config
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), RenderError> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.to_config();

    let mesh = Mesh::from_obj(&cli.model)?;
    let radius = mesh.radius();
    if !config
        .viewport()
        .contains_bounds(Vec3::new(-radius, -radius, 0.0), Vec3::new(radius, radius, 0.0))
    {
        warn!(
            radius,
            width = config.width(),
            height = config.height(),
            offset = config.offset(),
            "Model will leave the viewport while spinning"
        );
    }

    let stop = StopToken::new();
    let render_loop = RenderLoop::new(Engine::new(mesh, &config), stop.clone())
        .with_frame_limit(config.frame_limit());
    let sink = GifSink::new(config.output()).with_delay_ms(config.frame_delay_ms());

    let (report, gif) = if cli.headless() {
        render_loop.run(sink)?
    } else {
        run_windowed(render_loop, sink, &config, &stop)?
    };

    info!(
        frames = report.frames,
        path = %gif.path.display(),
        bytes = gif.bytes,
        "Done"
    );
    Ok(())
}

#[cfg(feature = "window")]
fn run_windowed(
    render_loop: RenderLoop,
    sink: GifSink,
    config: &RenderConfig,
    stop: &StopToken,
) -> Result<(RunReport, GifReport), RenderError> {
    use quadspin::render::FrameExchange;
    use quadspin::window::{FrameLimiter, Window, WindowEvent, PREVIEW_FPS};

    let mut window =
        Window::new("quadspin", config.width(), config.height()).map_err(RenderError::Window)?;
    let exchange = FrameExchange::new(config.width(), config.height());

    let handle = render_loop
        .with_exchange(exchange.clone())
        .spawn(sink)
        .map_err(RenderError::Spawn)?;

    let mut limiter = FrameLimiter::new(PREVIEW_FPS);
    let mut presented = 0u64;
    let mut shown = Ok(());

    while !handle.is_finished() {
        if window.poll_events() == WindowEvent::Quit {
            info!("Stop requested");
            break;
        }
        match window.show_latest(&exchange) {
            Ok(true) => presented += 1,
            Ok(false) => {}
            Err(e) => {
                shown = Err(e);
                break;
            }
        }
        limiter.wait();
    }

    stop.stop();
    let result = handle.join().map_err(|_| RenderError::WorkerPanicked)??;
    shown.map_err(RenderError::Window)?;
    tracing::debug!(presented, rendered = result.0.frames, "Preview closed");
    Ok(result)
}

#[cfg(not(feature = "window"))]
fn run_windowed(
    render_loop: RenderLoop,
    sink: GifSink,
    _config: &RenderConfig,
    _stop: &StopToken,
) -> Result<(RunReport, GifReport), RenderError> {
    Ok(render_loop.run(sink)?)
}
