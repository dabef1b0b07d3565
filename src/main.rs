use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use parking_lot::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use posecam_lib::dummy::{test_pattern_frame, DummyEngine};
use posecam_lib::frame::convert::convert_yuv420_to_argb;
use posecam_lib::frame::crop::crop_to_aspect;
use posecam_lib::frame::scale::Scaler;
use posecam_lib::overlay::{RasterSurface, SkeletonRenderer};
use posecam_lib::pipeline::{FrameSource, LatestFrameSlot, PipelineRegistry};
use posecam_lib::pose::InferenceEngine;
use posecam_lib::settings::{PipelineConfig, SettingsStore};

/// Run synthetic camera streams through the pose overlay pipeline and write
/// the last overlay of each stream to a PNG.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Pipeline settings file (JSON). Missing file means defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the default settings to `--config` and exit.
    #[arg(long, requires = "config")]
    init_config: bool,

    /// Number of frames each stream produces.
    #[arg(long, default_value_t = 90)]
    frames: u64,

    /// Frame rate of the synthetic camera.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Simulated inference latency in milliseconds.
    #[arg(long, default_value_t = 45)]
    latency_ms: u64,

    /// Run a second, landscape stream alongside the portrait one.
    #[arg(long)]
    dual: bool,

    /// Annotate a single frame at model resolution instead of streaming.
    #[arg(long, conflicts_with = "dual")]
    annotate: bool,

    /// Output PNG path.
    #[arg(long, short, default_value = "overlay.png")]
    output: PathBuf,
}

struct Stream {
    id: &'static str,
    slot: Arc<LatestFrameSlot>,
    surface: Arc<Mutex<RasterSurface>>,
    output: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => {
            let store = SettingsStore::open(path.clone())?;
            if args.init_config {
                store.save()?;
                info!("wrote default settings to {}", path.display());
                return Ok(());
            }
            store.config()
        }
        None => PipelineConfig::default(),
    };

    if args.annotate {
        return annotate(&config, &args.output);
    }

    let latency = Duration::from_millis(args.latency_ms);
    let registry = PipelineRegistry::new();
    let mut streams = vec![Stream {
        id: "front",
        slot: Arc::new(LatestFrameSlot::new()),
        surface: Arc::new(Mutex::new(RasterSurface::new(480, 640))),
        output: args.output.clone(),
    }];
    if args.dual {
        streams.push(Stream {
            id: "back",
            slot: Arc::new(LatestFrameSlot::new()),
            surface: Arc::new(Mutex::new(RasterSurface::new(640, 480))),
            output: sibling_path(&args.output, "back"),
        });
    }

    for stream in &streams {
        let engine = DummyEngine::new().with_latency(latency);
        registry.start(
            stream.id,
            config.clone(),
            Box::new(engine),
            Arc::clone(&stream.slot) as Arc<dyn FrameSource>,
            Arc::clone(&stream.surface),
        )?;
    }

    let interval = Duration::from_secs_f64(1.0 / args.fps.max(1.0));
    for index in 0..args.frames {
        for stream in &streams {
            stream.slot.push(test_pattern_frame(
                config.preview_width,
                config.preview_height,
                index,
            ));
            registry.notify(stream.id)?;
        }
        std::thread::sleep(interval);
    }
    // Let the last in-flight frame land before shutting down.
    std::thread::sleep(latency * 2);

    for stream in &streams {
        let snapshot = registry.diagnostics(stream.id)?;
        info!(
            "{}: {} frames produced, {}",
            stream.id,
            stream.slot.sequence(),
            serde_json::to_string(&snapshot)?
        );
        if let Some(e) = registry.fatal_error(stream.id) {
            warn!("{} halted: {e}", stream.id);
        }
    }
    registry.stop_all();

    for stream in &streams {
        let surface = stream.surface.lock();
        if surface.posted_frames() == 0 {
            warn!("{}: nothing was rendered", stream.id);
            continue;
        }
        surface.save_png(&stream.output)?;
        info!(
            "{}: wrote {} ({} labels not rasterised)",
            stream.id,
            stream.output.display(),
            surface.posted_labels().len()
        );
    }
    Ok(())
}

/// Still-image mode: one frame through convert, crop, scale, then the pose
/// drawn directly over the model input.
fn annotate(config: &PipelineConfig, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    let frame = test_pattern_frame(config.preview_width.max(1), config.preview_height.max(1), 0);
    let argb = convert_yuv420_to_argb(&frame)?;
    let cropped = crop_to_aspect(argb, config.model_width, config.model_height);
    let input = Scaler::new().scale(&cropped, config.model_width, config.model_height)?;

    let mut engine = DummyEngine::new();
    let pose = engine.estimate_single_pose(&input)?;
    engine.close();

    let image = SkeletonRenderer::from_config(config).annotate(&input, &pose);
    image.save_with_format(output, image::ImageFormat::Png)?;
    info!("wrote {} (score {:.2})", output.display(), pose.score());
    Ok(())
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "overlay".to_string());
    path.with_file_name(format!("{stem}-{suffix}.png"))
}
