/// facefit terminal demo - glasses overlay on a face-mesh landmark stream
///
/// Without `--landmarks` a synthetic face sways in front of the camera.
/// Controls:
///   - WASD / Arrow Keys: Turn the synthetic head
///   - E/R: Roll
///   - Space: Pause
///   - Q/ESC: Quit

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use facefit_core::obj::load_obj_file;
use facefit_core::{FaceOverlay, OverlayConfig, ScreenMapping};
use facefit_terminal::{
    run_headless, AsciiRenderer, LandmarkSource, RecordedFrames, SyntheticFace, TerminalApp,
};
use log::{error, info};

const BUNDLED_MODEL: &str = include_str!("../assets/glasses.obj");

/// Canvas used for the synthetic face in headless mode
const HEADLESS_CANVAS: (f32, f32) = (640.0, 480.0);

#[derive(Parser, Debug)]
#[command(name = "facefit-terminal")]
#[command(author, version, about = "Fit a 3D glasses model onto face-mesh landmarks", long_about = None)]
struct Args {
    /// OBJ model to overlay (defaults to the bundled glasses)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Overlay config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recorded landmark frames (JSON) instead of the synthetic face
    #[arg(short, long)]
    landmarks: Option<PathBuf>,

    /// Disable front-camera mirroring
    #[arg(long)]
    no_mirror: bool,

    /// Run this many frames without a terminal and log each pose
    #[arg(long)]
    headless: Option<usize>,

    /// Print the first landmark frame (one list per face) as JSON and exit
    #[arg(long)]
    dump_landmarks: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "info" } else { "warn" }),
    )
    .init();

    let mut config = match &args.config {
        Some(path) => OverlayConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => OverlayConfig::default(),
    };
    if args.no_mirror {
        config.mirror = false;
    }

    let model = match &args.model {
        Some(path) => load_obj_file(path, &config.parser())
            .with_context(|| format!("Failed to read model {}", path.display()))?,
        None => {
            let load = config.parser().parse(BUNDLED_MODEL);
            if let Some(e) = &load.error {
                error!("bundled model is malformed: {}", e);
            }
            load.model
        }
    };
    let overlay = FaceOverlay::from_config(Arc::new(model), &config);
    if !overlay.model().has_faces() {
        error!("model has no faces; nothing will be drawn");
    }
    info!(
        "model ready: {} vertices, {} faces",
        overlay.model().vertices.len(),
        overlay.model().faces.len()
    );

    let recorded = match &args.landmarks {
        Some(path) => Some(
            RecordedFrames::load(path)
                .with_context(|| format!("Failed to load landmarks {}", path.display()))?,
        ),
        None => None,
    };

    if args.dump_landmarks {
        let mut source: Box<dyn LandmarkSource> = match recorded {
            Some(frames) => Box::new(frames),
            None => Box::new(SyntheticFace::new(HEADLESS_CANVAS)),
        };
        let faces: Vec<_> = source
            .next_frame(0.0)
            .iter()
            .map(|face| face.to_triples())
            .collect();
        println!("{}", serde_json::to_string_pretty(&faces)?);
        return Ok(());
    }

    if let Some(frames) = args.headless {
        let mut source: Box<dyn LandmarkSource> = match recorded {
            Some(frames) => Box::new(frames),
            None => Box::new(SyntheticFace::new(HEADLESS_CANVAS)),
        };
        let mapping = ScreenMapping::fit(source.image_size(), source.image_size(), config.mirror);
        let summary = run_headless(&overlay, &mut *source, &mapping, frames, 1.0 / 30.0);
        println!(
            "{} frames: {} faces rendered, {} frames without a face, {} faces rejected, {} triangles",
            frames, summary.rendered, summary.no_face, summary.rejected, summary.triangles
        );
        return Ok(());
    }

    let source: Box<dyn LandmarkSource> = match recorded {
        Some(frames) => Box::new(frames),
        None => {
            let (width, height) = crossterm::terminal::size()?;
            let canvas = AsciiRenderer::new(width as usize, height as usize).canvas_size();
            Box::new(SyntheticFace::new(canvas))
        }
    };

    println!("Starting facefit terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(overlay, source, config.mirror)?;
    app.run()?;

    Ok(())
}
