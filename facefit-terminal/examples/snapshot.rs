/// Example: Print one frame of the overlay on a synthetic face
///
/// Usage: cargo run --example snapshot -- [path/to/model.obj]

use std::env;
use std::io;
use std::sync::Arc;

use facefit_core::obj::{load_obj, load_obj_file, ObjParser};
use facefit_core::{FaceOverlay, OverlayConfig};
use facefit_terminal::{render_snapshot, LandmarkSource, SyntheticFace};

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let model = if args.len() < 2 {
        eprintln!("No OBJ file provided, using bundled glasses...");
        load_obj(include_str!("../assets/glasses.obj"))
    } else {
        println!("Loading OBJ file: {}", args[1]);
        load_obj_file(&args[1], &ObjParser::default())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Failed to load model: {}", e)))?
    };
    let overlay = FaceOverlay::from_config(Arc::new(model), &OverlayConfig::default());
    println!("Loaded {} triangles", overlay.model().faces.len());
    let mut face = SyntheticFace::new((80.0, 48.0)).with_animation(false);
    face.nudge(0.0, 0.4, 0.1);

    let frame = render_snapshot(&overlay, &mut face, 80, 24, false)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Failed to render: {}", e)))?;
    frame.draw(&mut io::stdout())?;
    println!();
    Ok(())
}
