/// Terminal front-end: draws the posed overlay model as an ASCII wireframe
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use facefit_core::{CoordinateMapping, FaceOverlay, RenderedTriangle, ScreenMapping};
use log::{info, warn};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod source;

pub use renderer::AsciiRenderer;
pub use source::{LandmarkSource, RecordedFile, RecordedFrames, SyntheticFace};

/// Head rotation applied per key press (radians)
const NUDGE_STEP: f32 = 0.1;

/// Main application struct for terminal overlay rendering
pub struct TerminalApp {
    overlay: FaceOverlay,
    source: Box<dyn LandmarkSource>,
    mapping: ScreenMapping,
    renderer: AsciiRenderer,
    running: bool,
    paused: bool,
    status: String,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(overlay: FaceOverlay, source: Box<dyn LandmarkSource>, mirror: bool) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let renderer = AsciiRenderer::new(width as usize, height as usize);
        let mapping = ScreenMapping::fit(source.image_size(), renderer.canvas_size(), mirror);

        Ok(Self {
            overlay,
            source,
            mapping,
            renderer,
            running: true,
            paused: false,
            status: String::new(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Render
            let dt = if self.paused {
                0.0
            } else {
                target_frame_time.as_secs_f32()
            };
            self.render(dt)?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char(' ') => {
                    self.paused = !self.paused;
                }
                KeyCode::Char('w') | KeyCode::Up => {
                    self.source.nudge(NUDGE_STEP, 0.0, 0.0);
                }
                KeyCode::Char('s') | KeyCode::Down => {
                    self.source.nudge(-NUDGE_STEP, 0.0, 0.0);
                }
                KeyCode::Char('a') | KeyCode::Left => {
                    self.source.nudge(0.0, -NUDGE_STEP, 0.0);
                }
                KeyCode::Char('d') | KeyCode::Right => {
                    self.source.nudge(0.0, NUDGE_STEP, 0.0);
                }
                KeyCode::Char('e') => {
                    self.source.nudge(0.0, 0.0, NUDGE_STEP);
                }
                KeyCode::Char('r') => {
                    self.source.nudge(0.0, 0.0, -NUDGE_STEP);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn render(&mut self, dt: f32) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        let faces = self.source.next_frame(dt);
        let results = self
            .overlay
            .process_faces(&faces, &self.mapping, &mut self.renderer);

        let mut first_pose = None;
        let mut rejected = 0;
        for result in results {
            match result {
                Ok(frame) => {
                    first_pose.get_or_insert(frame.pose);
                }
                Err(e) => {
                    warn!("face rejected: {}", e);
                    rejected += 1;
                }
            }
        }

        self.status = match first_pose {
            None if faces.is_empty() => "no face".to_string(),
            None => format!("{} face(s) rejected", rejected),
            Some(pose) => {
                let mut status = format!(
                    "scale {:.2} | pitch {:+.2} yaw {:+.2} roll {:+.2}",
                    pose.scale, pose.rotation.x, pose.rotation.y, pose.rotation.z
                );
                if faces.len() > 1 {
                    status.push_str(&format!(" | {} faces", faces.len()));
                }
                status
            }
        };

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "facefit | FPS: {:.1} | {} | WASD/Arrows=Turn E/R=Roll Space=Pause Q=Quit",
                self.fps, self.status
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Counts from a headless run. `rendered` and `rejected` count faces,
/// `no_face` counts frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessSummary {
    pub rendered: usize,
    pub no_face: usize,
    pub rejected: usize,
    pub triangles: usize,
}

/// Run `frames` frames without a terminal, logging each face's pose.
pub fn run_headless<M: CoordinateMapping + ?Sized>(
    overlay: &FaceOverlay,
    source: &mut dyn LandmarkSource,
    mapping: &M,
    frames: usize,
    dt: f32,
) -> HeadlessSummary {
    let mut summary = HeadlessSummary::default();
    let mut triangles: Vec<RenderedTriangle> = Vec::new();

    for index in 0..frames {
        triangles.clear();
        let faces = source.next_frame(dt);
        if faces.is_empty() {
            summary.no_face += 1;
            info!("frame {}: no face", index);
            continue;
        }

        for (face, result) in overlay
            .process_faces(&faces, mapping, &mut triangles)
            .into_iter()
            .enumerate()
        {
            match result {
                Ok(frame) => {
                    summary.rendered += 1;
                    summary.triangles += frame.stats.triangles;
                    info!(
                        "frame {} face {}: scale {:.3} rotation ({:.3}, {:.3}, {:.3}) translation ({:.1}, {:.1}, {:.1}), {} triangles",
                        index,
                        face,
                        frame.pose.scale,
                        frame.pose.rotation.x,
                        frame.pose.rotation.y,
                        frame.pose.rotation.z,
                        frame.pose.translation.x,
                        frame.pose.translation.y,
                        frame.pose.translation.z,
                        frame.stats.triangles
                    );
                }
                Err(e) => {
                    summary.rejected += 1;
                    warn!("frame {} face {} rejected: {}", index, face, e);
                }
            }
        }
    }

    summary
}

/// Draw a single frame into a fresh renderer, e.g. for snapshots. The first
/// rejected face fails the snapshot.
pub fn render_snapshot(
    overlay: &FaceOverlay,
    source: &mut dyn LandmarkSource,
    width: usize,
    height: usize,
    mirror: bool,
) -> facefit_core::Result<AsciiRenderer> {
    let mut renderer = AsciiRenderer::new(width, height);
    let mapping = ScreenMapping::fit(source.image_size(), renderer.canvas_size(), mirror);
    let faces = source.next_frame(0.0);
    for result in overlay.process_faces(&faces, &mapping, &mut renderer) {
        result?;
    }
    Ok(renderer)
}
