/// ASCII wireframe sink for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use facefit_core::{DepthRange, RenderedTriangle, TriangleSink};
use nalgebra::Point3;
use std::io::Write;

/// Character ramp for depth shading (far to near)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 0.5;

/// Upper bound on samples per edge, for wildly off-screen geometry
const MAX_LINE_STEPS: f32 = 4096.0;

/// Draws triangle outlines into a character grid with a depth buffer.
///
/// Incoming x/y are canvas units; one canvas unit is one column wide and
/// `CELL_ASPECT` rows tall.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    /// Canvas size the landmark source should produce coordinates in
    pub fn canvas_size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32 / CELL_ASPECT)
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.char_buffer[y * self.width + x])
    }

    pub fn filled_cells(&self) -> usize {
        self.char_buffer.iter().filter(|c| **c != ' ').count()
    }

    fn shade(z: f32, depth: Option<&DepthRange>) -> char {
        // Closer to the camera means smaller z
        let nearness = depth.map_or(1.0, |range| 1.0 - range.normalize(z));
        let index = (nearness * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
        LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
    }

    /// Rasterize one edge with a DDA walk, keeping the nearest glyph per cell.
    fn draw_line(&mut self, from: Point3<f32>, to: Point3<f32>, character: char) {
        let (x0, y0) = (from.x, from.y * CELL_ASPECT);
        let (x1, y1) = (to.x, to.y * CELL_ASPECT);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().clamp(1.0, MAX_LINE_STEPS) as usize;

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = (x0 + (x1 - x0) * t).round();
            let y = (y0 + (y1 - y0) * t).round();
            if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                continue;
            }
            let depth = from.z + (to.z - from.z) * t;
            let idx = y as usize * self.width + x as usize;
            if depth < self.depth_buffer[idx] {
                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = character;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl TriangleSink for AsciiRenderer {
    fn draw_triangle(&mut self, triangle: &RenderedTriangle, depth: Option<&DepthRange>) {
        for (from, to) in triangle.edges() {
            let character = Self::shade((from.z + to.z) / 2.0, depth);
            self.draw_line(from, to, character);
        }
    }
}
