/// ASCII rasterizer that replays draw commands onto terminal cells
use buquy_core::{Color, DrawCommand};
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Logical pixels per terminal row; cells are roughly twice as tall as wide
pub const PIXELS_PER_ROW: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Color,
}

/// Character grid painted in command order, without a depth buffer
pub struct AsciiSurface {
    width: usize,
    height: usize,
    background: Color,
    cells: Vec<Cell>,
}

impl AsciiSurface {
    pub fn new(width: usize, height: usize) -> Self {
        let background = Color::BLACK;
        Self {
            width,
            height,
            background,
            cells: vec![blank(background); width * height],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![blank(self.background); width * height];
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Logical pixel size the scene should project into
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32 * PIXELS_PER_ROW)
    }

    pub fn clear(&mut self, background: Color) {
        self.background = background;
        self.cells.fill(blank(background));
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x].ch)
    }

    pub fn apply(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Clear(color) => self.clear(*color),
            DrawCommand::Point { at, color, size } => self.disc(at, size / 2.0, *color),
            DrawCommand::Line { from, to, color, .. } => self.line(from, to, *color),
            DrawCommand::Polygon {
                points,
                fill,
                outline,
            } => {
                if let Some(fill) = fill {
                    for k in 1..points.len().saturating_sub(1) {
                        let triangle = [points[0], points[k], points[k + 1]];
                        self.rasterize_triangle(&triangle, &[*fill; 3]);
                    }
                }
                if let Some((color, _)) = outline {
                    for (i, from) in points.iter().enumerate() {
                        let to = &points[(i + 1) % points.len()];
                        self.line(from, to, *color);
                    }
                }
            }
            DrawCommand::ShadedTriangle { points, colors } => self.rasterize_triangle(points, colors),
            DrawCommand::Disc {
                center,
                radius,
                color,
            } => self.disc(center, *radius, *color),
            DrawCommand::Label { at, text, color } => self.label(at, text, *color),
        }
    }

    fn cell_of(&self, p: &Point2<f32>) -> Option<(usize, usize)> {
        let x = p.x.floor();
        let y = (p.y / PIXELS_PER_ROW as f32).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    fn put(&mut self, x: usize, y: usize, ch: char, fg: Color) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = Cell { ch, fg };
        }
    }

    fn rasterize_triangle(&mut self, points: &[Point2<f32>; 3], colors: &[Color; 3]) {
        let [v0, v1, v2] = *points;
        let rows = PIXELS_PER_ROW as f32;

        // Bounding box in cells
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = (v0.y.min(v1.y).min(v2.y) / rows).floor() as i32;
        let max_y = (v0.y.max(v1.y).max(v2.y) / rows).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point2::new(x as f32 + 0.5, (y as f32 + 0.5) * rows);
                if let Some((w0, w1, w2)) = barycentric(&v0, &v1, &v2, &p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let color = blend(colors, [w0, w1, w2]);
                        self.put(x as usize, y as usize, ramp(color.luminance()), color);
                    }
                }
            }
        }
    }

    /// Step through the part of the segment that lies on the surface, in cell units
    fn line(&mut self, from: &Point2<f32>, to: &Point2<f32>, color: Color) {
        let rows = PIXELS_PER_ROW as f64;
        let start = (from.x as f64, from.y as f64 / rows);
        let end = (to.x as f64, to.y as f64 / rows);
        if ![start.0, start.1, end.0, end.1].iter().all(|v| v.is_finite()) {
            return;
        }
        let Some((t0, t1)) = clip_segment(start, end, self.width as f64, self.height as f64) else {
            return;
        };

        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let ch = line_char(dx as f32, dy as f32);
        let a = (start.0 + dx * t0, start.1 + dy * t0);
        let b = (start.0 + dx * t1, start.1 + dy * t1);
        let (sx, sy) = (b.0 - a.0, b.1 - a.1);
        // Strictly less than one cell per step so no cell is skipped
        let steps = sx.abs().max(sy.abs()).ceil() as usize + 1;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let (x, y) = ((a.0 + sx * t).floor(), (a.1 + sy * t).floor());
            if x >= 0.0 && y >= 0.0 {
                self.put(x as usize, y as usize, ch, color);
            }
        }
    }

    fn disc(&mut self, center: &Point2<f32>, radius: f32, color: Color) {
        let rows = PIXELS_PER_ROW as f32;
        let r = radius.max(0.5);
        let (cx, cy) = (center.x, center.y / rows);
        let (ry, ch) = (r / rows, ramp(color.luminance()));

        let min_y = (cy - ry).floor().max(0.0) as usize;
        let max_y = ((cy + ry).ceil().max(0.0) as usize).min(self.height);
        let min_x = (cx - r).floor().max(0.0) as usize;
        let max_x = ((cx + r).ceil().max(0.0) as usize).min(self.width);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5 - cx;
                let py = (y as f32 + 0.5 - cy) * rows;
                if px * px + py * py <= r * r {
                    self.put(x, y, ch, color);
                }
            }
        }
        // Always mark the centre so small dots stay visible
        if let Some((x, y)) = self.cell_of(center) {
            self.put(x, y, ch, color);
        }
    }

    fn label(&mut self, at: &Point2<f32>, text: &str, color: Color) {
        let Some((x, y)) = self.cell_of(at) else {
            return;
        };
        for (i, ch) in text.chars().enumerate() {
            self.put(x + i, y, ch, color);
        }
    }

    /// Plain text rendering, one line per row
    pub fn to_text(&self) -> String {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|c| c.ch).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.queue(SetBackgroundColor(term_color(self.background)))?;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            let mut current = None;
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                if current != Some(cell.fg) {
                    writer.queue(SetForegroundColor(term_color(cell.fg)))?;
                    current = Some(cell.fg);
                }
                writer.queue(Print(cell.ch))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn blank(background: Color) -> Cell {
    Cell {
        ch: ' ',
        fg: background,
    }
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Map a luminance in `[0, 1]` to a ramp character, never blank
fn ramp(luminance: f32) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = (luminance.clamp(0.0, 1.0) * last as f32).round() as usize;
    LUMINOSITY_RAMP[index.clamp(1, last)]
}

/// Liang-Barsky: parameter range of `from -> to` inside `[0, width] x [0, height]`
fn clip_segment(from: (f64, f64), to: (f64, f64), width: f64, height: f64) -> Option<(f64, f64)> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, from.0), (dx, width - from.0), (-dy, from.1), (dy, height - from.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }
    (t0 <= t1).then_some((t0, t1))
}

fn line_char(dx: f32, dy: f32) -> char {
    if dx.abs() > 2.0 * dy.abs() {
        '-'
    } else if dy.abs() > 2.0 * dx.abs() {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

fn blend(colors: &[Color; 3], weights: [f32; 3]) -> Color {
    let channel = |f: fn(&Color) -> u8| {
        let v: f32 = colors.iter().zip(weights).map(|(c, w)| f(c) as f32 * w).sum();
        v.round().clamp(0.0, 255.0) as u8
    };
    Color::rgb(channel(|c| c.r), channel(|c| c.g), channel(|c| c.b))
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: &Point2<f32>,
    v1: &Point2<f32>,
    v2: &Point2<f32>,
    p: &Point2<f32>,
) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
