//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - raw signal: `-` line
//! - fitted segment: `:` line between the two endpoints
//! - endpoints: `X`

use std::io::Write;

use crate::domain::Panel;
use crate::error::AppError;
use crate::plot::{Renderer, axis_range};

const SIGNAL: char = '-';
const FIT: char = ':';
const MARKER: char = 'X';

/// Writes panels as text grids, `columns` panels per line of output.
pub struct AsciiRenderer<W: Write> {
    out: W,
    width: usize,
    height: usize,
    columns: usize,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(out: W, width: usize, height: usize) -> Self {
        Self {
            out,
            width,
            height,
            columns: 2,
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render(&mut self, panels: &[Panel]) -> Result<(), AppError> {
        for (i, chunk) in panels.chunks(self.columns).enumerate() {
            let rendered: Vec<String> = chunk
                .iter()
                .map(|p| render_panel(p, self.width, self.height))
                .collect();
            if i > 0 {
                writeln!(self.out).map_err(write_err)?;
            }
            write!(self.out, "{}", join_side_by_side(&rendered)).map_err(write_err)?;
        }
        self.out.flush().map_err(write_err)
    }
}

fn write_err(e: std::io::Error) -> AppError {
    AppError::new(4, format!("Failed to write plot: {e}"))
}

/// Render one panel: title, range header, then the grid.
pub fn render_panel(panel: &Panel, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (t_min, t_max) = t_range(panel).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(&panel.points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let cells: Vec<(usize, usize)> = panel
        .points
        .iter()
        .map(|&(t, y)| (map_x(t, t_min, t_max, width), map_y(y, y_min, y_max, height)))
        .collect();
    draw_polyline(&mut grid, &cells, SIGNAL);

    if let Some(e) = &panel.endpoints {
        let a = (map_x(e.start.x, t_min, t_max, width), map_y(e.start.y, y_min, y_max, height));
        let b = (map_x(e.end.x, t_min, t_max, width), map_y(e.end.y, y_min, y_max, height));
        draw_line(&mut grid, a, b, FIT, true);
        grid[a.1][a.0] = MARKER;
        grid[b.1][b.0] = MARKER;
    }

    let mut out = String::new();
    out.push_str(&panel.title);
    out.push('\n');
    out.push_str(&format!(
        "Plot: t=[{t_min:.3}, {t_max:.3}]s | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Place multi-line blocks next to each other, padding each to its widest line.
fn join_side_by_side(blocks: &[String]) -> String {
    let split: Vec<Vec<&str>> = blocks.iter().map(|b| b.lines().collect()).collect();
    let widths: Vec<usize> = split
        .iter()
        .map(|lines| lines.iter().map(|l| l.chars().count()).max().unwrap_or(0))
        .collect();
    let n_lines = split.iter().map(Vec::len).max().unwrap_or(0);

    let mut out = String::new();
    for i in 0..n_lines {
        let mut line = String::new();
        for (j, lines) in split.iter().enumerate() {
            let cell = lines.get(i).copied().unwrap_or("");
            line.push_str(cell);
            if j + 1 < split.len() {
                let pad = widths[j] - cell.chars().count();
                line.push_str(&" ".repeat(pad + 3));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Time range covering the samples and both endpoints, so markers stay on-grid.
fn t_range(panel: &Panel) -> Option<(f64, f64)> {
    let endpoint_ts = panel
        .endpoints
        .iter()
        .flat_map(|e| [e.start.x, e.end.x]);
    axis_range(panel.points.iter().map(|&(t, _)| t).chain(endpoint_ts))
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    axis_range(points.iter().map(|&(_, y)| y))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], cells: &[(usize, usize)], ch: char) {
    match cells {
        [] => {}
        [(x, y)] => grid[*y][*x] = ch,
        _ => {
            for w in cells.windows(2) {
                draw_line(grid, w[0], w[1], ch, false);
            }
        }
    }
}

/// Integer line drawing (Bresenham-ish).
///
/// Without `overwrite`, only blank cells are filled.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char, overwrite: bool) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if overwrite || *cell == ' ' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
