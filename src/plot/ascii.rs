//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of a parameter set against a sweep
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed samples: `o`
//! - model curve: `-` line

use crate::domain::ModelParameters;
use crate::models::compute_sample;

/// Render observed samples and the model curve over the bias range.
pub fn render_ascii_plot(
    bias: &[f64],
    observed: &[f64],
    params: &ModelParameters,
    width: usize,
    height: usize,
) -> String {
    let points: Vec<(f64, f64)> = bias
        .iter()
        .zip(observed)
        .map(|(&b, &y)| (b, y))
        .filter(|(b, y)| b.is_finite() && y.is_finite())
        .collect();

    let (v_min, v_max) = span(points.iter().map(|p| p.0)).unwrap_or((-1.0, 1.0));
    let curve = sample_curve(params, v_min, v_max, width.max(10));

    let (y_min, y_max) = span(points.iter().chain(&curve).map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut canvas = Canvas::new(width, height, (v_min, v_max), (y_min, y_max));

    // Curve first; samples overwrite it.
    let mut prev = None;
    for &(v, y) in &curve {
        let cell = canvas.cell(v, y);
        match prev {
            Some(from) => canvas.line(from, cell, '-'),
            None => canvas.set(cell, '-'),
        }
        prev = Some(cell);
    }
    for &(b, y) in &points {
        let cell = canvas.cell(b, y);
        canvas.set(cell, 'o');
    }

    format!(
        "Plot: bias=[{v_min:.3}, {v_max:.3}] V | i_beem=[{y_min:.3e}, {y_max:.3e}]\n{}",
        canvas.render()
    )
}

/// Sample the model on an even grid; non-finite values (e.g. at `V = 0`) are dropped.
fn sample_curve(params: &ModelParameters, v_min: f64, v_max: f64, n: usize) -> Vec<(f64, f64)> {
    let step = (v_max - v_min) / (n as f64 - 1.0);
    (0..n)
        .map(|i| v_min + i as f64 * step)
        .map(|v| (v, compute_sample(v, params.exponent, params)))
        .filter(|(_, y)| y.is_finite())
        .collect()
}

/// `(min, max)` of the values, or `None` when empty or degenerate.
fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (lo.is_finite() && hi.is_finite() && hi > lo).then_some((lo, hi))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = ((max - min).abs() * frac).max(1e-30);
    (min - pad, max + pad)
}

/// Fixed-size character grid with data-space coordinates; row 0 is the top.
struct Canvas {
    cells: Vec<Vec<char>>,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Canvas {
    fn new(width: usize, height: usize, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            cells: vec![vec![' '; width.max(10)]; height.max(5)],
            x_range,
            y_range,
        }
    }

    fn width(&self) -> usize {
        self.cells[0].len()
    }

    fn height(&self) -> usize {
        self.cells.len()
    }

    /// Grid cell `(col, row)` for a data point, clamped to the canvas.
    fn cell(&self, x: f64, y: f64) -> (usize, usize) {
        let fx = ((x - self.x_range.0) / (self.x_range.1 - self.x_range.0)).clamp(0.0, 1.0);
        let fy = ((y - self.y_range.0) / (self.y_range.1 - self.y_range.0)).clamp(0.0, 1.0);
        let last_col = (self.width() - 1) as f64;
        let last_row = (self.height() - 1) as f64;
        ((fx * last_col).round() as usize, (last_row - fy * last_row).round() as usize)
    }

    fn set(&mut self, (col, row): (usize, usize), ch: char) {
        self.cells[row][col] = ch;
    }

    /// Bresenham line; only fills blank cells.
    fn line(&mut self, from: (usize, usize), to: (usize, usize), ch: char) {
        let (mut x, mut y) = (from.0 as isize, from.1 as isize);
        let (x1, y1) = (to.0 as isize, to.1 as isize);

        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let step_x = if x < x1 { 1 } else { -1 };
        let step_y = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            // Endpoints come from `cell`, so every visited point is in bounds.
            let slot = &mut self.cells[y as usize][x as usize];
            if *slot == ' ' {
                *slot = ch;
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += step_x;
            }
            if e2 <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for row in &self.cells {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}
