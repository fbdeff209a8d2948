//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - `o` for each (fitted, residual) pair
//! - `-` for the zero-residual line
//!
//! A fit with no structure left in it shows points scattered evenly around
//! the zero line; a funnel opening to the right is the picture of residual
//! spread growing with the fitted value.

use crate::domain::LineFit;

/// Render the fitted-versus-residual scatter for one model.
pub fn render_residual_plot(fit: &LineFit, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (f_min, f_max) = fitted_range(fit).unwrap_or((0.0, 1.0));

    // The zero line is always part of the picture, so the y-range covers the
    // residuals and zero.
    let mut r_min = 0.0_f64;
    let mut r_max = 0.0_f64;
    for &r in &fit.residuals {
        r_min = r_min.min(r);
        r_max = r_max.max(r);
    }
    let (y_min, y_max) = pad_range(r_min, r_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the zero line first so points can overlay it.
    draw_curve(
        &mut grid,
        &[(f_min, 0.0), (f_max, 0.0)],
        f_min,
        f_max,
        y_min,
        y_max,
    );

    for (&f, &r) in fit.fitted.iter().zip(&fit.residuals) {
        let x = map_x(f, f_min, f_max, width);
        let y = map_y(r, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: fitted=[{f_min:.3}, {f_max:.3}] | residual=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn fitted_range(fit: &LineFit) -> Option<(f64, f64)> {
    let mut min_f = f64::INFINITY;
    let mut max_f = f64::NEG_INFINITY;
    for &f in &fit.fitted {
        min_f = min_f.min(f);
        max_f = max_f.max(f);
    }
    if min_f.is_finite() && max_f.is_finite() && max_f > min_f {
        Some((min_f, max_f))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(f: f64, f_min: f64, f_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((f - f_min) / (f_max - f_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(r: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((r - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    f_min: f64,
    f_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(f, r) in curve {
        let x = map_x(f, f_min, f_max, width);
        let yy = map_y(r, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoefEstimate, FitQuality};

    fn fit_with(fitted: Vec<f64>, residuals: Vec<f64>) -> LineFit {
        let coef = CoefEstimate {
            value: 0.0,
            std_error: f64::NAN,
            t_value: f64::NAN,
            p_value: f64::NAN,
        };
        let n = fitted.len();
        LineFit {
            intercept: coef,
            slope: coef,
            fitted,
            residuals,
            quality: FitQuality {
                n,
                df: n.saturating_sub(2),
                sse: 0.0,
                rmse: 0.0,
                r_squared: 1.0,
            },
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let fit = fit_with(vec![1.0, 10.0], vec![0.0, 10.0]);
        let txt = render_residual_plot(&fit, 10, 5);
        let expected = concat!(
            "Plot: fitted=[1.000, 10.000] | residual=[-0.50, 10.50]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn every_point_lands_on_the_grid() {
        let fit = fit_with(vec![1.0, 2.0, 3.0, 4.0], vec![-1.0, 1.0, -1.0, 1.0]);
        let txt = render_residual_plot(&fit, 20, 9);
        // The header line spells "Plot", so count markers over the grid rows only.
        let points = txt
            .lines()
            .skip(1)
            .flat_map(|line| line.chars())
            .filter(|c| *c == 'o')
            .count();
        assert_eq!(points, 4);
        assert!(txt.contains('-'));
    }

    #[test]
    fn grid_dimensions_match_the_request() {
        let fit = fit_with(vec![5.0, 6.0, 7.0], vec![0.3, -0.2, 0.1]);
        let txt = render_residual_plot(&fit, 40, 12);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13);
        for row in &lines[1..] {
            assert_eq!(row.chars().count(), 40);
        }
    }
}
