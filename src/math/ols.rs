//! Ordinary least squares for the per-metric trend fits.
//!
//! Forecasting fits tiny two-parameter lines (`year -> value`), so the
//! design matrix is tall and skinny. We solve via SVD:
//!
//! - it stays robust when years are nearly collinear with the intercept
//!   column (consecutive integers around 2020 are exactly that)
//! - nalgebra's `QR::solve` targets square systems and would panic here
//!
//! Progressively looser tolerances are tried before giving up, mirroring
//! how ill-conditioned inputs are handled elsewhere in this codebase's
//! lineage.

use nalgebra::{DMatrix, DVector};

/// A fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub intercept: f64,
    pub slope: f64,
}

impl Line {
    /// Evaluate the line at `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = intercept + slope * x` by OLS over paired observations.
///
/// Requires at least two observations; returns `None` for degenerate input
/// (mismatched lengths, too few points, non-finite values, or an
/// unsolvable system).
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<Line> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return None;
    }

    let n = xs.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &x) in xs.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = x;
    }
    let y = DVector::from_row_slice(ys);

    let beta = solve_least_squares(&design, &y)?;
    Some(Line {
        intercept: beta[0],
        slope: beta[1],
    })
}

/// Coefficient of determination of `line` against the observations.
///
/// A zero-variance series is defined as a perfect fit (`R^2 = 1.0`): the
/// fitted line through a constant history reproduces it exactly, and the
/// definition sidesteps the 0/0 in the usual formula. This is a policy
/// choice, not an accident.
pub fn r_squared(xs: &[f64], ys: &[f64], line: &Line) -> f64 {
    let n = ys.len() as f64;
    if n == 0.0 {
        return 1.0;
    }

    let mean = ys.iter().sum::<f64>() / n;
    let ss_tot: f64 = ys.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 1.0;
    }

    let ss_res: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(&x, &y)| (y - line.at(x)).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_exact_trend_over_years() {
        let xs = [2021.0, 2022.0, 2023.0];
        let ys = [500.0, 510.0, 520.0];

        let line = fit_line(&xs, &ys).unwrap();
        assert!((line.slope - 10.0).abs() < 1e-6);
        assert!((line.at(2026.0) - 550.0).abs() < 1e-6);
        assert!((r_squared(&xs, &ys, &line) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fit_line_rejects_degenerate_input() {
        assert!(fit_line(&[2021.0], &[500.0]).is_none());
        assert!(fit_line(&[2021.0, 2022.0], &[500.0]).is_none());
        assert!(fit_line(&[2021.0, f64::NAN], &[500.0, 510.0]).is_none());
    }

    #[test]
    fn r_squared_is_one_for_constant_history() {
        let xs = [2021.0, 2022.0, 2023.0];
        let ys = [600.0, 600.0, 600.0];
        let line = fit_line(&xs, &ys).unwrap();
        assert_eq!(r_squared(&xs, &ys, &line), 1.0);
    }

    #[test]
    fn r_squared_drops_for_noisy_history() {
        let xs = [2021.0, 2022.0, 2023.0, 2024.0];
        let ys = [500.0, 540.0, 490.0, 530.0];
        let line = fit_line(&xs, &ys).unwrap();
        let r2 = r_squared(&xs, &ys, &line);
        assert!(r2 < 1.0);
    }
}
