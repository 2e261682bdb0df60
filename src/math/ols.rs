//! Ordinary least squares.
//!
//! The fitter only ever needs a straight line, but the solve goes through a
//! general design-matrix path:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD solves the (tall) system robustly; nalgebra's `QR::solve` is meant
//!   for square systems and panics on non-square matrices.
//! - The time column is centered on its mean before solving. Raw sample
//!   clocks can sit far from zero, and centering keeps the two columns
//!   orthogonal so the slope does not absorb rounding from the intercept.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// A fitted line `y = slope * x + intercept` plus goodness-of-fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination over the fitted samples.
    pub r_squared: f64,
    /// Number of samples the line was fitted to.
    pub n: usize,
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Back-solve the line for `x` at a given `y`.
    ///
    /// Callers must rule out a zero slope first.
    pub fn solve_for_x(&self, y: f64) -> f64 {
        (y - self.intercept) / self.slope
    }
}

/// Unweighted linear regression of `y` on `x`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::InvalidArgument(format!(
            "x has {} values, y has {}",
            x.len(),
            y.len()
        )));
    }

    let n = x.len();
    if n < 2 {
        return Err(FitError::InsufficientData { selected: n, required: 2 });
    }

    let x_mean = x.iter().sum::<f64>() / n as f64;
    let sxx: f64 = x.iter().map(|&v| (v - x_mean) * (v - x_mean)).sum();
    if !(sxx.is_finite() && sxx > 0.0) {
        return Err(FitError::DegenerateFit(
            "all selected samples share a single time coordinate".to_string(),
        ));
    }

    let design = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { x[r] - x_mean });
    let rhs = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &rhs).ok_or_else(|| {
        FitError::DegenerateFit("least-squares system is too ill-conditioned to solve".to_string())
    })?;

    let slope = beta[1];
    let intercept = beta[0] - slope * x_mean;

    let y_mean = y.iter().sum::<f64>() / n as f64;
    let sst: f64 = y.iter().map(|&v| (v - y_mean) * (v - y_mean)).sum();
    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - (slope * xi + intercept);
            r * r
        })
        .sum();
    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };

    Ok(LineFit {
        slope,
        intercept,
        r_squared,
        n,
    })
}
