//! Numerical plumbing shared by both back-ends.
//!
//! - forward-difference Jacobians of residual functions
//! - termination checking for the minimizer
//! - normal-matrix inversion and standard errors at the solution

use levenberg_marquardt::MinimizationReport;
use nalgebra::{DMatrix, DVector};

use crate::error::FitError;

/// Forward-difference step per parameter: `sqrt(machine epsilon) * max(|p|, 1)`.
fn step_for(p: f64) -> f64 {
    f64::EPSILON.sqrt() * p.abs().max(1.0)
}

/// Forward-difference Jacobian of `residuals_at` around `params`.
///
/// `base` must be `residuals_at(params)`. Returns `None` when a perturbed
/// evaluation fails, which the minimizer treats as a failed step.
pub fn forward_jacobian(
    params: &DVector<f64>,
    base: &DVector<f64>,
    mut residuals_at: impl FnMut(&DVector<f64>) -> Option<DVector<f64>>,
) -> Option<DMatrix<f64>> {
    let m = base.len();
    let n = params.len();
    let mut jacobian = DMatrix::zeros(m, n);
    let mut trial = params.clone();
    for j in 0..n {
        let h = step_for(params[j]);
        trial[j] = params[j] + h;
        let shifted = residuals_at(&trial)?;
        trial[j] = params[j];
        if shifted.len() != m {
            return None;
        }
        for i in 0..m {
            jacobian[(i, j)] = (shifted[i] - base[i]) / h;
        }
    }
    Some(jacobian)
}

/// Turn an unsuccessful minimizer termination into a solver error.
pub fn check_termination(report: &MinimizationReport<f64>) -> Result<(), FitError> {
    if report.termination.was_successful() {
        Ok(())
    } else {
        Err(FitError::solver(format!(
            "minimizer stopped without converging: {:?} after {} function evaluations",
            report.termination, report.number_of_evaluations
        )))
    }
}

/// `(JᵀJ)⁻¹` at the solution, via SVD pseudo-inverse.
pub fn normal_inverse(jacobian: &DMatrix<f64>) -> Result<DMatrix<f64>, FitError> {
    let jtj = jacobian.transpose() * jacobian;
    jtj.svd(true, true)
        .pseudo_inverse(f64::EPSILON)
        .map_err(|e| FitError::solver(format!("covariance inversion failed: {e}")))
}

/// Standard errors for the first `count` parameters:
/// `sqrt(diag(inverse) * residual_variance)`.
///
/// Tiny negative diagonal entries are rounding noise from the pseudo-inverse
/// and clamp to zero.
pub fn std_errors(inverse: &DMatrix<f64>, residual_variance: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| (inverse[(i, i)] * residual_variance).max(0.0).sqrt())
        .collect()
}
