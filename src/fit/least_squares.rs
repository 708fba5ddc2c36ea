//! Plain least-squares back-end.
//!
//! Minimizes `Σ ((f(x_i, params) - y_i) / dy_i)²` over the parameters, with
//! unit weights when no y uncertainties are given. x uncertainties play no
//! role here; the ODR back-end is the one that folds them in.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

use super::BackendFit;
use crate::domain::Observations;
use crate::error::FitError;
use crate::fit::{numeric, stats};
use crate::model::ModelFunction;

/// Weighted residuals of a model against fixed data.
struct Residuals<'a> {
    model: &'a ModelFunction,
    x: &'a [f64],
    y: &'a [f64],
    /// `1/dy` per point, absent for unit weights.
    weights: Option<Vec<f64>>,
    params: DVector<f64>,
}

impl Residuals<'_> {
    /// Residual vector at `p`, `None` when the model evaluates non-finite.
    fn residuals_for(&self, p: &DVector<f64>) -> Option<DVector<f64>> {
        let params = p.as_slice();
        let mut out = DVector::zeros(self.x.len());
        for i in 0..self.x.len() {
            let f = self.model.eval(params, self.x[i]);
            let w = self.weights.as_ref().map_or(1.0, |w| w[i]);
            let r = w * (f - self.y[i]);
            if !r.is_finite() {
                return None;
            }
            out[i] = r;
        }
        Some(out)
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for Residuals<'_> {
    type ParameterStorage = Owned<f64, Dyn>;
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;

    fn set_params(&mut self, params: &DVector<f64>) {
        self.params.copy_from(params);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.residuals_for(&self.params)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let base = self.residuals_for(&self.params)?;
        numeric::forward_jacobian(&self.params, &base, |p| self.residuals_for(p))
    }
}

/// Fit `model` to `(x, y)` by weighted least squares from `initial_params`.
///
/// Standard errors follow the usual recipe: the diagonal of `(JᵀJ)⁻¹` scaled
/// by `chi² / dof`, so they are meaningful even when `dy` is only known up to
/// a common factor.
pub fn fit_least_squares(
    model: &ModelFunction,
    x: &[f64],
    y: &[f64],
    dy: Option<&[f64]>,
    initial_params: &[f64],
) -> Result<BackendFit, FitError> {
    Observations::check_parallel(x, y, None, dy)?;
    let n = x.len();
    let n_params = initial_params.len();
    let dof = n.saturating_sub(n_params);
    if dof == 0 {
        return Err(FitError::degeneracy(format!(
            "no degrees of freedom: {n} points for {n_params} parameters"
        )));
    }

    let problem = Residuals {
        model,
        x,
        y,
        weights: dy.map(|s| s.iter().map(|v| 1.0 / v).collect()),
        params: DVector::from_column_slice(initial_params),
    };
    let (problem, report) = LevenbergMarquardt::new().minimize(problem);
    numeric::check_termination(&report)?;
    let solution = problem.params();

    let raw: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| yi - model.eval(solution.as_slice(), xi))
        .collect();
    let chi_square = stats::chi_square(&raw, dy);

    let base = problem
        .residuals_for(&solution)
        .ok_or_else(|| FitError::solver("model evaluation failed at the solution"))?;
    let jacobian = numeric::forward_jacobian(&solution, &base, |p| problem.residuals_for(p))
        .ok_or_else(|| FitError::solver("Jacobian evaluation failed at the solution"))?;
    let inverse = numeric::normal_inverse(&jacobian)?;
    let residual_variance = chi_square / dof as f64;
    let std_errors = numeric::std_errors(&inverse, residual_variance, n_params);

    Ok(BackendFit {
        params: solution.as_slice().to_vec(),
        std_errors,
        chi_square,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;

    fn line() -> ModelFunction {
        ModelFunction::least_squares("line", 2, |x, p| p[0] * x + p[1])
    }

    const X: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
    const Y: [f64; 4] = [2.1, 3.9, 6.2, 7.8];

    #[test]
    fn recovers_the_closed_form_line_fit() {
        let fit = fit_least_squares(&line(), &X, &Y, None, &[1.0, 0.0]).unwrap();
        // Closed-form slope/intercept for these points: 1.94 and 0.15.
        assert_relative_eq!(fit.params[0], 1.94, epsilon = 1e-6);
        assert_relative_eq!(fit.params[1], 0.15, epsilon = 1e-6);
        assert_relative_eq!(fit.chi_square, 0.082, epsilon = 1e-6);
    }

    #[test]
    fn std_errors_match_the_hand_computed_covariance() {
        let fit = fit_least_squares(&line(), &X, &Y, None, &[1.0, 0.0]).unwrap();
        // (JᵀJ)⁻¹ diag = [0.2, 1.5]; residual variance = 0.082 / 2 = 0.041.
        assert_relative_eq!(fit.std_errors[0], (0.2_f64 * 0.041).sqrt(), epsilon = 1e-5);
        assert_relative_eq!(fit.std_errors[1], (1.5_f64 * 0.041).sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn y_uncertainties_weight_the_chi_square() {
        let dy = [0.1; 4];
        let fit = fit_least_squares(&line(), &X, &Y, Some(&dy), &[1.0, 0.0]).unwrap();
        assert_relative_eq!(fit.params[0], 1.94, epsilon = 1e-6);
        assert_relative_eq!(fit.chi_square, 8.2, epsilon = 1e-5);
    }

    #[test]
    fn uniform_uncertainties_leave_std_errors_unchanged() {
        // With chi²/dof scaling, a common dy factor cancels out of the errors.
        let plain = fit_least_squares(&line(), &X, &Y, None, &[1.0, 0.0]).unwrap();
        let dy = [0.1; 4];
        let weighted = fit_least_squares(&line(), &X, &Y, Some(&dy), &[1.0, 0.0]).unwrap();
        assert_relative_eq!(plain.std_errors[0], weighted.std_errors[0], epsilon = 1e-5);
        assert_relative_eq!(plain.std_errors[1], weighted.std_errors[1], epsilon = 1e-5);
    }

    #[test]
    fn nonlinear_model_converges_from_a_rough_start() {
        // y = 3 * exp(0.5 x), exact data, so the fit should land on it.
        let model = ModelFunction::least_squares("growth", 2, |x, p| p[0] * (p[1] * x).exp());
        let x: Vec<f64> = (0..8).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&xi| 3.0 * (0.5 * xi).exp()).collect();
        let fit = fit_least_squares(&model, &x, &y, None, &[1.0, 1.0]).unwrap();
        assert_relative_eq!(fit.params[0], 3.0, epsilon = 1e-6);
        assert_relative_eq!(fit.params[1], 0.5, epsilon = 1e-6);
        assert!(fit.chi_square < 1e-10);
    }

    #[test]
    fn exact_parameter_count_is_rejected() {
        let err = fit_least_squares(&line(), &[1.0, 2.0], &[1.0, 2.0], None, &[1.0, 0.0])
            .unwrap_err();
        assert!(err.message().contains("no degrees of freedom"));
    }

    #[test]
    fn mismatched_input_lengths_are_rejected() {
        let err = fit_least_squares(&line(), &X, &Y[..3], None, &[1.0, 0.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert!(err.message().contains("y column has 3 values but x has 4"));

        let dy = [0.1; 2];
        let err = fit_least_squares(&line(), &X, &Y, Some(&dy), &[1.0, 0.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert!(err.message().contains("dy column has 2 values but x has 4"));
    }
}
