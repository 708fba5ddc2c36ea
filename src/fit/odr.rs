//! Orthogonal distance regression back-end.
//!
//! Treats the x values as uncertain too: alongside the model parameters, the
//! minimizer adjusts one shift `δ_i` per point and pays for it in units of
//! `dx_i`. The unknown vector is `[params; shifts]` and the residual vector
//! stacks `(f(params, x_i + δ_i) - y_i) / dy_i` on top of `δ_i / dx_i`.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

use super::BackendFit;
use crate::domain::Observations;
use crate::error::FitError;
use crate::fit::numeric;
use crate::model::ModelFunction;

/// Residuals of the augmented problem over `[params; shifts]`.
struct OdrResiduals<'a> {
    model: &'a ModelFunction,
    x: &'a [f64],
    y: &'a [f64],
    dx: &'a [f64],
    /// `1/dy` per point, absent for unit weights.
    weights_y: Option<Vec<f64>>,
    n_params: usize,
    state: DVector<f64>,
}

impl OdrResiduals<'_> {
    fn residuals_for(&self, v: &DVector<f64>) -> Option<DVector<f64>> {
        let n = self.x.len();
        let params = &v.as_slice()[..self.n_params];
        let mut out = DVector::zeros(2 * n);
        for i in 0..n {
            let shift = v[self.n_params + i];
            let f = self.model.eval(params, self.x[i] + shift);
            let w = self.weights_y.as_ref().map_or(1.0, |w| w[i]);
            let r = w * (f - self.y[i]);
            // A huge trial shift can overflow the penalty even when the
            // model value stays finite.
            let penalty = shift / self.dx[i];
            if !r.is_finite() || !penalty.is_finite() {
                return None;
            }
            out[i] = r;
            out[n + i] = penalty;
        }
        Some(out)
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for OdrResiduals<'_> {
    type ParameterStorage = Owned<f64, Dyn>;
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;

    fn set_params(&mut self, state: &DVector<f64>) {
        self.state.copy_from(state);
    }

    fn params(&self) -> DVector<f64> {
        self.state.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.residuals_for(&self.state)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let base = self.residuals_for(&self.state)?;
        numeric::forward_jacobian(&self.state, &base, |v| self.residuals_for(v))
    }
}

/// Fit `model` to `(x ± dx, y ± dy)` by orthogonal distance regression.
///
/// The reported chi-square is the full objective, shift penalties included.
/// Standard errors come from the parameter block of the inverted augmented
/// normal matrix, scaled by `chi² / dof` with `dof = n - n_params` (the
/// shifts do not count as free parameters there).
pub fn fit_odr(
    model: &ModelFunction,
    x: &[f64],
    y: &[f64],
    dx: &[f64],
    dy: Option<&[f64]>,
    initial_params: &[f64],
) -> Result<BackendFit, FitError> {
    Observations::check_parallel(x, y, Some(dx), dy)?;
    let n = x.len();
    let n_params = initial_params.len();
    let dof = n.saturating_sub(n_params);
    if dof == 0 {
        return Err(FitError::degeneracy(format!(
            "no degrees of freedom: {n} points for {n_params} parameters"
        )));
    }

    // Parameters first, then one zero-initialized shift per point.
    let state = DVector::from_fn(n_params + n, |i, _| {
        if i < n_params { initial_params[i] } else { 0.0 }
    });
    let problem = OdrResiduals {
        model,
        x,
        y,
        dx,
        weights_y: dy.map(|s| s.iter().map(|v| 1.0 / v).collect()),
        n_params,
        state,
    };
    let (problem, report) = LevenbergMarquardt::new().minimize(problem);
    numeric::check_termination(&report)?;
    let solution = problem.params();

    let base = problem
        .residuals_for(&solution)
        .ok_or_else(|| FitError::solver("model evaluation failed at the solution"))?;
    let chi_square = base.norm_squared();
    let jacobian = numeric::forward_jacobian(&solution, &base, |v| problem.residuals_for(v))
        .ok_or_else(|| FitError::solver("Jacobian evaluation failed at the solution"))?;
    let inverse = numeric::normal_inverse(&jacobian)?;
    let residual_variance = chi_square / dof as f64;
    let std_errors = numeric::std_errors(&inverse, residual_variance, n_params);

    Ok(BackendFit {
        params: solution.as_slice()[..n_params].to_vec(),
        std_errors,
        chi_square,
    })
}
