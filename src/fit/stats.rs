//! Goodness-of-fit statistics.
//!
//! Chi-square is computed from raw residuals, weighted by `1/dy` when y
//! uncertainties are present. The p-value is the chi-square survival function
//! at the observed statistic.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::domain::FitStats;
use crate::error::FitError;

/// Chi-square of raw residuals `y - f(x)`, weighted when `dy` is given:
/// unweighted `Σ r²`, weighted `Σ (r/dy)²`.
pub fn chi_square(residuals: &[f64], dy: Option<&[f64]>) -> f64 {
    match dy {
        Some(sigma) => residuals
            .iter()
            .zip(sigma)
            .map(|(r, s)| (r / s).powi(2))
            .sum(),
        None => residuals.iter().map(|r| r * r).sum(),
    }
}

/// Degrees of freedom, p-value and reduced chi-square for a completed fit.
///
/// Fails when the fit leaves no degrees of freedom: with `n_used <= n_params`
/// every statistic here would divide by zero or worse.
pub fn goodness_of_fit(
    chi_square: f64,
    n_used: usize,
    n_params: usize,
) -> Result<FitStats, FitError> {
    if n_used <= n_params {
        return Err(FitError::degeneracy(format!(
            "no degrees of freedom: {n_used} points in range for {n_params} parameters"
        )));
    }
    let dof = n_used - n_params;
    let dist = ChiSquared::new(dof as f64)
        .map_err(|e| FitError::solver(format!("chi-square distribution: {e}")))?;
    let p_value = dist.sf(chi_square);
    Ok(FitStats {
        chi_square,
        degrees_of_freedom: dof,
        p_value,
        reduced_chi_square: chi_square / dof as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unweighted_chi_square_sums_squared_residuals() {
        let chi2 = chi_square(&[1.0, -2.0, 0.5], None);
        assert_relative_eq!(chi2, 1.0 + 4.0 + 0.25);
    }

    #[test]
    fn weighted_chi_square_divides_by_sigma() {
        let chi2 = chi_square(&[1.0, -2.0], Some(&[0.5, 2.0]));
        assert_relative_eq!(chi2, 4.0 + 1.0);
    }

    #[test]
    fn degrees_of_freedom_subtract_parameters() {
        let stats = goodness_of_fit(3.0, 10, 3).unwrap();
        assert_eq!(stats.degrees_of_freedom, 7);
        assert_relative_eq!(stats.reduced_chi_square, 3.0 / 7.0);
    }

    #[test]
    fn zero_chi_square_has_p_value_one() {
        let stats = goodness_of_fit(0.0, 5, 2).unwrap();
        assert_relative_eq!(stats.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn huge_chi_square_has_vanishing_p_value() {
        let stats = goodness_of_fit(1e4, 12, 2).unwrap();
        assert!(stats.p_value < 1e-12, "p = {}", stats.p_value);
    }

    #[test]
    fn p_value_matches_survival_function_for_two_dof() {
        // For dof = 2 the survival function is exp(-x/2).
        let stats = goodness_of_fit(3.0, 4, 2).unwrap();
        assert_relative_eq!(stats.p_value, (-1.5f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn too_few_points_is_a_degeneracy_error() {
        let err = goodness_of_fit(1.0, 3, 3).unwrap_err();
        assert!(err.message().contains("no degrees of freedom"));
    }
}
