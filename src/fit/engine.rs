//! Fit orchestration.
//!
//! The engine owns the path from raw table to finished outcome:
//!
//! - validate the configuration before touching any data
//! - extract and coerce the selected columns
//! - apply the x-range to observations and curve grid alike
//! - dispatch to the matching back-end
//! - assemble statistics, residuals and plottable curves
//!
//! Back-ends only ever see clean parallel arrays; every rejection a user can
//! trigger happens here first.

use log::debug;

use crate::domain::{Curve, DataTable, FitConfig, FitOutcome, Method, Observations, ParamEstimate};
use crate::error::FitError;
use crate::fit::{fit_least_squares, fit_odr, selection, stats};
use crate::model::ModelFunction;

/// Samples per rendered model curve, before range masking.
pub const CURVE_GRID_POINTS: usize = 1000;

/// Validated fit inputs, ready to run against any compatible model.
///
/// Construction does all configuration and data checks; `fit` can then be
/// called repeatedly (e.g. with revised models) without re-extracting.
#[derive(Debug, Clone)]
pub struct FitEngine {
    observations: Observations,
    config: FitConfig,
}

impl FitEngine {
    pub fn new(table: &DataTable, config: FitConfig) -> Result<Self, FitError> {
        check_config(&config)?;
        let observations = extract(table, &config)?;
        observations.check_lengths()?;
        Ok(Self {
            observations,
            config,
        })
    }

    /// The extracted (not yet range-selected) observation arrays.
    pub fn observations(&self) -> &Observations {
        &self.observations
    }

    /// Run the configured fit against `model`.
    pub fn fit(&self, model: &ModelFunction) -> Result<FitOutcome, FitError> {
        model.check_method(self.config.method)?;
        model.check_params(&self.config.initial_params)?;

        let used = selection::select(&self.observations, self.config.x_range.as_ref());
        let n_params = self.config.initial_params.len();
        debug!(
            "fitting '{}' by {} to {} of {} points",
            model.label(),
            self.config.method.display_name(),
            used.len(),
            self.observations.len()
        );
        if used.len() <= n_params {
            return Err(FitError::degeneracy(format!(
                "no degrees of freedom: {} points in range for {n_params} parameters",
                used.len()
            )));
        }

        let backend = match self.config.method {
            Method::Odr => {
                let dx = used.dx.as_deref().ok_or_else(|| {
                    FitError::configuration("ODR needs x uncertainties but no dx data was extracted")
                })?;
                fit_odr(
                    model,
                    &used.x,
                    &used.y,
                    dx,
                    used.dy.as_deref(),
                    &self.config.initial_params,
                )?
            }
            Method::LeastSquares => fit_least_squares(
                model,
                &used.x,
                &used.y,
                used.dy.as_deref(),
                &self.config.initial_params,
            )?,
        };

        let stats = stats::goodness_of_fit(backend.chi_square, used.len(), n_params)?;
        let residuals: Vec<f64> = used
            .x
            .iter()
            .zip(&used.y)
            .map(|(&xi, &yi)| yi - model.eval(&backend.params, xi))
            .collect();
        let estimates: Vec<ParamEstimate> = backend
            .params
            .iter()
            .zip(&backend.std_errors)
            .map(|(&value, &std_error)| ParamEstimate { value, std_error })
            .collect();

        // Curves span the full observed extent, then honor the same mask as
        // the data, so a windowed fit is drawn only over its own window.
        let lo = self.observations.x.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = self
            .observations
            .x
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let mut grid = sample_grid(lo, hi, CURVE_GRID_POINTS);
        if let Some(range) = &self.config.x_range {
            let mask = selection::range_mask(&grid, range);
            grid = selection::filter_by_mask(&grid, &mask);
        }
        let fitted_curve = curve_on(&grid, model, &backend.params);
        let initial_curve = curve_on(&grid, model, &self.config.initial_params);

        debug!(
            "fit complete: chi² = {:.6}, dof = {}, p = {:.6}",
            stats.chi_square, stats.degrees_of_freedom, stats.p_value
        );

        Ok(FitOutcome {
            method: self.config.method,
            estimates,
            stats,
            observations: used,
            residuals,
            fitted_curve,
            initial_curve,
            initial_params: self.config.initial_params.clone(),
        })
    }
}

/// Build the engine and fit in one call.
pub fn run_fit(
    table: &DataTable,
    model: &ModelFunction,
    config: FitConfig,
) -> Result<FitOutcome, FitError> {
    FitEngine::new(table, config)?.fit(model)
}

fn check_config(config: &FitConfig) -> Result<(), FitError> {
    if config.initial_params.is_empty() {
        return Err(FitError::configuration(
            "initial parameters must not be empty",
        ));
    }
    if config.method == Method::Odr && config.columns.dx.is_none() {
        return Err(FitError::configuration(
            "ODR needs x uncertainties: select a dx column or switch to least squares",
        ));
    }
    let mut used = config.columns.used_indices(config.method);
    used.sort_unstable();
    if let Some(pair) = used.windows(2).find(|w| w[0] == w[1]) {
        return Err(FitError::configuration(format!(
            "columns must be distinct: column {} is selected twice",
            pair[0]
        )));
    }
    if let Some(range) = &config.x_range {
        if !range.low.is_finite() || !range.high.is_finite() || range.low >= range.high {
            return Err(FitError::configuration(format!(
                "empty x range: low {} must be below high {}",
                range.low, range.high
            )));
        }
    }
    Ok(())
}

fn extract(table: &DataTable, config: &FitConfig) -> Result<Observations, FitError> {
    let x = table.column(config.columns.x)?;
    let y = table.column(config.columns.y)?;
    // dx is only read when ODR will use it; least squares leaves that column
    // alone, whatever it contains.
    let dx = match (config.method, config.columns.dx) {
        (Method::Odr, Some(c)) => Some(check_uncertainties(table.column(c)?, c)?),
        _ => None,
    };
    let dy = match config.columns.dy {
        Some(c) => Some(check_uncertainties(table.column(c)?, c)?),
        None => None,
    };
    Ok(Observations { x, y, dx, dy })
}

fn check_uncertainties(values: Vec<f64>, column: usize) -> Result<Vec<f64>, FitError> {
    for (row, v) in values.iter().enumerate() {
        if !v.is_finite() || *v <= 0.0 {
            return Err(FitError::conversion(format!(
                "column {column}, row {}: uncertainty must be positive and finite, got {v}",
                row + 1
            )));
        }
    }
    Ok(values)
}

/// `n` evenly spaced samples from `lo` to `hi` inclusive.
fn sample_grid(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let span = hi - lo;
    (0..n)
        .map(|i| lo + span * i as f64 / (n - 1) as f64)
        .collect()
}

fn curve_on(grid: &[f64], model: &ModelFunction, params: &[f64]) -> Curve {
    Curve {
        x: grid.to_vec(),
        y: grid.iter().map(|&g| model.eval(params, g)).collect(),
    }
}
