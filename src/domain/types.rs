//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - handed to plotting/reporting collaborators
//! - serialized by callers that want to persist results

use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Which fitting back-end to run.
///
/// The two methods make different assumptions about measurement error:
///
/// - `Odr` accounts for uncertainty on both axes and therefore requires a
///   `dx` column.
/// - `LeastSquares` treats x as exact; `dx` is never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Odr,
    LeastSquares,
}

impl Method {
    /// Human-readable label for messages and summaries.
    pub fn display_name(self) -> &'static str {
        match self {
            Method::Odr => "ODR",
            Method::LeastSquares => "least squares",
        }
    }
}

/// Column indices locating the fit inputs inside a data table.
///
/// Indices are zero-based and positional; the engine never looks columns up by
/// name. `dx`/`dy` are optional: `dy` may be omitted under either method, `dx`
/// is required by ODR and ignored by least squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub x: usize,
    pub dx: Option<usize>,
    pub y: usize,
    pub dy: Option<usize>,
}

impl ColumnMap {
    /// Columns without uncertainty data.
    pub fn plain(x: usize, y: usize) -> Self {
        Self {
            x,
            dx: None,
            y,
            dy: None,
        }
    }

    /// The indices the given method will actually read, in (x, dx, y, dy)
    /// order with the unread ones skipped.
    pub fn used_indices(&self, method: Method) -> Vec<usize> {
        let mut out = vec![self.x];
        if method == Method::Odr {
            if let Some(dx) = self.dx {
                out.push(dx);
            }
        }
        out.push(self.y);
        if let Some(dy) = self.dy {
            out.push(dy);
        }
        out
    }
}

/// Inclusive x-interval restricting which observations participate in a fit.
///
/// `low < high` strictly; validation happens in the engine before any
/// numerical work so a malformed range never reaches a back-end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XRange {
    pub low: f64,
    pub high: f64,
}

impl XRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.high
    }
}

/// One fit request, supplied once per invocation and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    pub columns: ColumnMap,
    pub method: Method,
    pub initial_params: Vec<f64>,
    /// Restrict the fit to observations with `low <= x <= high`.
    pub x_range: Option<XRange>,
}

impl FitConfig {
    pub fn new(columns: ColumnMap, method: Method, initial_params: Vec<f64>) -> Self {
        Self {
            columns,
            method,
            initial_params,
            x_range: None,
        }
    }

    pub fn with_x_range(mut self, low: f64, high: f64) -> Self {
        self.x_range = Some(XRange::new(low, high));
        self
    }
}

/// Extracted observation arrays, parallel by index.
///
/// `x` and `y` always have the same length; `dx`/`dy`, when present, match it.
/// After range selection these hold only the participating observations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Observations {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub dx: Option<Vec<f64>>,
    pub dy: Option<Vec<f64>>,
}

impl Observations {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check the parallel-array invariant. Returns a conversion error naming
    /// the offending array if lengths diverge.
    pub fn check_lengths(&self) -> Result<(), FitError> {
        Self::check_parallel(&self.x, &self.y, self.dx.as_deref(), self.dy.as_deref())
    }

    /// Slice form of [`check_lengths`](Self::check_lengths) for callers that
    /// hold borrowed arrays, as the back-ends do.
    pub fn check_parallel(
        x: &[f64],
        y: &[f64],
        dx: Option<&[f64]>,
        dy: Option<&[f64]>,
    ) -> Result<(), FitError> {
        let n = x.len();
        if y.len() != n {
            return Err(FitError::conversion(format!(
                "y column has {} values but x has {n}",
                y.len()
            )));
        }
        if let Some(dx) = dx {
            if dx.len() != n {
                return Err(FitError::conversion(format!(
                    "dx column has {} values but x has {n}",
                    dx.len()
                )));
            }
        }
        if let Some(dy) = dy {
            if dy.len() != n {
                return Err(FitError::conversion(format!(
                    "dy column has {} values but x has {n}",
                    dy.len()
                )));
            }
        }
        Ok(())
    }
}

/// One fitted parameter: point estimate plus standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamEstimate {
    pub value: f64,
    pub std_error: f64,
}

impl ParamEstimate {
    /// Percent-relative standard error, `|std_error / value| * 100`.
    ///
    /// `None` when the estimate is exactly zero; the percentage is undefined
    /// there and reporting renders it as such instead of propagating NaN.
    pub fn relative_error_percent(&self) -> Option<f64> {
        if self.value == 0.0 {
            None
        } else {
            Some((self.std_error / self.value).abs() * 100.0)
        }
    }
}

/// Goodness-of-fit statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FitStats {
    pub chi_square: f64,
    pub degrees_of_freedom: usize,
    /// Survival probability of `chi_square` under a chi-square distribution
    /// with `degrees_of_freedom` degrees of freedom.
    pub p_value: f64,
    pub reduced_chi_square: f64,
}

/// A sampled curve on a dense x-grid, ready for a plotting consumer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Curve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Curve {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Everything one fit produces.
///
/// Constructed atomically by the engine; nothing here is recomputed after the
/// fact. `observations` holds the range-selected arrays that actually entered
/// the back-end, which is what plotting consumers should draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitOutcome {
    pub method: Method,
    pub estimates: Vec<ParamEstimate>,
    pub stats: FitStats,
    pub observations: Observations,
    /// `y_i - model(x_i)` per used observation, in observation order.
    pub residuals: Vec<f64>,
    /// Model sampled at the estimated parameters over the dense grid.
    pub fitted_curve: Curve,
    /// Model sampled at the initial guess over the same grid.
    pub initial_curve: Curve,
    pub initial_params: Vec<f64>,
}

impl FitOutcome {
    pub fn estimated_params(&self) -> Vec<f64> {
        self.estimates.iter().map(|e| e.value).collect()
    }

    pub fn param_std_errors(&self) -> Vec<f64> {
        self.estimates.iter().map(|e| e.std_error).collect()
    }
}
