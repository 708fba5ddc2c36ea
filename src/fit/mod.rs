//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - validate configuration and extract columns (engine)
//! - restrict observations to the requested x-range (selection)
//! - run the ODR or least-squares back-end
//! - derive goodness-of-fit statistics (stats)

pub mod engine;
pub mod least_squares;
pub mod numeric;
pub mod odr;
pub mod selection;
pub mod stats;

pub use engine::*;
pub use least_squares::*;
pub use odr::*;
pub use selection::*;

use serde::{Deserialize, Serialize};

/// What either back-end hands back to the engine.
///
/// `chi_square` is the back-end's own objective: weighted residual sum for
/// least squares, the full shift-penalized sum for ODR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendFit {
    pub params: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub chi_square: f64,
}
