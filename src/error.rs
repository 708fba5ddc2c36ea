//! Error type shared across the crate.
//!
//! Every failure carries a category (`ErrorKind`) so callers can distinguish
//! bad configuration from bad data, a model that does not fit the request, a
//! statistically degenerate request, and a back-end that failed to converge.
//! All categories are fatal to the fit attempt they occur in; none is retried.

/// Failure category for a fit attempt.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// Invalid method/column combination, duplicate or out-of-range column
    /// indices, malformed x-range, empty initial parameter vector.
    Configuration,
    /// Non-numeric data in a required column, ragged rows, or uncertainty
    /// values that cannot weight a residual (zero, negative, non-finite).
    Conversion,
    /// Model does not match the request: wrong calling convention for the
    /// method, wrong parameter arity, or a model definition that failed to
    /// load or parse.
    ModelShape,
    /// Too few observations for the parameter count (`dof <= 0`).
    Degeneracy,
    /// The minimizer terminated unsuccessfully or the covariance could not
    /// be formed.
    Solver,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Conversion => "conversion error",
            ErrorKind::ModelShape => "model shape error",
            ErrorKind::Degeneracy => "statistical degeneracy error",
            ErrorKind::Solver => "solver error",
        }
    }

    /// One-line most-likely cause, suitable for showing next to the message.
    pub fn likely_cause(self) -> &'static str {
        match self {
            ErrorKind::Configuration => {
                "the selected method, columns, or x-range do not form a valid fit request"
            }
            ErrorKind::Conversion => "a selected column contains non-numeric or unusable data",
            ErrorKind::ModelShape => {
                "the method does not match the model file, or the initial parameter count is wrong"
            }
            ErrorKind::Degeneracy => "too few observations for the number of fitted parameters",
            ErrorKind::Solver => "the fit did not converge from the given initial parameters",
        }
    }
}

#[derive(Clone)]
pub struct FitError {
    kind: ErrorKind,
    message: String,
}

impl FitError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conversion, message)
    }

    pub fn model_shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelShape, message)
    }

    pub fn degeneracy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Degeneracy, message)
    }

    pub fn solver(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Solver, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Two-line rendering: `category: message`, then the likely cause.
    pub fn diagnostic(&self) -> String {
        format!("{self}\n  likely cause: {}", self.kind.likely_cause())
    }
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::fmt::Debug for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for FitError {}
