//! The model function behind one tagged type.
//!
//! The two fitting methods expect different call shapes: ODR passes the
//! parameter vector first, least squares passes x first, and the shapes are
//! not interchangeable. A `ModelFunction` carries its convention as a tag so
//! the engine can reject a model/method mismatch up front instead of fitting
//! garbage.

use crate::domain::Method;
use crate::error::FitError;

/// Model callable in ODR convention: `f(params, x)`.
pub type OdrFn = Box<dyn Fn(&[f64], f64) -> f64 + Send + Sync>;

/// Model callable in least-squares convention: `f(x, params)`.
pub type LeastSquaresFn = Box<dyn Fn(f64, &[f64]) -> f64 + Send + Sync>;

enum Callable {
    Odr(OdrFn),
    LeastSquares(LeastSquaresFn),
}

/// A user model: one callable in one convention, plus its parameter count
/// and a label for messages and summaries.
pub struct ModelFunction {
    callable: Callable,
    arity: usize,
    label: String,
}

impl ModelFunction {
    /// A model in ODR convention (`f(params, x)`).
    pub fn odr(
        label: impl Into<String>,
        arity: usize,
        f: impl Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            callable: Callable::Odr(Box::new(f)),
            arity,
            label: label.into(),
        }
    }

    /// A model in least-squares convention (`f(x, params)`).
    pub fn least_squares(
        label: impl Into<String>,
        arity: usize,
        f: impl Fn(f64, &[f64]) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            callable: Callable::LeastSquares(Box::new(f)),
            arity,
            label: label.into(),
        }
    }

    /// The convention this model was written in.
    pub fn convention(&self) -> Method {
        match self.callable {
            Callable::Odr(_) => Method::Odr,
            Callable::LeastSquares(_) => Method::LeastSquares,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Evaluate at one point. Callers validate `params.len()` against
    /// [`arity`](Self::arity) first; the engine does this once per fit.
    pub fn eval(&self, params: &[f64], x: f64) -> f64 {
        match &self.callable {
            Callable::Odr(f) => f(params, x),
            Callable::LeastSquares(f) => f(x, params),
        }
    }

    /// Reject a model whose convention does not match the selected method.
    pub fn check_method(&self, method: Method) -> Result<(), FitError> {
        if self.convention() == method {
            Ok(())
        } else {
            Err(FitError::model_shape(format!(
                "model '{}' uses the {} convention but the {} method was selected; \
                 the method does not match the model file",
                self.label,
                self.convention().display_name(),
                method.display_name()
            )))
        }
    }

    /// Reject an initial parameter vector of the wrong length.
    pub fn check_params(&self, initial_params: &[f64]) -> Result<(), FitError> {
        if initial_params.len() == self.arity {
            Ok(())
        } else {
            Err(FitError::model_shape(format!(
                "parameter count mismatch: model '{}' takes {} parameters but {} initial values were given",
                self.label,
                self.arity,
                initial_params.len()
            )))
        }
    }
}

impl std::fmt::Debug for ModelFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelFunction")
            .field("label", &self.label)
            .field("convention", &self.convention())
            .field("arity", &self.arity)
            .finish()
    }
}
