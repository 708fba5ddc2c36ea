//! Model-definition loading.
//!
//! A model definition is a few lines of text:
//!
//! ```text
//! # Linear model, errors on both axes.
//! params: 2
//! a[0]*x + a[1]
//! ```
//!
//! or, in the least-squares convention:
//!
//! ```text
//! params: a0, a1
//! a1*x + a0
//! ```
//!
//! The `params:` header decides everything: a count declares an indexed
//! vector `a` (ODR convention, params first), a name list declares positional
//! named parameters (least-squares convention, x first). Initial parameters
//! map positionally either way. Lines starting with `#` are comments; the
//! remaining lines form one expression. Every failure (unreadable file, bad
//! header, bad expression) becomes a model-shape error here.

use std::path::Path;

use log::debug;

use crate::error::FitError;
use crate::model::function::ModelFunction;
use crate::model::parser::{ParamSymbols, parse_expression};

const HEADER_KEY: &str = "params:";

/// Parse a model definition from an in-memory string.
pub fn parse_model_str(source: &str, label: impl Into<String>) -> Result<ModelFunction, FitError> {
    let label = label.into();
    let mut lines = source
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));

    let header = lines
        .next()
        .ok_or_else(|| FitError::model_shape(format!("model '{label}' is empty")))?;
    let decl = header.strip_prefix(HEADER_KEY).ok_or_else(|| {
        FitError::model_shape(format!(
            "model '{label}' must start with a '{HEADER_KEY}' header line, found {header:?}"
        ))
    })?;
    let symbols = parse_header(decl, &label)?;

    let expr_src = lines.collect::<Vec<_>>().join(" ");
    if expr_src.is_empty() {
        return Err(FitError::model_shape(format!(
            "model '{label}' has no expression"
        )));
    }
    let ast = parse_expression(&expr_src, &symbols)
        .map_err(|e| FitError::model_shape(format!("model '{label}': {}", e.message())))?;

    let model = match symbols {
        ParamSymbols::Indexed { count } => {
            ModelFunction::odr(label, count, move |a: &[f64], x: f64| ast.eval(a, x))
        }
        ParamSymbols::Named(names) => {
            let arity = names.len();
            ModelFunction::least_squares(label, arity, move |x: f64, a: &[f64]| ast.eval(a, x))
        }
    };
    debug!(
        "loaded model '{}': {} convention, {} parameter(s)",
        model.label(),
        model.convention().display_name(),
        model.arity()
    );
    Ok(model)
}

/// Read a model definition from a file; the label is the file stem.
pub fn load_model_file(path: impl AsRef<Path>) -> Result<ModelFunction, FitError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| {
        FitError::model_shape(format!("cannot read model file '{}': {e}", path.display()))
    })?;
    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string();
    parse_model_str(&source, label)
}

fn parse_header(decl: &str, label: &str) -> Result<ParamSymbols, FitError> {
    let decl = decl.trim();
    if decl.is_empty() {
        return Err(FitError::model_shape(format!(
            "model '{label}': the params declaration is empty"
        )));
    }
    if decl.chars().all(|c| c.is_ascii_digit()) {
        let count: usize = decl.parse().map_err(|_| {
            FitError::model_shape(format!(
                "model '{label}': parameter count '{decl}' is out of range"
            ))
        })?;
        if count == 0 {
            return Err(FitError::model_shape(format!(
                "model '{label}' declares zero parameters"
            )));
        }
        return Ok(ParamSymbols::Indexed { count });
    }

    let mut names = Vec::new();
    for raw in decl.split(',') {
        let name = raw.trim();
        check_param_name(name, label)?;
        if names.iter().any(|n| n == name) {
            return Err(FitError::model_shape(format!(
                "model '{label}': duplicate parameter name '{name}'"
            )));
        }
        names.push(name.to_string());
    }
    Ok(ParamSymbols::Named(names))
}

fn check_param_name(name: &str, label: &str) -> Result<(), FitError> {
    let mut chars = name.chars();
    let first_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !(first_ok && rest_ok) {
        return Err(FitError::model_shape(format!(
            "model '{label}': '{name}' is not a valid parameter name"
        )));
    }
    if matches!(name, "x" | "pi" | "e") {
        return Err(FitError::model_shape(format!(
            "model '{label}': '{name}' is reserved and cannot be a parameter name"
        )));
    }
    Ok(())
}
