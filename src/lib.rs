//! `xyfit` library crate.
//!
//! Curve fitting for (x, y, ±error) tabular data: orthogonal distance
//! regression when both axes carry uncertainty, nonlinear least squares when
//! only y does. The crate is a library with no binary so that:
//!
//! - core logic is testable without a user interface
//! - GUI, file-loading and plotting front-ends stay external collaborators
//! - results are plain serializable values any consumer can render
//!
//! Typical use: build a [`domain::DataTable`], describe the fit with a
//! [`domain::FitConfig`], supply a [`model::ModelFunction`] (closure or model
//! file), and call [`fit::run_fit`]. Render the outcome with
//! [`report::format_summary`] or track a series of fits in a
//! [`report::FitSession`].

pub mod domain;
pub mod error;
pub mod fit;
pub mod model;
pub mod report;
