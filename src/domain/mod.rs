//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the input side: `DataTable`/`Cell`, `ColumnMap`, `Method`, `XRange`, `FitConfig`
//! - the extracted observation arrays (`Observations`)
//! - fit outputs (`FitOutcome`, `ParamEstimate`, `FitStats`, `Curve`)

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;
