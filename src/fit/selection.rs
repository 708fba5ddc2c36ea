//! Observation selection by x-range.
//!
//! Range restriction touches several parallel arrays (x, y, and whichever of
//! dx/dy exist) plus the dense sampling grid used for display curves. All of
//! them go through the same mask helpers here, so the "apply to whatever is
//! present" logic lives in exactly one place.

use crate::domain::{Observations, XRange};

/// Boolean mask of the values inside the inclusive range.
pub fn range_mask(values: &[f64], range: &XRange) -> Vec<bool> {
    values.iter().map(|&v| range.contains(v)).collect()
}

/// Keep the entries of one array selected by a mask.
pub fn filter_by_mask(values: &[f64], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .filter_map(|(&v, &keep)| keep.then_some(v))
        .collect()
}

/// Apply an optional range to every array present in the observation set.
///
/// Without a range this is a plain copy; with one, the mask computed over `x`
/// is applied identically to x, y, dx (if present), and dy (if present).
/// Callers hand in length-checked arrays ([`Observations::check_lengths`]);
/// the engine validates this at construction, so a mismatched set never gets
/// here on the library's own paths.
pub fn select(observations: &Observations, range: Option<&XRange>) -> Observations {
    let Some(range) = range else {
        return observations.clone();
    };
    let mask = range_mask(&observations.x, range);
    Observations {
        x: filter_by_mask(&observations.x, &mask),
        y: filter_by_mask(&observations.y, &mask),
        dx: observations
            .dx
            .as_ref()
            .map(|v| filter_by_mask(v, &mask)),
        dy: observations
            .dy
            .as_ref()
            .map(|v| filter_by_mask(v, &mask)),
    }
}
