//! Fit numbering and history.
//!
//! Callers that run several fits in a row (a GUI, a notebook-style driver)
//! want each successful fit labeled "Fit number N" and a running text log of
//! all results. Both live in an explicit `FitSession` value owned by the
//! caller; nothing here is process-global.

use serde::Serialize;

use crate::domain::FitOutcome;
use crate::report::format::{ReportStyle, format_summary};

/// Separator between history entries.
const PARTITION: &str = "________________________________________";

/// One recorded fit: its session-assigned number, a caller label, and the
/// rendered plain summary.
#[derive(Debug, Clone, Serialize)]
pub struct FitRecord {
    pub number: usize,
    pub label: String,
    pub summary: String,
}

/// Counter plus history for a sequence of fits.
#[derive(Debug, Clone)]
pub struct FitSession {
    style: ReportStyle,
    records: Vec<FitRecord>,
    next_number: usize,
}

impl FitSession {
    pub fn new() -> Self {
        Self::with_style(ReportStyle::default())
    }

    pub fn with_style(style: ReportStyle) -> Self {
        Self {
            style,
            records: Vec::new(),
            next_number: 1,
        }
    }

    /// Assign the next fit number, render and store the summary, and return
    /// the stored record.
    pub fn record(&mut self, label: impl Into<String>, outcome: &FitOutcome) -> &FitRecord {
        let record = FitRecord {
            number: self.next_number,
            label: label.into(),
            summary: format_summary(outcome, &self.style),
        };
        self.next_number += 1;
        self.records.push(record);
        // Just pushed, so the last index exists.
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[FitRecord] {
        &self.records
    }

    /// All recorded summaries, oldest first, separated by a partition line.
    /// This is the exact text a caller would write to a results file.
    pub fn history_text(&self) -> String {
        let mut out = String::new();
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                out.push_str(PARTITION);
                out.push('\n');
            }
            out.push_str(&format!("Fit number {}: {}\n", record.number, record.label));
            out.push_str(&record.summary);
        }
        out
    }

    /// Drop the history and restart numbering at 1.
    pub fn clear(&mut self) {
        self.records.clear();
        self.next_number = 1;
    }
}

impl Default for FitSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Curve, FitStats, Method, Observations, ParamEstimate};

    fn outcome() -> FitOutcome {
        FitOutcome {
            method: Method::LeastSquares,
            estimates: vec![ParamEstimate {
                value: 2.0,
                std_error: 0.1,
            }],
            stats: FitStats {
                chi_square: 1.5,
                degrees_of_freedom: 3,
                p_value: 0.68,
                reduced_chi_square: 0.5,
            },
            observations: Observations::default(),
            residuals: vec![],
            fitted_curve: Curve::default(),
            initial_curve: Curve::default(),
            initial_params: vec![1.0],
        }
    }

    #[test]
    fn numbers_run_consecutively_from_one() {
        let mut session = FitSession::new();
        let first = session.record("line", &outcome()).number;
        let second = session.record("line again", &outcome()).number;
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(session.records().len(), 2);
    }

    #[test]
    fn record_stores_the_rendered_summary() {
        let mut session = FitSession::new();
        let record = session.record("line", &outcome());
        assert_eq!(record.label, "line");
        assert!(record.summary.contains("a[0] = 2.000 +- 0.100"));
        assert!(record.summary.contains("DoF = 3"));
    }

    #[test]
    fn history_partitions_entries_with_underscores() {
        let mut session = FitSession::new();
        session.record("first", &outcome());
        session.record("second", &outcome());
        let text = session.history_text();
        assert!(text.contains("Fit number 1: first"));
        assert!(text.contains("Fit number 2: second"));
        assert_eq!(text.matches(PARTITION).count(), 1);
    }

    #[test]
    fn clear_resets_the_counter_and_history() {
        let mut session = FitSession::new();
        session.record("first", &outcome());
        session.record("second", &outcome());
        session.clear();
        assert!(session.records().is_empty());
        assert!(session.history_text().is_empty());
        let renumbered = session.record("fresh", &outcome()).number;
        assert_eq!(renumbered, 1);
    }
}
