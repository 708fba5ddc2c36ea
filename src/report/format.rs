//! Formatted fit summaries.
//!
//! We keep formatting code in one place so:
//! - the engine and back-ends stay clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! Two variants share the same content: a plain-text summary and a typeset
//! one whose parameter and chi-square lines use LaTeX-style markup for
//! mathtext-capable renderers.

use crate::domain::FitOutcome;

/// Formatting precision, passed in explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    /// Decimals for parameter values and their standard errors.
    pub value_decimals: usize,
    /// Decimals for chi-square, p-value and reduced chi-square.
    pub stat_decimals: usize,
    /// Decimals for percent-relative errors.
    pub percent_decimals: usize,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            value_decimals: 3,
            stat_decimals: 3,
            percent_decimals: 2,
        }
    }
}

/// Plain-text summary: one line per parameter, the fit statistics, and the
/// initial parameter vector.
pub fn format_summary(outcome: &FitOutcome, style: &ReportStyle) -> String {
    let vd = style.value_decimals;
    let pd = style.percent_decimals;
    let mut out = String::new();

    for (i, est) in outcome.estimates.iter().enumerate() {
        let tail = match est.relative_error_percent() {
            Some(pct) => format!("({pct:.pd$}% relative error)"),
            None => "(relative error undefined)".to_string(),
        };
        out.push_str(&format!(
            "a[{i}] = {:.vd$} +- {:.vd$} {tail}\n",
            est.value, est.std_error
        ));
    }

    out.push('\n');
    push_stat_lines(&mut out, outcome, style, "chi squared", "chi squared reduced");
    out.push('\n');
    out.push_str(&format!(
        "Initial parameters = {}\n",
        fmt_vec(&outcome.initial_params)
    ));

    out
}

/// Typeset summary: same content with LaTeX-style parameter and chi-square
/// lines.
pub fn format_summary_typeset(outcome: &FitOutcome, style: &ReportStyle) -> String {
    let vd = style.value_decimals;
    let pd = style.percent_decimals;
    let mut out = String::new();

    for (i, est) in outcome.estimates.iter().enumerate() {
        let tail = match est.relative_error_percent() {
            Some(pct) => format!("\\;({pct:.pd$}\\%)"),
            None => "\\;(\\%\\;undefined)".to_string(),
        };
        out.push_str(&format!(
            "a_{{{i}}} = {:.vd$} \\pm {:.vd$}{tail}\n",
            est.value, est.std_error
        ));
    }

    out.push('\n');
    push_stat_lines(&mut out, outcome, style, "\\chi^2", "\\chi^2_{red}");
    out.push('\n');
    out.push_str(&format!(
        "Initial parameters = {}\n",
        fmt_vec(&outcome.initial_params)
    ));

    out
}

fn push_stat_lines(
    out: &mut String,
    outcome: &FitOutcome,
    style: &ReportStyle,
    chi_name: &str,
    reduced_name: &str,
) {
    let sd = style.stat_decimals;
    out.push_str(&format!("DoF = {}\n", outcome.stats.degrees_of_freedom));
    out.push_str(&format!("{chi_name} = {:.sd$}\n", outcome.stats.chi_square));
    out.push_str(&format!("p-value = {:.sd$}\n", outcome.stats.p_value));
    out.push_str(&format!(
        "{reduced_name} = {:.sd$}\n",
        outcome.stats.reduced_chi_square
    ));
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Curve, FitStats, Method, Observations, ParamEstimate};

    fn line_outcome() -> FitOutcome {
        FitOutcome {
            method: Method::LeastSquares,
            estimates: vec![
                ParamEstimate {
                    value: 1.94,
                    std_error: 0.0906,
                },
                ParamEstimate {
                    value: 0.15,
                    std_error: 0.248,
                },
            ],
            stats: FitStats {
                chi_square: 0.082,
                degrees_of_freedom: 2,
                p_value: 0.959_83,
                reduced_chi_square: 0.041,
            },
            observations: Observations::default(),
            residuals: vec![],
            fitted_curve: Curve::default(),
            initial_curve: Curve::default(),
            initial_params: vec![1.0, 1.0],
        }
    }

    #[test]
    fn plain_summary_has_the_expected_lines() {
        let text = format_summary(&line_outcome(), &ReportStyle::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a[0] = 1.940 +- 0.091 (4.67% relative error)");
        assert_eq!(lines[1], "a[1] = 0.150 +- 0.248 (165.33% relative error)");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "DoF = 2");
        assert_eq!(lines[4], "chi squared = 0.082");
        assert_eq!(lines[5], "p-value = 0.960");
        assert_eq!(lines[6], "chi squared reduced = 0.041");
        assert_eq!(lines[7], "");
        assert_eq!(lines[8], "Initial parameters = [1, 1]");
    }

    #[test]
    fn zero_valued_parameter_reports_an_undefined_percentage() {
        let mut outcome = line_outcome();
        outcome.estimates[0] = ParamEstimate {
            value: 0.0,
            std_error: 0.1,
        };
        let text = format_summary(&outcome, &ReportStyle::default());
        assert!(text.contains("a[0] = 0.000 +- 0.100 (relative error undefined)"));
        let typeset = format_summary_typeset(&outcome, &ReportStyle::default());
        assert!(typeset.contains("(\\%\\;undefined)"));
    }

    #[test]
    fn typeset_summary_uses_math_markup() {
        let text = format_summary_typeset(&line_outcome(), &ReportStyle::default());
        assert!(text.contains("a_{0} = 1.940 \\pm 0.091\\;(4.67\\%)"));
        assert!(text.contains("\\chi^2 = 0.082"));
        assert!(text.contains("\\chi^2_{red} = 0.041"));
        // The shared lines stay plain.
        assert!(text.contains("DoF = 2"));
        assert!(text.contains("p-value = 0.960"));
    }

    #[test]
    fn style_controls_precision() {
        let style = ReportStyle {
            value_decimals: 1,
            stat_decimals: 4,
            percent_decimals: 0,
        };
        let text = format_summary(&line_outcome(), &style);
        assert!(text.contains("a[0] = 1.9 +- 0.1 (5% relative error)"));
        assert!(text.contains("chi squared = 0.0820"));
    }

    #[test]
    fn initial_parameters_print_without_forced_decimals() {
        let mut outcome = line_outcome();
        outcome.initial_params = vec![1.0, 0.25];
        let text = format_summary(&outcome, &ReportStyle::default());
        assert!(text.contains("Initial parameters = [1, 0.25]"));
    }
}
