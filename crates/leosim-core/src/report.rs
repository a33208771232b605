// Copyright (c) 2026 LEOSim Contributors
// SPDX-License-Identifier: Apache-2.0

//! Plain-text console reports for experiment results.
//!
//! Each report is a [`fmt::Display`] wrapper around a result, so the same
//! layout can be streamed to any writer or collected with `to_string()`.

use std::fmt;

use crate::experiments::exp1::{Exp1Result, Exp1Row};
use crate::experiments::exp2::{CycleState, Exp2Result};
use crate::experiments::{ExperimentId, ExperimentOutput};

const RULE_WIDTH: usize = 40;

/// Fractional horizons are shown with at most this many decimals.
const HORIZON_DECIMALS: usize = 3;

pub fn render_report(output: &ExperimentOutput) -> String {
    match output {
        ExperimentOutput::PredictionHorizon(r) => render_exp1(r),
        ExperimentOutput::FairnessDivergence(r) => render_exp2(r),
    }
}

pub fn render_exp1(result: &Exp1Result) -> String {
    Exp1Report(result).to_string()
}

pub fn render_exp2(result: &Exp2Result) -> String {
    Exp2Report(result).to_string()
}

/// Console layout for the prediction horizon sweep.
pub struct Exp1Report<'a>(pub &'a Exp1Result);

/// Console layout for the divergence run and the mitigation comparison.
pub struct Exp2Report<'a>(pub &'a Exp2Result);

fn write_header(f: &mut fmt::Formatter<'_>, id: ExperimentId) -> fmt::Result {
    writeln!(f, "Experiment {}: {}", id.number(), id.title())?;
    writeln!(f)
}

/// Whole seconds print bare; anything else is rounded and loses trailing
/// zeros, so `0.1 + 0.2` prints as `0.3`.
fn format_horizon(tau: f64) -> String {
    if tau.fract() == 0.0 {
        return format!("{tau:.0}");
    }
    let rounded = format!("{:.*}", HORIZON_DECIMALS, tau);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

fn write_horizon_metrics(f: &mut fmt::Formatter<'_>, row: &Exp1Row) -> fmt::Result {
    writeln!(f, "Throughput: {:.0} Mbps", row.throughput_mbps)?;
    writeln!(f, "Latency: {:.1} ms", row.latency_ms)?;
    writeln!(f, "Prediction Error: {:.1} ms", row.prediction_error_ms)
}

impl fmt::Display for Exp1Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        write_header(f, ExperimentId::PredictionHorizon)?;
        for row in &result.rows {
            writeln!(f, "T = {}s:", format_horizon(row.horizon_s))?;
            write_horizon_metrics(f, row)?;
            writeln!(f)?;
        }
        writeln!(
            f,
            "Optimal prediction horizon: T* = {}s",
            format_horizon(result.optimal.horizon_s)
        )?;
        write_horizon_metrics(f, &result.optimal)
    }
}

fn write_cycle_state(f: &mut fmt::Formatter<'_>, state: &CycleState) -> fmt::Result {
    writeln!(f, "Model Divergence (D): {:.2}", state.divergence)?;
    writeln!(f, "Fairness (J): {:.2}", state.fairness)
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "-".repeat(RULE_WIDTH))
}

fn signed_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!(" ({v:+.1}%)"),
        None => String::new(),
    }
}

impl fmt::Display for Exp2Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        write_header(f, ExperimentId::FairnessDivergence)?;

        write_section(f, "WITHOUT MITIGATIONS:")?;
        writeln!(f)?;
        for state in &result.unmitigated {
            writeln!(f, "Cycle {}:", state.cycle)?;
            write_cycle_state(f, state)?;
            writeln!(f)?;
        }

        let cmp = &result.comparison;
        writeln!(f)?;
        write_section(f, "PROPOSED MITIGATION RESULTS:")?;
        writeln!(f)?;
        writeln!(f, "Cycle {} - WITHOUT mitigations:", cmp.cycle)?;
        write_cycle_state(f, &cmp.without)?;
        writeln!(f)?;
        writeln!(f, "Cycle {} - WITH mitigations:", cmp.cycle)?;
        write_cycle_state(f, &cmp.with)?;
        writeln!(f)?;

        write_section(f, "Quantitative improvements:")?;
        writeln!(
            f,
            "Divergence: {:.2} -> {:.2}{}",
            cmp.without.divergence,
            cmp.with.divergence,
            signed_pct(cmp.divergence_reduction_pct.map(|p| -p))
        )?;
        writeln!(
            f,
            "Fairness: {:.2} -> {:.2}{}",
            cmp.without.fairness,
            cmp.with.fairness,
            signed_pct(cmp.fairness_gain_pct)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_pct_shows_sign_and_omits_missing_values() {
        assert_eq!(signed_pct(Some(12.34)), " (+12.3%)");
        assert_eq!(signed_pct(Some(-83.06)), " (-83.1%)");
        assert_eq!(signed_pct(None), "");
    }

    #[test]
    fn horizons_print_without_float_noise() {
        assert_eq!(format_horizon(30.0), "30");
        assert_eq!(format_horizon(0.0), "0");
        assert_eq!(format_horizon(0.1 + 0.2), "0.3");
        assert_eq!(format_horizon(12.5), "12.5");
        assert_eq!(format_horizon(1.0 / 3.0), "0.333");
        assert_eq!(format_horizon(59.9999), "60");
        assert_eq!(format_horizon(1e-9), "0");
    }
}
