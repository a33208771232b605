// Copyright 2026 LEOSim Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fairness under model divergence.
//!
//! Three operators start from the same pre-trained congestion-control model
//! and retrain on their own traffic every cycle. Divergence D between the
//! models grows in three phases and Jain fairness J falls with it, collapsing
//! once D passes the critical threshold. Periodic synchronisation keeps D
//! capped and J floored.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const SCHEMA_VERSION: &str = "leosim.exp2.v1";

/// Piecewise-linear divergence/fairness model, anchored on observed values
/// at the phase boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DivergenceModel {
    pub gradual_end_cycle: u32,
    pub threshold_end_cycle: u32,
    pub critical_divergence: f64,

    pub gradual_divergence_rate: f64,
    pub threshold_divergence_rate: f64,
    pub collapse_divergence_rate: f64,
    pub divergence_at_gradual_end: f64,
    pub divergence_at_threshold_end: f64,

    pub initial_fairness: f64,
    pub gradual_fairness_rate: f64,
    pub threshold_fairness_rate: f64,
    pub collapse_fairness_rate: f64,
    pub fairness_at_gradual_end: f64,
    pub fairness_at_threshold_end: f64,
    pub collapse_fairness_floor: f64,

    pub mitigated_residual_divergence: f64,
    pub mitigated_divergence_rate: f64,
    pub mitigated_divergence_cap: f64,
    pub mitigated_fairness_rate: f64,
    pub mitigated_fairness_floor: f64,
}

impl Default for DivergenceModel {
    fn default() -> Self {
        Self {
            gradual_end_cycle: 50,
            threshold_end_cycle: 65,
            critical_divergence: 0.5,

            // (0.42 - 0.00) / 50, (0.53 - 0.42) / 15, (1.12 - 0.53) / 35
            gradual_divergence_rate: 0.0084,
            threshold_divergence_rate: 0.0073,
            collapse_divergence_rate: 0.0169,
            divergence_at_gradual_end: 0.42,
            divergence_at_threshold_end: 0.53,

            // (0.96 - 0.71) / 50, (0.71 - 0.48) / 15, (0.48 - 0.19) / 35
            initial_fairness: 0.96,
            gradual_fairness_rate: 0.005,
            threshold_fairness_rate: 0.0153,
            collapse_fairness_rate: 0.0083,
            fairness_at_gradual_end: 0.71,
            fairness_at_threshold_end: 0.48,
            collapse_fairness_floor: 0.15,

            // gradual rates divided by 6 and 10
            mitigated_residual_divergence: 0.05,
            mitigated_divergence_rate: 0.0014,
            mitigated_divergence_cap: 0.20,
            mitigated_fairness_rate: 0.0005,
            mitigated_fairness_floor: 0.90,
        }
    }
}

impl DivergenceModel {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.gradual_end_cycle < self.threshold_end_cycle,
            "gradual_end_cycle must be less than threshold_end_cycle"
        );
        let fields = [
            ("critical_divergence", self.critical_divergence),
            ("gradual_divergence_rate", self.gradual_divergence_rate),
            ("threshold_divergence_rate", self.threshold_divergence_rate),
            ("collapse_divergence_rate", self.collapse_divergence_rate),
            ("divergence_at_gradual_end", self.divergence_at_gradual_end),
            ("divergence_at_threshold_end", self.divergence_at_threshold_end),
            ("initial_fairness", self.initial_fairness),
            ("gradual_fairness_rate", self.gradual_fairness_rate),
            ("threshold_fairness_rate", self.threshold_fairness_rate),
            ("collapse_fairness_rate", self.collapse_fairness_rate),
            ("fairness_at_gradual_end", self.fairness_at_gradual_end),
            ("fairness_at_threshold_end", self.fairness_at_threshold_end),
            ("collapse_fairness_floor", self.collapse_fairness_floor),
            (
                "mitigated_residual_divergence",
                self.mitigated_residual_divergence,
            ),
            ("mitigated_divergence_rate", self.mitigated_divergence_rate),
            ("mitigated_divergence_cap", self.mitigated_divergence_cap),
            ("mitigated_fairness_rate", self.mitigated_fairness_rate),
            ("mitigated_fairness_floor", self.mitigated_fairness_floor),
        ];
        for (name, value) in fields {
            anyhow::ensure!(value.is_finite(), "{name} must be finite");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DivergencePhase {
    /// Cycle 0: every operator still runs the shared pre-trained model.
    Aligned,
    /// Operators slowly specialise on their own traffic.
    Gradual,
    /// Policies start to conflict and divergence accelerates.
    ApproachingThreshold,
    /// One operator dominates bandwidth.
    Collapse,
    Mitigated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleState {
    pub cycle: u32,
    pub phase: DivergencePhase,
    pub divergence: f64,
    pub fairness: f64,
    pub above_critical: bool,
}

pub fn simulate_cycle(model: &DivergenceModel, cycle: u32, mitigated: bool) -> CycleState {
    let c = f64::from(cycle);
    let (phase, divergence, fairness) = if mitigated {
        (
            DivergencePhase::Mitigated,
            (model.mitigated_residual_divergence + c * model.mitigated_divergence_rate)
                .min(model.mitigated_divergence_cap),
            (model.initial_fairness - c * model.mitigated_fairness_rate)
                .max(model.mitigated_fairness_floor),
        )
    } else if cycle == 0 {
        (DivergencePhase::Aligned, 0.0, model.initial_fairness)
    } else if cycle <= model.gradual_end_cycle {
        (
            DivergencePhase::Gradual,
            c * model.gradual_divergence_rate,
            model.initial_fairness - c * model.gradual_fairness_rate,
        )
    } else if cycle <= model.threshold_end_cycle {
        let since = f64::from(cycle - model.gradual_end_cycle);
        (
            DivergencePhase::ApproachingThreshold,
            model.divergence_at_gradual_end + since * model.threshold_divergence_rate,
            model.fairness_at_gradual_end - since * model.threshold_fairness_rate,
        )
    } else {
        let since = f64::from(cycle - model.threshold_end_cycle);
        (
            DivergencePhase::Collapse,
            model.divergence_at_threshold_end + since * model.collapse_divergence_rate,
            (model.fairness_at_threshold_end - since * model.collapse_fairness_rate)
                .max(model.collapse_fairness_floor),
        )
    };

    CycleState {
        cycle,
        phase,
        divergence,
        fairness,
        above_critical: divergence > model.critical_divergence,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Exp2Config {
    pub key_cycles: Vec<u32>,
    pub comparison_cycle: u32,
    pub model: DivergenceModel,
}

impl Default for Exp2Config {
    fn default() -> Self {
        Self {
            key_cycles: vec![0, 50, 65, 100],
            comparison_cycle: 100,
            model: DivergenceModel::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MitigationComparison {
    pub cycle: u32,
    pub without: CycleState,
    pub with: CycleState,
    pub divergence_reduction_pct: Option<f64>,
    pub fairness_gain_pct: Option<f64>,
}

impl MitigationComparison {
    pub fn at(model: &DivergenceModel, cycle: u32) -> Self {
        let without = simulate_cycle(model, cycle, false);
        let with = simulate_cycle(model, cycle, true);
        let divergence_reduction_pct =
            relative_change_pct(without.divergence - with.divergence, without.divergence);
        let fairness_gain_pct =
            relative_change_pct(with.fairness - without.fairness, without.fairness);
        Self {
            cycle,
            without,
            with,
            divergence_reduction_pct,
            fairness_gain_pct,
        }
    }
}

fn relative_change_pct(delta: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        None
    } else {
        Some(delta / base * 100.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exp2Result {
    pub schema_version: String,
    pub unmitigated: Vec<CycleState>,
    pub comparison: MitigationComparison,
}

pub async fn run_exp2(cfg: &Exp2Config) -> anyhow::Result<Exp2Result> {
    anyhow::ensure!(!cfg.key_cycles.is_empty(), "key_cycles must not be empty");
    cfg.model.validate()?;
    info!(key_cycles = cfg.key_cycles.len(), "running fairness divergence model");

    let unmitigated = cfg
        .key_cycles
        .iter()
        .map(|&cycle| {
            let state = simulate_cycle(&cfg.model, cycle, false);
            debug!(
                cycle,
                divergence = state.divergence,
                fairness = state.fairness,
                "evaluated cycle"
            );
            state
        })
        .collect::<Vec<_>>();

    let comparison = MitigationComparison::at(&cfg.model, cfg.comparison_cycle);
    info!(
        cycle = comparison.cycle,
        divergence_without = comparison.without.divergence,
        divergence_with = comparison.with.divergence,
        "fairness divergence model complete"
    );

    Ok(Exp2Result {
        schema_version: SCHEMA_VERSION.to_string(),
        unmitigated,
        comparison,
    })
}
