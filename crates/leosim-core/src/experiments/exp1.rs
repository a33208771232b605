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

//! Optimal prediction horizon.
//!
//! Satellite positions are perfectly predictable but queueing delay is not, so
//! the RTT/queue prediction error grows with the horizon. Short horizons leave
//! too little time to plan a smooth cwnd trajectory; long horizons plan on
//! predictions that no longer hold. The sweep picks the horizon with the best
//! throughput.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const SCHEMA_VERSION: &str = "leosim.exp1.v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Exp1Config {
    pub horizons_s: Vec<f64>,
    pub link_capacity_mbps: f64,
    pub utilization_ceiling: f64,
    pub base_latency_ms: f64,
    pub base_error_ms: f64,
    pub error_growth_scale_s: f64,
    /// Below this horizon there is not enough time to plan cwnd degradation.
    pub min_planning_horizon_s: f64,
    /// From this horizon on, predictions become unreliable.
    pub reliability_horizon_s: f64,
    pub efficiency_floor: f64,
    pub efficiency_peak: f64,
    pub efficiency_decay_span_s: f64,
    pub error_penalty_scale_ms: f64,
    pub latency_error_factor: f64,
}

impl Default for Exp1Config {
    fn default() -> Self {
        Self {
            horizons_s: vec![10.0, 30.0, 45.0, 60.0, 90.0],
            link_capacity_mbps: 1000.0,
            utilization_ceiling: 0.95,
            base_latency_ms: 7.0,
            base_error_ms: 0.4,
            error_growth_scale_s: 60.0,
            min_planning_horizon_s: 20.0,
            reliability_horizon_s: 60.0,
            efficiency_floor: 0.80,
            efficiency_peak: 0.95,
            efficiency_decay_span_s: 200.0,
            error_penalty_scale_ms: 10.0,
            latency_error_factor: 2.0,
        }
    }
}

impl Exp1Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.horizons_s.is_empty(), "horizons_s must not be empty");
        for tau in &self.horizons_s {
            anyhow::ensure!(
                tau.is_finite() && *tau >= 0.0,
                "horizons_s must be finite and non-negative (got {tau})"
            );
        }

        let fields = [
            ("link_capacity_mbps", self.link_capacity_mbps),
            ("utilization_ceiling", self.utilization_ceiling),
            ("base_latency_ms", self.base_latency_ms),
            ("base_error_ms", self.base_error_ms),
            ("error_growth_scale_s", self.error_growth_scale_s),
            ("min_planning_horizon_s", self.min_planning_horizon_s),
            ("reliability_horizon_s", self.reliability_horizon_s),
            ("efficiency_floor", self.efficiency_floor),
            ("efficiency_peak", self.efficiency_peak),
            ("efficiency_decay_span_s", self.efficiency_decay_span_s),
            ("error_penalty_scale_ms", self.error_penalty_scale_ms),
            ("latency_error_factor", self.latency_error_factor),
        ];
        for (name, value) in fields {
            anyhow::ensure!(value.is_finite(), "{name} must be finite");
        }

        anyhow::ensure!(
            self.error_growth_scale_s > 0.0,
            "error_growth_scale_s must be positive"
        );
        anyhow::ensure!(
            self.error_penalty_scale_ms > 0.0,
            "error_penalty_scale_ms must be positive"
        );
        anyhow::ensure!(
            self.efficiency_decay_span_s > 0.0,
            "efficiency_decay_span_s must be positive"
        );
        anyhow::ensure!(
            self.min_planning_horizon_s > 0.0,
            "min_planning_horizon_s must be positive"
        );
        anyhow::ensure!(
            self.min_planning_horizon_s <= self.reliability_horizon_s,
            "min_planning_horizon_s must not exceed reliability_horizon_s"
        );
        anyhow::ensure!(
            self.efficiency_floor <= self.efficiency_peak,
            "efficiency_floor must not exceed efficiency_peak"
        );
        Ok(())
    }
}

/// Which branch of the efficiency curve a horizon falls on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HorizonRegime {
    ShortPlanning,
    Sweet,
    Unreliable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exp1Row {
    pub horizon_s: f64,
    pub regime: HorizonRegime,
    pub link_efficiency: f64,
    pub throughput_mbps: f64,
    pub latency_ms: f64,
    pub prediction_error_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exp1Result {
    pub schema_version: String,
    pub rows: Vec<Exp1Row>,
    pub optimal: Exp1Row,
}

pub fn prediction_error_ms(cfg: &Exp1Config, tau: f64) -> f64 {
    cfg.base_error_ms * (1.0 + tau / cfg.error_growth_scale_s).powi(2)
}

pub fn link_efficiency(cfg: &Exp1Config, tau: f64) -> (HorizonRegime, f64) {
    let (regime, efficiency) = if tau < cfg.min_planning_horizon_s {
        let time_ratio = tau / cfg.min_planning_horizon_s;
        (
            HorizonRegime::ShortPlanning,
            cfg.efficiency_floor + time_ratio * (cfg.efficiency_peak - cfg.efficiency_floor),
        )
    } else if tau < cfg.reliability_horizon_s {
        (HorizonRegime::Sweet, cfg.efficiency_peak)
    } else {
        (
            HorizonRegime::Unreliable,
            cfg.efficiency_peak - (tau - cfg.reliability_horizon_s) / cfg.efficiency_decay_span_s,
        )
    };
    (regime, efficiency.max(0.0))
}

/// Evaluates the model at a single horizon. Assumes a validated config.
pub fn simulate_horizon(cfg: &Exp1Config, tau: f64) -> Exp1Row {
    let error = prediction_error_ms(cfg, tau);
    let (regime, efficiency) = link_efficiency(cfg, tau);

    let base_throughput = cfg.link_capacity_mbps * cfg.utilization_ceiling;
    let error_penalty = error / cfg.error_penalty_scale_ms;
    let throughput = (base_throughput * efficiency * (1.0 - error_penalty)).max(0.0);

    // mispredictions show up as extra queueing
    let latency = cfg.base_latency_ms + error * cfg.latency_error_factor;

    Exp1Row {
        horizon_s: tau,
        regime,
        link_efficiency: efficiency,
        throughput_mbps: throughput,
        latency_ms: latency,
        prediction_error_ms: error,
    }
}

fn select_optimal(rows: &[Exp1Row]) -> Option<&Exp1Row> {
    let mut best: Option<&Exp1Row> = None;
    for row in rows {
        match best {
            Some(current) if row.throughput_mbps <= current.throughput_mbps => {}
            _ => best = Some(row),
        }
    }
    best
}

pub async fn run_exp1(cfg: &Exp1Config) -> anyhow::Result<Exp1Result> {
    cfg.validate()?;
    info!(horizons = cfg.horizons_s.len(), "running prediction horizon sweep");

    let rows = cfg
        .horizons_s
        .iter()
        .map(|&tau| {
            let row = simulate_horizon(cfg, tau);
            debug!(
                horizon_s = tau,
                throughput_mbps = row.throughput_mbps,
                latency_ms = row.latency_ms,
                "evaluated horizon"
            );
            row
        })
        .collect::<Vec<_>>();

    let optimal = select_optimal(&rows)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no horizons evaluated"))?;
    info!(
        optimal_horizon_s = optimal.horizon_s,
        throughput_mbps = optimal.throughput_mbps,
        "prediction horizon sweep complete"
    );

    Ok(Exp1Result {
        schema_version: SCHEMA_VERSION.to_string(),
        rows,
        optimal,
    })
}
