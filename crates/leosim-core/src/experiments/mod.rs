// Copyright (c) 2026 LEOSim Contributors
// SPDX-License-Identifier: Apache-2.0

//! Experiment registry.
//!
//! Every experiment unit has a stable name and runs with no arguments; the
//! configuration it needs comes from [`SuiteConfig`], which defaults every
//! field.

pub mod exp1;
pub mod exp2;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::exp1::{run_exp1, Exp1Config, Exp1Result};
use self::exp2::{run_exp2, Exp2Config, Exp2Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentId {
    PredictionHorizon,
    FairnessDivergence,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown experiment '{name}' (valid: {valid})")]
    UnknownExperiment { name: String, valid: String },
}

impl ExperimentId {
    pub fn all() -> [ExperimentId; 2] {
        [ExperimentId::PredictionHorizon, ExperimentId::FairnessDivergence]
    }

    pub fn name(self) -> &'static str {
        match self {
            ExperimentId::PredictionHorizon => "prediction_horizon",
            ExperimentId::FairnessDivergence => "fairness_divergence",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ExperimentId::PredictionHorizon => "Optimal Prediction Horizon",
            ExperimentId::FairnessDivergence => "Fairness Under Model Divergence",
        }
    }

    pub fn number(self) -> u8 {
        match self {
            ExperimentId::PredictionHorizon => 1,
            ExperimentId::FairnessDivergence => 2,
        }
    }

    /// File name of the JSON artifact this experiment writes.
    pub fn artifact_file_name(self) -> String {
        format!("exp{}_{}.json", self.number(), self.name())
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExperimentId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ExperimentId::all()
            .into_iter()
            .find(|id| {
                normalized == id.name() || normalized == format!("exp{}", id.number())
            })
            .ok_or_else(|| RegistryError::UnknownExperiment {
                name: s.to_string(),
                valid: ExperimentId::all()
                    .iter()
                    .map(|id| id.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Per-experiment configuration. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuiteConfig {
    pub prediction_horizon: Exp1Config,
    pub fairness_divergence: Exp2Config,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "experiment", content = "result", rename_all = "snake_case")]
pub enum ExperimentOutput {
    PredictionHorizon(Exp1Result),
    FairnessDivergence(Exp2Result),
}

impl ExperimentOutput {
    pub fn id(&self) -> ExperimentId {
        match self {
            ExperimentOutput::PredictionHorizon(_) => ExperimentId::PredictionHorizon,
            ExperimentOutput::FairnessDivergence(_) => ExperimentId::FairnessDivergence,
        }
    }
}

pub async fn run_experiment(
    id: ExperimentId,
    cfg: &SuiteConfig,
) -> anyhow::Result<ExperimentOutput> {
    let output = match id {
        ExperimentId::PredictionHorizon => {
            ExperimentOutput::PredictionHorizon(run_exp1(&cfg.prediction_horizon).await?)
        }
        ExperimentId::FairnessDivergence => {
            ExperimentOutput::FairnessDivergence(run_exp2(&cfg.fairness_divergence).await?)
        }
    };
    Ok(output)
}
