use std::{fs, path::Path};

use anyhow::Context;
use leosim_core::experiments::exp1::Exp1Result;
use leosim_core::{run_experiment, ExperimentId, ExperimentOutput, SuiteConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::figure::render_figure1_png;

pub const FIGURE1_FILE_NAME: &str = "figure1_prediction_horizon.json";
pub const FIGURE1_PNG_FILE_NAME: &str = "figure1_prediction_horizon.png";
pub const INDEX_FILE_NAME: &str = "index.json";

/// Plot-ready series for the throughput and latency panels of figure 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Figure1Series {
    pub schema_version: String,
    pub x_label: String,
    pub horizons_s: Vec<f64>,
    pub throughput_label: String,
    pub throughput_mbps: Vec<f64>,
    pub latency_label: String,
    pub latency_ms: Vec<f64>,
    pub optimal_horizon_s: f64,
}

impl Figure1Series {
    pub fn from_result(result: &Exp1Result) -> Self {
        Self {
            schema_version: "leosim.figure1.v1".to_string(),
            x_label: "Prediction Horizon T (seconds)".to_string(),
            horizons_s: result.rows.iter().map(|r| r.horizon_s).collect(),
            throughput_label: "Throughput (Mbps)".to_string(),
            throughput_mbps: result.rows.iter().map(|r| r.throughput_mbps).collect(),
            latency_label: "Latency (ms)".to_string(),
            latency_ms: result.rows.iter().map(|r| r.latency_ms).collect(),
            optimal_horizon_s: result.optimal.horizon_s,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuiteIndexEntry {
    pub experiment: ExperimentId,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuiteIndex {
    pub schema_version: String,
    pub entries: Vec<SuiteIndexEntry>,
    pub figure1_path: String,
    pub figure1_png_path: String,
}

pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create artifact dir {}", parent.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes).with_context(|| format!("write artifact {}", path.display()))?;
    Ok(())
}

/// Writes the result file for `output` (plus the figure series and its PNG
/// rendering for the prediction horizon sweep) and returns the file names
/// written.
pub fn write_experiment_artifacts(
    out_dir: &Path,
    output: &ExperimentOutput,
) -> anyhow::Result<Vec<String>> {
    let result_name = output.id().artifact_file_name();
    let mut written = Vec::with_capacity(3);

    match output {
        ExperimentOutput::PredictionHorizon(result) => {
            write_json_file(&out_dir.join(&result_name), result)?;
            written.push(result_name);
            let figure = Figure1Series::from_result(result);
            write_json_file(&out_dir.join(FIGURE1_FILE_NAME), &figure)?;
            written.push(FIGURE1_FILE_NAME.to_string());
            render_figure1_png(&out_dir.join(FIGURE1_PNG_FILE_NAME), &figure)?;
            written.push(FIGURE1_PNG_FILE_NAME.to_string());
        }
        ExperimentOutput::FairnessDivergence(result) => {
            write_json_file(&out_dir.join(&result_name), result)?;
            written.push(result_name);
        }
    }

    info!(out_dir = %out_dir.display(), files = ?written, "wrote artifacts");
    Ok(written)
}

pub async fn run_suite(out_dir: &Path, cfg: &SuiteConfig) -> anyhow::Result<SuiteIndex> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create suite dir {}", out_dir.display()))?;

    let mut entries = Vec::new();
    for id in ExperimentId::all() {
        let output = run_experiment(id, cfg)
            .await
            .with_context(|| format!("run experiment {id}"))?;
        write_experiment_artifacts(out_dir, &output)?;
        entries.push(SuiteIndexEntry {
            experiment: id,
            path: id.artifact_file_name(),
        });
    }

    let index = SuiteIndex {
        schema_version: "leosim.suite.index.v1".to_string(),
        entries,
        figure1_path: FIGURE1_FILE_NAME.to_string(),
        figure1_png_path: FIGURE1_PNG_FILE_NAME.to_string(),
    };
    write_json_file(&out_dir.join(INDEX_FILE_NAME), &index)?;
    Ok(index)
}
