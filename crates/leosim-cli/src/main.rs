#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use leosim_cli::{
    artifacts::{run_suite, write_experiment_artifacts},
    config::load_suite_config,
};
use leosim_core::{render_report, run_experiment, ExperimentId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leosim")]
#[command(version)]
#[command(about = "Reproducible LEO network experiments")]
struct Args {
    #[arg(long, default_value = "info")]
    log: String,
    /// JSON file with per-experiment overrides
    #[arg(long, env = "LEOSIM_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available experiments
    List,
    /// Run one experiment by name
    Run {
        /// prediction_horizon or fairness_divergence
        experiment: String,
        /// Print the result as JSON instead of the text report
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Directory for the experiment's artifacts
        #[arg(long, env = "LEOSIM_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
        /// Only print the report; write no artifacts
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Run every experiment and write all artifacts plus an index
    Suite {
        #[arg(long, default_value = "artifacts")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(args.log))
        .with_writer(std::io::stderr)
        .init();

    match args.cmd {
        Command::List => {
            for id in ExperimentId::all() {
                println!("{}\t{}\t{}", id.number(), id.name(), id.title());
            }
        }
        Command::Run {
            experiment,
            json,
            out_dir,
            no_save,
        } => {
            let id: ExperimentId = experiment.parse()?;
            let cfg = load_suite_config(args.config.as_deref())?;
            info!(experiment = %id, "running experiment");

            let output = run_experiment(id, &cfg)
                .await
                .with_context(|| format!("run experiment {id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{}", render_report(&output));
            }

            if !no_save {
                for name in write_experiment_artifacts(&out_dir, &output)? {
                    let saved = out_dir.join(name);
                    // keep stdout parseable under --json
                    if json {
                        eprintln!("Saved: {}", saved.display());
                    } else {
                        println!("Saved: {}", saved.display());
                    }
                }
            }
        }
        Command::Suite { out_dir } => {
            let cfg = load_suite_config(args.config.as_deref())?;
            let index = run_suite(&out_dir, &cfg).await?;
            println!("{}", serde_json::to_string_pretty(&index)?);
        }
    }

    Ok(())
}
