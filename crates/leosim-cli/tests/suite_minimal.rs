use std::fs;

use leosim_cli::artifacts::{run_suite, SuiteIndex};
use leosim_core::{ExperimentId, SuiteConfig};

#[tokio::test]
async fn suite_writes_every_artifact_and_an_index() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("suite");

    let index = run_suite(&out, &SuiteConfig::default())
        .await
        .expect("suite run");

    assert_eq!(index.schema_version, "leosim.suite.index.v1");
    assert_eq!(index.entries.len(), 2);
    assert!(out.join("index.json").exists());
    assert!(out.join("exp1_prediction_horizon.json").exists());
    assert!(out.join("exp2_fairness_divergence.json").exists());
    assert!(out.join("figure1_prediction_horizon.json").exists());
    assert!(out.join("figure1_prediction_horizon.png").exists());

    let on_disk: SuiteIndex = serde_json::from_slice(
        &fs::read(out.join("index.json")).expect("read index"),
    )
    .expect("index should parse");
    assert_eq!(on_disk, index);
    assert_eq!(on_disk.entries[0].experiment, ExperimentId::PredictionHorizon);
    assert_eq!(on_disk.entries[1].experiment, ExperimentId::FairnessDivergence);
}

#[tokio::test]
async fn suite_artifacts_carry_schema_versions() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().to_path_buf();
    run_suite(&out, &SuiteConfig::default())
        .await
        .expect("suite run");

    let exp1: serde_json::Value = serde_json::from_slice(
        &fs::read(out.join("exp1_prediction_horizon.json")).expect("read exp1"),
    )
    .expect("exp1 json");
    assert_eq!(exp1["schema_version"], "leosim.exp1.v1");
    assert_eq!(exp1["optimal"]["horizon_s"], 30.0);

    let exp2: serde_json::Value = serde_json::from_slice(
        &fs::read(out.join("exp2_fairness_divergence.json")).expect("read exp2"),
    )
    .expect("exp2 json");
    assert_eq!(exp2["schema_version"], "leosim.exp2.v1");
    assert_eq!(exp2["comparison"]["cycle"], 100);

    let figure: serde_json::Value = serde_json::from_slice(
        &fs::read(out.join("figure1_prediction_horizon.json")).expect("read figure"),
    )
    .expect("figure json");
    assert_eq!(figure["schema_version"], "leosim.figure1.v1");
    assert_eq!(figure["optimal_horizon_s"], 30.0);

    let png = fs::read(out.join("figure1_prediction_horizon.png")).expect("read figure png");
    assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
}
