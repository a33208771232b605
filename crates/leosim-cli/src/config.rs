use std::{fs, path::Path};

use anyhow::Context;
use leosim_core::SuiteConfig;

/// Loads experiment configuration from an optional JSON file. Without a file,
/// every experiment runs with its defaults.
pub fn load_suite_config(path: Option<&Path>) -> anyhow::Result<SuiteConfig> {
    let Some(path) = path else {
        return Ok(SuiteConfig::default());
    };
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse config {}", path.display()))
}
