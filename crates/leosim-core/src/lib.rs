// Copyright (c) 2026 LEOSim Contributors
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! leosim-core
//!
//! Closed-form models of a low-earth-orbit satellite network, packaged as
//! named experiment units that run without arguments and produce
//! serialisable results plus a console report.

pub mod experiments;
pub mod report;

pub use experiments::{run_experiment, ExperimentId, ExperimentOutput, RegistryError, SuiteConfig};
pub use report::render_report;
