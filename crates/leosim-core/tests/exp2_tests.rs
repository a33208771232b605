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

use leosim_core::experiments::exp2::{
    run_exp2, simulate_cycle, DivergenceModel, DivergencePhase, Exp2Config, SCHEMA_VERSION,
};
use leosim_core::report::render_exp2;
use proptest::prelude::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn key_cycles_match_observed_anchors() {
    let r = run_exp2(&Exp2Config::default())
        .await
        .unwrap_or_else(|e| panic!("exp2 should run: {e}"));

    assert_eq!(r.schema_version, SCHEMA_VERSION);
    let cycles = r.unmitigated.iter().map(|s| s.cycle).collect::<Vec<_>>();
    assert_eq!(cycles, vec![0, 50, 65, 100]);

    // (divergence, fairness)
    let expected = [(0.0, 0.96), (0.42, 0.71), (0.5295, 0.4805), (1.1215, 0.1895)];
    for (state, (d, j)) in r.unmitigated.iter().zip(expected) {
        assert!(close(state.divergence, d), "D at cycle {}", state.cycle);
        assert!(close(state.fairness, j), "J at cycle {}", state.cycle);
    }
    assert_eq!(r.unmitigated[3].phase, DivergencePhase::Collapse);
}

#[tokio::test]
async fn mitigation_recovers_fairness_at_cycle_100() {
    let r = run_exp2(&Exp2Config::default())
        .await
        .unwrap_or_else(|e| panic!("exp2 should run: {e}"));
    let cmp = &r.comparison;

    assert_eq!(cmp.cycle, 100);
    assert!(close(cmp.with.divergence, 0.19));
    assert!(close(cmp.with.fairness, 0.91));
    assert!(cmp.with.divergence < cmp.without.divergence);
    assert!(cmp.with.fairness > cmp.without.fairness);

    let reduction = cmp
        .divergence_reduction_pct
        .unwrap_or_else(|| panic!("divergence reduction should be defined"));
    let gain = cmp
        .fairness_gain_pct
        .unwrap_or_else(|| panic!("fairness gain should be defined"));
    assert!((reduction - 83.058_403_923_316_99).abs() < 1e-6, "{reduction}");
    assert!((gain - 380.211_081_794_195_3).abs() < 1e-6, "{gain}");
}

#[tokio::test]
async fn report_matches_console_layout() {
    let r = run_exp2(&Exp2Config::default())
        .await
        .unwrap_or_else(|e| panic!("exp2 should run: {e}"));
    let report = render_exp2(&r);

    assert!(report.starts_with(
        "Experiment 2: Fairness Under Model Divergence\n\nWITHOUT MITIGATIONS:\n----------------------------------------\n\n"
    ));
    assert!(report.contains("Cycle 0:\nModel Divergence (D): 0.00\nFairness (J): 0.96\n"));
    assert!(report.contains("Cycle 65:\nModel Divergence (D): 0.53\nFairness (J): 0.48\n"));
    assert!(report.contains(
        "Cycle 100 - WITHOUT mitigations:\nModel Divergence (D): 1.12\nFairness (J): 0.19\n"
    ));
    assert!(report.contains(
        "Cycle 100 - WITH mitigations:\nModel Divergence (D): 0.19\nFairness (J): 0.91\n"
    ));
    assert!(report.contains("Divergence: 1.12 -> 0.19 (-83.1%)\n"));
    assert!(report.ends_with("Fairness: 0.19 -> 0.91 (+380.2%)\n"));
}

#[tokio::test]
async fn rejects_empty_key_cycles() {
    let err = run_exp2(&Exp2Config {
        key_cycles: vec![],
        ..Exp2Config::default()
    })
    .await
    .expect_err("empty key cycles must be rejected");
    assert!(
        err.to_string().contains("key_cycles must not be empty"),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn rejects_inverted_phase_boundaries() {
    let err = run_exp2(&Exp2Config {
        model: DivergenceModel {
            gradual_end_cycle: 70,
            threshold_end_cycle: 65,
            ..DivergenceModel::default()
        },
        ..Exp2Config::default()
    })
    .await
    .expect_err("inverted boundaries must be rejected");
    assert!(
        err.to_string()
            .contains("gradual_end_cycle must be less than threshold_end_cycle"),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn rejects_non_finite_model_constants() {
    let err = run_exp2(&Exp2Config {
        model: DivergenceModel {
            collapse_divergence_rate: f64::INFINITY,
            ..DivergenceModel::default()
        },
        ..Exp2Config::default()
    })
    .await
    .expect_err("non-finite constant must be rejected");
    assert!(
        err.to_string()
            .contains("collapse_divergence_rate must be finite"),
        "unexpected error: {err}"
    );
}

proptest! {
    #[test]
    fn unmitigated_divergence_rises_and_fairness_falls(a in 0u32..500, b in 0u32..500) {
        prop_assume!(a < b);
        let m = DivergenceModel::default();
        let early = simulate_cycle(&m, a, false);
        let late = simulate_cycle(&m, b, false);

        prop_assert!(late.divergence >= early.divergence);
        prop_assert!(late.fairness <= early.fairness);
    }

    #[test]
    fn fairness_and_divergence_respect_floors_and_caps(cycle in 0u32..10_000) {
        let m = DivergenceModel::default();
        let unmitigated = simulate_cycle(&m, cycle, false);
        let mitigated = simulate_cycle(&m, cycle, true);

        prop_assert!(unmitigated.fairness >= m.collapse_fairness_floor);
        prop_assert!(unmitigated.fairness <= m.initial_fairness);
        prop_assert!(mitigated.divergence <= m.mitigated_divergence_cap);
        prop_assert!(mitigated.fairness >= m.mitigated_fairness_floor);
        prop_assert!(mitigated.fairness >= unmitigated.fairness);
    }
}
