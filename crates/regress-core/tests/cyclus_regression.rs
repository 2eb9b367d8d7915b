//! Regression runs against a real Cyclus installation
//!
//! Ignored by default. Run with `--ignored` from a checkout whose working
//! directory (or `CYCLUS_REGRESS_SIMULATOR__WORKING_DIR`) contains the
//! scenario `input/` files. Each test skips when `cyclus` is not on PATH.

use regress_core::{run_scenario, scenarios, HarnessConfig};

async fn regression(name: &str) {
    if which::which("cyclus").is_err() {
        eprintln!("skipping {}: cyclus not found on PATH", name);
        return;
    }

    let config = HarnessConfig::load(None).unwrap();
    let scenario = scenarios::find(name).unwrap();

    let input = config.simulator.working_dir.join(scenario.input_path());
    if !input.exists() {
        eprintln!("skipping {}: {} not found", name, input.display());
        return;
    }

    let report = run_scenario(&config, scenario.as_ref()).await.unwrap();
    assert!(report.passed(), "{}", report);
}

#[tokio::test]
#[ignore = "requires the cyclus executable"]
async fn test_physor_enrichment() {
    regression("physor-enrichment").await;
}

#[tokio::test]
#[ignore = "requires the cyclus executable"]
async fn test_physor_sources() {
    regression("physor-sources").await;
}

#[tokio::test]
#[ignore = "requires the cyclus executable"]
async fn test_dynamic_capacitated() {
    regression("dynamic-capacitated").await;
}

#[tokio::test]
#[ignore = "requires the cyclus executable"]
async fn test_growth() {
    regression("growth").await;
}
