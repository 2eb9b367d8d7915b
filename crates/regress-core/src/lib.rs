//! Cyclus Regression Harness
//!
//! Drives the Cyclus simulator with fixed input scenarios, loads the SQLite
//! output it persists, and checks agent lifecycles, resource transfers and
//! computed quantities against expected literal values.
//!
//! The moving parts, leaf-first:
//!
//! - [`execution`] runs the simulator as a subprocess ([`ProcessSimulator`])
//! - [`dataset`] materialises the output tables ([`ResultDataset`])
//! - [`resolver`] maps agent labels to simulator-assigned ids ([`find_ids`])
//! - [`aggregate`] and [`check`] provide per-time-step sums and tolerant comparisons
//! - [`harness`] owns the run/load/cleanup lifecycle ([`ScenarioHarness`])
//! - [`scenarios`] holds the concrete regression fixtures
//!
//! ## Usage
//!
//! ```no_run
//! use regress_core::{run_scenario, scenarios, HarnessConfig};
//!
//! # async fn demo() -> Result<(), regress_core::HarnessError> {
//! let config = HarnessConfig::default();
//! let scenario = scenarios::find("growth").expect("registered scenario");
//! let report = run_scenario(&config, scenario.as_ref()).await?;
//! assert!(report.passed());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod check;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod execution;
pub mod harness;
pub mod records;
pub mod resolver;
pub mod scenarios;

// Re-export main types for convenience
pub use aggregate::{count_per_step, quantity_per_step, sum_per_step, TransactionFilter};
pub use check::{CheckFailure, CheckOutcome, CheckResult, ScenarioReport};
pub use config::{ArtifactConfig, HarnessConfig, SimulatorConfig};
pub use dataset::{DatasetSummary, DatasetTables, ResultDataset};
pub use errors::{ConfigError, DatasetError, ExecutionError, HarnessError};
pub use execution::{ProcessSimulator, Simulator};
pub use harness::{run_scenario, ArtifactGuard, ScenarioHarness};
pub use records::{
    AgentEntryRecord, AgentExitRecord, AgentId, EnrichmentRecord, OpaqueTable, ResourceId,
    ResourceRecord, TransactionRecord,
};
pub use resolver::{find_ids, AgentLabel};
pub use scenarios::Scenario;

/// Version of the harness library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
