//! Regression scenarios
//!
//! Each scenario declares the input file it drives the simulator with, resolves
//! the agents that play its roles, and runs a set of independent checks over
//! the loaded dataset. A failing check never stops its siblings; a failed role
//! resolution fails every check, like a fixture whose setup raised.

use std::path::Path;

use crate::check::{CheckFailure, CheckOutcome, CheckResult};
use crate::dataset::ResultDataset;
use crate::records::AgentId;

pub mod dynamic_capacitated;
pub mod growth;
pub mod physor_enrichment;
pub mod physor_sources;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dynamic_capacitated::DynamicCapacitated;
pub use growth::Growth;
pub use physor_enrichment::PhysorEnrichment;
pub use physor_sources::PhysorSources;

/// One simulator input and the invariants its output must satisfy
pub trait Scenario: Send + Sync {
    /// Stable identifier used on the command line
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Input file, relative to the simulator working directory
    fn input_path(&self) -> &Path;

    /// Names of the checks, in the order they run
    fn check_names(&self) -> Vec<&'static str>;

    fn run_checks(&self, dataset: &ResultDataset) -> Vec<CheckOutcome>;
}

/// Every registered scenario
pub fn all() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(PhysorEnrichment),
        Box::new(PhysorSources),
        Box::new(DynamicCapacitated),
        Box::new(Growth),
    ]
}

/// Look up a registered scenario by name
pub fn find(name: &str) -> Option<Box<dyn Scenario>> {
    all().into_iter().find(|s| s.name() == name)
}

// ----------------------------------------------------------------------------
// Helpers for scenario implementations
// ----------------------------------------------------------------------------

/// A named check over resolved roles `R`
pub(crate) type Check<R> = (&'static str, fn(&R, &ResultDataset) -> CheckResult);

/// Resolve roles once, then run every check independently
pub(crate) fn run_with_roles<R>(
    dataset: &ResultDataset,
    resolve: impl FnOnce(&ResultDataset) -> Result<R, CheckFailure>,
    checks: &[Check<R>],
) -> Vec<CheckOutcome> {
    match resolve(dataset) {
        Ok(roles) => checks
            .iter()
            .map(|(name, check)| CheckOutcome::from_result(name, check(&roles, dataset)))
            .collect(),
        Err(failure) => {
            let failure = CheckFailure::new(format!("role resolution failed: {}", failure));
            checks
                .iter()
                .map(|(name, _)| CheckOutcome::from_result(name, Err(failure.clone())))
                .collect()
        }
    }
}

/// The `index`-th agent of a role, failing if the role has too few agents
pub(crate) fn nth(ids: &[AgentId], index: usize, role: &str) -> Result<AgentId, CheckFailure> {
    ids.get(index).copied().ok_or_else(|| {
        CheckFailure::new(format!(
            "no {} #{}: only {} matched",
            role,
            index + 1,
            ids.len()
        ))
    })
}
