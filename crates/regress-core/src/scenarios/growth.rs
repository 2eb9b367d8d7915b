//! Demand-driven deployment in a growth region
//!
//! Linear demand `y = x + 2` over four steps, with two source prototypes of
//! capacity 2 (`Source2`) and 1.1 (`Source1`) on offer. One `Source2` is built
//! at step 1, then one `Source1` at each of steps 2 and 3.

use std::path::Path;

use crate::check::{expect_eq, CheckFailure, CheckOutcome, CheckResult};
use crate::dataset::ResultDataset;
use crate::records::AgentId;
use crate::resolver::AgentLabel;

use super::{nth, run_with_roles, Check, Scenario};

const INPUT: &str = "input/growth.xml";

struct Roles {
    source1: Vec<AgentId>,
    source2: Vec<AgentId>,
}

const CHECKS: [Check<Roles>; 1] = [("deployment", deployment)];

pub struct Growth;

impl Scenario for Growth {
    fn name(&self) -> &'static str {
        "growth"
    }

    fn description(&self) -> &'static str {
        "growth region with linear demand: which source prototype is built when"
    }

    fn input_path(&self) -> &Path {
        Path::new(INPUT)
    }

    fn check_names(&self) -> Vec<&'static str> {
        CHECKS.iter().map(|(name, _)| *name).collect()
    }

    fn run_checks(&self, dataset: &ResultDataset) -> Vec<CheckOutcome> {
        run_with_roles(dataset, resolve, &CHECKS)
    }
}

fn resolve(dataset: &ResultDataset) -> Result<Roles, CheckFailure> {
    Ok(Roles {
        source1: dataset.agents_matching(AgentLabel::Prototype, "Source1"),
        source2: dataset.agents_matching(AgentLabel::Prototype, "Source2"),
    })
}

fn deployment(roles: &Roles, dataset: &ResultDataset) -> CheckResult {
    expect_eq("Source2 count", 1, roles.source2.len())?;
    expect_eq("Source1 count", 2, roles.source1.len())?;

    for (ids, index, label, enter) in [
        (&roles.source2, 0, "Source2", 1),
        (&roles.source1, 0, "Source1", 2),
        (&roles.source1, 1, "Source1", 3),
    ] {
        let agent = nth(ids, index, label)?;
        expect_eq(
            &format!("{} #{} enter time", label, index + 1),
            enter,
            dataset.enter_time(agent)?,
        )?;
    }
    Ok(())
}
