//! Capacity constraints under a changing facility population
//!
//! Every source offers one unit and every sink requests one unit, so the
//! number of trades per step is bounded by whichever side is smaller:
//!
//! - step 1: 3 sources, 2 sinks - 2 trades
//! - step 2: 3 sources, 4 sinks - 3 trades
//! - step 3: 3 sources, 2 sinks after the first two sinks are decommissioned - 2 trades

use std::path::Path;

use crate::aggregate::{count_per_step, quantity_per_step, TransactionFilter};
use crate::check::{
    expect_all_almost_eq, expect_eq, expect_true, CheckFailure, CheckOutcome, CheckResult,
    DEFAULT_DECIMAL,
};
use crate::dataset::ResultDataset;
use crate::records::AgentId;
use crate::resolver::AgentLabel;

use super::{nth, run_with_roles, Check, Scenario};

const INPUT: &str = "input/dynamic_capacitated.xml";
const SOURCE: &str = ":agents:Source";
const SINK: &str = ":agents:Sink";

const HORIZON: usize = 4;
const TOTAL_TRANSACTIONS: usize = 7;
const EXPECTED_PER_STEP: [usize; HORIZON] = [0, 2, 3, 2];

struct Roles {
    sources: Vec<AgentId>,
    sinks: Vec<AgentId>,
}

const CHECKS: [Check<Roles>; 4] = [
    ("source_deployment", source_deployment),
    ("sink_deployment", sink_deployment),
    ("xaction_general", xaction_general),
    ("xaction_specific", xaction_specific),
];

pub struct DynamicCapacitated;

impl Scenario for DynamicCapacitated {
    fn name(&self) -> &'static str {
        "dynamic-capacitated"
    }

    fn description(&self) -> &'static str {
        "3 sources, 4 staggered sinks: trade counts limited by the smaller side each step"
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
        sources: dataset.agents_matching(AgentLabel::Spec, SOURCE),
        sinks: dataset.agents_matching(AgentLabel::Spec, SINK),
    })
}

fn source_deployment(roles: &Roles, dataset: &ResultDataset) -> CheckResult {
    expect_eq("source count", 3, roles.sources.len())?;
    for &source in &roles.sources {
        expect_eq(
            &format!("source {} enter time", source),
            1,
            dataset.enter_time(source)?,
        )?;
    }
    Ok(())
}

fn sink_deployment(roles: &Roles, dataset: &ResultDataset) -> CheckResult {
    expect_eq("sink count", 4, roles.sinks.len())?;

    // first pair lives for step 1 only, second pair for step 2 only
    for (index, enter, exit) in [(0, 1, 2), (1, 1, 2), (2, 2, 3), (3, 2, 3)] {
        let sink = nth(&roles.sinks, index, "sink")?;
        expect_eq(
            &format!("sink {} enter time", sink),
            enter,
            dataset.enter_time(sink)?,
        )?;
        expect_eq(
            &format!("sink {} exit time", sink),
            Some(exit),
            dataset.exit_time(sink),
        )?;
    }
    Ok(())
}

fn xaction_general(roles: &Roles, dataset: &ResultDataset) -> CheckResult {
    for tx in dataset.transactions() {
        expect_true(
            &format!("sender {} is not a source", tx.sender_id),
            roles.sources.contains(&tx.sender_id),
        )?;
        expect_true(
            &format!("receiver {} is not a sink", tx.receiver_id),
            roles.sinks.contains(&tx.receiver_id),
        )?;
    }

    expect_eq(
        "transaction count",
        TOTAL_TRANSACTIONS,
        dataset.transactions().len(),
    )?;
    let counts = count_per_step(dataset, &TransactionFilter::any(), HORIZON)?;
    expect_eq("transactions per step", &EXPECTED_PER_STEP[1..], &counts[1..])
}

fn xaction_specific(_: &Roles, dataset: &ResultDataset) -> CheckResult {
    let quantities = quantity_per_step(dataset, &TransactionFilter::any(), HORIZON)?;
    let expected: Vec<f64> = EXPECTED_PER_STEP.iter().map(|&n| n as f64).collect();
    expect_all_almost_eq(
        "quantity per step",
        &expected[1..],
        &quantities[1..],
        DEFAULT_DECIMAL,
    )
}
