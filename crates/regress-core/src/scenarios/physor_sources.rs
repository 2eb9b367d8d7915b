//! Two fuel sources supplying three reactors
//!
//! From the Cyclus PHYSOR 2014 publication. Reactors are deployed one per
//! step; the MOX source is preferred and the UOX source only fills the gaps.

use std::path::Path;

use crate::aggregate::{quantity_per_step, TransactionFilter};
use crate::check::{
    expect_all_almost_eq, expect_eq, CheckFailure, CheckOutcome, CheckResult, DEFAULT_DECIMAL,
};
use crate::dataset::ResultDataset;
use crate::records::AgentId;
use crate::resolver::AgentLabel;

use super::{run_with_roles, Check, Scenario};

const INPUT: &str = "input/physor/2_Sources_3_Reactors.xml";
const REACTOR: &str = ":cycamore:Reactor";
const SOURCE: &str = ":cycamore:Source";

const HORIZON: usize = 5;

struct Roles {
    reactors: [AgentId; 3],
    mox_source: AgentId,
    uox_source: AgentId,
}

const CHECKS: [Check<Roles>; 4] = [
    ("rxtr_deployment", rxtr_deployment),
    ("rxtr1_xactions", rxtr1_xactions),
    ("rxtr2_xactions", rxtr2_xactions),
    ("rxtr3_xactions", rxtr3_xactions),
];

pub struct PhysorSources;

impl Scenario for PhysorSources {
    fn name(&self) -> &'static str {
        "physor-sources"
    }

    fn description(&self) -> &'static str {
        "2 sources, 3 reactors: staggered deployment and MOX/UOX receipts per reactor"
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

/// The MOX source is whichever source sent the first recorded transaction
fn resolve(dataset: &ResultDataset) -> Result<Roles, CheckFailure> {
    let reactor_ids = dataset.agents_matching(AgentLabel::Spec, REACTOR);
    let reactors: [AgentId; 3] = reactor_ids.as_slice().try_into().map_err(|_| {
        CheckFailure::new(format!("expected 3 reactors, found {}", reactor_ids.len()))
    })?;

    let mox_source = dataset
        .transactions()
        .first()
        .map(|tx| tx.sender_id)
        .ok_or_else(|| CheckFailure::new("no transactions recorded"))?;

    let mut sources = dataset.agents_matching(AgentLabel::Spec, SOURCE);
    let position = sources.iter().position(|&s| s == mox_source).ok_or_else(|| {
        CheckFailure::new(format!("first sender {} is not a source", mox_source))
    })?;
    sources.remove(position);

    let uox_source = sources
        .first()
        .copied()
        .ok_or_else(|| CheckFailure::new("no second source"))?;

    Ok(Roles {
        reactors,
        mox_source,
        uox_source,
    })
}

fn rxtr_deployment(roles: &Roles, dataset: &ResultDataset) -> CheckResult {
    for (i, &reactor) in roles.reactors.iter().enumerate() {
        let what = format!("reactor {} enter time", i + 1);
        expect_eq(&what, i as i64 + 1, dataset.enter_time(reactor)?)?;
    }
    Ok(())
}

/// Receipts of one reactor from the MOX and the UOX source
fn receipts(
    roles: &Roles,
    dataset: &ResultDataset,
    reactor: usize,
    mox: [f64; HORIZON],
    uox: [f64; HORIZON],
) -> CheckResult {
    let receiver = roles.reactors[reactor];

    for (source, label, expected) in [
        (roles.mox_source, "MOX", mox),
        (roles.uox_source, "UOX", uox),
    ] {
        let filter = TransactionFilter::any().sender(source).receiver(receiver);
        let observed = quantity_per_step(dataset, &filter, HORIZON)?;
        let what = format!("reactor {} {} receipts", reactor + 1, label);
        expect_all_almost_eq(&what, &expected, &observed, DEFAULT_DECIMAL)?;
    }
    Ok(())
}

fn rxtr1_xactions(roles: &Roles, dataset: &ResultDataset) -> CheckResult {
    receipts(roles, dataset, 0, [0.0, 1.0, 1.0, 1.0, 0.0], [0.0, 0.0, 0.0, 0.0, 1.0])
}

fn rxtr2_xactions(roles: &Roles, dataset: &ResultDataset) -> CheckResult {
    receipts(roles, dataset, 1, [0.0, 0.0, 1.0, 1.0, 1.0], [0.0; HORIZON])
}

fn rxtr3_xactions(roles: &Roles, dataset: &ResultDataset) -> CheckResult {
    receipts(roles, dataset, 2, [0.0, 0.0, 0.0, 0.5, 1.0], [0.0, 0.0, 0.0, 0.5, 0.0])
}
