//! One enrichment facility feeding two reactors
//!
//! From the Cyclus PHYSOR 2014 publication. Checks the number of key
//! facilities, the enrichment bookkeeping and the fuel each reactor receives.

use std::path::Path;

use crate::aggregate::{quantity_per_step, sum_per_step, TransactionFilter};
use crate::check::{expect_all_almost_eq, expect_eq, CheckFailure, CheckOutcome, CheckResult};
use crate::dataset::ResultDataset;
use crate::records::{AgentId, EnrichmentRecord};
use crate::resolver::AgentLabel;

use super::{nth, run_with_roles, Check, Scenario};

const INPUT: &str = "input/physor/1_Enrichment_2_Reactor.xml";
const REACTOR: &str = ":cycamore:Reactor";
const ENRICHMENT: &str = ":cycamore:EnrichmentFacility";

const HORIZON: usize = 4;
const DECIMAL: u32 = 2;

// Reference values for the current Reactor archetype; the retired
// BatchReactor gave natural uranium [13.03, 16.54, 7.83, 13.03].
const EXPECTED_SWU: [f64; HORIZON] = [6.9, 10.0, 4.14, 6.9];
const EXPECTED_NATURAL_URANIUM: [f64; HORIZON] = [13.03, 16.55, 7.82, 13.03];
const EXPECTED_REACTOR1_RECEIPTS: [f64; HORIZON] = [1.0, 1.0, 1.0, 1.0];
const EXPECTED_REACTOR2_RECEIPTS: [f64; HORIZON] = [1.0, 0.8, 0.2, 1.0];

struct Roles {
    reactors: Vec<AgentId>,
    enrichment: Vec<AgentId>,
}

const CHECKS: [Check<Roles>; 4] = [
    ("deploy", deploy),
    ("swu", swu),
    ("natural_uranium", natural_uranium),
    ("xactions", xactions),
];

pub struct PhysorEnrichment;

impl Scenario for PhysorEnrichment {
    fn name(&self) -> &'static str {
        "physor-enrichment"
    }

    fn description(&self) -> &'static str {
        "1 enrichment facility, 2 reactors: facility counts, SWU, natural uranium, reactor receipts"
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
        reactors: dataset.agents_matching(AgentLabel::Spec, REACTOR),
        enrichment: dataset.agents_matching(AgentLabel::Spec, ENRICHMENT),
    })
}

fn enrichments(dataset: &ResultDataset) -> Result<&[EnrichmentRecord], CheckFailure> {
    dataset
        .enrichments()
        .ok_or_else(|| CheckFailure::new("Enrichments table is absent"))
}

fn deploy(roles: &Roles, _: &ResultDataset) -> CheckResult {
    expect_eq("reactor count", 2, roles.reactors.len())?;
    expect_eq("enrichment facility count", 1, roles.enrichment.len())
}

fn swu(_: &Roles, dataset: &ResultDataset) -> CheckResult {
    let observed = sum_per_step(enrichments(dataset)?, HORIZON, |r| r.time, |r| r.swu)?;
    expect_all_almost_eq("SWU per step", &EXPECTED_SWU, &observed, DECIMAL)
}

fn natural_uranium(_: &Roles, dataset: &ResultDataset) -> CheckResult {
    let observed = sum_per_step(
        enrichments(dataset)?,
        HORIZON,
        |r| r.time,
        |r| r.natural_uranium,
    )?;
    expect_all_almost_eq(
        "natural uranium per step",
        &EXPECTED_NATURAL_URANIUM,
        &observed,
        DECIMAL,
    )
}

fn xactions(roles: &Roles, dataset: &ResultDataset) -> CheckResult {
    let first = nth(&roles.reactors, 0, "reactor")?;
    let observed = quantity_per_step(dataset, &TransactionFilter::any().receiver(first), HORIZON)?;
    expect_all_almost_eq(
        "first reactor receipts",
        &EXPECTED_REACTOR1_RECEIPTS,
        &observed,
        DECIMAL,
    )?;

    let second = nth(&roles.reactors, 1, "reactor")?;
    let observed = quantity_per_step(dataset, &TransactionFilter::any().receiver(second), HORIZON)?;
    expect_all_almost_eq(
        "second reactor receipts",
        &EXPECTED_REACTOR2_RECEIPTS,
        &observed,
        DECIMAL,
    )
}
