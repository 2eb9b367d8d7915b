//! Check outcomes and comparison helpers
//!
//! A check compares expected literals against what the dataset shows. Counts
//! and ids compare exactly; quantities compare with an absolute tolerance of
//! `1.5 * 10^-decimal`, since the simulator's floating-point output may
//! round differently between builds.

use std::fmt::{self, Debug};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::DatasetError;

/// Default number of decimal places for quantity comparisons
pub const DEFAULT_DECIMAL: u32 = 6;

/// A failed expectation within a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct CheckFailure {
    pub message: String,
}

impl CheckFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<DatasetError> for CheckFailure {
    fn from(err: DatasetError) -> Self {
        Self::new(err.to_string())
    }
}

pub type CheckResult = Result<(), CheckFailure>;

// ----------------------------------------------------------------------------
// Comparisons
// ----------------------------------------------------------------------------

/// Exact equality for counts, ids and time steps
pub fn expect_eq<T>(what: &str, expected: T, observed: T) -> CheckResult
where
    T: PartialEq + Debug,
{
    if expected == observed {
        Ok(())
    } else {
        Err(CheckFailure::new(format!(
            "{}: expected {:?}, observed {:?}",
            what, expected, observed
        )))
    }
}

pub fn expect_true(what: &str, condition: bool) -> CheckResult {
    if condition {
        Ok(())
    } else {
        Err(CheckFailure::new(what.to_string()))
    }
}

fn tolerance(decimal: u32) -> f64 {
    1.5 * 10f64.powi(-(decimal as i32))
}

/// Absolute-tolerance equality for a single quantity
pub fn expect_almost_eq(what: &str, expected: f64, observed: f64, decimal: u32) -> CheckResult {
    if (expected - observed).abs() < tolerance(decimal) {
        Ok(())
    } else {
        Err(CheckFailure::new(format!(
            "{}: expected {}, observed {} (decimal={})",
            what, expected, observed, decimal
        )))
    }
}

/// Elementwise absolute-tolerance equality for a time-indexed vector
pub fn expect_all_almost_eq(
    what: &str,
    expected: &[f64],
    observed: &[f64],
    decimal: u32,
) -> CheckResult {
    if expected.len() != observed.len() {
        return Err(CheckFailure::new(format!(
            "{}: expected {} steps, observed {}",
            what,
            expected.len(),
            observed.len()
        )));
    }

    let tol = tolerance(decimal);
    let mismatched: Vec<usize> = expected
        .iter()
        .zip(observed)
        .enumerate()
        .filter(|(_, (e, o))| !((*e - *o).abs() < tol))
        .map(|(i, _)| i)
        .collect();

    if mismatched.is_empty() {
        Ok(())
    } else {
        Err(CheckFailure::new(format!(
            "{}: mismatch at steps {:?} (decimal={})\n  expected: {:?}\n  observed: {:?}",
            what, mismatched, decimal, expected, observed
        )))
    }
}

// ----------------------------------------------------------------------------
// Reporting
// ----------------------------------------------------------------------------

/// Result of one named check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub message: Option<String>,
}

impl CheckOutcome {
    pub fn from_result(name: &str, result: CheckResult) -> Self {
        match result {
            Ok(()) => Self {
                name: name.to_string(),
                passed: true,
                message: None,
            },
            Err(failure) => Self {
                name: name.to_string(),
                passed: false,
                message: Some(failure.message),
            },
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "ok" } else { "FAILED" };
        write!(f, "{} ... {}", self.name, status)?;
        if let Some(message) = &self.message {
            write!(f, "\n    {}", message.replace('\n', "\n    "))?;
        }
        Ok(())
    }
}

/// All check outcomes of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub checks: Vec<CheckOutcome>,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario {}", self.scenario)?;
        for check in &self.checks {
            writeln!(f, "  {}", check)?;
        }
        let failed = self.failures().count();
        write!(
            f,
            "  {} passed, {} failed ({:.2}s)",
            self.checks.len() - failed,
            failed,
            self.duration.as_secs_f64()
        )
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
