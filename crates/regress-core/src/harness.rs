//! Scenario harness: run, load, clean up
//!
//! A [`ScenarioHarness`] moves through four states:
//!
//! 1. constructed - artifact path generated, input possibly not yet declared
//! 2. running     - simulator invoked against the input
//! 3. loaded      - dataset materialised and available through [`ScenarioHarness::dataset`]
//! 4. torn down   - artifact removed
//!
//! The artifact is owned by an [`ArtifactGuard`], so it is removed on every
//! exit path: explicit teardown, early return on error, a panicking check, or
//! the harness future being dropped mid-run.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::check::ScenarioReport;
use crate::config::HarnessConfig;
use crate::dataset::ResultDataset;
use crate::errors::{ConfigError, HarnessError};
use crate::execution::{ProcessSimulator, Simulator};
use crate::scenarios::Scenario;

// ----------------------------------------------------------------------------
// Artifact Guard
// ----------------------------------------------------------------------------

/// Owns an output artifact path and removes the file when dropped
#[derive(Debug)]
pub struct ArtifactGuard {
    path: PathBuf,
}

impl ArtifactGuard {
    /// Guard a fresh, collision-resistant artifact name inside `dir`
    pub fn generate(dir: &Path, extension: &str) -> Self {
        let name = format!("{}.{}", Uuid::new_v4(), extension);
        Self {
            path: dir.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the artifact if it exists
    ///
    /// Returns whether a file was removed. A missing file is not an error, so
    /// this may be called any number of times.
    pub fn release(&self) -> io::Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("removing {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to remove artifact {}: {}", self.path.display(), e);
        }
    }
}

// ----------------------------------------------------------------------------
// Scenario Harness
// ----------------------------------------------------------------------------

/// Base fixture for one scenario run
pub struct ScenarioHarness {
    simulator: Arc<dyn Simulator>,
    input_path: Option<PathBuf>,
    artifact: ArtifactGuard,
    dataset: Option<ResultDataset>,
}

impl ScenarioHarness {
    /// Harness driving the configured simulator process
    pub fn new(config: &HarnessConfig) -> Self {
        let simulator = Arc::new(ProcessSimulator::new(config.simulator.clone()));
        Self::with_simulator(config, simulator)
    }

    /// Harness driving an arbitrary [`Simulator`]
    pub fn with_simulator(config: &HarnessConfig, simulator: Arc<dyn Simulator>) -> Self {
        let artifact = ArtifactGuard::generate(&config.artifact_dir(), &config.artifacts.extension);
        debug!("Scenario artifact will be {}", artifact.path().display());

        Self {
            simulator,
            input_path: None,
            artifact,
            dataset: None,
        }
    }

    /// Declare the scenario input file
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input_path = Some(input.into());
        self
    }

    pub fn set_input(&mut self, input: impl Into<PathBuf>) {
        self.input_path = Some(input.into());
    }

    pub fn input_path(&self) -> Option<&Path> {
        self.input_path.as_deref()
    }

    pub fn artifact_path(&self) -> &Path {
        self.artifact.path()
    }

    /// Run the simulator and load its output
    ///
    /// On any failure the artifact is removed before the error is returned.
    pub async fn setup(&mut self) -> Result<&ResultDataset, HarnessError> {
        let input = self
            .input_path
            .clone()
            .ok_or(HarnessError::Configuration(ConfigError::MissingInput))?;

        // a repeated setup starts from a clean slate
        self.dataset = None;
        self.teardown()?;

        let loaded = match self.simulator.run(&input, self.artifact.path()).await {
            Ok(()) => ResultDataset::load(self.artifact.path()).map_err(HarnessError::from),
            Err(e) => Err(e.into()),
        };

        match loaded {
            Ok(dataset) => Ok(self.dataset.insert(dataset)),
            Err(e) => {
                if let Err(cleanup) = self.teardown() {
                    warn!("{}", cleanup);
                }
                Err(e)
            }
        }
    }

    /// The loaded dataset
    pub fn dataset(&self) -> Result<&ResultDataset, HarnessError> {
        self.dataset.as_ref().ok_or(HarnessError::NotLoaded)
    }

    /// Remove the artifact; safe to call repeatedly
    pub fn teardown(&mut self) -> Result<(), HarnessError> {
        self.artifact
            .release()
            .map(|_| ())
            .map_err(|source| HarnessError::Cleanup {
                path: self.artifact.path().to_path_buf(),
                source,
            })
    }

    /// Set up, run every check of `scenario`, tear down
    pub async fn run_checks(&mut self, scenario: &dyn Scenario) -> Result<ScenarioReport, HarnessError> {
        let started = Instant::now();
        if self.input_path.is_none() {
            self.set_input(scenario.input_path());
        }

        info!("Running scenario: {}", scenario.name());
        let checks = match self.setup().await {
            Ok(dataset) => scenario.run_checks(dataset),
            Err(e) => {
                // the setup error takes precedence over a cleanup error
                if let Err(cleanup) = self.teardown() {
                    warn!("{}", cleanup);
                }
                return Err(e);
            }
        };
        self.teardown()?;

        let report = ScenarioReport {
            scenario: scenario.name().to_string(),
            checks,
            duration: started.elapsed(),
        };

        if report.passed() {
            info!("Scenario {} passed", scenario.name());
        } else {
            warn!(
                "Scenario {} failed {} of {} checks",
                scenario.name(),
                report.failures().count(),
                report.checks.len()
            );
        }
        Ok(report)
    }
}

/// Run one scenario against the configured simulator
pub async fn run_scenario(
    config: &HarnessConfig,
    scenario: &dyn Scenario,
) -> Result<ScenarioReport, HarnessError> {
    let mut harness = ScenarioHarness::new(config).with_input(scenario.input_path());
    harness.run_checks(scenario).await
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
