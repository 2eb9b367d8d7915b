//! Error types for the regression harness
//!
//! Each infrastructure concern has its own error enum: configuration,
//! simulator execution and dataset loading. [`HarnessError`] unifies them for
//! the fixture lifecycle. Check mismatches are not errors; they are reported
//! through [`crate::check::CheckFailure`].

use std::path::PathBuf;
use std::time::Duration;

use crate::records::{AgentId, ResourceId};

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Scenario input path is not set; declare it before running setup")]
    MissingInput,

    #[error("Configuration loading error: {0}")]
    Loading(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Failures of the external simulator process
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Simulator executable '{executable}' not found: {reason}")]
    ExecutableNotFound { executable: String, reason: String },

    #[error("Failed to start simulator '{executable}': {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Simulator exited with {status}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    Failed {
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("Simulator timed out after {}s", .after.as_secs_f64())]
    TimedOut { after: Duration },

    #[error("Simulator finished but produced no artifact at {}\n--- stderr ---\n{stderr}", .path.display())]
    MissingArtifact { path: PathBuf, stderr: String },
}

/// Failures while opening, loading or querying an output artifact
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to open artifact {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Required table '{table}' is missing from the artifact")]
    MissingTable { table: &'static str },

    #[error("Failed to read table '{table}': {source}")]
    Query {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Duplicate {column} {id} in table '{table}'")]
    DuplicateId {
        table: &'static str,
        column: &'static str,
        id: i64,
    },

    #[error("Unknown resource {0}: not present in the Resources table")]
    UnknownResource(ResourceId),

    #[error("Unknown agent {0}: not present in the AgentEntry table")]
    UnknownAgent(AgentId),

    #[error("Time step {time} lies outside the horizon 0..{horizon}")]
    TimeOutOfHorizon { time: i64, horizon: usize },
}

// ----------------------------------------------------------------------------
// Main Harness Error Type
// ----------------------------------------------------------------------------

/// Errors that abort a scenario fixture
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Failed to remove artifact {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scenario dataset accessed before setup completed")]
    NotLoaded,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
