//! Simulator execution adapter
//!
//! Runs the external simulator as a subprocess and reports whether it produced
//! an output artifact. A run is expensive and deterministic, so failures are
//! surfaced with the captured process output and never retried.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::SimulatorConfig;
use crate::errors::ExecutionError;

/// Anything that can turn a scenario input into an output artifact
#[async_trait]
pub trait Simulator: Send + Sync {
    /// Run one scenario, writing the artifact to `output`
    async fn run(&self, input: &Path, output: &Path) -> Result<(), ExecutionError>;
}

/// Invokes the configured simulator executable as a blocking subprocess
#[derive(Debug, Clone)]
pub struct ProcessSimulator {
    config: SimulatorConfig,
}

impl ProcessSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Resolve the executable on PATH (or as a path relative to the working dir)
    fn resolve_executable(&self) -> Result<PathBuf, ExecutionError> {
        which::which_in(
            &self.config.executable,
            std::env::var_os("PATH"),
            &self.config.working_dir,
        )
        .map(|path| {
            // the child's cwd differs from ours; only an absolute path is unambiguous
            if path.is_absolute() {
                path
            } else {
                std::env::current_dir().map(|cwd| cwd.join(&path)).unwrap_or(path)
            }
        })
        .map_err(|e| ExecutionError::ExecutableNotFound {
            executable: self.config.executable.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Simulator for ProcessSimulator {
    async fn run(&self, input: &Path, output: &Path) -> Result<(), ExecutionError> {
        let executable = self.resolve_executable()?;
        let args = self.config.render_args(input, output);

        info!("Running simulator on {}", input.display());
        debug!("Command: {} {:?} (cwd: {})", executable.display(), args, self.config.working_dir.display());

        let child = Command::new(&executable)
            .args(&args)
            .current_dir(&self.config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                executable: self.config.executable.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let limit = self.config.timeout();
        let result = match timeout(limit, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Simulator exceeded {:?} on {}", limit, input.display());
                return Err(ExecutionError::TimedOut { after: limit });
            }
        };

        let process_output = result.map_err(|source| ExecutionError::Spawn {
            executable: self.config.executable.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&process_output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&process_output.stderr).into_owned();

        if !stderr.is_empty() {
            debug!("Simulator stderr: {}", stderr.trim_end());
        }

        if !process_output.status.success() {
            warn!("Simulator failed with {}", process_output.status);
            return Err(ExecutionError::Failed {
                status: process_output.status.to_string(),
                stdout,
                stderr,
            });
        }

        if !output.is_file() {
            return Err(ExecutionError::MissingArtifact {
                path: output.to_path_buf(),
                stderr,
            });
        }

        debug!("Simulator wrote {}", output.display());
        Ok(())
    }
}
