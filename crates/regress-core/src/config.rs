//! Harness Configuration
//!
//! All knobs that used to be ambient (executable name, working directory,
//! output naming) live in [`HarnessConfig`] and are passed explicitly to the
//! simulator adapter and the scenario harness.
//!
//! Configuration is layered with figment, lowest priority first:
//! defaults, `cyclus-regress.toml` (or an explicit file), then environment
//! variables prefixed `CYCLUS_REGRESS_` with nested keys split on `__`
//! (e.g. `CYCLUS_REGRESS_SIMULATOR__TIMEOUT_SECS=60`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Placeholder replaced with the scenario input path
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced with the generated artifact path
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Default configuration file looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "cyclus-regress.toml";

const ENV_PREFIX: &str = "CYCLUS_REGRESS_";

// ----------------------------------------------------------------------------
// Configuration Types
// ----------------------------------------------------------------------------

/// Complete configuration for a harness run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// How to invoke the simulator
    pub simulator: SimulatorConfig,

    /// Where and how output artifacts are named
    pub artifacts: ArtifactConfig,
}

/// Simulator process configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Executable name (resolved on PATH) or path
    pub executable: String,

    /// Argument template; `{input}` and `{output}` are substituted per run
    pub args: Vec<String>,

    /// Directory the simulator runs in; relative input paths resolve here
    pub working_dir: PathBuf,

    /// Upper bound on a single simulator run
    pub timeout_secs: u64,
}

/// Output artifact configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory for generated artifacts; relative paths resolve against the
    /// simulator working directory
    pub output_dir: PathBuf,

    /// File extension; selects the simulator's output backend
    pub extension: String,
}

// ----------------------------------------------------------------------------
// Default Implementations
// ----------------------------------------------------------------------------

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            executable: "cyclus".to_string(),
            args: vec![
                INPUT_PLACEHOLDER.to_string(),
                "-o".to_string(),
                OUTPUT_PLACEHOLDER.to_string(),
            ],
            working_dir: PathBuf::from("."),
            timeout_secs: 600,
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            extension: "sqlite".to_string(),
        }
    }
}

// ----------------------------------------------------------------------------
// Configuration Loading Logic
// ----------------------------------------------------------------------------

impl HarnessConfig {
    /// Load configuration with the standard priority order:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file (`path`, or `cyclus-regress.toml` if present)
    /// 3. Default values (lowest priority)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        if path.is_some() && !file.exists() {
            return Err(ConfigError::Loading(format!(
                "Configuration file {} does not exist",
                file.display()
            )));
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::extract(figment)
    }

    /// Load configuration from a TOML string layered over the defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(source));

        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: HarnessConfig = figment
            .extract()
            .map_err(|e| ConfigError::Loading(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulator;

        if sim.executable.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Simulator executable must not be empty".to_string(),
            ));
        }

        for placeholder in [INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER] {
            if !sim.args.iter().any(|arg| arg.contains(placeholder)) {
                return Err(ConfigError::Validation(format!(
                    "Simulator args must reference {}",
                    placeholder
                )));
            }
        }

        if sim.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "Simulator timeout must be greater than 0".to_string(),
            ));
        }

        let ext = &self.artifacts.extension;
        if ext.is_empty() || ext.contains(['.', '/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "Artifact extension must be a bare extension, got '{}'",
                ext
            )));
        }

        Ok(())
    }

    /// Create example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| "# Failed to generate example config".to_string())
    }
}

impl SimulatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Substitute the placeholders of the argument template
    pub fn render_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }
}

impl HarnessConfig {
    /// Absolute directory in which artifacts are generated
    ///
    /// The simulator runs inside `working_dir`, the harness does not, so both
    /// must see the same absolute path.
    pub fn artifact_dir(&self) -> PathBuf {
        let dir = self.simulator.working_dir.join(&self.artifacts.output_dir);
        if dir.is_absolute() {
            return dir;
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(dir),
            Err(_) => dir,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
