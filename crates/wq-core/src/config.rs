//! Configuration types and parsing for wq.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `default_project`
pub const PROJECT_ENV_VAR: &str = "BIGQUERY_PROJECT_ID";

/// Environment variable holding the BigQuery OAuth access token
pub const ACCESS_TOKEN_ENV_VAR: &str = "BIGQUERY_ACCESS_TOKEN";

/// Main configuration from wq.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project used for datasets that name no project
    #[serde(default)]
    pub default_project: Option<String>,

    /// Reject unparsable `project.dataset` references instead of falling
    /// back to the default project
    #[serde(default)]
    pub strict_dataset_references: bool,

    #[serde(default)]
    pub warehouse: WarehouseConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Directory holding persisted runs
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_project: None,
            strict_dataset_references: false,
            warehouse: WarehouseConfig::default(),
            generator: GeneratorConfig::default(),
            timeouts: TimeoutConfig::default(),
            state_dir: default_state_dir(),
        }
    }
}

/// Warehouse backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseType {
    /// Local DuckDB database (default)
    #[default]
    DuckDb,
    /// Google BigQuery over REST
    BigQuery,
}

impl std::fmt::Display for WarehouseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarehouseType::DuckDb => write!(f, "duckdb"),
            WarehouseType::BigQuery => write!(f, "bigquery"),
        }
    }
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarehouseConfig {
    #[serde(rename = "type", default)]
    pub warehouse_type: WarehouseType,

    /// DuckDB database path (`:memory:` for an in-memory database)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// BigQuery job location, e.g. `US`
    #[serde(default)]
    pub location: Option<String>,

    /// Upper bound on rows fetched per query
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            warehouse_type: WarehouseType::default(),
            path: default_db_path(),
            location: None,
            max_rows: default_max_rows(),
        }
    }
}

/// Chat-completions generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Per-call timeouts, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    #[serde(default = "default_introspection_secs")]
    pub introspection_secs: u64,

    #[serde(default = "default_generation_secs")]
    pub generation_secs: u64,

    #[serde(default = "default_execution_secs")]
    pub execution_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            introspection_secs: default_introspection_secs(),
            generation_secs: default_generation_secs(),
            execution_secs: default_execution_secs(),
        }
    }
}

fn default_state_dir() -> String {
    ".wq/runs".to_string()
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

fn default_max_rows() -> usize {
    10_000
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "openai/gpt-4.1".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_introspection_secs() -> u64 {
    120
}

fn default_generation_secs() -> u64 {
    120
}

fn default_execution_secs() -> u64 {
    300
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for wq.yml or wq.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("wq.yml");
        let yaml_path = dir.join("wq.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if let Some(project) = &self.default_project {
            crate::identifier::ensure_safe_project(project).map_err(|_| {
                CoreError::ConfigInvalid {
                    message: format!("default_project '{}' is not a valid project id", project),
                }
            })?;
        }

        if self.warehouse.max_rows == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "warehouse.max_rows must be greater than zero".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.generator.temperature) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "generator.temperature {} must be between 0 and 2",
                    self.generator.temperature
                ),
            });
        }

        let t = &self.timeouts;
        if t.introspection_secs == 0 || t.generation_secs == 0 || t.execution_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "timeouts must be greater than zero".to_string(),
            });
        }

        if self.state_dir.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "state_dir cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// `BIGQUERY_PROJECT_ID` replaces `default_project` when set and non-empty.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project) = lookup(PROJECT_ENV_VAR).filter(|p| !p.is_empty()) {
            log::debug!("default project overridden by {}", PROJECT_ENV_VAR);
            self.default_project = Some(project);
        }
    }

    /// Resolve the state directory against `root`
    pub fn state_dir_absolute(&self, root: &Path) -> PathBuf {
        let dir = Path::new(&self.state_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            root.join(dir)
        }
    }
}

/// Read a required environment variable through `lookup`.
pub fn require_var<F>(lookup: F, name: &str) -> CoreResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CoreError::MissingEnvVar {
            name: name.to_string(),
        })
}

/// Environment lookup backed by the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
