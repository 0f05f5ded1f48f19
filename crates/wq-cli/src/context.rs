//! Runtime context for CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wq_core::config::{process_env, Config, WarehouseType};
use wq_core::CoreError;
use wq_db::{BigQueryBackend, DuckDbBackend, Warehouse};
use wq_generate::{ChatSqlGenerator, SqlDialect, SqlGenerator};
use wq_introspect::{IntrospectOptions, Introspector};
use wq_pipeline::{query_pipeline, Engine, FileRunStore, QueryPipelineParts};

use crate::cli::GlobalArgs;

/// Loaded configuration plus the paths it resolves against
pub struct RuntimeContext {
    pub config: Config,
    pub root: PathBuf,
}

impl RuntimeContext {
    /// Load `wq.yml` (or defaults when absent) and apply environment and
    /// flag overrides
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&args.project_dir);

        let mut config = match &args.config {
            Some(path) => Config::load(Path::new(path)).context("Failed to load configuration file")?,
            None => match Config::load_from_dir(&root) {
                Ok(config) => config,
                Err(CoreError::ConfigNotFound { path }) => {
                    log::debug!("No config at {}, using defaults", path);
                    Config::default()
                }
                Err(e) => return Err(e).context("Failed to load project configuration"),
            },
        };

        config.apply_env(process_env);
        if let Some(project) = &args.default_project {
            config.default_project = Some(project.clone());
        }
        if let Some(path) = &args.database {
            config.warehouse.path = path.clone();
        }

        Ok(Self { config, root })
    }

    pub fn introspect_options(&self) -> IntrospectOptions {
        IntrospectOptions {
            strict_dataset_references: self.config.strict_dataset_references,
        }
    }

    /// Connect to the configured warehouse
    pub fn warehouse(&self) -> Result<Arc<dyn Warehouse>> {
        let warehouse = &self.config.warehouse;
        Ok(match warehouse.warehouse_type {
            WarehouseType::DuckDb => Arc::new(
                DuckDbBackend::new(&warehouse.path)
                    .with_context(|| format!("Failed to open DuckDB database '{}'", warehouse.path))?,
            ),
            WarehouseType::BigQuery => Arc::new(
                BigQueryBackend::from_env(
                    self.config.default_project.as_deref(),
                    warehouse,
                    process_env,
                )
                .context("Failed to configure BigQuery client")?,
            ),
        })
    }

    pub fn introspector(&self, warehouse: Arc<dyn Warehouse>) -> Introspector {
        Introspector::new(warehouse).with_options(self.introspect_options())
    }

    /// Build the chat generator; fails when the API key variable is unset
    pub fn generator(&self) -> Result<Arc<dyn SqlGenerator>> {
        let dialect = match self.config.warehouse.warehouse_type {
            WarehouseType::DuckDb => SqlDialect::DuckDb,
            WarehouseType::BigQuery => SqlDialect::BigQuery,
        };
        let generator = ChatSqlGenerator::from_config(&self.config.generator, process_env)
            .context("Failed to configure SQL generator")?
            .with_dialect(dialect);
        Ok(Arc::new(generator))
    }

    pub fn run_store(&self) -> FileRunStore {
        FileRunStore::new(self.config.state_dir_absolute(&self.root))
    }

    /// Engine for the query pipeline over the file run store
    pub fn engine(&self) -> Result<Engine> {
        let pipeline = query_pipeline(QueryPipelineParts {
            warehouse: self.warehouse()?,
            generator: self.generator()?,
            default_project: self.config.default_project.clone(),
            options: self.introspect_options(),
            timeouts: self.config.timeouts,
        })?;
        Ok(Engine::new(pipeline, Arc::new(self.run_store())))
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
