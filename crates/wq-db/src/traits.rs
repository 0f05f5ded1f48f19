//! Warehouse trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use serde_json::Value;

/// Flavour of catalog SQL a warehouse understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogDialect {
    /// `information_schema` with catalogs as projects and schemas as datasets
    DuckDb,
    /// Per-dataset `INFORMATION_SCHEMA` views and `__TABLES__`
    BigQuery,
}

/// Warehouse abstraction
///
/// Implementations must be Send + Sync so one client can be shared by
/// concurrent runs.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Run a statement and return its rows as JSON values.
    ///
    /// Backends return one value per row; callers validate the shape.
    async fn query(&self, sql: &str) -> DbResult<Vec<Value>>;

    /// Warehouse type identifier for logging
    fn db_type(&self) -> &'static str;

    fn dialect(&self) -> CatalogDialect;
}
