//! wq-db - Warehouse access for the warehouse query assistant
//!
//! This crate provides the `Warehouse` trait, DuckDB and BigQuery
//! implementations, and the SELECT-only `QueryExecutor`.

pub mod bigquery;
pub mod duckdb;
pub mod error;
pub mod executor;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod traits;

pub use bigquery::BigQueryBackend;
pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult, ExecutionError};
pub use executor::QueryExecutor;
pub use traits::{CatalogDialect, Warehouse};
