//! wq-core - Core library for the warehouse query assistant
//!
//! This crate provides the identifier validator, the unified schema document
//! and its presentations, SQL candidate and execution outcome types, run
//! state tracking, and configuration loading shared by every other crate.

pub mod config;
pub mod error;
pub mod identifier;
mod ids;
pub mod presentation;
pub mod query;
pub mod run_state;
pub mod schema;
pub mod target;

pub use config::{Config, WarehouseType};
pub use error::{CoreError, CoreResult};
pub use identifier::{is_safe_identifier, parse_project_dataset, ProjectDataset};
pub use query::{ExecutionOutcome, Row, SqlCandidate};
pub use run_state::{Run, RunFailure, RunId, RunResult, RunStatus, StepId, StepRecord, SuspendPayload};
pub use schema::{
    ColumnInfo, DatasetRef, DatasetSchema, IntrospectionIssue, IntrospectionStage, Relationship,
    RowCount, SchemaSummary, TableInfo, TableKey, UnifiedSchema,
};
pub use target::DatasetTarget;
