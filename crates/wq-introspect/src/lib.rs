//! wq-introspect - Schema introspection for the warehouse query assistant
//!
//! Resolves dataset targets to their owning projects, queries warehouse
//! metadata per dataset, and merges the results into one `UnifiedSchema`.

pub mod catalog;
pub mod error;
pub mod introspector;

pub use catalog::CatalogQueries;
pub use error::{IntrospectError, IntrospectResult};
pub use introspector::{resolve_target, IntrospectOptions, Introspector, ResolvedTarget};
