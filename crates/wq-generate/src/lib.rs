//! wq-generate - SQL generation for the warehouse query assistant
//!
//! The generator is an opaque collaborator: a question and a schema go in,
//! a validated [`SqlCandidate`](wq_core::SqlCandidate) comes out.

pub mod chat;
pub mod error;
pub mod prompt;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod traits;

pub use chat::ChatSqlGenerator;
pub use error::{GenerateError, GenerateResult};
pub use prompt::SqlDialect;
pub use traits::SqlGenerator;
