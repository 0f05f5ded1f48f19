//! CLI command implementations

pub(crate) mod common;
pub(crate) mod exec;
pub(crate) mod introspect;
pub(crate) mod resume;
pub(crate) mod run;
pub(crate) mod start;
pub(crate) mod status;
