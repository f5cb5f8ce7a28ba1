//! Cross-crate scenarios over the multi-node harness.

pub mod failures;
pub mod issue_flow;
pub mod queries;
