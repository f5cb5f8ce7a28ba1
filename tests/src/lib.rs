//! # Record-Ledger Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # TestNetwork: nodes, notary and session network
//! └── integration/      # End-to-end record scenarios
//!     ├── issue_flow.rs
//!     ├── queries.rs
//!     └── failures.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tr-tests
//! RUST_LOG=debug cargo test -p tr-tests integration::issue_flow
//! ```

pub mod harness;
pub mod integration;
