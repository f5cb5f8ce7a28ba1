//! # Shared Bus - Point-to-Point Session Network
//!
//! Parties exchange protocol messages over sessions: an initiator opens a
//! session to a counterparty, the counterparty's listener accepts it, and both
//! ends then send and receive `SessionEnvelope`s in order.
//!
//! ```text
//! ┌──────────────┐  open_session()   ┌──────────────────┐
//! │  Initiator   │ ────────────────→ │ Network          │
//! │              │                   │  listeners[name] │
//! └──────┬───────┘                   └────────┬─────────┘
//!        │ SessionChannel                     │ accept()
//!        │ ←──────── envelopes ────────→      ▼
//!        │                            ┌──────────────────┐
//!        └──────────────────────────→ │  Counterparty    │
//!                                     └──────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Envelope-Only Identity:** the receiver checks `sender` against the
//!   session counterparty.
//! - **Ordering:** per-direction sequence numbers; gaps are rejected.
//! - **Opaque payloads:** the bus never decodes what it carries.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod errors;
pub mod network;
pub mod session;

pub use errors::BusError;
pub use network::{InMemorySessionNetwork, SessionListener};
pub use session::SessionChannel;
