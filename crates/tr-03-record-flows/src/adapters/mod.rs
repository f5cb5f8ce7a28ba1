//! Adapters for the flow ports.

pub mod clock;
pub mod fiat_token;
pub mod notary;
pub mod session;

pub use clock::{FixedClock, SystemClock};
pub use fiat_token::{FiatTokenModule, FungibleToken, FUNGIBLE_TOKEN_CONTRACT};
pub use notary::InMemoryNotary;
pub use session::{BusSession, BusSessionInitiator, BusSessionListener};
