//! Flow domain: protocol messages, state machines and the local identity.

pub mod identity;
pub mod messages;
pub mod state;

pub use identity::NodeIdentity;
pub use messages::{CounterpartyRole, SessionMessage};
pub use state::{
    InitiatorEvent, InitiatorMachine, InitiatorState, ResponderEvent, ResponderMachine,
    ResponderState,
};
