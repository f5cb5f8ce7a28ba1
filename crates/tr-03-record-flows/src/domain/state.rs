//! Flow state machines
//!
//! Initiator:
//! ```text
//! [Built] ─validated→ [LocallyValidated] ─signed→ [LocallySigned]
//!     ─sessions opened→ [AwaitingCounterSignature] ─collected→ [Finalizing]
//!     ─consensus accepted→ [Finalized]
//!
//! any non-terminal state ─failure→ [Failed]
//! ```
//!
//! Responder:
//! ```text
//! [WaitRole] ─SIGNER→ [Signing] ─countersigned→ [WaitFinality] ─stored→ [Done]
//!     │                   └─refused→ [Rejected]
//!     └─PARTICIPANT→ [WaitFinalityOnly] ─skip signing→ [WaitFinality]
//!
//! any non-terminal state ─failure→ [Failed]
//! ```
//!
//! Transitions never go backwards; an event that does not apply to the
//! current state is a protocol error.

use super::messages::CounterpartyRole;
use crate::error::{FlowError, FlowResult};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitiatorState {
    Built,
    LocallyValidated,
    LocallySigned,
    AwaitingCounterSignature,
    Finalizing,
    Finalized,
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitiatorEvent {
    Validated,
    Signed,
    SessionsOpened,
    SignaturesCollected,
    ConsensusAccepted,
    Failed(String),
}

impl InitiatorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InitiatorState::Finalized | InitiatorState::Failed { .. })
    }

    fn next(&self, event: &InitiatorEvent) -> Option<InitiatorState> {
        use InitiatorEvent as E;
        use InitiatorState as S;

        if self.is_terminal() {
            return None;
        }
        match (self, event) {
            (_, E::Failed(reason)) => Some(S::Failed {
                reason: reason.clone(),
            }),
            (S::Built, E::Validated) => Some(S::LocallyValidated),
            (S::LocallyValidated, E::Signed) => Some(S::LocallySigned),
            (S::LocallySigned, E::SessionsOpened) => Some(S::AwaitingCounterSignature),
            (S::AwaitingCounterSignature, E::SignaturesCollected) => Some(S::Finalizing),
            (S::Finalizing, E::ConsensusAccepted) => Some(S::Finalized),
            _ => None,
        }
    }
}

impl fmt::Display for InitiatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitiatorState::Failed { reason } => write!(f, "Failed({reason})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponderState {
    WaitRole,
    Signing,
    WaitFinalityOnly,
    WaitFinality,
    Done,
    Rejected { reason: String },
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponderEvent {
    RoleAssigned(CounterpartyRole),
    Countersigned,
    SigningSkipped,
    Refused(String),
    FinalityStored,
    Failed(String),
}

impl ResponderState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResponderState::Done | ResponderState::Rejected { .. } | ResponderState::Failed { .. }
        )
    }

    fn next(&self, event: &ResponderEvent) -> Option<ResponderState> {
        use ResponderEvent as E;
        use ResponderState as S;

        if self.is_terminal() {
            return None;
        }
        match (self, event) {
            (_, E::Failed(reason)) => Some(S::Failed {
                reason: reason.clone(),
            }),
            (S::WaitRole, E::RoleAssigned(CounterpartyRole::Signer)) => Some(S::Signing),
            (S::WaitRole, E::RoleAssigned(CounterpartyRole::Participant)) => {
                Some(S::WaitFinalityOnly)
            }
            (S::Signing, E::Countersigned) => Some(S::WaitFinality),
            (S::Signing, E::Refused(reason)) => Some(S::Rejected {
                reason: reason.clone(),
            }),
            (S::WaitFinalityOnly, E::SigningSkipped) => Some(S::WaitFinality),
            (S::WaitFinality, E::FinalityStored) => Some(S::Done),
            _ => None,
        }
    }
}

impl fmt::Display for ResponderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponderState::Rejected { reason } => write!(f, "Rejected({reason})"),
            ResponderState::Failed { reason } => write!(f, "Failed({reason})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Drives an `InitiatorState` through legal transitions only.
#[derive(Debug)]
pub struct InitiatorMachine {
    state: InitiatorState,
    transitions: u32,
}

impl InitiatorMachine {
    pub fn new() -> Self {
        Self {
            state: InitiatorState::Built,
            transitions: 0,
        }
    }

    pub fn state(&self) -> &InitiatorState {
        &self.state
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    pub fn process_event(&mut self, event: InitiatorEvent) -> FlowResult<&InitiatorState> {
        let next = self
            .state
            .next(&event)
            .ok_or_else(|| FlowError::InvalidTransition {
                from: self.state.to_string(),
                event: format!("{event:?}"),
            })?;
        self.state = next;
        self.transitions += 1;
        Ok(&self.state)
    }

    /// Move to `Failed` unless already terminal.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if !self.state.is_terminal() {
            self.state = InitiatorState::Failed {
                reason: reason.into(),
            };
            self.transitions += 1;
        }
    }
}

impl Default for InitiatorMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a `ResponderState` through legal transitions only.
#[derive(Debug)]
pub struct ResponderMachine {
    state: ResponderState,
}

impl ResponderMachine {
    pub fn new() -> Self {
        Self {
            state: ResponderState::WaitRole,
        }
    }

    pub fn state(&self) -> &ResponderState {
        &self.state
    }

    pub fn process_event(&mut self, event: ResponderEvent) -> FlowResult<&ResponderState> {
        let next = self
            .state
            .next(&event)
            .ok_or_else(|| FlowError::InvalidTransition {
                from: self.state.to_string(),
                event: format!("{event:?}"),
            })?;
        self.state = next;
        Ok(&self.state)
    }

    /// Move to `Failed` unless already terminal.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if !self.state.is_terminal() {
            self.state = ResponderState::Failed {
                reason: reason.into(),
            };
        }
    }
}

impl Default for ResponderMachine {
    fn default() -> Self {
        Self::new()
    }
}
