//! # In-Memory Session Network
//!
//! Routes session openings to the listener registered for each party name.
//! Suitable for single-process networks and tests; a distributed deployment
//! would put a real transport behind the same `SessionChannel` contract.

use crate::errors::BusError;
use crate::session::SessionChannel;
use parking_lot::RwLock;
use shared_types::Party;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Network of parties reachable by name.
#[derive(Default)]
pub struct InMemorySessionNetwork {
    listeners: RwLock<HashMap<String, mpsc::UnboundedSender<SessionChannel>>>,
    sessions_opened: AtomicU64,
}

impl InMemorySessionNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a party and get the listener its incoming sessions arrive on.
    ///
    /// Registering the same name again replaces the previous listener.
    pub fn register(&self, party: &Party) -> SessionListener {
        let (sender, incoming) = mpsc::unbounded_channel();
        self.listeners.write().insert(party.name.clone(), sender);
        debug!(party = %party, "Registered session listener");
        SessionListener {
            party: party.clone(),
            incoming,
        }
    }

    /// Remove a party from the network. Open sessions are unaffected.
    pub fn deregister(&self, name: &str) -> bool {
        self.listeners.write().remove(name).is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.listeners.read().contains_key(name)
    }

    /// Open a session from `initiator` to `counterparty`.
    ///
    /// Returns the initiator's end; the counterparty's end is delivered to
    /// its listener.
    pub fn open_session(
        &self,
        initiator: &Party,
        counterparty: &Party,
    ) -> Result<SessionChannel, BusError> {
        let listener = self
            .listeners
            .read()
            .get(&counterparty.name)
            .cloned()
            .ok_or_else(|| BusError::UnknownParty {
                name: counterparty.name.clone(),
            })?;

        let (local_end, remote_end) = SessionChannel::pair(initiator.clone(), counterparty.clone());
        let session_id = local_end.session_id();

        if listener.send(remote_end).is_err() {
            warn!(party = %counterparty, "Listener dropped, party unreachable");
            return Err(BusError::PartyUnreachable {
                name: counterparty.name.clone(),
            });
        }

        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
        debug!(
            session = %session_id,
            from = %initiator,
            to = %counterparty,
            "Session opened"
        );
        Ok(local_end)
    }

    /// Total sessions opened since creation.
    pub fn sessions_opened(&self) -> u64 {
        self.sessions_opened.load(Ordering::Relaxed)
    }
}

/// Incoming sessions for one party.
pub struct SessionListener {
    party: Party,
    incoming: mpsc::UnboundedReceiver<SessionChannel>,
}

impl SessionListener {
    /// The party this listener accepts sessions for.
    pub fn party(&self) -> &Party {
        &self.party
    }

    /// Wait for the next incoming session. `None` once the network is gone
    /// or the party was deregistered.
    pub async fn accept(&mut self) -> Option<SessionChannel> {
        self.incoming.recv().await
    }
}
