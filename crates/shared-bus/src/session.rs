//! # Session Channel
//!
//! One end of a bidirectional, ordered session between two parties.

use crate::errors::BusError;
use shared_types::{Party, SessionEnvelope};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace};
use uuid::Uuid;

/// One end of a session.
///
/// `send` never blocks. `receive` waits for the next envelope from the
/// counterparty and verifies it before handing back the payload.
pub struct SessionChannel {
    session_id: Uuid,
    local: Party,
    counterparty: Party,
    outbound: mpsc::UnboundedSender<SessionEnvelope>,
    inbound: Mutex<mpsc::UnboundedReceiver<SessionEnvelope>>,
    next_send: AtomicU64,
    next_receive: AtomicU64,
}

impl SessionChannel {
    /// Create both ends of a new session.
    pub(crate) fn pair(initiator: Party, counterparty: Party) -> (SessionChannel, SessionChannel) {
        let session_id = Uuid::new_v4();
        let (to_counterparty, from_initiator) = mpsc::unbounded_channel();
        let (to_initiator, from_counterparty) = mpsc::unbounded_channel();

        let initiator_end = SessionChannel {
            session_id,
            local: initiator.clone(),
            counterparty: counterparty.clone(),
            outbound: to_counterparty,
            inbound: Mutex::new(from_counterparty),
            next_send: AtomicU64::new(0),
            next_receive: AtomicU64::new(0),
        };
        let counterparty_end = SessionChannel {
            session_id,
            local: counterparty,
            counterparty: initiator,
            outbound: to_initiator,
            inbound: Mutex::new(from_initiator),
            next_send: AtomicU64::new(0),
            next_receive: AtomicU64::new(0),
        };
        (initiator_end, counterparty_end)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The party on this end.
    pub fn local(&self) -> &Party {
        &self.local
    }

    /// The party on the other end.
    pub fn counterparty(&self) -> &Party {
        &self.counterparty
    }

    /// Send an opaque payload to the counterparty.
    pub fn send(&self, payload: Vec<u8>) -> Result<(), BusError> {
        let sequence = self.next_send.fetch_add(1, Ordering::SeqCst);
        let envelope = SessionEnvelope::new(
            self.session_id,
            self.local.name.clone(),
            self.counterparty.name.clone(),
            sequence,
            payload,
        );
        trace!(
            session = %self.session_id,
            to = %self.counterparty,
            sequence,
            bytes = envelope.payload.len(),
            "Sending envelope"
        );
        self.outbound
            .send(envelope)
            .map_err(|_| BusError::ChannelClosed {
                session_id: self.session_id,
            })
    }

    /// Wait for the next payload from the counterparty.
    pub async fn receive(&self) -> Result<Vec<u8>, BusError> {
        let mut inbound = self.inbound.lock().await;
        let envelope = inbound.recv().await.ok_or(BusError::ChannelClosed {
            session_id: self.session_id,
        })?;

        let expected = self.next_receive.load(Ordering::SeqCst);
        envelope.verify(&self.counterparty.name, expected)?;
        self.next_receive.store(expected + 1, Ordering::SeqCst);

        debug!(
            session = %self.session_id,
            from = %self.counterparty,
            sequence = envelope.sequence,
            "Received envelope"
        );
        Ok(envelope.payload)
    }
}

impl std::fmt::Debug for SessionChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionChannel")
            .field("session_id", &self.session_id)
            .field("local", &self.local.name)
            .field("counterparty", &self.counterparty.name)
            .finish()
    }
}
