//! Flow sessions over the in-memory session network.

use crate::domain::SessionMessage;
use crate::error::FlowResult;
use crate::ports::{FlowSession, SessionAcceptor, SessionInitiator};
use async_trait::async_trait;
use shared_bus::{InMemorySessionNetwork, SessionChannel, SessionListener};
use shared_types::Party;
use std::sync::Arc;
use tracing::trace;

/// `SessionMessage`s encoded with bincode over a `SessionChannel`.
#[derive(Debug)]
pub struct BusSession {
    channel: SessionChannel,
}

impl BusSession {
    pub fn new(channel: SessionChannel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl FlowSession for BusSession {
    fn counterparty(&self) -> &Party {
        self.channel.counterparty()
    }

    async fn send(&self, message: SessionMessage) -> FlowResult<()> {
        trace!(
            session = %self.channel.session_id(),
            to = %self.channel.counterparty(),
            kind = message.kind(),
            "Sending"
        );
        self.channel.send(message.to_bytes()?)?;
        Ok(())
    }

    async fn receive(&self) -> FlowResult<SessionMessage> {
        let payload = self.channel.receive().await?;
        SessionMessage::from_bytes(&payload)
    }
}

/// Opens sessions as `local`.
pub struct BusSessionInitiator {
    network: Arc<InMemorySessionNetwork>,
    local: Party,
}

impl BusSessionInitiator {
    pub fn new(network: Arc<InMemorySessionNetwork>, local: Party) -> Self {
        Self { network, local }
    }
}

#[async_trait]
impl SessionInitiator for BusSessionInitiator {
    type Session = BusSession;

    async fn open(&self, counterparty: &Party) -> FlowResult<BusSession> {
        let channel = self.network.open_session(&self.local, counterparty)?;
        Ok(BusSession::new(channel))
    }
}

/// Accepts sessions opened to a registered party.
pub struct BusSessionListener {
    listener: SessionListener,
}

impl BusSessionListener {
    pub fn new(listener: SessionListener) -> Self {
        Self { listener }
    }

    pub fn register(network: &InMemorySessionNetwork, party: &Party) -> Self {
        Self::new(network.register(party))
    }
}

#[async_trait]
impl SessionAcceptor for BusSessionListener {
    type Session = BusSession;

    async fn accept(&mut self) -> Option<BusSession> {
        self.listener.accept().await.map(BusSession::new)
    }
}
