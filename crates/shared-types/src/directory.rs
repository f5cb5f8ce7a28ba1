//! # Party Directory
//!
//! Name and key lookups for well-known parties, plus the list of consensus
//! authorities (notaries) known to the node.

use crate::entities::{Party, PublicKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// In-memory identity directory.
///
/// Notaries are kept in registration order so that "first notary" is stable.
#[derive(Debug, Default)]
pub struct PartyDirectory {
    parties: RwLock<HashMap<String, Party>>,
    notaries: RwLock<Vec<Party>>,
}

impl PartyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a well-known party.
    pub fn register(&self, party: Party) {
        debug!(party = %party.name, key = %party.key_fingerprint(), "Registered party");
        self.parties.write().insert(party.name.clone(), party);
    }

    /// Register a notary. Notaries are also well-known parties.
    pub fn register_notary(&self, notary: Party) {
        self.register(notary.clone());
        let mut notaries = self.notaries.write();
        if !notaries.contains(&notary) {
            notaries.push(notary);
        }
    }

    /// Look up a party by its legal name.
    pub fn well_known_party(&self, name: &str) -> Option<Party> {
        self.parties.read().get(name).cloned()
    }

    /// Look up a party by its owning key.
    pub fn party_from_key(&self, key: &PublicKey) -> Option<Party> {
        self.parties
            .read()
            .values()
            .find(|p| &p.owning_key == key)
            .cloned()
    }

    /// Look up a notary by name.
    pub fn notary(&self, name: &str) -> Option<Party> {
        self.notaries.read().iter().find(|n| n.name == name).cloned()
    }

    /// All notaries in registration order.
    pub fn notaries(&self) -> Vec<Party> {
        self.notaries.read().clone()
    }

    /// Whether the party is a registered notary.
    pub fn is_notary(&self, party: &Party) -> bool {
        self.notaries.read().contains(party)
    }
}
