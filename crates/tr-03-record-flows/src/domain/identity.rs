//! The local node's identity and signing key.

use shared_crypto::Ed25519KeyPair;
use shared_types::Party;
use tr_01_record_contract::{SignedBundle, TransactionSignature};

#[derive(Debug)]
pub struct NodeIdentity {
    party: Party,
    keypair: Ed25519KeyPair,
}

impl NodeIdentity {
    pub fn new(name: impl Into<String>, keypair: Ed25519KeyPair) -> Self {
        let party = Party::new(name, keypair.public_key().to_bytes());
        Self { party, keypair }
    }

    /// Deterministic identity for test networks.
    pub fn from_label(name: &str) -> Self {
        Self::new(name, Ed25519KeyPair::from_label(name))
    }

    pub fn party(&self) -> &Party {
        &self.party
    }

    pub fn sign(&self, signed: &mut SignedBundle) {
        signed.sign_with(&self.keypair);
    }

    pub fn signature_for(&self, signed: &SignedBundle) -> TransactionSignature {
        TransactionSignature::sign(&self.keypair, &signed.id())
    }
}
