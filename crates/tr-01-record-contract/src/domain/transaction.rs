//! # Signed and Finalized Bundles
//!
//! Signatures are always over the bundle id. A bundle becomes final only
//! when every required signer and the notary have signed.

use super::bundle::ProposalBundle;
use super::record::RecordEntity;
use crate::error::{RecordError, RecordResult};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::{verify_signature, Ed25519KeyPair};
use shared_types::{short_hex, Hash, PublicKey, Signature};
use std::collections::BTreeSet;

/// A signature over a bundle id by one key.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub by: PublicKey,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl TransactionSignature {
    pub fn sign(keypair: &Ed25519KeyPair, tx_id: &Hash) -> Self {
        Self {
            by: keypair.public_key().to_bytes(),
            signature: keypair.sign(tx_id).to_bytes(),
        }
    }

    pub fn verify(&self, tx_id: &Hash) -> RecordResult<()> {
        verify_signature(&self.by, tx_id, &self.signature).map_err(|_| {
            RecordError::InvalidSignature {
                signer: short_hex(&self.by),
            }
        })
    }
}

/// A bundle and the signatures collected on it so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBundle {
    bundle: ProposalBundle,
    signatures: Vec<TransactionSignature>,
}

impl SignedBundle {
    pub fn new(bundle: ProposalBundle) -> Self {
        Self {
            bundle,
            signatures: Vec::new(),
        }
    }

    pub fn id(&self) -> Hash {
        self.bundle.id()
    }

    pub fn bundle(&self) -> &ProposalBundle {
        &self.bundle
    }

    pub fn signatures(&self) -> &[TransactionSignature] {
        &self.signatures
    }

    /// Sign with `keypair` and attach the signature.
    pub fn sign_with(&mut self, keypair: &Ed25519KeyPair) {
        let signature = TransactionSignature::sign(keypair, &self.bundle.id());
        self.push_unique(signature);
    }

    /// Attach a signature obtained elsewhere. It must verify against this id.
    pub fn add_signature(&mut self, signature: TransactionSignature) -> RecordResult<()> {
        signature.verify(&self.bundle.id())?;
        self.push_unique(signature);
        Ok(())
    }

    fn push_unique(&mut self, signature: TransactionSignature) {
        if !self.signatures.iter().any(|s| s.by == signature.by) {
            self.signatures.push(signature);
        }
    }

    /// Keys that have signed.
    pub fn signers(&self) -> BTreeSet<PublicKey> {
        self.signatures.iter().map(|s| s.by).collect()
    }

    /// Required keys without a signature yet.
    pub fn missing_signatures(&self) -> BTreeSet<PublicKey> {
        let signed = self.signers();
        self.bundle
            .required_signers()
            .into_iter()
            .filter(|key| !signed.contains(key))
            .collect()
    }

    /// Every attached signature is valid for this bundle id.
    pub fn verify_signatures(&self) -> RecordResult<()> {
        let id = self.bundle.id();
        self.signatures.iter().try_for_each(|s| s.verify(&id))
    }

    /// Every attached signature is valid and no required signer is missing.
    pub fn verify_complete(&self) -> RecordResult<()> {
        self.verify_signatures()?;
        let missing = self.missing_signatures();
        if !missing.is_empty() {
            return Err(RecordError::MissingSignatures {
                missing: missing.len(),
            });
        }
        Ok(())
    }
}

/// A signed bundle the notary has committed to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedBundle {
    signed: SignedBundle,
    notary_signature: TransactionSignature,
}

impl FinalizedBundle {
    pub fn new(signed: SignedBundle, notary_signature: TransactionSignature) -> Self {
        Self {
            signed,
            notary_signature,
        }
    }

    pub fn tx_id(&self) -> Hash {
        self.signed.id()
    }

    pub fn bundle(&self) -> &ProposalBundle {
        self.signed.bundle()
    }

    pub fn signed(&self) -> &SignedBundle {
        &self.signed
    }

    pub fn notary_signature(&self) -> &TransactionSignature {
        &self.notary_signature
    }

    /// Records produced by this bundle.
    pub fn records(&self) -> impl Iterator<Item = &RecordEntity> {
        self.signed.bundle().record_outputs()
    }

    /// Complete signatures plus a valid signature from the bundle's notary.
    pub fn verify(&self) -> RecordResult<()> {
        self.signed.verify_complete()?;

        let notary = self.signed.bundle().notary();
        if self.notary_signature.by != notary.owning_key {
            return Err(RecordError::WrongNotarySigner {
                signer: short_hex(&self.notary_signature.by),
                notary: notary.name.clone(),
            });
        }
        self.notary_signature.verify(&self.tx_id())
    }
}
