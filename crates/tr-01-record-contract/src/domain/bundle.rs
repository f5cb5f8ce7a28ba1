//! # Proposal Bundle
//!
//! A bundle is the atomic unit of ledger change: consumed inputs, produced
//! outputs and commands, each command carrying the keys that must sign.
//!
//! Bundles are content addressed. The id is the BLAKE3 hash of the canonical
//! (bincode) encoding of the content and is computed once, when the builder
//! freezes the bundle. Deserialization recomputes it, so an id on the wire is
//! never trusted.

use super::record::RecordEntity;
use crate::error::{RecordError, RecordResult};
use serde::{Deserialize, Serialize};
use shared_crypto::content_hash;
use shared_types::{short_hex, Hash, Party, PublicKey};
use std::collections::BTreeSet;
use std::fmt;
use tracing::trace;

/// Contract id under which record states and commands are governed.
pub const RECORD_CONTRACT_ID: &str = "tr.contracts.RecordContract";

const BUNDLE_ID_DOMAIN: &str = "record-ledger 2024 bundle id";

/// Pointer to an output of a finalized bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateRef {
    pub tx_id: Hash,
    pub index: u32,
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", short_hex(&self.tx_id), self.index)
    }
}

/// A state governed by some other contract, e.g. a fungible token.
///
/// The record rules never look inside `data`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalState {
    pub contract: String,
    pub participants: Vec<Party>,
    pub data: Vec<u8>,
}

/// Any state a bundle can consume or produce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerState {
    Record(RecordEntity),
    External(ExternalState),
}

impl LedgerState {
    pub fn contract(&self) -> &str {
        match self {
            LedgerState::Record(_) => RECORD_CONTRACT_ID,
            LedgerState::External(state) => &state.contract,
        }
    }

    pub fn participants(&self) -> Vec<Party> {
        match self {
            LedgerState::Record(record) => record.participants(),
            LedgerState::External(state) => state.participants.clone(),
        }
    }

    pub fn as_record(&self) -> Option<&RecordEntity> {
        match self {
            LedgerState::Record(record) => Some(record),
            LedgerState::External(_) => None,
        }
    }

    pub fn as_external(&self) -> Option<&ExternalState> {
        match self {
            LedgerState::External(state) => Some(state),
            LedgerState::Record(_) => None,
        }
    }
}

/// A state together with where it was produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state: LedgerState,
    pub reference: StateRef,
}

/// Commands of the record contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordCommand {
    Create,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandData {
    Record(RecordCommand),
    /// A command of some other contract, opaque to the record rules.
    External { contract: String, name: String },
}

/// A command and the keys that must sign for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub data: CommandData,
    pub signers: BTreeSet<PublicKey>,
}

impl Command {
    pub fn new(data: CommandData, signers: impl IntoIterator<Item = PublicKey>) -> Self {
        Self {
            data,
            signers: signers.into_iter().collect(),
        }
    }

    /// The record `Create` command.
    pub fn create_record(signers: impl IntoIterator<Item = PublicKey>) -> Self {
        Self::new(CommandData::Record(RecordCommand::Create), signers)
    }

    pub fn is_record_create(&self) -> bool {
        matches!(self.data, CommandData::Record(RecordCommand::Create))
    }
}

/// Everything the bundle id commits to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct BundleContent {
    notary: Party,
    inputs: Vec<StateAndRef>,
    outputs: Vec<LedgerState>,
    commands: Vec<Command>,
}

impl BundleContent {
    fn compute_id(&self) -> RecordResult<Hash> {
        let bytes = bincode::serialize(self).map_err(|e| RecordError::Serialization {
            reason: e.to_string(),
        })?;
        Ok(content_hash(BUNDLE_ID_DOMAIN, &bytes))
    }
}

/// A frozen proposal. Cannot be modified once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BundleContent", try_from = "BundleContent")]
pub struct ProposalBundle {
    id: Hash,
    content: BundleContent,
}

impl From<ProposalBundle> for BundleContent {
    fn from(bundle: ProposalBundle) -> Self {
        bundle.content
    }
}

impl TryFrom<BundleContent> for ProposalBundle {
    type Error = RecordError;

    fn try_from(content: BundleContent) -> Result<Self, Self::Error> {
        let id = content.compute_id()?;
        Ok(Self { id, content })
    }
}

impl ProposalBundle {
    pub fn id(&self) -> Hash {
        self.id
    }

    pub fn notary(&self) -> &Party {
        &self.content.notary
    }

    pub fn inputs(&self) -> &[StateAndRef] {
        &self.content.inputs
    }

    pub fn outputs(&self) -> &[LedgerState] {
        &self.content.outputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.content.commands
    }

    /// Record states among the outputs.
    pub fn record_outputs(&self) -> impl Iterator<Item = &RecordEntity> {
        self.content.outputs.iter().filter_map(LedgerState::as_record)
    }

    /// Record states among the inputs.
    pub fn record_inputs(&self) -> impl Iterator<Item = &RecordEntity> {
        self.content
            .inputs
            .iter()
            .filter_map(|input| input.state.as_record())
    }

    /// Record `Create` commands.
    pub fn create_commands(&self) -> impl Iterator<Item = &Command> {
        self.content.commands.iter().filter(|c| c.is_record_create())
    }

    /// Union of the signers of every command.
    pub fn required_signers(&self) -> BTreeSet<PublicKey> {
        self.content
            .commands
            .iter()
            .flat_map(|c| c.signers.iter().copied())
            .collect()
    }

    /// Parties of every input and output state.
    pub fn participants(&self) -> BTreeSet<Party> {
        self.content
            .inputs
            .iter()
            .map(|input| &input.state)
            .chain(self.content.outputs.iter())
            .flat_map(LedgerState::participants)
            .collect()
    }

    /// References the outputs will have once this bundle is finalized.
    pub fn output_refs(&self) -> Vec<StateAndRef> {
        self.content
            .outputs
            .iter()
            .enumerate()
            .map(|(index, state)| StateAndRef {
                state: state.clone(),
                reference: StateRef {
                    tx_id: self.id,
                    index: index as u32,
                },
            })
            .collect()
    }

    /// References of the consumed inputs.
    pub fn input_refs(&self) -> Vec<StateRef> {
        self.content.inputs.iter().map(|i| i.reference).collect()
    }
}

/// Assembles a bundle. Freezing computes the id.
#[derive(Clone, Debug)]
pub struct BundleBuilder {
    notary: Party,
    inputs: Vec<StateAndRef>,
    outputs: Vec<LedgerState>,
    commands: Vec<Command>,
}

impl BundleBuilder {
    pub fn new(notary: Party) -> Self {
        Self {
            notary,
            inputs: Vec::new(),
            outputs: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn add_input(&mut self, input: StateAndRef) -> &mut Self {
        self.inputs.push(input);
        self
    }

    pub fn add_output(&mut self, output: LedgerState) -> &mut Self {
        self.outputs.push(output);
        self
    }

    pub fn add_command(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn notary(&self) -> &Party {
        &self.notary
    }

    pub fn build(self) -> RecordResult<ProposalBundle> {
        let content = BundleContent {
            notary: self.notary,
            inputs: self.inputs,
            outputs: self.outputs,
            commands: self.commands,
        };
        let bundle = ProposalBundle::try_from(content)?;
        trace!(
            bundle = %short_hex(&bundle.id),
            inputs = bundle.inputs().len(),
            outputs = bundle.outputs().len(),
            commands = bundle.commands().len(),
            "Bundle frozen"
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::RecordType;
    use chrono::Utc;

    fn notary() -> Party {
        Party::new("Notary", [9u8; 32])
    }

    fn explorer() -> Party {
        Party::new("Explorer", [7u8; 32])
    }

    fn record() -> RecordEntity {
        RecordEntity::new(explorer(), Utc::now(), RecordType::Issue, "Bank", "Alice", 100).unwrap()
    }

    fn token_output(holder: &Party) -> LedgerState {
        LedgerState::External(ExternalState {
            contract: "tokens.Fungible".into(),
            participants: vec![holder.clone()],
            data: vec![1, 2, 3],
        })
    }

    fn sample() -> ProposalBundle {
        let alice = Party::new("Alice", [2u8; 32]);
        let mut builder = BundleBuilder::new(notary());
        builder
            .add_output(token_output(&alice))
            .add_output(LedgerState::Record(record()))
            .add_command(Command::new(
                CommandData::External {
                    contract: "tokens.Fungible".into(),
                    name: "Issue".into(),
                },
                [[1u8; 32]],
            ))
            .add_command(Command::create_record([explorer().owning_key]));
        builder.build().unwrap()
    }

    #[test]
    fn test_id_survives_round_trip() {
        let bundle = sample();
        let bytes = bincode::serialize(&bundle).unwrap();
        let decoded: ProposalBundle = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded.id(), bundle.id());
        assert_eq!(decoded, bundle);
    }

    #[test]
    fn test_id_commits_to_content() {
        let a = sample();
        let b = sample();
        // Different record ids, so different bundles.
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_required_signers_is_union() {
        let bundle = sample();
        let signers = bundle.required_signers();
        assert_eq!(signers.len(), 2);
        assert!(signers.contains(&explorer().owning_key));
        assert!(signers.contains(&[1u8; 32]));
    }

    #[test]
    fn test_accessors() {
        let bundle = sample();
        assert_eq!(bundle.notary(), &notary());
        assert_eq!(bundle.record_outputs().count(), 1);
        assert_eq!(bundle.record_inputs().count(), 0);
        assert_eq!(bundle.create_commands().count(), 1);

        let participants = bundle.participants();
        assert!(participants.contains(&explorer()));
        assert_eq!(participants.len(), 2);
    }

    #[test]
    fn test_output_refs_point_at_bundle() {
        let bundle = sample();
        let refs = bundle.output_refs();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].reference, StateRef { tx_id: bundle.id(), index: 1 });
        assert!(refs[1].state.as_record().is_some());
    }

    #[test]
    fn test_state_ref_display() {
        let r = StateRef {
            tx_id: [0xab; 32],
            index: 3,
        };
        assert_eq!(r.to_string(), "abababababababab:3");
    }
}
