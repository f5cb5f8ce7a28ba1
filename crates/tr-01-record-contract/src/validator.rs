//! # Record Validation Rules
//!
//! Pure function over a bundle. Evaluated in a fixed order and the first
//! violated rule is reported; states and commands of other contracts are
//! ignored.

use crate::domain::bundle::ProposalBundle;
use crate::error::ValidationError;

/// Rule engine for bundles carrying records.
pub struct RecordValidator;

impl RecordValidator {
    /// Accept or reject `bundle`.
    ///
    /// 1. exactly one record `Create` command
    /// 2. no record is consumed
    /// 3. at least one record is produced
    /// 4. every produced record's explorer key is a signer of the `Create` command
    pub fn validate(bundle: &ProposalBundle) -> Result<(), ValidationError> {
        let creates: Vec<_> = bundle.create_commands().collect();
        if creates.len() != 1 {
            return Err(ValidationError::CreateCommandCount {
                found: creates.len(),
            });
        }
        let create = creates[0];

        let consumed = bundle.record_inputs().count();
        if consumed > 0 {
            return Err(ValidationError::RecordInputs { count: consumed });
        }

        let mut produced = bundle.record_outputs().peekable();
        if produced.peek().is_none() {
            return Err(ValidationError::NoRecordOutput);
        }

        for record in produced {
            if !create.signers.contains(&record.explorer().owning_key) {
                return Err(ValidationError::ExplorerNotSigner {
                    explorer: record.explorer().name.clone(),
                });
            }
        }

        Ok(())
    }
}
