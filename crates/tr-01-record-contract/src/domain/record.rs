//! # Transaction Record
//!
//! The immutable annotation a bundle carries next to its value transfer.
//! Invariants are checked on every construction path, including
//! deserialization, so a `RecordEntity` in hand is always well formed.

use crate::error::{RecordError, ValueConstraintError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::Party;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of movement a record describes.
///
/// Only `Issue` is produced by the issuance flow; the others are reserved
/// for move and redeem flows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    Issue,
    Move,
    Redeem,
}

impl RecordType {
    pub const ALL: [RecordType; 3] = [RecordType::Issue, RecordType::Move, RecordType::Redeem];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Issue => "ISSUE",
            RecordType::Move => "MOVE",
            RecordType::Redeem => "REDEEM",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| RecordError::UnknownRecordType {
                value: s.to_string(),
            })
    }
}

/// A transaction record.
///
/// Fields are private; the only way to obtain one is through
/// [`RecordEntity::new`] / [`RecordEntity::with_id`] or deserialization,
/// all of which enforce:
/// - `quantity >= 0`
/// - `from_holder != to_holder`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct RecordEntity {
    id: Uuid,
    explorer: Party,
    timestamp: DateTime<Utc>,
    record_type: RecordType,
    from_holder: String,
    to_holder: String,
    quantity: i64,
}

impl RecordEntity {
    /// Create a record with a fresh identifier.
    pub fn new(
        explorer: Party,
        timestamp: DateTime<Utc>,
        record_type: RecordType,
        from_holder: impl Into<String>,
        to_holder: impl Into<String>,
        quantity: i64,
    ) -> Result<Self, ValueConstraintError> {
        Self::with_id(
            Uuid::new_v4(),
            explorer,
            timestamp,
            record_type,
            from_holder,
            to_holder,
            quantity,
        )
    }

    /// Create a record with a caller-chosen identifier.
    pub fn with_id(
        id: Uuid,
        explorer: Party,
        timestamp: DateTime<Utc>,
        record_type: RecordType,
        from_holder: impl Into<String>,
        to_holder: impl Into<String>,
        quantity: i64,
    ) -> Result<Self, ValueConstraintError> {
        let from_holder = from_holder.into();
        let to_holder = to_holder.into();

        if quantity < 0 {
            return Err(ValueConstraintError::NegativeQuantity { quantity });
        }
        if from_holder == to_holder {
            return Err(ValueConstraintError::IdenticalHolders { holder: from_holder });
        }

        Ok(Self {
            id,
            explorer,
            timestamp,
            record_type,
            from_holder,
            to_holder,
            quantity,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn explorer(&self) -> &Party {
        &self.explorer
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn from_holder(&self) -> &str {
        &self.from_holder
    }

    pub fn to_holder(&self) -> &str {
        &self.to_holder
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Parties whose vaults retain this record. Only the explorer.
    pub fn participants(&self) -> Vec<Party> {
        vec![self.explorer.clone()]
    }
}

impl fmt::Display for RecordEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} x{} (explorer {})",
            self.record_type, self.from_holder, self.to_holder, self.quantity, self.explorer
        )
    }
}

/// Wire shape, validated into a `RecordEntity` on the way in.
#[derive(Deserialize)]
struct RawRecord {
    id: Uuid,
    explorer: Party,
    timestamp: DateTime<Utc>,
    record_type: RecordType,
    from_holder: String,
    to_holder: String,
    quantity: i64,
}

impl TryFrom<RawRecord> for RecordEntity {
    type Error = ValueConstraintError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        RecordEntity::with_id(
            raw.id,
            raw.explorer,
            raw.timestamp,
            raw.record_type,
            raw.from_holder,
            raw.to_holder,
            raw.quantity,
        )
    }
}
