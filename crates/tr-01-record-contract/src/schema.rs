//! # Persistent Record Projection
//!
//! The flat, column-oriented form of a record kept in the queryable store.
//! The explorer is stored by name; turning a row back into a `RecordEntity`
//! needs an identity lookup.

use crate::domain::record::{RecordEntity, RecordType};
use crate::error::{RecordError, RecordResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Party, PartyDirectory};
use uuid::Uuid;

/// One row of the record table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentRecord {
    pub linear_id: Uuid,
    pub explorer: String,
    pub timestamp: DateTime<Utc>,
    pub record_type: String,
    pub from_holder: String,
    pub to_holder: String,
    pub quantity: i64,
}

/// Columns of the record table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordField {
    LinearId,
    Explorer,
    Timestamp,
    RecordType,
    FromHolder,
    ToHolder,
    Quantity,
}

impl RecordField {
    pub const ALL: [RecordField; 7] = [
        RecordField::LinearId,
        RecordField::Explorer,
        RecordField::Timestamp,
        RecordField::RecordType,
        RecordField::FromHolder,
        RecordField::ToHolder,
        RecordField::Quantity,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            RecordField::LinearId => "linear_id",
            RecordField::Explorer => "explorer",
            RecordField::Timestamp => "timestamp",
            RecordField::RecordType => "type",
            RecordField::FromHolder => "from_holder",
            RecordField::ToHolder => "to_holder",
            RecordField::Quantity => "quantity",
        }
    }
}

/// Resolves a stored explorer name back to an identity.
pub trait IdentityResolver {
    fn resolve(&self, name: &str) -> Option<Party>;
}

impl IdentityResolver for PartyDirectory {
    fn resolve(&self, name: &str) -> Option<Party> {
        self.well_known_party(name)
    }
}

impl From<&RecordEntity> for PersistentRecord {
    fn from(record: &RecordEntity) -> Self {
        Self {
            linear_id: record.id(),
            explorer: record.explorer().name.clone(),
            timestamp: record.timestamp(),
            record_type: record.record_type().to_string(),
            from_holder: record.from_holder().to_string(),
            to_holder: record.to_holder().to_string(),
            quantity: record.quantity(),
        }
    }
}

impl PersistentRecord {
    /// Text value of a column, used for equality filters and grouping.
    pub fn text(&self, field: RecordField) -> String {
        match field {
            RecordField::LinearId => self.linear_id.to_string(),
            RecordField::Explorer => self.explorer.clone(),
            RecordField::Timestamp => self.timestamp.to_rfc3339(),
            RecordField::RecordType => self.record_type.clone(),
            RecordField::FromHolder => self.from_holder.clone(),
            RecordField::ToHolder => self.to_holder.clone(),
            RecordField::Quantity => self.quantity.to_string(),
        }
    }

    /// Rebuild the entity, re-checking its invariants.
    pub fn to_entity(&self, identities: &dyn IdentityResolver) -> RecordResult<RecordEntity> {
        let explorer =
            identities
                .resolve(&self.explorer)
                .ok_or_else(|| RecordError::UnknownParty {
                    name: self.explorer.clone(),
                })?;
        let record_type: RecordType = self.record_type.parse()?;

        Ok(RecordEntity::with_id(
            self.linear_id,
            explorer,
            self.timestamp,
            record_type,
            self.from_holder.clone(),
            self.to_holder.clone(),
            self.quantity,
        )?)
    }
}
