//! Domain entities for the record contract.

pub mod bundle;
pub mod record;
pub mod transaction;
