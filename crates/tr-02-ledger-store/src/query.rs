//! # Record Queries
//!
//! Equality filters over the flat record projection, plus the grouped
//! average of `quantity`.

use std::collections::BTreeMap;
use tr_01_record_contract::{PersistentRecord, RecordField, RecordType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Conjunction of column equality filters. An empty query matches every row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordQuery {
    filters: Vec<(RecordField, String)>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    pub fn with_equal(mut self, field: RecordField, value: impl Into<String>) -> Self {
        self.filters.push((field, value.into()));
        self
    }

    pub fn with_type(self, record_type: RecordType) -> Self {
        self.with_equal(RecordField::RecordType, record_type.as_str())
    }

    pub fn with_from_holder(self, holder: impl Into<String>) -> Self {
        self.with_equal(RecordField::FromHolder, holder)
    }

    pub fn with_to_holder(self, holder: impl Into<String>) -> Self {
        self.with_equal(RecordField::ToHolder, holder)
    }

    pub fn matches(&self, row: &PersistentRecord) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| row.text(*field) == *value)
    }

    /// Rows matching every filter, in input order.
    pub fn apply<'a>(
        &self,
        rows: impl IntoIterator<Item = &'a PersistentRecord>,
    ) -> Vec<PersistentRecord> {
        rows.into_iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect()
    }
}

/// Average quantity of one group.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupAverage {
    pub group: String,
    pub average: f64,
    pub count: usize,
}

/// Average of `quantity` per distinct value of `group_by`, ordered by the
/// average (ties by group name).
pub fn average_quantity_by(
    rows: &[PersistentRecord],
    group_by: RecordField,
    direction: SortDirection,
) -> Vec<GroupAverage> {
    let mut sums: BTreeMap<String, (i128, usize)> = BTreeMap::new();
    for row in rows {
        let entry = sums.entry(row.text(group_by)).or_insert((0, 0));
        entry.0 += i128::from(row.quantity);
        entry.1 += 1;
    }

    let mut averages: Vec<GroupAverage> = sums
        .into_iter()
        .map(|(group, (sum, count))| GroupAverage {
            group,
            average: sum as f64 / count as f64,
            count,
        })
        .collect();

    averages.sort_by(|a, b| {
        let by_average = match direction {
            SortDirection::Asc => a.average.total_cmp(&b.average),
            SortDirection::Desc => b.average.total_cmp(&a.average),
        };
        by_average.then_with(|| a.group.cmp(&b.group))
    });
    averages
}
