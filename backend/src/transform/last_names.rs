//! Surname frequency.

use std::collections::HashMap;

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use tracing::debug;

use crate::models::PassengerTable;

/// Occurrence count per surname.
///
/// Matching is exact and case-sensitive. [`LastNameCounts::by_count`] gives
/// the natural consumption order: most frequent first, ties by surname.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastNameCounts {
    counts: HashMap<String, usize>,
}

/// One entry of [`LastNameCounts::by_count`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastNameCount<'a> {
    pub last_name: &'a str,
    pub count: usize,
}

impl LastNameCounts {
    pub fn get(&self, last_name: &str) -> usize {
        self.counts.get(last_name).copied().unwrap_or(0)
    }

    /// Number of distinct surnames.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts (equals the number of records counted).
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn by_count(&self) -> Vec<LastNameCount<'_>> {
        let mut entries: Vec<LastNameCount<'_>> = self
            .counts
            .iter()
            .map(|(name, &count)| LastNameCount {
                last_name: name,
                count,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.last_name.cmp(b.last_name))
        });
        entries
    }
}

impl Serialize for LastNameCounts {
    /// Serialized as a list in [`LastNameCounts::by_count`] order.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.by_count();
        let mut seq = serializer.serialize_seq(Some(entries.len()))?;
        for entry in &entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

/// Count surnames across every record.
pub fn last_names(table: &PassengerTable) -> LastNameCounts {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in table {
        *counts.entry(record.last_name().to_string()).or_insert(0) += 1;
    }

    debug!(distinct = counts.len(), "last names counted");
    LastNameCounts { counts }
}
