//! Per-call mutation counters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// What one ingestion call did to the graph
///
/// Every driver returns one of these and callers merge them with `+=`.
/// `properties_set` counts applied fields, not changed values, so
/// re-ingesting identical data reports the same number again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub nodes_created: u64,
    pub relationships_created: u64,
    pub properties_set: u64,
}

impl IngestOutcome {
    pub fn new(nodes_created: u64, relationships_created: u64, properties_set: u64) -> Self {
        Self {
            nodes_created,
            relationships_created,
            properties_set,
        }
    }

    /// True when the call created no nodes and no relationships
    pub fn is_shape_noop(&self) -> bool {
        self.nodes_created == 0 && self.relationships_created == 0
    }

    pub(crate) fn count_node(&mut self, created: bool) {
        if created {
            self.nodes_created += 1;
        }
    }

    pub(crate) fn count_properties(&mut self, n: usize) {
        self.properties_set += n as u64;
    }
}

impl AddAssign for IngestOutcome {
    fn add_assign(&mut self, other: Self) {
        self.nodes_created += other.nodes_created;
        self.relationships_created += other.relationships_created;
        self.properties_set += other.properties_set;
    }
}

impl Add for IngestOutcome {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for IngestOutcome {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes created, {} relationships created, {} properties set",
            self.nodes_created, self.relationships_created, self.properties_set
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_outcomes() {
        let mut total = IngestOutcome::new(1, 2, 3);
        total += IngestOutcome::new(4, 5, 6);
        assert_eq!(total, IngestOutcome::new(5, 7, 9));

        let summed: IngestOutcome = vec![IngestOutcome::new(1, 0, 10), IngestOutcome::new(0, 1, 1)]
            .into_iter()
            .sum();
        assert_eq!(summed, IngestOutcome::new(1, 1, 11));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(IngestOutcome::new(8, 12, 52)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"nodesCreated": 8, "relationshipsCreated": 12, "propertiesSet": 52})
        );
    }

    #[test]
    fn test_shape_noop_ignores_properties() {
        assert!(IngestOutcome::new(0, 0, 34).is_shape_noop());
        assert!(!IngestOutcome::new(0, 1, 0).is_shape_noop());
        assert_eq!(
            IngestOutcome::new(3, 3, 12).to_string(),
            "3 nodes created, 3 relationships created, 12 properties set"
        );
    }
}
