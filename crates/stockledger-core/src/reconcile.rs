//! Reconciliation of stock against the movement log.
//!
//! For every `(item, unit_price)` bucket the units held in batches must equal
//! the sum of the signed movements recorded for that bucket. Buckets where
//! they differ are reported as [`Inconsistency`] records; an empty result
//! means the stock is fully explained by the log.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::intern::InternedStr;
use crate::Ledger;

/// A bucket whose stock disagrees with its movements.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Inconsistency {
    /// Item name.
    pub item: InternedStr,
    /// Unit price of the bucket.
    pub unit_price: i64,
    /// Units in stock minus the net recorded movement.
    pub delta: i128,
}

impl Inconsistency {
    /// Create a record.
    pub fn new(item: impl Into<InternedStr>, unit_price: i64, delta: i128) -> Self {
        Self {
            item: item.into(),
            unit_price,
            delta,
        }
    }
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}: {:+}", self.item, self.unit_price, self.delta)
    }
}

/// Compare the ledger's stock with its movement log.
///
/// Sums are taken in `i128`: a bucket's inbound history is unbounded even
/// though its stock fits an `i64`.
#[must_use]
pub fn find_inconsistencies(ledger: &Ledger) -> BTreeSet<Inconsistency> {
    let mut deltas: BTreeMap<(InternedStr, i64), i128> = BTreeMap::new();

    for (item, batches) in ledger.inventory() {
        for batch in batches {
            *deltas.entry((item.clone(), batch.unit_price)).or_default() += i128::from(batch.amount);
        }
    }

    for movement in ledger.movements() {
        *deltas
            .entry((movement.item.clone(), movement.unit_price))
            .or_default() -= i128::from(movement.amount);
    }

    deltas
        .into_iter()
        .filter(|(_, delta)| *delta != 0)
        .map(|((item, unit_price), delta)| Inconsistency {
            item,
            unit_price,
            delta,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Batch, LedgerSnapshot, Movement};

    fn snapshot() -> LedgerSnapshot {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.inventory.insert(
            "peas".to_string(),
            vec![Batch::new(10, 1, "20220921".parse().unwrap())],
        );
        snapshot.movements.push(Movement::new("peas", 10, 1, "G. P. a C."));
        snapshot
    }

    #[test]
    fn test_consistent_ledger() {
        let ledger = Ledger::from_snapshot(snapshot()).unwrap();
        assert!(find_inconsistencies(&ledger).is_empty());
    }

    #[test]
    fn test_stock_without_movement() {
        let mut snapshot = snapshot();
        snapshot.movements.clear();
        let ledger = Ledger::from_snapshot(snapshot).unwrap();

        let found = find_inconsistencies(&ledger);
        assert_eq!(found, BTreeSet::from([Inconsistency::new("peas", 1, 10)]));
    }

    #[test]
    fn test_movement_without_stock() {
        let mut snapshot = snapshot();
        snapshot.movements.push(Movement::new("beans", 5, 3, "Bean Co."));
        let ledger = Ledger::from_snapshot(snapshot).unwrap();

        let found = find_inconsistencies(&ledger);
        assert_eq!(found, BTreeSet::from([Inconsistency::new("beans", 3, -5)]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Inconsistency::new("rice", 12, -90).to_string(), "rice @ 12: -90");
    }
}
