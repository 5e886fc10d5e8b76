//! Stock movements and the append-only movement log.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::intern::InternedStr;

/// Tag recorded on movements produced by expiry trimming.
pub const EXPIRED_TAG: &str = "EXPIRED";

/// A signed stock change against an item at a unit price.
///
/// Positive amounts are inbound (stored stock), negative amounts are
/// outbound (sales and expiry). The tag names the origin: the supplier for
/// inbound movements, the buyer for sales, [`EXPIRED_TAG`] for trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Movement {
    /// Item the stock belongs to.
    pub item: InternedStr,
    /// Signed change in units.
    pub amount: i64,
    /// Unit price of the affected batch.
    pub unit_price: i64,
    /// Supplier, buyer or [`EXPIRED_TAG`].
    pub tag: InternedStr,
}

impl Movement {
    /// Create a movement.
    pub fn new(
        item: impl Into<InternedStr>,
        amount: i64,
        unit_price: i64,
        tag: impl Into<InternedStr>,
    ) -> Self {
        Self {
            item: item.into(),
            amount,
            unit_price,
            tag: tag.into(),
        }
    }

    /// Check if this movement brought stock in.
    #[must_use]
    pub const fn is_inbound(&self) -> bool {
        self.amount > 0
    }

    /// Check if this movement records an expiry removal.
    #[must_use]
    pub fn is_expiry(&self) -> bool {
        self.tag == EXPIRED_TAG
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:+} @ {} [{}]",
            self.item, self.amount, self.unit_price, self.tag
        )
    }
}

/// Chronological, append-only record of every stock change.
///
/// Entries are never removed or reordered. Only the owning
/// [`Ledger`](crate::Ledger) appends to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementLog {
    entries: Vec<Movement>,
}

impl MovementLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, movement: Movement) {
        self.entries.push(movement);
    }

    /// All movements in append order.
    #[must_use]
    pub fn as_slice(&self) -> &[Movement] {
        &self.entries
    }

    /// Iterate in append order.
    pub fn iter(&self) -> std::slice::Iter<'_, Movement> {
        self.entries.iter()
    }

    /// Movements recorded against one item, in append order.
    pub fn for_item<'a>(&'a self, item: &'a str) -> impl Iterator<Item = &'a Movement> + 'a {
        self.entries.iter().filter(move |m| m.item == item)
    }

    /// Number of movements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent movement.
    #[must_use]
    pub fn last(&self) -> Option<&Movement> {
        self.entries.last()
    }
}

impl<'a> IntoIterator for &'a MovementLog {
    type Item = &'a Movement;
    type IntoIter = std::slice::Iter<'a, Movement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
