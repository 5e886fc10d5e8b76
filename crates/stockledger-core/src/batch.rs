//! Batches and the per-item FEFO batch list.
//!
//! A [`Batch`] is a priced, dated lot of one item. A [`BatchList`] keeps the
//! batches of an item ordered by non-increasing expiry from front to back, so
//! the earliest-expiring stock always sits at the tail. Sales consume from the
//! tail (first-expires-first-out) and expiry trimming is a suffix scan.
//!
//! The order is produced by the insertion rule alone: a new batch goes in
//! front of the first batch whose expiry is not later than its own. Among
//! equal expiries the newest batch therefore ends up closest to the front.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Expiry;

/// A priced, dated lot of stock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Batch {
    /// Units in the lot. Always positive while the batch is stored.
    pub amount: i64,
    /// Cost of one unit.
    pub unit_price: i64,
    /// Best-before date.
    pub expiry: Expiry,
}

impl Batch {
    /// Create a batch.
    #[must_use]
    pub const fn new(amount: i64, unit_price: i64, expiry: Expiry) -> Self {
        Self {
            amount,
            unit_price,
            expiry,
        }
    }

    /// Total cost of the lot (`amount * unit_price`).
    #[must_use]
    pub fn cost(&self) -> i128 {
        i128::from(self.amount) * i128::from(self.unit_price)
    }

    /// A copy of this batch carrying a different amount.
    #[must_use]
    pub const fn with_amount(&self, amount: i64) -> Self {
        Self {
            amount,
            unit_price: self.unit_price,
            expiry: self.expiry,
        }
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {} (expires {})", self.amount, self.unit_price, self.expiry)
    }
}

/// Batches of a single item in FEFO order.
///
/// # Examples
///
/// ```
/// use stockledger_core::{Batch, BatchList};
///
/// let mut list = BatchList::new();
/// list.insert(Batch::new(100, 17, "20220202".parse().unwrap()));
/// list.insert(Batch::new(200, 158, "20771023".parse().unwrap()));
/// list.insert(Batch::new(42, 9, "20211111".parse().unwrap()));
///
/// let prices: Vec<i64> = list.iter().map(|b| b.unit_price).collect();
/// assert_eq!(prices, vec![158, 17, 9]);
///
/// // The earliest-expiring batch is sold first.
/// assert_eq!(list.fefo().next().unwrap().unit_price, 9);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchList {
    batches: Vec<Batch>,
}

impl BatchList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches front to back (latest expiry first).
    #[must_use]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Iterate front to back.
    pub fn iter(&self) -> std::slice::Iter<'_, Batch> {
        self.batches.iter()
    }

    /// Iterate in issue order: tail first, earliest expiry first.
    pub fn fefo(&self) -> std::iter::Rev<std::slice::Iter<'_, Batch>> {
        self.batches.iter().rev()
    }

    /// Number of batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Check if the list holds no batches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total units over all batches.
    #[must_use]
    pub fn total_amount(&self) -> i64 {
        self.batches.iter().map(|b| b.amount).sum()
    }

    /// Total cost over all batches.
    #[must_use]
    pub fn total_cost(&self) -> i128 {
        self.batches.iter().map(Batch::cost).sum()
    }

    /// Check that expiry never increases from front to back.
    #[must_use]
    pub fn is_fefo_ordered(&self) -> bool {
        self.batches.windows(2).all(|w| w[0].expiry >= w[1].expiry)
    }

    /// Insert a batch in front of the first batch whose expiry is not later
    /// than its own, or at the end if every batch expires later.
    pub fn insert(&mut self, batch: Batch) {
        let position = self
            .batches
            .iter()
            .position(|existing| existing.expiry <= batch.expiry)
            .unwrap_or(self.batches.len());
        self.batches.insert(position, batch);
        debug_assert!(self.is_fefo_ordered());
    }

    /// Detach every batch that expires strictly before `cutoff`.
    ///
    /// Those batches form a suffix of the list. They are returned tail first,
    /// i.e. in increasing expiry order.
    pub fn trim_expired(&mut self, cutoff: Expiry) -> Vec<Batch> {
        let mut detached = Vec::new();
        while self.batches.last().is_some_and(|b| b.expiry < cutoff) {
            if let Some(batch) = self.batches.pop() {
                detached.push(batch);
            }
        }
        detached
    }

    /// Consume stock in issue order.
    ///
    /// Removes the `whole` tail batches entirely, then takes `partial` units
    /// from the new tail. Returns the consumed portions in issue order; a
    /// batch that drops to zero units is removed.
    pub(crate) fn consume_fefo(&mut self, whole: usize, partial: Option<i64>) -> Vec<Batch> {
        let split = self.batches.len().saturating_sub(whole);
        let mut consumed: Vec<Batch> = self.batches.drain(split..).rev().collect();

        if let Some(quantity) = partial.filter(|&q| q > 0) {
            if let Some(tail) = self.batches.last_mut() {
                let taken = quantity.min(tail.amount);
                tail.amount -= taken;
                consumed.push(tail.with_amount(taken));
            }
            if self.batches.last().is_some_and(|b| b.amount == 0) {
                self.batches.pop();
            }
        }

        consumed
    }
}

impl<'a> IntoIterator for &'a BatchList {
    type Item = &'a Batch;
    type IntoIter = std::slice::Iter<'a, Batch>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.iter()
    }
}

impl FromIterator<Batch> for BatchList {
    /// Build a list by inserting batches in the order given.
    fn from_iter<I: IntoIterator<Item = Batch>>(iter: I) -> Self {
        let mut list = Self::new();
        for batch in iter {
            list.insert(batch);
        }
        list
    }
}
