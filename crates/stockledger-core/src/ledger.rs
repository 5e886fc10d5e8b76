//! The ledger: per-item batch lists plus the movement log.
//!
//! Every mutation goes through [`Ledger::store`], [`Ledger::try_sell`] or
//! [`Ledger::remove_expired`], and each of them appends the matching
//! movements, so the current stock can always be rebuilt from the log (see
//! [`Ledger::find_inconsistencies`]).
//!
//! The ledger has no interior mutability. Mutations need `&mut Ledger` and
//! queries need `&Ledger`; callers that share a ledger between threads wrap
//! it in their own lock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::error::{ensure_named, ensure_non_negative, ensure_positive, ensure_room};
use crate::intern::{InternedStr, StringInterner};
use crate::movement::EXPIRED_TAG;
use crate::reconcile::Inconsistency;
use crate::seller::{plan_sale, Sale};
use crate::{analytics, reconcile, Batch, BatchList, Expiry, LedgerError, Movement, MovementLog};

/// An in-memory goods ledger.
///
/// # Examples
///
/// ```
/// use stockledger_core::Ledger;
///
/// let mut ledger = Ledger::new();
/// ledger.store("rice", 100, 17, "20220202".parse().unwrap(), "ACME Rice Ltd.").unwrap();
/// ledger.store("rice", 42, 9, "20211111".parse().unwrap(), "ACME Rice Ltd.").unwrap();
///
/// // Sell as much as possible while the average unit cost stays <= 12.
/// let sale = ledger.try_sell("rice", 500, 12, "Pear Shop").unwrap();
/// assert_eq!((sale.quantity, sale.total_cost), (67, 42 * 9 + 25 * 17));
///
/// assert!(ledger.find_inconsistencies().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    inventory: BTreeMap<InternedStr, BatchList>,
    history: MovementLog,
    names: StringInterner,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new batch of `item` and record it as an inbound movement
    /// tagged with the supplier.
    pub fn store(
        &mut self,
        item: &str,
        amount: i64,
        unit_price: i64,
        expiry: Expiry,
        tag: &str,
    ) -> Result<(), LedgerError> {
        ensure_named("item", item)?;
        ensure_named("tag", tag)?;
        ensure_positive("amount", amount)?;
        ensure_non_negative("unit_price", unit_price)?;
        ensure_room("amount", self.available(item), amount)?;

        let item = self.names.intern(item);
        let tag = self.names.intern(tag);

        debug!(item = %item, amount, unit_price, %expiry, tag = %tag, "storing batch");

        self.history
            .append(Movement::new(item.clone(), amount, unit_price, tag));
        self.inventory
            .entry(item)
            .or_default()
            .insert(Batch::new(amount, unit_price, expiry));
        Ok(())
    }

    /// Sell up to `amount` units of `item` in FEFO order, as many as possible
    /// while the average unit cost stays at or below `price_ceiling`.
    ///
    /// Unknown items and sales where no positive quantity fits the ceiling
    /// return [`Sale::NONE`] and leave the ledger untouched. Otherwise each
    /// consumed batch portion is logged as an outbound movement at that
    /// batch's own price.
    pub fn try_sell(
        &mut self,
        item: &str,
        amount: i64,
        price_ceiling: i64,
        tag: &str,
    ) -> Result<Sale, LedgerError> {
        ensure_named("tag", tag)?;
        ensure_positive("amount", amount)?;
        ensure_non_negative("price_ceiling", price_ceiling)?;

        let Some(batches) = self.inventory.get_mut(item) else {
            debug!(item, "sale of unknown item");
            return Ok(Sale::NONE);
        };

        let Some(plan) = plan_sale(batches, amount, price_ceiling) else {
            debug!(item, amount, price_ceiling, "no quantity fits the price ceiling");
            return Ok(Sale::NONE);
        };
        let consumed = batches.consume_fefo(plan.whole_batches, plan.boundary.map(|b| b.quantity));
        debug_assert_eq!(
            consumed.iter().map(|b| b.amount).sum::<i64>(),
            plan.quantity
        );

        let name = self.names.intern(item);
        let tag = self.names.intern(tag);
        for portion in &consumed {
            self.history.append(Movement::new(
                name.clone(),
                -portion.amount,
                portion.unit_price,
                tag.clone(),
            ));
        }

        let sale = plan.sale();
        debug!(
            item,
            requested = amount,
            price_ceiling,
            quantity = sale.quantity,
            total_cost = %sale.total_cost,
            batches = consumed.len(),
            "sale committed"
        );
        Ok(sale)
    }

    /// Remove every batch that expires strictly before `cutoff`.
    ///
    /// Items are visited in ascending name order and each item's batches are
    /// returned earliest expiry first. Every removal is logged with
    /// [`EXPIRED_TAG`].
    pub fn remove_expired(&mut self, cutoff: Expiry) -> Vec<Batch> {
        let expired_tag = self.names.intern(EXPIRED_TAG);
        let mut removed = Vec::new();

        for (item, batches) in &mut self.inventory {
            for batch in batches.trim_expired(cutoff) {
                debug!(item = %item, amount = batch.amount, expiry = %batch.expiry, "batch expired");
                self.history.append(Movement::new(
                    item.clone(),
                    -batch.amount,
                    batch.unit_price,
                    expired_tag.clone(),
                ));
                removed.push(batch);
            }
        }

        removed
    }

    /// Batches of an item in FEFO order, front (latest expiry) first.
    #[must_use]
    pub fn batches(&self, item: &str) -> Option<&BatchList> {
        self.inventory.get(item).filter(|list| !list.is_empty())
    }

    /// Items that currently hold stock, with their batches, by name.
    pub fn inventory(&self) -> impl Iterator<Item = (&InternedStr, &BatchList)> {
        self.inventory.iter().filter(|(_, list)| !list.is_empty())
    }

    /// Names of the items that currently hold stock.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.inventory().map(|(item, _)| item.as_str())
    }

    /// Units of `item` in stock.
    #[must_use]
    pub fn available(&self, item: &str) -> i64 {
        self.inventory.get(item).map_or(0, BatchList::total_amount)
    }

    /// The movement log.
    #[must_use]
    pub const fn movements(&self) -> &MovementLog {
        &self.history
    }

    /// `(item, unit_price)` buckets whose stock differs from the net of the
    /// recorded movements.
    #[must_use]
    pub fn find_inconsistencies(&self) -> BTreeSet<Inconsistency> {
        reconcile::find_inconsistencies(self)
    }

    /// Weighted average unit price per stocked item.
    #[must_use]
    pub fn average_prices(&self) -> BTreeMap<InternedStr, Decimal> {
        analytics::average_prices(self)
    }

    /// Suppliers that delivered the most units of at least one item.
    #[must_use]
    pub fn best_suppliers(&self) -> BTreeSet<String> {
        analytics::best_suppliers(self)
    }

    /// A serializable copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            inventory: self
                .inventory()
                .map(|(item, list)| (item.to_string(), list.batches().to_vec()))
                .collect(),
            movements: self.history.as_slice().to_vec(),
        }
    }

    /// Rebuild a ledger from a snapshot.
    ///
    /// Batches are re-inserted through the FEFO rule, so a snapshot listing
    /// them out of order still yields a correctly ordered ledger. Nothing
    /// checks that the stock agrees with the movements; run
    /// [`Ledger::find_inconsistencies`] afterwards to find out.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        let mut ledger = Self::new();

        for (item, batches) in snapshot.inventory {
            ensure_named("item", &item)?;
            let name = ledger.names.intern(&item);
            let list = ledger.inventory.entry(name).or_default();
            // Inserting back to front keeps the relative order of equal expiries.
            for batch in batches.into_iter().rev() {
                ensure_positive("amount", batch.amount)?;
                ensure_non_negative("unit_price", batch.unit_price)?;
                ensure_room("amount", list.total_amount(), batch.amount)?;
                list.insert(batch);
            }
        }

        for movement in snapshot.movements {
            ensure_named("item", &movement.item)?;
            let item = ledger.names.intern(&movement.item);
            let tag = ledger.names.intern(&movement.tag);
            ledger.history.append(Movement::new(
                item,
                movement.amount,
                movement.unit_price,
                tag,
            ));
        }

        Ok(ledger)
    }
}

/// Serializable ledger state for reporting and persistence by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Stocked items and their batches in FEFO order.
    pub inventory: BTreeMap<String, Vec<Batch>>,
    /// The movement log in append order.
    pub movements: Vec<Movement>,
}
