//! Read-only analytics over a ledger.
//!
//! - [`average_prices`]: weighted average unit price of the stock per item.
//! - [`supplier_volumes`]: inbound units per item and supplier tag.
//! - [`best_suppliers`]: the supplier(s) that delivered the most of each item.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::intern::InternedStr;
use crate::Ledger;

/// `Σ(amount · unit_price) / Σ amount` for every item with stock.
///
/// Items whose stock is entirely free (unit price 0) are included with an
/// average of zero.
#[must_use]
pub fn average_prices(ledger: &Ledger) -> BTreeMap<InternedStr, Decimal> {
    ledger
        .inventory()
        .filter_map(|(item, batches)| {
            let amount = Decimal::from(batches.total_amount());
            let cost = Decimal::from_i128(batches.total_cost())?;
            let average = cost.checked_div(amount)?;
            Some((item.clone(), average))
        })
        .collect()
}

/// Inbound units per item, broken down by supplier tag.
///
/// Only positive movements count; sales and expiry removals do not reduce a
/// supplier's volume.
#[must_use]
pub fn supplier_volumes(ledger: &Ledger) -> BTreeMap<InternedStr, BTreeMap<InternedStr, i128>> {
    let mut volumes: BTreeMap<InternedStr, BTreeMap<InternedStr, i128>> = BTreeMap::new();

    for movement in ledger.movements().iter().filter(|m| m.is_inbound()) {
        *volumes
            .entry(movement.item.clone())
            .or_default()
            .entry(movement.tag.clone())
            .or_default() += i128::from(movement.amount);
    }

    volumes
}

/// Union over all items of the tag(s) with the largest inbound volume.
/// Ties keep every tied tag.
#[must_use]
pub fn best_suppliers(ledger: &Ledger) -> BTreeSet<String> {
    let mut best = BTreeSet::new();

    for by_tag in supplier_volumes(ledger).values() {
        let Some(top) = by_tag.values().copied().max() else {
            continue;
        };
        best.extend(
            by_tag
                .iter()
                .filter(|&(_, &volume)| volume == top)
                .map(|(tag, _)| tag.to_string()),
        );
    }

    best
}
