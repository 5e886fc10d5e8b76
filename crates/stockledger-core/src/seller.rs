//! Price-constrained FEFO sales.
//!
//! A sale request asks for up to `requested` units of an item under a ceiling
//! on the *average* unit cost. Units must be issued in FEFO order, so the
//! sequence of unit prices met along the way is arbitrary and the running
//! average is not monotonic in the quantity sold. It is, however, monotonic
//! while the quantity grows inside a single batch: each extra unit moves the
//! average towards that batch's price. [`plan_sale`] exploits this.
//!
//! 1. Take whole batches from the tail until the request is met, taking only
//!    part of the last one if needed.
//! 2. If the average exceeds the ceiling, back off one batch at a time. For
//!    each batch given back, [`max_feasible_partial`] binary-searches how many
//!    of its units can stay.
//!
//! Candidates are visited from the largest quantity down, so the first
//! feasible one is the largest quantity the ceiling allows.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Batch, BatchList};

/// Outcome of a sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sale {
    /// Units sold.
    pub quantity: i64,
    /// Sum of the unit prices of the sold units.
    pub total_cost: i128,
}

impl Sale {
    /// Nothing sold.
    pub const NONE: Self = Self {
        quantity: 0,
        total_cost: 0,
    };

    /// Check if nothing was sold.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.quantity == 0
    }
}

impl From<Sale> for (i64, i128) {
    fn from(sale: Sale) -> Self {
        (sale.quantity, sale.total_cost)
    }
}

/// Units taken from the batch that is only partly sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    /// Unit price of the boundary batch.
    pub unit_price: i64,
    /// Units taken from it.
    pub quantity: i64,
}

impl Boundary {
    fn cost(self) -> i128 {
        i128::from(self.quantity) * i128::from(self.unit_price)
    }
}

/// An accepted sale that has not been applied yet.
///
/// The plan consumes the `whole_batches` tail batches entirely and then,
/// if present, the [`Boundary`] quantity from the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalePlan {
    /// Number of tail batches sold entirely.
    pub whole_batches: usize,
    /// Partial take from the batch after them.
    pub boundary: Option<Boundary>,
    /// Total units sold.
    pub quantity: i64,
    /// Total cost of the sold units.
    pub total_cost: i128,
}

impl SalePlan {
    /// The sale this plan produces once applied.
    #[must_use]
    pub const fn sale(&self) -> Sale {
        Sale {
            quantity: self.quantity,
            total_cost: self.total_cost,
        }
    }
}

/// Check `cost / quantity <= ceiling` without dividing.
///
/// A zero quantity counts as within the ceiling; callers treat it as
/// "nothing to sell" rather than as an accepted sale.
#[must_use]
pub fn average_within(cost: i128, quantity: i64, ceiling: i64) -> bool {
    cost <= i128::from(ceiling) * i128::from(quantity)
}

/// Largest number of units, between 1 and `limit`, that can be taken from a
/// batch priced `unit_price` on top of a prefix of `running_qty` units
/// costing `running_cost` without the average exceeding `ceiling`.
///
/// Returns `None` when no positive quantity fits.
///
/// ```
/// use stockledger_core::seller::max_feasible_partial;
///
/// // 42 units at 9 already taken; how many at 17 keep the average <= 12?
/// assert_eq!(max_feasible_partial(17, 100, 378, 42, 12), Some(25));
/// // Even one unit at 158 is too expensive on top of that prefix.
/// assert_eq!(max_feasible_partial(158, 200, 378, 42, 9), None);
/// ```
#[must_use]
pub fn max_feasible_partial(
    unit_price: i64,
    limit: i64,
    running_cost: i128,
    running_qty: i64,
    ceiling: i64,
) -> Option<i64> {
    if limit <= 0 {
        return None;
    }

    let fits = |quantity: i64| {
        let cost = running_cost + i128::from(quantity) * i128::from(unit_price);
        average_within(cost, running_qty + quantity, ceiling)
    };

    // A batch cheaper than the running average pulls it down, so the
    // feasible quantities are a suffix of the range; a dearer one pushes it
    // up and they are a prefix. Both shapes are covered by these two probes.
    if fits(limit) {
        return Some(limit);
    }
    if !fits(1) {
        return None;
    }

    // fits(lo) holds and fits(hi) does not.
    let (mut lo, mut hi) = (1, limit);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(lo)
}

/// Choose the largest FEFO quantity, up to `requested`, whose average unit
/// cost stays within `ceiling`.
///
/// Returns `None` when nothing can be sold. The batch list is not modified.
#[must_use]
pub fn plan_sale(batches: &BatchList, requested: i64, ceiling: i64) -> Option<SalePlan> {
    let mut whole: Vec<&Batch> = Vec::new();
    let mut boundary: Option<Boundary> = None;
    let mut quantity: i64 = 0;
    let mut cost: i128 = 0;

    for batch in batches.fefo() {
        let remaining = requested - quantity;
        if remaining <= 0 {
            break;
        }
        if batch.amount <= remaining {
            whole.push(batch);
            quantity += batch.amount;
            cost += batch.cost();
        } else {
            let partial = Boundary {
                unit_price: batch.unit_price,
                quantity: remaining,
            };
            quantity += partial.quantity;
            cost += partial.cost();
            boundary = Some(partial);
            break;
        }
    }

    loop {
        if quantity == 0 {
            return None;
        }
        if average_within(cost, quantity, ceiling) {
            return Some(SalePlan {
                whole_batches: whole.len(),
                boundary,
                quantity,
                total_cost: cost,
            });
        }

        // Give back the outermost batch, then see how much of it can stay.
        let (unit_price, limit) = match boundary.take() {
            Some(partial) => {
                quantity -= partial.quantity;
                cost -= partial.cost();
                (partial.unit_price, partial.quantity)
            }
            None => match whole.pop() {
                Some(batch) => {
                    quantity -= batch.amount;
                    cost -= batch.cost();
                    (batch.unit_price, batch.amount)
                }
                None => return None,
            },
        };

        trace!(unit_price, limit, quantity, "backing off boundary batch");

        if let Some(kept) = max_feasible_partial(unit_price, limit, cost, quantity, ceiling) {
            let partial = Boundary {
                unit_price,
                quantity: kept,
            };
            quantity += partial.quantity;
            cost += partial.cost();
            boundary = Some(partial);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Expiry;

    fn expiry(key: &str) -> Expiry {
        key.parse().unwrap()
    }

    fn rice() -> BatchList {
        [
            Batch::new(100, 17, expiry("20220202")),
            Batch::new(200, 158, expiry("20771023")),
            Batch::new(90, 14, expiry("20220202")),
            Batch::new(42, 9, expiry("20211111")),
        ]
        .into_iter()
        .collect()
    }

    fn sold(requested: i64, ceiling: i64) -> (i64, i128) {
        plan_sale(&rice(), requested, ceiling).map_or((0, 0), |p| p.sale().into())
    }

    #[test]
    fn test_average_within_ties_accepted() {
        assert!(average_within(30, 3, 10));
        assert!(!average_within(31, 3, 10));
        assert!(average_within(0, 0, 0));
    }

    #[test]
    fn test_max_feasible_partial_prefix_shape() {
        // (378 + 17q) / (42 + q) <= 12  <=>  q <= 25.2
        assert_eq!(max_feasible_partial(17, 100, 378, 42, 12), Some(25));
        // (378 + 17q) / (42 + q) <= 14  <=>  q <= 70
        assert_eq!(max_feasible_partial(17, 100, 378, 42, 14), Some(70));
    }

    #[test]
    fn test_max_feasible_partial_suffix_shape() {
        // Prefix averages 20; cheap units at 5 bring it down to 10 only
        // after 10 units, so the whole batch is the answer.
        assert_eq!(max_feasible_partial(5, 30, 200, 10, 10), Some(30));
        // Not enough cheap units to get there.
        assert_eq!(max_feasible_partial(5, 9, 200, 10, 10), None);
    }

    #[test]
    fn test_max_feasible_partial_empty_prefix() {
        assert_eq!(max_feasible_partial(9, 42, 0, 0, 9), Some(42));
        assert_eq!(max_feasible_partial(9, 42, 0, 0, 8), None);
        assert_eq!(max_feasible_partial(9, 0, 0, 0, 100), None);
    }

    #[test]
    fn test_plan_scenarios() {
        assert_eq!(sold(500, 9), (42, 378));
        assert_eq!(sold(500, 12), (67, 803));
        assert_eq!(sold(500, 14), (112, 1568));
        assert_eq!(sold(500, 15), (232, 3338));
        assert_eq!(sold(500, 16), (234, 3654));
        assert_eq!(sold(500, 81), (432, 34_938));
    }

    #[test]
    fn test_plan_below_cheapest_price() {
        assert!(plan_sale(&rice(), 500, 8).is_none());
    }

    #[test]
    fn test_plan_respects_request() {
        assert_eq!(sold(10, 100), (10, 90));
        assert_eq!(sold(50, 100), (50, 42 * 9 + 8 * 17));
    }

    #[test]
    fn test_plan_shape() {
        let plan = plan_sale(&rice(), 500, 16).unwrap();
        assert_eq!(plan.whole_batches, 3);
        assert_eq!(
            plan.boundary,
            Some(Boundary {
                unit_price: 158,
                quantity: 2
            })
        );

        let plan = plan_sale(&rice(), 500, 81).unwrap();
        assert_eq!(plan.whole_batches, 4);
        assert_eq!(plan.boundary, None);
    }

    #[test]
    fn test_plan_empty_list() {
        assert!(plan_sale(&BatchList::new(), 10, 100).is_none());
    }

    #[test]
    fn test_plan_recovers_after_expensive_front() {
        // Issue order: 10 @ 100, then 90 @ 1. Taking everything averages
        // 10.9; the cheap tail is what makes the sale feasible at all.
        let list: BatchList = [
            Batch::new(90, 1, expiry("20300101")),
            Batch::new(10, 100, expiry("20200101")),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            plan_sale(&list, 100, 11).map(|p| p.sale()),
            Some(Sale {
                quantity: 100,
                total_cost: 1090
            })
        );
        // At ceiling 10 the full take fails and nothing shorter is cheaper
        // on average, since every prefix starts at 100.
        assert!(plan_sale(&list, 100, 10).is_none());
    }
}
