//! Operation scripts for `sledger-replay`.
//!
//! A script is a JSON array of operations applied in order:
//!
//! ```json
//! [
//!   {"op": "store", "item": "rice", "amount": 100, "unit_price": 17,
//!    "expiry": "20220202", "tag": "ACME Rice Ltd."},
//!   {"op": "sell", "item": "rice", "amount": 30, "price_ceiling": 20,
//!    "tag": "Pear Shop"},
//!   {"op": "expire", "cutoff": "20220101"}
//! ]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stockledger_core::{Expiry, Ledger, LedgerError, LedgerSnapshot, Sale};
use tracing::{debug, instrument};

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Operation {
    /// Receive a batch.
    Store {
        /// Item name.
        item: String,
        /// Units received.
        amount: i64,
        /// Price per unit.
        unit_price: i64,
        /// Expiry date as `YYYYMMDD`.
        expiry: Expiry,
        /// Supplier.
        tag: String,
    },
    /// Sell under a ceiling on the average unit cost.
    Sell {
        /// Item name.
        item: String,
        /// Units requested.
        amount: i64,
        /// Highest acceptable average unit cost.
        price_ceiling: i64,
        /// Customer.
        tag: String,
    },
    /// Remove batches expiring strictly before `cutoff`.
    Expire {
        /// Cutoff date as `YYYYMMDD`.
        cutoff: Expiry,
    },
}

/// What applying an operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Outcome {
    /// A batch was stored.
    Stored {
        /// Item name.
        item: String,
        /// Units received.
        amount: i64,
    },
    /// A sale was attempted.
    Sold {
        /// Item name.
        item: String,
        /// Units requested.
        requested: i64,
        /// Units sold and what they cost.
        sale: Sale,
    },
    /// Expired batches were removed.
    Expired {
        /// Number of batches removed.
        batches: usize,
        /// Units removed across those batches.
        amount: i64,
    },
}

impl Operation {
    /// Apply this operation to `ledger`.
    pub fn apply(&self, ledger: &mut Ledger) -> Result<Outcome, LedgerError> {
        match self {
            Self::Store {
                item,
                amount,
                unit_price,
                expiry,
                tag,
            } => {
                ledger.store(item, *amount, *unit_price, *expiry, tag)?;
                Ok(Outcome::Stored {
                    item: item.clone(),
                    amount: *amount,
                })
            }
            Self::Sell {
                item,
                amount,
                price_ceiling,
                tag,
            } => {
                let sale = ledger.try_sell(item, *amount, *price_ceiling, tag)?;
                Ok(Outcome::Sold {
                    item: item.clone(),
                    requested: *amount,
                    sale,
                })
            }
            Self::Expire { cutoff } => {
                let removed = ledger.remove_expired(*cutoff);
                Ok(Outcome::Expired {
                    batches: removed.len(),
                    amount: removed.iter().map(|b| b.amount).sum(),
                })
            }
        }
    }
}

/// Parse a script from JSON text.
pub fn parse_script(source: &str) -> Result<Vec<Operation>> {
    serde_json::from_str(source).context("invalid operation script")
}

/// Read and parse a script file.
pub fn load_script(path: &Path) -> Result<Vec<Operation>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_script(&source).with_context(|| format!("in {}", path.display()))
}

/// Read a saved ledger (a JSON [`LedgerSnapshot`]).
///
/// The stock is not checked against the movements here; a tampered snapshot
/// loads fine and shows up in the inconsistency report.
pub fn load_snapshot(path: &Path) -> Result<Ledger> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot: LedgerSnapshot = serde_json::from_str(&source)
        .with_context(|| format!("invalid ledger snapshot in {}", path.display()))?;
    Ledger::from_snapshot(snapshot)
        .with_context(|| format!("invalid ledger snapshot in {}", path.display()))
}

/// Apply `operations` to a fresh ledger in order.
pub fn replay(operations: &[Operation]) -> Result<(Ledger, Vec<Outcome>)> {
    replay_onto(Ledger::new(), operations)
}

/// Apply `operations` to `ledger` in order.
///
/// Stops at the first rejected operation; the error names its position.
#[instrument(skip_all, fields(operations = operations.len()))]
pub fn replay_onto(
    mut ledger: Ledger,
    operations: &[Operation],
) -> Result<(Ledger, Vec<Outcome>)> {
    let mut outcomes = Vec::with_capacity(operations.len());

    for (index, operation) in operations.iter().enumerate() {
        let outcome = operation
            .apply(&mut ledger)
            .with_context(|| format!("operation #{} rejected", index + 1))?;
        debug!(?outcome, "applied operation");
        outcomes.push(outcome);
    }

    Ok((ledger, outcomes))
}

/// Deliveries of the small example warehouse.
pub fn demo_script() -> Vec<Operation> {
    const DELIVERIES: [(&str, i64, i64, (i32, u32, u32), &str); 7] = [
        ("rice", 100, 17, (2022, 2, 2), "ACME Rice Ltd."),
        ("corn", 70, 15, (2022, 3, 15), "UniCORN & co."),
        ("rice", 200, 158, (2077, 10, 23), "RICE Unlimited"),
        ("peas", 9774, 1, (2022, 9, 21), "G. P. a C."),
        ("rice", 90, 14, (2022, 2, 2), "Theorem's Rice"),
        ("peas", 64, 7, (2021, 11, 1), "Discount Peas"),
        ("rice", 42, 9, (2021, 11, 11), "ACME Rice Ltd."),
    ];

    DELIVERIES
        .iter()
        .filter_map(|&(item, amount, unit_price, (y, m, d), tag)| {
            let expiry = Expiry::from_ymd(y, m, d).ok()?;
            Some(Operation::Store {
                item: item.to_string(),
                amount,
                unit_price,
                expiry,
                tag: tag.to_string(),
            })
        })
        .collect()
}
