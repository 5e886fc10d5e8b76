//! Core engine for stockledger.
//!
//! This crate provides an in-memory goods ledger:
//!
//! - [`Batch`] - A priced, dated lot of one item
//! - [`BatchList`] - An item's batches in first-expires-first-out order
//! - [`Movement`] / [`MovementLog`] - The append-only record of stock changes
//! - [`Ledger`] - Items, batches and the movement log together
//! - [`seller`] - Sales under a ceiling on the average unit cost
//! - [`reconcile`] - Checking stock against the movement log
//! - [`analytics`] - Average prices and best suppliers
//!
//! # Example
//!
//! ```
//! use stockledger_core::Ledger;
//!
//! let mut ledger = Ledger::new();
//! ledger.store("rice", 100, 17, "20220202".parse().unwrap(), "ACME Rice Ltd.").unwrap();
//! ledger.store("rice", 200, 158, "20771023".parse().unwrap(), "RICE Unlimited").unwrap();
//! ledger.store("rice", 42, 9, "20211111".parse().unwrap(), "ACME Rice Ltd.").unwrap();
//!
//! // Earliest-expiring stock is issued first, as long as the average
//! // unit cost stays within the ceiling.
//! let sale = ledger.try_sell("rice", 500, 15, "Pear Shop").unwrap();
//! assert_eq!(sale.quantity, 42 + 100);
//!
//! // Expired batches are removed and logged.
//! let expired = ledger.remove_expired("20300101".parse().unwrap());
//! assert!(expired.is_empty());
//!
//! // Stock is always explained by the movement log.
//! assert!(ledger.find_inconsistencies().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analytics;
pub mod batch;
pub mod error;
pub mod expiry;
pub mod format;
pub mod intern;
pub mod ledger;
pub mod movement;
pub mod reconcile;
pub mod seller;

pub use batch::{Batch, BatchList};
pub use error::LedgerError;
pub use expiry::Expiry;
pub use format::{format_ledger, FormatConfig};
pub use intern::InternedStr;
pub use ledger::{Ledger, LedgerSnapshot};
pub use movement::{Movement, MovementLog, EXPIRED_TAG};
pub use reconcile::Inconsistency;
pub use seller::{Boundary, Sale, SalePlan};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
