//! Stockledger CLI tools.
//!
//! This crate provides command-line tools on top of `stockledger-core`:
//!
//! - `sledger-replay`: Replay a script of store/sell/expire operations and
//!   report the resulting inventory, history and analytics
//!
//! # Example Usage
//!
//! ```bash
//! sledger-replay operations.json
//! sledger-replay --demo --format json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;
pub mod script;
