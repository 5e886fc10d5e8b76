//! Ledger error types.
//!
//! Only malformed input is an error. Unknown items, infeasible sales and
//! reconciliation mismatches are ordinary results, see
//! [`Ledger::try_sell`](crate::Ledger::try_sell) and
//! [`Ledger::find_inconsistencies`](crate::Ledger::find_inconsistencies).

use thiserror::Error;

/// Errors returned by ledger operations.
///
/// Every variant is raised before the ledger is touched, so a failed call
/// leaves batches and movements exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// An argument was rejected at the boundary.
    #[error("invalid {argument}: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        argument: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl LedgerError {
    /// Build an [`LedgerError::InvalidArgument`].
    pub fn invalid(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    /// The argument that was rejected.
    #[must_use]
    pub const fn argument(&self) -> &'static str {
        match self {
            Self::InvalidArgument { argument, .. } => argument,
        }
    }
}

/// Reject amounts that are zero or negative.
pub(crate) fn ensure_positive(argument: &'static str, value: i64) -> Result<(), LedgerError> {
    if value > 0 {
        Ok(())
    } else {
        Err(LedgerError::invalid(
            argument,
            format!("must be positive, got {value}"),
        ))
    }
}

/// Reject negative prices. Zero is allowed (free goods).
pub(crate) fn ensure_non_negative(argument: &'static str, value: i64) -> Result<(), LedgerError> {
    if value >= 0 {
        Ok(())
    } else {
        Err(LedgerError::invalid(
            argument,
            format!("must not be negative, got {value}"),
        ))
    }
}

/// Reject an addition that would push `held` units past `i64::MAX`.
pub(crate) fn ensure_room(
    argument: &'static str,
    held: i64,
    added: i64,
) -> Result<(), LedgerError> {
    held.checked_add(added).map(|_| ()).ok_or_else(|| {
        LedgerError::invalid(
            argument,
            format!("{added} more units on top of {held} would overflow the stock"),
        )
    })
}

/// Reject empty or whitespace-only names.
pub(crate) fn ensure_named(argument: &'static str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        Err(LedgerError::invalid(argument, "must not be empty"))
    } else {
        Ok(())
    }
}
