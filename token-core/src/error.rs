//! Error types for the token ledger

use crate::types::{Address, Amount};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every variant is a rejection of the requested operation. A returned
/// error guarantees that no state was mutated by the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An address argument was the zero identifier where a concrete
    /// account is required
    #[error("zero address where a concrete account is required")]
    ZeroAddress,

    /// Amount argument must be non-zero
    #[error("amount must be non-zero")]
    AmountZero,

    /// Requested amount exceeds the sender's balance
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount the operation needed
        required: Amount,
        /// Amount actually available
        available: Amount,
    },

    /// Requested amount exceeds the spender's remaining allowance
    #[error("insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance {
        /// Amount the operation needed
        required: Amount,
        /// Allowance actually available
        available: Amount,
    },

    /// Checked addition or multiplication exceeded the amount width
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// Checked subtraction went below zero
    #[error("arithmetic underflow in {context}")]
    ArithmeticUnderflow {
        /// Caller-supplied tag identifying the failing subtraction
        context: &'static str,
    },

    /// Division or remainder by zero
    #[error("division by zero")]
    DivideByZero,

    /// Mint would push circulating supply above the configured maximum
    #[error("mint of {requested} would exceed max supply {max_supply}")]
    SupplyCeiling {
        /// Amount the mint requested
        requested: Amount,
        /// Configured supply ceiling
        max_supply: Amount,
    },

    /// Transfer sender is frozen
    #[error("account {0} is frozen")]
    AccountFrozen(Address),

    /// Global transfer gate is closed
    #[error("transfers are locked until {unlock_at}")]
    TransfersLocked {
        /// Threshold after which transfers unlock
        unlock_at: DateTime<Utc>,
    },

    /// Caller lacks the required authority
    #[error("caller is not the authority")]
    Unauthorized,

    /// Redundant freeze or unfreeze request
    #[error("already in requested state: {0}")]
    AlreadyInState(String),

    /// Renounce requires a held authority seat
    #[error("authority seat is vacant")]
    AuthorityVacant,

    /// Claim requires a vacant authority seat
    #[error("authority seat is not vacant")]
    AuthorityNotVacant,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("concurrency error: {0}")]
    Concurrency(String),
}

impl Error {
    /// Stable label for metrics and log aggregation
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ZeroAddress => "zero_address",
            Error::AmountZero => "amount_zero",
            Error::InsufficientBalance { .. } => "insufficient_balance",
            Error::InsufficientAllowance { .. } => "insufficient_allowance",
            Error::ArithmeticOverflow => "arithmetic_overflow",
            Error::ArithmeticUnderflow { .. } => "arithmetic_underflow",
            Error::DivideByZero => "divide_by_zero",
            Error::SupplyCeiling { .. } => "supply_ceiling",
            Error::AccountFrozen(_) => "account_frozen",
            Error::TransfersLocked { .. } => "transfers_locked",
            Error::Unauthorized => "unauthorized",
            Error::AlreadyInState(_) => "already_in_state",
            Error::AuthorityVacant => "authority_vacant",
            Error::AuthorityNotVacant => "authority_not_vacant",
            Error::Config(_) => "config",
            Error::Concurrency(_) => "concurrency",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_diagnostics() {
        let err = Error::InsufficientBalance {
            required: 150,
            available: 100,
        };
        assert_eq!(
            err.to_string(),
            "insufficient balance: required 150, available 100"
        );
    }

    #[test]
    fn test_kind_labels_are_distinct() {
        let errs = [
            Error::ZeroAddress,
            Error::AmountZero,
            Error::ArithmeticOverflow,
            Error::DivideByZero,
            Error::Unauthorized,
            Error::AuthorityVacant,
            Error::AuthorityNotVacant,
        ];
        let mut labels: Vec<_> = errs.iter().map(|e| e.kind()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), errs.len());
    }
}
