use crate::core::ids::{ExpenseId, GroupId, MemberId};
use crate::core::money::Money;
use thiserror::Error;

/// Errors raised when constructing records or committing to a group book.
///
/// The balance, split and optimizer functions never return these: they
/// recover from malformed input locally.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("settlement amount must be positive, got {0}")]
    NonPositiveSettlement(Money),
    #[error("settlement cannot be from {0} to themselves")]
    SelfSettlement(MemberId),
    #[error("expense amount must be positive, got {0}")]
    NonPositiveExpense(Money),
    #[error("member {0} appears more than once in the group")]
    DuplicateMember(MemberId),
    #[error("expense {0} has no splits")]
    MissingSplits(ExpenseId),
    #[error("expense {0} not found")]
    UnknownExpense(ExpenseId),
    #[error("expense {0} already exists")]
    DuplicateExpense(ExpenseId),
    #[error("record belongs to group {found}, expected {expected}")]
    GroupMismatch { expected: GroupId, found: GroupId },
    #[error("payers sum to {payers}, but expense amount is {amount}")]
    PayersMismatch { payers: Money, amount: Money },
    #[error("invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },
    #[error("version conflict: expected {expected}, current is {current}")]
    VersionConflict { expected: u64, current: u64 },
}
