//! # split-ledger
//!
//! Shared-expense ledger and settlement optimization engine.
//!
//! Given a group's expenses and recorded settlements, this engine computes
//! exact per-member balances and the payments that settle them.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: money, members, groups, expenses, settlements, ledger
//! - **split** — Equal and custom split normalization
//! - **aggregation** — Balance computation and ledger validation
//! - **optimization** — Greedy settle-up payment suggestions
//! - **explain** — Human-readable settlement notifications
//! - **analysis** — Fairness, data reliability and spending analytics
//! - **store** — Versioned in-process group book with explicit commits
//! - **simulation** — Random group histories for testing

pub mod aggregation;
pub mod analysis;
pub mod core;
pub mod explain;
pub mod optimization;
pub mod simulation;
pub mod split;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::aggregation::balances::BalanceAggregator;
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::error::LedgerError;
    pub use crate::core::expense::{Expense, ExtraItem, Payer, Split};
    pub use crate::core::group::{Group, Member};
    pub use crate::core::ids::{ExpenseId, GroupId, MemberId, SettlementId};
    pub use crate::core::ledger::{Balance, Ledger};
    pub use crate::core::money::Money;
    pub use crate::core::payment::Payment;
    pub use crate::core::settlement::{Settlement, SettlementStatus};
    pub use crate::explain::explainer::SettlementExplainer;
    pub use crate::optimization::settle_up::{OptimizationResult, SettlementOptimizer};
    pub use crate::split::normalizer::{equal_splits, normalize, verify_sum};
}
