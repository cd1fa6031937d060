use crate::core::ids::MemberId;
use crate::core::ledger::{Balance, Ledger};
use crate::core::money::Money;
use crate::core::payment::Payment;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Suggested payments that bring every balance to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Ordered by descending amount; ties keep generation order.
    pub payments: Vec<Payment>,
    pub transaction_count: usize,
}

impl OptimizationResult {
    /// Sum of all suggested payment amounts.
    pub fn total_transferred(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

impl std::fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Suggested Payments ===")?;
        if self.payments.is_empty() {
            return writeln!(f, "Everyone is settled up.");
        }
        for payment in &self.payments {
            writeln!(f, "  {}", payment)?;
        }
        writeln!(f, "Transactions:   {}", self.transaction_count)?;
        writeln!(f, "Total moved:    {}", self.total_transferred())
    }
}

/// One side of the matching: a creditor or a debtor with the absolute amount
/// still to be settled.
///
/// Heap order is largest amount first, then smallest member id.
#[derive(Debug, PartialEq, Eq)]
struct Outstanding {
    amount: Money,
    member_id: MemberId,
}

impl Ord for Outstanding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.amount
            .cmp(&other.amount)
            .then_with(|| other.member_id.cmp(&self.member_id))
    }
}

impl PartialOrd for Outstanding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Greedy debt simplification.
pub struct SettlementOptimizer;

impl SettlementOptimizer {
    /// Produce payments that zero out `balances`.
    ///
    /// # Algorithm
    ///
    /// 1. Members above one cent are creditors, below minus one cent are
    ///    debtors; everyone else is already settled.
    /// 2. Repeatedly match the largest remaining creditor with the largest
    ///    remaining debtor (ties by member id ascending) and move
    ///    `min(credit, debt)` from debtor to creditor.
    /// 3. A party whose remainder is within one cent of zero drops out.
    ///
    /// This is a heuristic. It needs at most `creditors + debtors - 1`
    /// payments and is optimal when no subset of debts cancels another
    /// subset exactly, but it is not a global minimum for every input.
    ///
    /// # Examples
    ///
    /// ```
    /// use split_ledger::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let balances = vec![
    ///     Balance::new("A", Money::new(dec!(150))),
    ///     Balance::new("B", Money::new(dec!(50))),
    ///     Balance::new("C", Money::new(dec!(-100))),
    ///     Balance::new("D", Money::new(dec!(-100))),
    /// ];
    /// let result = SettlementOptimizer::optimize(&balances);
    /// assert_eq!(result.transaction_count, 3);
    /// assert_eq!(result.payments[0], Payment::new("C", "A", Money::new(dec!(100))));
    /// ```
    pub fn optimize(balances: &[Balance]) -> OptimizationResult {
        let mut creditors = BinaryHeap::new();
        let mut debtors = BinaryHeap::new();
        for b in balances {
            if b.balance > Money::EPSILON {
                creditors.push(Outstanding {
                    amount: b.balance,
                    member_id: b.member_id.clone(),
                });
            } else if b.balance < -Money::EPSILON {
                debtors.push(Outstanding {
                    amount: b.balance.abs(),
                    member_id: b.member_id.clone(),
                });
            }
        }

        let mut payments = Vec::with_capacity(creditors.len() + debtors.len());
        while let (Some(mut creditor), Some(mut debtor)) = (creditors.pop(), debtors.pop()) {
            let amount = creditor.amount.min(debtor.amount);
            log::debug!(
                "match {} (owes {}) -> {} (owed {}): {}",
                debtor.member_id,
                debtor.amount,
                creditor.member_id,
                creditor.amount,
                amount
            );
            payments.push(Payment::new(
                debtor.member_id.clone(),
                creditor.member_id.clone(),
                amount,
            ));

            creditor.amount -= amount;
            debtor.amount -= amount;
            if !creditor.amount.is_within_epsilon() {
                creditors.push(creditor);
            }
            if !debtor.amount.is_within_epsilon() {
                debtors.push(debtor);
            }
        }

        if !creditors.is_empty() || !debtors.is_empty() {
            log::debug!(
                "unmatched residue: {} creditors, {} debtors (balances did not sum to zero)",
                creditors.len(),
                debtors.len()
            );
        }

        payments.sort_by(|a, b| b.amount.cmp(&a.amount));
        let transaction_count = payments.len();
        OptimizationResult {
            payments,
            transaction_count,
        }
    }
}

/// Balances after treating each payment as a completed settlement.
pub fn apply_payments(balances: &[Balance], payments: &[Payment]) -> Vec<Balance> {
    let mut ledger = Ledger::from(balances);
    for payment in payments {
        ledger.credit(&payment.from_member_id, payment.amount);
        ledger.debit(&payment.to_member_id, payment.amount);
    }
    ledger.to_balances()
}
