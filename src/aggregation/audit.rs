use crate::aggregation::balances::BalanceAggregator;
use crate::core::expense::Expense;
use crate::core::group::Group;
use crate::core::ledger::Balance;
use crate::core::money::Money;
use crate::core::settlement::Settlement;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of checking that a group's balances cancel out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// Balances sum to zero within one cent.
    Ok,
    /// Off by less than one currency unit; likely accumulated rounding.
    Warn,
    /// Off by a unit or more; splits or settlements are inconsistent.
    Error,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationStatus::Ok => "ok",
            ValidationStatus::Warn => "warn",
            ValidationStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Balances plus a human-readable trail of how they were reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub balances: Vec<Balance>,
    pub audit: Vec<String>,
    pub status: ValidationStatus,
    pub total: Money,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.status == ValidationStatus::Ok
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Ledger Validation ===")?;
        for line in &self.audit {
            writeln!(f, "{}", line)?;
        }
        writeln!(f, "Status: {}", self.status)
    }
}

/// Recompute a group's balances and explain every step.
///
/// The trail lists each expense with its payer(s) and splits, flags
/// expenses whose splits do not add up, lists each completed settlement,
/// then summarises non-zero balances (largest first) and the zero-sum check.
pub fn validate_ledger(
    group: &Group,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> ValidationReport {
    let currency = &group.currency;
    let mut audit = Vec::new();

    for expense in expenses.iter().filter(|e| e.group_id() == &group.id) {
        for payer in expense.credits() {
            audit.push(format!(
                "Expense {}: {} paid {}",
                expense.id(),
                payer.member_id,
                currency.format_amount(payer.amount)
            ));
        }
        match expense.splits() {
            Some(splits) => {
                for split in splits {
                    audit.push(format!(
                        "  → {} owes {}",
                        split.member_id,
                        currency.format_amount(split.amount)
                    ));
                }
                let split_total = expense.split_total();
                let diff = (split_total - expense.amount()).abs();
                if diff > Money::EPSILON {
                    audit.push(format!(
                        "  WARNING: splits sum to {}, but expense is {} (diff: {})",
                        currency.format_amount(split_total),
                        currency.format_amount(expense.amount()),
                        currency.format_amount(diff)
                    ));
                }
            }
            None => audit.push("  WARNING: expense has no splits; nobody was debited".to_string()),
        }
    }

    for settlement in settlements
        .iter()
        .filter(|s| s.group_id() == &group.id && s.is_completed())
    {
        audit.push(format!(
            "Settlement {}: {} → {}: {}",
            settlement.id(),
            settlement.from_member_id(),
            settlement.to_member_id(),
            currency.format_amount(settlement.amount())
        ));
        if !group.contains(settlement.from_member_id()) || !group.contains(settlement.to_member_id())
        {
            audit.push("  WARNING: settlement references a member outside the group".to_string());
        }
    }

    let balances = BalanceAggregator::compute_balances(group, expenses, settlements);
    let total: Money = balances.iter().map(|b| b.balance).sum();

    audit.push(String::new());
    audit.push("Balance Summary:".to_string());
    let mut by_balance: Vec<&Balance> = balances.iter().collect();
    by_balance.sort_by(|a, b| b.balance.cmp(&a.balance).then(a.member_id.cmp(&b.member_id)));
    for b in by_balance.into_iter().filter(|b| !b.balance.is_within_epsilon()) {
        let verb = if b.balance.is_positive() { "gets" } else { "owes" };
        audit.push(format!(
            "  {}: {} {}",
            b.member_id,
            verb,
            currency.format_amount(b.balance.abs())
        ));
    }

    audit.push(String::new());
    audit.push(format!(
        "Invariant Check: Total net sum = {} (should be 0)",
        currency.format_amount(total)
    ));

    let status = classify(total);
    match status {
        ValidationStatus::Ok => {}
        ValidationStatus::Warn => {
            log::warn!("group {} balances off by {}", group.id, total);
            audit.push("WARNING: Small rounding error detected".to_string());
        }
        ValidationStatus::Error => {
            log::error!("group {} balances off by {}", group.id, total);
            audit.push("ERROR: Balances don't sum to zero! Possible data corruption.".to_string());
        }
    }

    ValidationReport {
        balances,
        audit,
        status,
        total,
    }
}

fn classify(total: Money) -> ValidationStatus {
    let drift = total.as_decimal().abs();
    if drift < dec!(0.01) {
        ValidationStatus::Ok
    } else if drift < dec!(1.00) {
        ValidationStatus::Warn
    } else {
        ValidationStatus::Error
    }
}
