use crate::core::expense::Expense;
use crate::core::group::Group;
use crate::core::ids::GroupId;
use crate::core::ledger::{Balance, Ledger};
use crate::core::settlement::Settlement;

/// Folds a group's expense and settlement history into net balances.
///
/// Every call recomputes from the full history it is given; nothing is
/// carried between calls.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Compute one balance per member of `group`, sorted by member id.
    ///
    /// # Algorithm
    ///
    /// 1. Start every group member at zero.
    /// 2. For each expense of this group, credit its payers (or `paid_by`
    ///    for the full amount), then debit each split.
    /// 3. For each completed settlement of this group, credit the sender and
    ///    debit the receiver.
    ///
    /// Expenses without splits debit nobody. Ids that appear in splits or
    /// settlements but not in `group.members` still get a balance entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use split_ledger::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let group = Group::new(
    ///     "g",
    ///     "Trip",
    ///     vec![Member::new("A", "Asha"), Member::new("B", "Bilal"), Member::new("C", "Chen")],
    ///     CurrencyCode::new("INR"),
    /// ).unwrap();
    /// let total = Money::new(dec!(300));
    /// let expense = Expense::new("g", "A", total, equal_splits(total, &group.member_ids()));
    ///
    /// let balances = BalanceAggregator::compute_balances(&group, &[expense], &[]);
    /// let values: Vec<_> = balances.iter().map(|b| b.balance.to_string()).collect();
    /// assert_eq!(values, ["200.00", "-100.00", "-100.00"]);
    /// ```
    pub fn compute_balances(
        group: &Group,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Vec<Balance> {
        Self::ledger(group, expenses, settlements).to_balances()
    }

    /// Look `group_id` up in `groups` and compute its balances.
    ///
    /// An unknown group yields an empty list.
    pub fn compute_group_balances(
        group_id: &GroupId,
        groups: &[Group],
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Vec<Balance> {
        match groups.iter().find(|g| &g.id == group_id) {
            Some(group) => Self::compute_balances(group, expenses, settlements),
            None => {
                log::warn!("balances requested for unknown group {}", group_id);
                Vec::new()
            }
        }
    }

    /// The ledger behind [`BalanceAggregator::compute_balances`].
    pub fn ledger(group: &Group, expenses: &[Expense], settlements: &[Settlement]) -> Ledger {
        let member_ids = group.member_ids();
        let mut ledger = Ledger::with_members(&member_ids);

        for expense in expenses.iter().filter(|e| e.group_id() == &group.id) {
            Self::apply_expense(&mut ledger, expense);
        }

        for settlement in settlements
            .iter()
            .filter(|s| s.group_id() == &group.id && s.is_completed())
        {
            ledger.apply_settlement(settlement);
        }

        log::debug!(
            "group {}: {} expenses, {} settlements -> {} positions, total {}",
            group.id,
            expenses.len(),
            settlements.len(),
            ledger.len(),
            ledger.total()
        );
        ledger
    }

    fn apply_expense(ledger: &mut Ledger, expense: &Expense) {
        for payer in expense.credits() {
            ledger.credit(&payer.member_id, payer.amount);
        }

        match expense.splits() {
            Some(splits) => {
                for split in splits {
                    ledger.debit(&split.member_id, split.amount);
                }
            }
            None => log::warn!("expense {} has no splits; nothing debited", expense.id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use crate::core::expense::{Payer, Split};
    use crate::core::group::Member;
    use crate::core::ids::MemberId;
    use crate::core::money::Money;
    use crate::split::normalizer::equal_splits;
    use rust_decimal_macros::dec;

    fn m(v: rust_decimal::Decimal) -> Money {
        Money::new(v)
    }

    fn group() -> Group {
        Group::new(
            "g",
            "Trip",
            vec![
                Member::new("A", "Asha"),
                Member::new("B", "Bilal"),
                Member::new("C", "Chen"),
            ],
            CurrencyCode::new("INR"),
        )
        .unwrap()
    }

    fn balance_of(balances: &[Balance], id: &str) -> Money {
        balances
            .iter()
            .find(|b| b.member_id == MemberId::new(id))
            .map(|b| b.balance)
            .unwrap()
    }

    fn equal_expense(payer: &str, total: Money) -> Expense {
        Expense::new("g", payer, total, equal_splits(total, &group().member_ids()))
    }

    #[test]
    fn test_single_expense() {
        let balances =
            BalanceAggregator::compute_balances(&group(), &[equal_expense("A", m(dec!(300)))], &[]);
        assert_eq!(balance_of(&balances, "A"), m(dec!(200)));
        assert_eq!(balance_of(&balances, "B"), m(dec!(-100)));
        assert_eq!(balance_of(&balances, "C"), m(dec!(-100)));
    }

    #[test]
    fn test_members_without_activity_appear() {
        let balances = BalanceAggregator::compute_balances(&group(), &[], &[]);
        assert_eq!(balances.len(), 3);
        assert!(balances.iter().all(|b| b.balance.is_zero()));
    }

    #[test]
    fn test_multiple_payers() {
        let total = m(dec!(90));
        let expense = Expense::new("g", "A", total, equal_splits(total, &group().member_ids()))
            .with_payers(vec![Payer::new("B", m(dec!(60))), Payer::new("C", m(dec!(30)))]);
        let balances = BalanceAggregator::compute_balances(&group(), &[expense], &[]);
        assert_eq!(balance_of(&balances, "A"), m(dec!(-30)));
        assert_eq!(balance_of(&balances, "B"), m(dec!(30)));
        assert_eq!(balance_of(&balances, "C"), Money::ZERO);
    }

    #[test]
    fn test_completed_settlement_applies() {
        let expense = equal_expense("A", m(dec!(300)));
        let settlement = Settlement::completed("g", "B", "A", m(dec!(100))).unwrap();
        let balances = BalanceAggregator::compute_balances(&group(), &[expense], &[settlement]);
        assert_eq!(balance_of(&balances, "A"), m(dec!(100)));
        assert_eq!(balance_of(&balances, "B"), Money::ZERO);
        assert_eq!(balance_of(&balances, "C"), m(dec!(-100)));
    }

    #[test]
    fn test_pending_settlement_ignored() {
        let expense = equal_expense("A", m(dec!(300)));
        let settlement = Settlement::pending("g", "B", "A", m(dec!(100))).unwrap();
        let balances = BalanceAggregator::compute_balances(&group(), &[expense], &[settlement]);
        assert_eq!(balance_of(&balances, "B"), m(dec!(-100)));
    }

    #[test]
    fn test_other_group_records_ignored() {
        let total = m(dec!(50));
        let foreign = Expense::new("other", "A", total, vec![Split::new("B", total)]);
        let foreign_settlement = Settlement::completed("other", "B", "A", total).unwrap();
        let balances =
            BalanceAggregator::compute_balances(&group(), &[foreign], &[foreign_settlement]);
        assert!(balances.iter().all(|b| b.balance.is_zero()));
    }

    #[test]
    fn test_missing_splits_debit_nobody() {
        let expense = Expense::new("g", "A", m(dec!(30)), vec![]).without_splits();
        let balances = BalanceAggregator::compute_balances(&group(), &[expense], &[]);
        assert_eq!(balance_of(&balances, "A"), m(dec!(30)));
        assert_eq!(balance_of(&balances, "B"), Money::ZERO);
    }

    #[test]
    fn test_non_member_ids_still_accumulate() {
        // Stale references are kept rather than filtered out.
        let total = m(dec!(40));
        let expense = Expense::new("g", "A", total, vec![Split::new("ghost", total)]);
        let balances = BalanceAggregator::compute_balances(&group(), &[expense], &[]);
        assert_eq!(balances.len(), 4);
        assert_eq!(balance_of(&balances, "ghost"), m(dec!(-40)));
        let total: Money = balances.iter().map(|b| b.balance).sum();
        assert_eq!(total, Money::ZERO);
    }

    #[test]
    fn test_unknown_group_yields_empty() {
        let balances = BalanceAggregator::compute_group_balances(
            &GroupId::new("missing"),
            &[group()],
            &[equal_expense("A", m(dec!(30)))],
            &[],
        );
        assert!(balances.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let expenses = vec![equal_expense("A", m(dec!(100))), equal_expense("B", m(dec!(55.55)))];
        let first = BalanceAggregator::compute_balances(&group(), &expenses, &[]);
        let second = BalanceAggregator::compute_balances(&group(), &expenses, &[]);
        assert_eq!(first, second);
    }
}
