use split_ledger::aggregation::balances::BalanceAggregator;
use split_ledger::core::ids::MemberId;
use split_ledger::core::ledger::Balance;
use split_ledger::core::money::Money;
use split_ledger::core::settlement::Settlement;
use split_ledger::optimization::settle_up::{apply_payments, SettlementOptimizer};
use split_ledger::simulation::group_generator::{generate_random_group, GroupConfig, GroupHistory};
use split_ledger::split::normalizer::{equal_splits, normalize};
use split_ledger::core::expense::Split;
use proptest::prelude::*;

fn member_ids(n: usize) -> Vec<MemberId> {
    (0..n).map(|i| MemberId::new(format!("M{:02}", i))).collect()
}

/// Balances in whole cents that sum to exactly zero.
///
/// One-cent balances are left out: they sit inside the settled tolerance and
/// never get matched.
fn arb_balances() -> impl Strategy<Value = Vec<Balance>> {
    prop::collection::vec(-1_000_000i64..1_000_000i64, 1..15)
        .prop_map(|mut cents| {
            let rest: i64 = cents.iter().sum();
            cents.push(-rest);
            cents
        })
        .prop_filter("no one-cent balances", |cents| cents.iter().all(|c| c.abs() != 1))
        .prop_map(|cents| {
            member_ids(cents.len())
                .into_iter()
                .zip(cents)
                .map(|(id, c)| Balance::new(id, Money::from_cents(c)))
                .collect()
        })
}

/// A seeded random group history.
fn arb_history() -> impl Strategy<Value = GroupHistory> {
    (2usize..10, 0usize..40, 0usize..5, any::<u64>()).prop_map(
        |(member_count, expense_count, settlement_count, seed)| {
            generate_random_group(&GroupConfig {
                member_count,
                expense_count,
                settlement_count,
                seed: Some(seed),
                ..Default::default()
            })
        },
    )
}

fn outstanding_parties(balances: &[Balance]) -> usize {
    balances
        .iter()
        .filter(|b| !b.balance.is_within_epsilon())
        .count()
}

proptest! {
    // ===================================================================
    // Equal splits always add back up to the total, cent for cent.
    // ===================================================================
    #[test]
    fn equal_splits_are_exact(cents in 1i64..100_000_000, n in 1usize..20) {
        let total = Money::from_cents(cents);
        let splits = equal_splits(total, &member_ids(n));
        prop_assert_eq!(splits.len(), n);
        let sum: Money = splits.iter().map(|s| s.amount).sum();
        prop_assert_eq!(sum, total);

        // No two shares differ by more than the cent left over.
        let max = splits.iter().map(|s| s.amount.cents()).max().unwrap();
        let min = splits.iter().map(|s| s.amount.cents()).min().unwrap();
        prop_assert!(max - min <= cents % n as i64);
    }

    // ===================================================================
    // Normalizing custom shares lands exactly on the total.
    // ===================================================================
    #[test]
    fn normalize_is_exact(
        shares in prop::collection::vec(0i64..1_000_000, 1..10),
        total_cents in 1i64..10_000_000,
    ) {
        let splits: Vec<Split> = member_ids(shares.len())
            .into_iter()
            .zip(&shares)
            .map(|(id, c)| Split::new(id, Money::from_cents(*c)))
            .collect();
        let total = Money::from_cents(total_cents);
        let normalized = normalize(&splits, total);
        let sum: Money = normalized.iter().map(|s| s.amount).sum();
        prop_assert_eq!(sum, total);
        prop_assert_eq!(normalized.len(), splits.len());
    }

    // ===================================================================
    // Balances cancel out whenever every expense's splits are exact.
    // ===================================================================
    #[test]
    fn computed_balances_sum_to_zero(history in arb_history()) {
        let balances = BalanceAggregator::compute_balances(
            &history.group,
            &history.expenses,
            &history.settlements,
        );
        let total: Money = balances.iter().map(|b| b.balance).sum();
        prop_assert!(total.is_within_epsilon());
    }

    // ===================================================================
    // Recomputing from the same history gives the same answer.
    // ===================================================================
    #[test]
    fn balance_computation_is_idempotent(history in arb_history()) {
        let first = BalanceAggregator::compute_balances(
            &history.group,
            &history.expenses,
            &history.settlements,
        );
        let second = BalanceAggregator::compute_balances(
            &history.group,
            &history.expenses,
            &history.settlements,
        );
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // Recording every suggested payment settles the whole group.
    // ===================================================================
    #[test]
    fn suggested_payments_settle_the_group(history in arb_history()) {
        let balances = BalanceAggregator::compute_balances(
            &history.group,
            &history.expenses,
            &history.settlements,
        );
        let result = SettlementOptimizer::optimize(&balances);

        let mut settlements = history.settlements.clone();
        for payment in result.payments {
            settlements.push(payment.into_settlement(history.group.id.clone()).unwrap());
        }
        let after = BalanceAggregator::compute_balances(
            &history.group,
            &history.expenses,
            &settlements,
        );
        prop_assert!(after.iter().all(|b| b.balance.is_within_epsilon()));
    }

    // ===================================================================
    // A completed settlement of N moves the payer up and the payee down
    // by exactly N.
    // ===================================================================
    #[test]
    fn settlement_shifts_balances_by_amount(history in arb_history(), cents in 1i64..1_000_000) {
        let members = history.group.member_ids();
        let amount = Money::from_cents(cents);
        let settlement = Settlement::completed(
            history.group.id.clone(),
            members[0].clone(),
            members[1].clone(),
            amount,
        )
        .unwrap();

        let before = BalanceAggregator::ledger(&history.group, &history.expenses, &history.settlements);
        let mut settlements = history.settlements.clone();
        settlements.push(settlement);
        let after = BalanceAggregator::ledger(&history.group, &history.expenses, &settlements);

        prop_assert_eq!(after.balance(&members[0]) - before.balance(&members[0]), amount);
        prop_assert_eq!(before.balance(&members[1]) - after.balance(&members[1]), amount);
    }

    // ===================================================================
    // Greedy matching never needs more than one fewer payment than there
    // are people with something outstanding, and every payment is a real
    // transfer between two different members.
    // ===================================================================
    #[test]
    fn payment_count_is_bounded(balances in arb_balances()) {
        let result = SettlementOptimizer::optimize(&balances);
        let parties = outstanding_parties(&balances);
        prop_assert_eq!(result.transaction_count, result.payments.len());
        prop_assert!(result.transaction_count <= parties.saturating_sub(1));
        for payment in &result.payments {
            prop_assert!(payment.amount.is_positive());
            prop_assert_ne!(&payment.from_member_id, &payment.to_member_id);
        }
    }

    // ===================================================================
    // Applying the payments leaves everyone within a cent of zero.
    // ===================================================================
    #[test]
    fn payments_settle_balances(balances in arb_balances()) {
        let result = SettlementOptimizer::optimize(&balances);
        let after = apply_payments(&balances, &result.payments);
        prop_assert!(after.iter().all(|b| b.balance.is_within_epsilon()));
    }

    // ===================================================================
    // The suggestion depends on the balances, not on their order.
    // ===================================================================
    #[test]
    fn optimization_is_order_independent(balances in arb_balances()) {
        let forward = SettlementOptimizer::optimize(&balances);
        let mut reversed = balances.clone();
        reversed.reverse();
        let backward = SettlementOptimizer::optimize(&reversed);
        prop_assert_eq!(forward, backward);
    }
}
