//! Random group histories for property tests, benchmarks and the CLI
//! `generate` command.

use crate::core::currency::CurrencyCode;
use crate::core::expense::{Expense, Split};
use crate::core::group::{Group, Member};
use crate::core::ids::{GroupId, MemberId};
use crate::core::money::Money;
use crate::core::settlement::Settlement;
use crate::split::normalizer::{equal_splits, normalize};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use chrono::{Duration, Utc};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const CATEGORIES: [&str; 6] = ["Food", "Travel", "Rent", "Utilities", "Entertainment", "Shopping"];

/// Configuration for generating a random group history.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Number of members in the group.
    pub member_count: usize,
    /// Number of expenses to record.
    pub expense_count: usize,
    /// Number of completed settlements to record.
    pub settlement_count: usize,
    /// Smallest expense, in cents.
    pub min_cents: i64,
    /// Largest expense, in cents.
    pub max_cents: i64,
    /// Probability that an expense uses custom rather than equal splits.
    pub custom_split_ratio: f64,
    /// Expenses are dated up to this many days before now.
    pub history_days: i64,
    pub currency: CurrencyCode,
    /// Fixed seed for reproducible output.
    pub seed: Option<u64>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            member_count: 5,
            expense_count: 20,
            settlement_count: 3,
            min_cents: 100,
            max_cents: 500_000,
            custom_split_ratio: 0.3,
            history_days: 180,
            currency: CurrencyCode::default(),
            seed: None,
        }
    }
}

/// A generated group and its history, in the CLI's input file layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupHistory {
    pub group: Group,
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

/// Generate a random group history.
///
/// Every expense's splits sum exactly to its amount, so the resulting
/// balances always cancel out.
pub fn generate_random_group(config: &GroupConfig) -> GroupHistory {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let group_id = GroupId::generate();
    let members: Vec<Member> = (0..config.member_count.max(1))
        .map(|i| Member::new(format!("M{:03}", i), format!("Member {}", i + 1)))
        .collect();
    let member_ids: Vec<MemberId> = members.iter().map(|m| m.id.clone()).collect();

    let min = config.min_cents.max(1);
    let max = config.max_cents.max(min + 1);

    let now = Utc::now();
    let mut expenses = Vec::with_capacity(config.expense_count);
    for i in 0..config.expense_count {
        let amount = Money::from_cents(rng.gen_range(min..max));
        let payer = member_ids[rng.gen_range(0..member_ids.len())].clone();

        let share_count = rng.gen_range(1..=member_ids.len());
        let participants: Vec<MemberId> = member_ids
            .choose_multiple(&mut rng, share_count)
            .cloned()
            .collect();

        let splits = if rng.gen_bool(config.custom_split_ratio.clamp(0.0, 1.0)) {
            custom_splits(&mut rng, amount, &participants)
        } else {
            equal_splits(amount, &participants)
        };

        expenses.push(
            Expense::new(group_id.clone(), payer, amount, splits)
                .with_id(format!("E{:04}", i))
                .with_title(format!("Expense {}", i + 1))
                .with_category(CATEGORIES[rng.gen_range(0..CATEGORIES.len())])
                .with_created_at(now - Duration::days(rng.gen_range(0..=config.history_days.max(0)))),
        );
    }

    let mut settlements = Vec::with_capacity(config.settlement_count);
    if member_ids.len() >= 2 {
        for i in 0..config.settlement_count {
            let pair: Vec<&MemberId> = member_ids.choose_multiple(&mut rng, 2).collect();
            let amount = Money::from_cents(rng.gen_range(min..max) / 10 + 1);
            if let Ok(settlement) =
                Settlement::completed(group_id.clone(), pair[0].clone(), pair[1].clone(), amount)
            {
                settlements.push(settlement.with_id(format!("S{:04}", i)));
            }
        }
    }

    let group = Group {
        id: group_id,
        name: "Generated group".to_string(),
        members,
        currency: config.currency.clone(),
    };

    GroupHistory {
        group,
        expenses,
        settlements,
    }
}

/// Random weights scaled to `amount`, then normalized to sum exactly.
fn custom_splits(rng: &mut impl Rng, amount: Money, participants: &[MemberId]) -> Vec<Split> {
    let weights: Vec<i64> = participants.iter().map(|_| rng.gen_range(1..=10)).collect();
    let total_weight: i64 = weights.iter().sum();
    let raw: Vec<Split> = participants
        .iter()
        .zip(&weights)
        .map(|(id, w)| Split::new(id.clone(), Money::from_cents(amount.cents() * w / total_weight)))
        .collect();
    normalize(&raw, amount)
}
