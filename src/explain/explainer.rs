use crate::core::currency::CurrencyCode;
use crate::core::group::Member;
use crate::core::ids::MemberId;
use crate::core::ledger::Balance;
use crate::core::money::Money;
use crate::core::settlement::Settlement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How one member's position moved because of a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    pub member_id: MemberId,
    pub explanation: String,
}

/// Notification text for a recorded settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementExplanation {
    pub summary: String,
    pub balance_changes: Vec<BalanceChange>,
}

/// Turns before/after balance snapshots into user-facing sentences.
///
/// Purely presentational: it diffs the two snapshots and never fails. A
/// member missing from one snapshot gets a generic line, and a member
/// missing from `members` is named by id.
#[derive(Debug, Clone, Default)]
pub struct SettlementExplainer {
    currency: CurrencyCode,
}

impl SettlementExplainer {
    pub fn new(currency: CurrencyCode) -> Self {
        Self { currency }
    }

    /// Explain what `settlement` did to the group's balances.
    ///
    /// # Examples
    ///
    /// ```
    /// use split_ledger::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let members = vec![Member::new("A", "Asha"), Member::new("B", "Bilal")];
    /// let before = vec![
    ///     Balance::new("A", Money::new(dec!(100))),
    ///     Balance::new("B", Money::new(dec!(-100))),
    /// ];
    /// let after = vec![
    ///     Balance::new("A", Money::new(dec!(60))),
    ///     Balance::new("B", Money::new(dec!(-60))),
    /// ];
    /// let settlement = Settlement::completed("g", "B", "A", Money::new(dec!(40))).unwrap();
    ///
    /// let explanation = SettlementExplainer::default().explain(&settlement, &before, &after, &members);
    /// assert_eq!(explanation.summary, "Bilal paid Asha ₹40.00");
    /// assert_eq!(explanation.balance_changes[1].explanation, "Bilal now owes ₹40.00 less");
    /// ```
    pub fn explain(
        &self,
        settlement: &Settlement,
        before: &[Balance],
        after: &[Balance],
        members: &[Member],
    ) -> SettlementExplanation {
        let name_of = |id: &MemberId| -> String {
            members
                .iter()
                .find(|m| &m.id == id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let summary = format!(
            "{} paid {} {}",
            name_of(settlement.from_member_id()),
            name_of(settlement.to_member_id()),
            self.currency.format_amount(settlement.amount())
        );

        // BTreeMap keeps output ordered by member id.
        let mut snapshots: BTreeMap<&MemberId, (Option<Money>, Option<Money>)> = BTreeMap::new();
        for b in before {
            snapshots.entry(&b.member_id).or_default().0 = Some(b.balance);
        }
        for b in after {
            snapshots.entry(&b.member_id).or_default().1 = Some(b.balance);
        }

        let balance_changes = snapshots
            .into_iter()
            .filter_map(|(id, pair)| {
                let name = name_of(id);
                let explanation = match pair {
                    (Some(old), Some(new)) if old == new => return None,
                    (Some(old), Some(new)) => self.describe(&name, old, new),
                    _ => {
                        log::debug!("member {} missing from one balance snapshot", id);
                        format!("{}'s balance was updated", name)
                    }
                };
                Some(BalanceChange {
                    member_id: id.clone(),
                    explanation,
                })
            })
            .collect();

        SettlementExplanation {
            summary,
            balance_changes,
        }
    }

    fn describe(&self, name: &str, old: Money, new: Money) -> String {
        if new.is_within_epsilon() {
            return format!("{} is now settled up", name);
        }

        // Crossing zero: report where the member stands now, not the swing.
        if old.is_positive() && new.is_negative() {
            return format!("{} now owes {}", name, self.currency.format_amount(new.abs()));
        }
        if old.is_negative() && new.is_positive() {
            return format!("{} is now owed {}", name, self.currency.format_amount(new));
        }

        let delta = new - old;
        let amount = self.currency.format_amount(delta.abs());
        if new.is_negative() {
            // Rising balance means the member owes less.
            let direction = if delta.is_positive() { "less" } else { "more" };
            format!("{} now owes {} {}", name, amount, direction)
        } else {
            let direction = if delta.is_negative() { "less" } else { "more" };
            format!("{} is now owed {} {}", name, amount, direction)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn m(v: rust_decimal::Decimal) -> Money {
        Money::new(v)
    }

    fn members() -> Vec<Member> {
        vec![
            Member::new("A", "Asha"),
            Member::new("B", "Bilal"),
            Member::new("C", "Chen"),
        ]
    }

    #[test]
    fn test_partial_settlement() {
        let before = vec![
            Balance::new("A", m(dec!(200))),
            Balance::new("B", m(dec!(-100))),
            Balance::new("C", m(dec!(-100))),
        ];
        let after = vec![
            Balance::new("A", m(dec!(150))),
            Balance::new("B", m(dec!(-50))),
            Balance::new("C", m(dec!(-100))),
        ];
        let s = Settlement::completed("g", "B", "A", m(dec!(50))).unwrap();
        let out = SettlementExplainer::default().explain(&s, &before, &after, &members());

        assert_eq!(out.summary, "Bilal paid Asha ₹50.00");
        assert_eq!(
            out.balance_changes,
            vec![
                BalanceChange {
                    member_id: MemberId::new("A"),
                    explanation: "Asha is now owed ₹50.00 less".to_string(),
                },
                BalanceChange {
                    member_id: MemberId::new("B"),
                    explanation: "Bilal now owes ₹50.00 less".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_full_settlement() {
        let before = vec![Balance::new("A", m(dec!(10))), Balance::new("B", m(dec!(-10)))];
        let after = vec![Balance::new("A", m(dec!(0))), Balance::new("B", m(dec!(0)))];
        let s = Settlement::completed("g", "B", "A", m(dec!(10))).unwrap();
        let out = SettlementExplainer::new(CurrencyCode::new("USD"))
            .explain(&s, &before, &after, &members());

        assert_eq!(out.summary, "Bilal paid Asha $10.00");
        assert!(out
            .balance_changes
            .iter()
            .all(|c| c.explanation.ends_with("is now settled up")));
    }

    #[test]
    fn test_overpayment_flips_sign() {
        let before = vec![Balance::new("A", m(dec!(10))), Balance::new("B", m(dec!(-10)))];
        let after = vec![Balance::new("A", m(dec!(-5))), Balance::new("B", m(dec!(5)))];
        let s = Settlement::completed("g", "B", "A", m(dec!(15))).unwrap();
        let out = SettlementExplainer::default().explain(&s, &before, &after, &members());

        assert_eq!(out.balance_changes[0].explanation, "Asha now owes ₹5.00");
        assert_eq!(out.balance_changes[1].explanation, "Bilal is now owed ₹5.00");
    }

    #[test]
    fn test_missing_member_falls_back() {
        let before = vec![Balance::new("A", m(dec!(10)))];
        let after = vec![Balance::new("A", m(dec!(0))), Balance::new("X", m(dec!(0)))];
        let s = Settlement::completed("g", "X", "A", m(dec!(10))).unwrap();
        let out = SettlementExplainer::default().explain(&s, &before, &after, &members());

        assert_eq!(out.summary, "X paid Asha ₹10.00");
        assert_eq!(out.balance_changes[1].explanation, "X's balance was updated");
    }
}
