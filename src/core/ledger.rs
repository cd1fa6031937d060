use crate::core::ids::MemberId;
use crate::core::money::Money;
use crate::core::settlement::Settlement;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A member's net position in a group.
///
/// Positive means the group owes this member; negative means this member
/// owes the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub member_id: MemberId,
    pub balance: Money,
}

impl Balance {
    pub fn new(member_id: impl Into<MemberId>, balance: Money) -> Self {
        Self {
            member_id: member_id.into(),
            balance,
        }
    }
}

/// Running net positions of every member touched by a group's history.
///
/// The ledger is rebuilt from scratch for every balance query and never
/// mutated incrementally across queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    positions: HashMap<MemberId, Money>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger with a zero position for each of `members`.
    pub fn with_members<'a>(members: impl IntoIterator<Item = &'a MemberId>) -> Self {
        Self {
            positions: members
                .into_iter()
                .map(|id| (id.clone(), Money::ZERO))
                .collect(),
        }
    }

    /// The group now owes `member` `amount` more.
    pub fn credit(&mut self, member: &MemberId, amount: Money) {
        *self.positions.entry(member.clone()).or_default() += amount;
    }

    /// `member` now owes the group `amount` more.
    pub fn debit(&mut self, member: &MemberId, amount: Money) {
        *self.positions.entry(member.clone()).or_default() -= amount;
    }

    /// Apply money moved by a settlement: the sender owes less, the
    /// receiver is owed less. Status filtering is the caller's job.
    pub fn apply_settlement(&mut self, settlement: &Settlement) {
        self.credit(settlement.from_member_id(), settlement.amount());
        self.debit(settlement.to_member_id(), settlement.amount());
    }

    pub fn balance(&self, member: &MemberId) -> Money {
        self.positions.get(member).copied().unwrap_or(Money::ZERO)
    }

    pub fn all_positions(&self) -> &HashMap<MemberId, Money> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of all positions. Zero for a closed group.
    pub fn total(&self) -> Money {
        self.positions.values().sum()
    }

    /// Whether positions sum to zero within one cent.
    pub fn is_balanced(&self) -> bool {
        self.total().is_within_epsilon()
    }

    /// Total owed to creditors (equivalently, total owed by debtors when the
    /// ledger is balanced).
    pub fn total_outstanding(&self) -> Money {
        self.positions.values().filter(|v| v.is_positive()).sum()
    }

    /// Positions as balances, sorted by member id.
    pub fn to_balances(&self) -> Vec<Balance> {
        let mut balances: Vec<Balance> = self
            .positions
            .iter()
            .map(|(id, &balance)| Balance::new(id.clone(), balance))
            .collect();
        balances.sort_by(|a, b| a.member_id.cmp(&b.member_id));
        balances
    }
}

impl From<&[Balance]> for Ledger {
    fn from(balances: &[Balance]) -> Self {
        let mut ledger = Ledger::new();
        for b in balances {
            ledger.credit(&b.member_id, b.balance);
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn id(s: &str) -> MemberId {
        MemberId::new(s)
    }

    #[test]
    fn test_ledger_basic() {
        let mut ledger = Ledger::new();
        ledger.credit(&id("A"), Money::new(dec!(100)));
        ledger.debit(&id("B"), Money::new(dec!(100)));

        assert_eq!(ledger.balance(&id("A")), Money::new(dec!(100)));
        assert_eq!(ledger.balance(&id("B")), Money::new(dec!(-100)));
        assert_eq!(ledger.balance(&id("C")), Money::ZERO);
        assert!(ledger.is_balanced());
        assert_eq!(ledger.total_outstanding(), Money::new(dec!(100)));
    }

    #[test]
    fn test_ledger_settlement_moves_toward_zero() {
        let mut ledger = Ledger::new();
        ledger.credit(&id("A"), Money::new(dec!(60)));
        ledger.debit(&id("B"), Money::new(dec!(60)));

        let s = Settlement::completed("g", "B", "A", Money::new(dec!(60))).unwrap();
        ledger.apply_settlement(&s);

        assert_eq!(ledger.balance(&id("A")), Money::ZERO);
        assert_eq!(ledger.balance(&id("B")), Money::ZERO);
        assert_eq!(ledger.total_outstanding(), Money::ZERO);
    }

    #[test]
    fn test_with_members_starts_at_zero() {
        let members = [id("B"), id("A")];
        let ledger = Ledger::with_members(&members);
        let balances = ledger.to_balances();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].member_id, id("A"));
        assert!(balances.iter().all(|b| b.balance.is_zero()));
    }

    #[test]
    fn test_unbalanced_detected() {
        let mut ledger = Ledger::new();
        ledger.credit(&id("A"), Money::new(dec!(0.02)));
        assert!(!ledger.is_balanced());
    }
}
