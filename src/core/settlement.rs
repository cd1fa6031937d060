use crate::core::error::LedgerError;
use crate::core::ids::{GroupId, MemberId, SettlementId};
use crate::core::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a settlement. Only completed settlements move balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Completed,
}

/// A recorded payment from one member to another inside a group.
///
/// Construction validates `amount > 0` and `from != to`; the aggregator
/// trusts records built this way and only filters on status.
///
/// # Examples
///
/// ```
/// use split_ledger::core::settlement::Settlement;
/// use split_ledger::core::money::Money;
/// use rust_decimal_macros::dec;
///
/// let s = Settlement::completed("trip", "B", "A", Money::new(dec!(100))).unwrap();
/// assert!(s.is_completed());
///
/// assert!(Settlement::completed("trip", "A", "A", Money::new(dec!(1))).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    id: SettlementId,
    group_id: GroupId,
    from_member_id: MemberId,
    to_member_id: MemberId,
    amount: Money,
    status: SettlementStatus,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl Settlement {
    /// Record a payment that has already happened.
    pub fn completed(
        group_id: impl Into<GroupId>,
        from: impl Into<MemberId>,
        to: impl Into<MemberId>,
        amount: Money,
    ) -> Result<Self, LedgerError> {
        Self::build(group_id.into(), from.into(), to.into(), amount, SettlementStatus::Completed)
    }

    /// Record an intended payment that does not affect balances yet.
    pub fn pending(
        group_id: impl Into<GroupId>,
        from: impl Into<MemberId>,
        to: impl Into<MemberId>,
        amount: Money,
    ) -> Result<Self, LedgerError> {
        Self::build(group_id.into(), from.into(), to.into(), amount, SettlementStatus::Pending)
    }

    fn build(
        group_id: GroupId,
        from_member_id: MemberId,
        to_member_id: MemberId,
        amount: Money,
        status: SettlementStatus,
    ) -> Result<Self, LedgerError> {
        let settlement = Self {
            id: SettlementId::generate(),
            group_id,
            from_member_id,
            to_member_id,
            amount,
            status,
            created_at: Utc::now(),
        };
        settlement.validate()?;
        Ok(settlement)
    }

    /// Re-check construction invariants, for records read from outside.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.amount.is_positive() {
            return Err(LedgerError::NonPositiveSettlement(self.amount));
        }
        if self.from_member_id == self.to_member_id {
            return Err(LedgerError::SelfSettlement(self.from_member_id.clone()));
        }
        Ok(())
    }

    pub fn with_id(mut self, id: impl Into<SettlementId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> &SettlementId {
        &self.id
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn from_member_id(&self) -> &MemberId {
        &self.from_member_id
    }

    pub fn to_member_id(&self) -> &MemberId {
        &self.to_member_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn status(&self) -> SettlementStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == SettlementStatus::Completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
