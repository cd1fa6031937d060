use crate::core::error::LedgerError;
use crate::core::ids::{GroupId, MemberId};
use crate::core::money::Money;
use crate::core::settlement::Settlement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A suggested transfer that has not been recorded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub from_member_id: MemberId,
    pub to_member_id: MemberId,
    pub amount: Money,
}

impl Payment {
    pub fn new(from: impl Into<MemberId>, to: impl Into<MemberId>, amount: Money) -> Self {
        Self {
            from_member_id: from.into(),
            to_member_id: to.into(),
            amount,
        }
    }

    /// Record this payment as a completed settlement in `group_id`.
    pub fn into_settlement(self, group_id: impl Into<GroupId>) -> Result<Settlement, LedgerError> {
        Settlement::completed(group_id, self.from_member_id, self.to_member_id, self.amount)
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {}", self.from_member_id, self.to_member_id, self.amount)
    }
}
