use crate::core::currency::CurrencyCode;
use crate::core::error::LedgerError;
use crate::core::ids::{GroupId, MemberId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A participant in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A set of members sharing expenses in one currency.
///
/// Membership is fixed by the caller; the engine only reads it.
///
/// # Examples
///
/// ```
/// use split_ledger::core::group::{Group, Member};
/// use split_ledger::core::currency::CurrencyCode;
///
/// let group = Group::new(
///     "flat",
///     "Flat 4B",
///     vec![Member::new("A", "Asha"), Member::new("B", "Bilal")],
///     CurrencyCode::new("INR"),
/// ).unwrap();
///
/// assert_eq!(group.member_name(&"B".into()), Some("Bilal"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<Member>,
    #[serde(default)]
    pub currency: CurrencyCode,
}

impl Group {
    /// Create a group, rejecting duplicate member ids.
    pub fn new(
        id: impl Into<GroupId>,
        name: impl Into<String>,
        members: Vec<Member>,
        currency: CurrencyCode,
    ) -> Result<Self, LedgerError> {
        let group = Self {
            id: id.into(),
            name: name.into(),
            members,
            currency,
        };
        group.check_unique_members()?;
        Ok(group)
    }

    /// Verify member ids are unique. Groups read from JSON bypass [`Group::new`].
    pub fn check_unique_members(&self) -> Result<(), LedgerError> {
        let mut seen = HashSet::new();
        for member in &self.members {
            if !seen.insert(&member.id) {
                return Err(LedgerError::DuplicateMember(member.id.clone()));
            }
        }
        Ok(())
    }

    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn member_name(&self, id: &MemberId) -> Option<&str> {
        self.member(id).map(|m| m.name.as_str())
    }

    pub fn contains(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }
}
