use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// A fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id! {
    /// Identifier of a member within a group. Ordering is used as the
    /// deterministic tie-break everywhere members are sorted.
    ///
    /// ```
    /// use split_ledger::core::ids::MemberId;
    ///
    /// assert!(MemberId::new("alice") < MemberId::new("bob"));
    /// ```
    MemberId
}

string_id! {
    /// Identifier of a group.
    GroupId
}

string_id! {
    /// Identifier of an expense record.
    ExpenseId
}

string_id! {
    /// Identifier of a settlement record.
    SettlementId
}
