use crate::core::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217-style currency code a group keeps its books in.
///
/// Only used for presentation. Balances are never converted between
/// currencies.
///
/// # Examples
///
/// ```
/// use split_ledger::core::currency::CurrencyCode;
///
/// let inr = CurrencyCode::new("INR");
/// assert_eq!(inr.symbol(), "₹");
/// assert_eq!(CurrencyCode::new("CHF").symbol(), "CHF ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix used when rendering an amount in this currency.
    pub fn symbol(&self) -> String {
        match self.0.as_str() {
            "INR" => "₹".to_string(),
            "USD" => "$".to_string(),
            "EUR" => "€".to_string(),
            "GBP" => "£".to_string(),
            "JPY" => "¥".to_string(),
            other => format!("{} ", other),
        }
    }

    /// Render `amount` with this currency's symbol, e.g. `₹33.34`.
    pub fn format_amount(&self, amount: Money) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.symbol(), amount.abs())
        } else {
            format!("{}{}", self.symbol(), amount)
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("INR")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
