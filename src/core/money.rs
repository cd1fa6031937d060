use crate::core::error::LedgerError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of decimal places every amount is held at.
pub const MONEY_SCALE: u32 = 2;

/// A currency amount fixed at two decimal places.
///
/// Every value passes through [`Money::new`], which rounds to the nearest
/// cent using **round half away from zero** (`0.005 -> 0.01`,
/// `-0.005 -> -0.01`). Addition and subtraction of two-place values are exact,
/// so the only place rounding can occur is on construction and in
/// [`Money::split_evenly`].
///
/// # Examples
///
/// ```
/// use split_ledger::core::money::Money;
/// use rust_decimal_macros::dec;
///
/// let total = Money::new(dec!(100));
/// assert_eq!(total.split_evenly(3), Money::new(dec!(33.33)));
/// assert_eq!(Money::new(dec!(0.125)), Money::new(dec!(0.13)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));

    /// Tolerance used for every "is this settled / does this match" comparison.
    pub const EPSILON: Money = Money(Decimal::from_parts(1, 0, 0, false, MONEY_SCALE));

    /// Create an amount, rounding to the nearest cent.
    pub fn new(amount: Decimal) -> Self {
        let mut rounded =
            amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(MONEY_SCALE);
        Self(rounded)
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, MONEY_SCALE))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The amount in whole cents.
    ///
    /// Saturates at the `i64` bounds for amounts too large to count in cents.
    pub fn cents(&self) -> i64 {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64())
            .unwrap_or(if self.0.is_sign_negative() { i64::MIN } else { i64::MAX })
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// True when the amount is within one cent of zero.
    pub fn is_within_epsilon(&self) -> bool {
        self.abs() <= Self::EPSILON
    }

    /// Compare two amounts within an explicit tolerance.
    pub fn approx_eq(&self, other: Money, tolerance: Money) -> bool {
        (*self - other).abs() <= tolerance
    }

    /// One share of this amount divided `count` ways, rounded to the cent.
    ///
    /// Returns zero when `count` is zero.
    pub fn split_evenly(&self, count: usize) -> Self {
        if count == 0 {
            return Self::ZERO;
        }
        Self::new(self.0 / Decimal::from(count))
    }

    pub fn min(self, other: Money) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// Lossy conversion for score arithmetic; never used for balances.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::str::FromStr for Money {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Decimal>()
            .map(Self::new)
            .map_err(|e| LedgerError::InvalidAmount {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

// Addition and subtraction saturate at the `Decimal` bounds.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::new(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::new(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(Money::new(dec!(1.005)), Money::new(dec!(1.01)));
        assert_eq!(Money::new(dec!(-1.005)), Money::new(dec!(-1.01)));
        assert_eq!(Money::new(dec!(2.675)), Money::new(dec!(2.68)));
        assert_eq!(Money::new(dec!(1.004)), Money::new(dec!(1.00)));
    }

    #[test]
    fn test_display_always_two_places() {
        assert_eq!(Money::new(dec!(5)).to_string(), "5.00");
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::from_cents(-1050).to_string(), "-10.50");
    }

    #[test]
    fn test_split_evenly() {
        let total = Money::new(dec!(100));
        assert_eq!(total.split_evenly(3), Money::new(dec!(33.33)));
        assert_eq!(total.split_evenly(0), Money::ZERO);
        assert_eq!(Money::new(dec!(0.05)).split_evenly(2), Money::new(dec!(0.03)));
    }

    #[test]
    fn test_epsilon_comparisons() {
        assert!(Money::new(dec!(0.01)).is_within_epsilon());
        assert!(Money::new(dec!(-0.01)).is_within_epsilon());
        assert!(!Money::new(dec!(0.02)).is_within_epsilon());
        assert!(Money::new(dec!(10.00)).approx_eq(Money::new(dec!(10.01)), Money::EPSILON));
        assert!(!Money::new(dec!(10.00)).approx_eq(Money::new(dec!(10.02)), Money::EPSILON));
    }

    #[test]
    fn test_cents_round_trip() {
        assert_eq!(Money::from_cents(3334).cents(), 3334);
        assert_eq!(Money::new(dec!(33.34)), Money::from_cents(3334));
    }

    #[test]
    fn test_sum() {
        let parts = [Money::new(dec!(33.34)), Money::new(dec!(33.33)), Money::new(dec!(33.33))];
        let total: Money = parts.iter().sum();
        assert_eq!(total, Money::new(dec!(100)));
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("12.5").unwrap();
        let from_string: Money = serde_json::from_str("\"12.345\"").unwrap();
        assert_eq!(from_number, Money::new(dec!(12.50)));
        assert_eq!(from_string, Money::new(dec!(12.35)));
        assert_eq!(serde_json::to_string(&Money::new(dec!(7))).unwrap(), "\"7.00\"");
    }

    #[test]
    fn test_parse() {
        assert_eq!(" 19.999 ".parse::<Money>().unwrap(), Money::new(dec!(20)));
        assert!(matches!(
            "twelve".parse::<Money>(),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::new(Decimal::MAX);
        let total: Money = [huge, huge].iter().sum();
        assert_eq!(total, huge);
        assert_eq!(-huge - huge, -huge);
        assert_eq!(huge.cents(), i64::MAX);
        assert_eq!((-huge).cents(), i64::MIN);
    }
}
