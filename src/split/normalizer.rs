use crate::core::expense::Split;
use crate::core::ids::MemberId;
use crate::core::money::Money;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Divide `total` equally among `member_ids`.
///
/// Each share is `total / n` rounded to the cent; whatever the rounding
/// leaves over (`total - sum(shares)`) goes entirely to the **first** member
/// in input order. The result always sums to `total` exactly.
///
/// # Examples
///
/// ```
/// use split_ledger::split::normalizer::equal_splits;
/// use split_ledger::core::money::Money;
/// use rust_decimal_macros::dec;
///
/// let splits = equal_splits(Money::new(dec!(100)), &["A".into(), "B".into(), "C".into()]);
/// let amounts: Vec<_> = splits.iter().map(|s| s.amount.to_string()).collect();
/// assert_eq!(amounts, ["33.34", "33.33", "33.33"]);
/// ```
pub fn equal_splits(total: Money, member_ids: &[MemberId]) -> Vec<Split> {
    let share = total.split_evenly(member_ids.len());
    let mut splits: Vec<Split> = member_ids
        .iter()
        .map(|id| Split::new(id.clone(), share))
        .collect();

    let allocated: Money = splits.iter().map(|s| s.amount).sum();
    let remainder = total - allocated;
    if let Some(first) = splits.first_mut() {
        first.amount += remainder;
    }
    splits
}

/// Round custom shares to the cent and force them to sum to `total`.
///
/// Any difference left after rounding is added in full to the share with the
/// **largest** amount; ties go to the first such share in input order.
///
/// # Examples
///
/// ```
/// use split_ledger::split::normalizer::normalize;
/// use split_ledger::core::expense::Split;
/// use split_ledger::core::money::Money;
/// use rust_decimal_macros::dec;
///
/// let splits = vec![
///     Split::new("A", Money::new(dec!(30))),
///     Split::new("B", Money::new(dec!(30))),
///     Split::new("C", Money::new(dec!(39))),
/// ];
/// let fixed = normalize(&splits, Money::new(dec!(100)));
/// assert_eq!(fixed[2].amount, Money::new(dec!(40)));
/// ```
pub fn normalize(splits: &[Split], total: Money) -> Vec<Split> {
    // Shares are already held at cent precision, so "rounding every input
    // share" is the Money invariant itself.
    let mut normalized = splits.to_vec();
    let sum: Money = normalized.iter().map(|s| s.amount).sum();
    let difference = total - sum;

    if difference.as_decimal().abs() > dec!(0.001) {
        let largest = normalized
            .iter()
            .enumerate()
            .fold(None::<(usize, Money)>, |best, (idx, split)| match best {
                Some((_, amount)) if amount >= split.amount => best,
                _ => Some((idx, split.amount)),
            });
        if let Some((idx, _)) = largest {
            log::debug!(
                "normalize: assigning {} difference to {}",
                difference,
                normalized[idx].member_id
            );
            normalized[idx].amount += difference;
        }
    }
    normalized
}

/// Whether `splits` sum to `total` within `tolerance`.
///
/// A failed check calls for [`normalize`], never a rejection.
pub fn verify_sum(splits: &[Split], total: Money, tolerance: Money) -> bool {
    let sum: Money = splits.iter().map(|s| s.amount).sum();
    sum.approx_eq(total, tolerance)
}

/// [`verify_sum`] with the default one-cent tolerance.
pub fn verify_sum_default(splits: &[Split], total: Money) -> bool {
    verify_sum(splits, total, Money::EPSILON)
}

/// Raised once when caller-supplied shares had to be re-normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationWarning {
    pub expected: Money,
    pub found: Money,
    pub adjustment: Money,
}

impl std::fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "splits summed to {} instead of {}; adjusted by {}",
            self.found, self.expected, self.adjustment
        )
    }
}

/// Make `splits` sum to `total` exactly before an expense is accepted.
///
/// Splits that already sum exactly are returned untouched. Anything else is
/// re-normalized, and a warning describing the adjustment is returned with
/// the corrected shares. This never fails.
pub fn ensure_exact(splits: &[Split], total: Money) -> (Vec<Split>, Option<NormalizationWarning>) {
    let found: Money = splits.iter().map(|s| s.amount).sum();
    if found == total {
        return (splits.to_vec(), None);
    }

    let normalized = normalize(splits, total);
    let warning = NormalizationWarning {
        expected: total,
        found,
        adjustment: total - found,
    };
    if !verify_sum(splits, total, Money::EPSILON) {
        log::warn!("{}", warning);
    }
    (normalized, Some(warning))
}
