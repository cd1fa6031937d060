use crate::core::error::LedgerError;
use crate::core::ids::{ExpenseId, GroupId, MemberId};
use crate::core::money::Money;
use crate::split::normalizer::equal_splits;
use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// One member's owed share of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub member_id: MemberId,
    pub amount: Money,
}

impl Split {
    pub fn new(member_id: impl Into<MemberId>, amount: Money) -> Self {
        Self {
            member_id: member_id.into(),
            amount,
        }
    }
}

/// One member's contribution towards paying an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payer {
    pub member_id: MemberId,
    pub amount: Money,
}

impl Payer {
    pub fn new(member_id: impl Into<MemberId>, amount: Money) -> Self {
        Self {
            member_id: member_id.into(),
            amount,
        }
    }
}

/// An additive charge on top of an expense (delivery fee, tip, tax).
///
/// `paid_by` defaults to the expense payer, `split_between` defaults to the
/// members already sharing the expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraItem {
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_between: Option<Vec<MemberId>>,
}

/// A shared expense paid by one or more members and owed by the members in
/// `splits`.
///
/// `splits` is optional: an expense whose splits are missing, `null` or not
/// a list deserializes with `splits() == None` and debits nobody.
///
/// # Examples
///
/// ```
/// use split_ledger::core::expense::Expense;
/// use split_ledger::core::money::Money;
/// use split_ledger::split::normalizer::equal_splits;
/// use rust_decimal_macros::dec;
///
/// let total = Money::new(dec!(300));
/// let members = ["A".into(), "B".into(), "C".into()];
/// let expense = Expense::new("trip", "A", total, equal_splits(total, &members));
///
/// assert_eq!(expense.splits().map(|s| s.len()), Some(3));
/// assert_eq!(expense.credits()[0].amount, total);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    id: ExpenseId,
    group_id: GroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    amount: Money,
    paid_by: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payers: Option<Vec<Payer>>,
    #[serde(default, deserialize_with = "lenient_splits")]
    splits: Option<Vec<Split>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extra_items: Vec<ExtraItem>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

fn lenient_splits<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Split>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        List(Vec<Split>),
        Other(IgnoredAny),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::List(splits)) => Some(splits),
        Some(Lenient::Other(_)) => {
            log::warn!("expense splits are not a list of shares; treating as absent");
            None
        }
        None => None,
    })
}

impl Expense {
    /// Create an expense paid in full by `paid_by`.
    pub fn new(
        group_id: impl Into<GroupId>,
        paid_by: impl Into<MemberId>,
        amount: Money,
        splits: Vec<Split>,
    ) -> Self {
        Self {
            id: ExpenseId::generate(),
            group_id: group_id.into(),
            title: None,
            category: None,
            amount,
            paid_by: paid_by.into(),
            payers: None,
            splits: Some(splits),
            extra_items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ExpenseId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attribute payment to several members. Supersedes `paid_by` for credit.
    pub fn with_payers(mut self, payers: Vec<Payer>) -> Self {
        self.payers = Some(payers);
        self
    }

    pub fn with_extra_items(mut self, extra_items: Vec<ExtraItem>) -> Self {
        self.extra_items = extra_items;
        self
    }

    pub fn with_splits(mut self, splits: Vec<Split>) -> Self {
        self.splits = Some(splits);
        self
    }

    pub fn without_splits(mut self) -> Self {
        self.splits = None;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> &ExpenseId {
        &self.id
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn paid_by(&self) -> &MemberId {
        &self.paid_by
    }

    pub fn payers(&self) -> Option<&[Payer]> {
        self.payers.as_deref()
    }

    pub fn splits(&self) -> Option<&[Split]> {
        self.splits.as_deref()
    }

    pub fn extra_items(&self) -> &[ExtraItem] {
        &self.extra_items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Who is credited for paying this expense.
    ///
    /// A non-empty `payers` list wins; otherwise `paid_by` is credited with
    /// the full amount.
    pub fn credits(&self) -> Vec<Payer> {
        match self.payers.as_deref() {
            Some(payers) if !payers.is_empty() => payers.to_vec(),
            _ => vec![Payer::new(self.paid_by.clone(), self.amount)],
        }
    }

    /// Sum of the split amounts, zero when splits are absent.
    pub fn split_total(&self) -> Money {
        self.splits().unwrap_or_default().iter().map(|s| s.amount).sum()
    }

    /// Check the record-level invariants an expense must satisfy before it is
    /// accepted into a group book.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.amount.is_positive() {
            return Err(LedgerError::NonPositiveExpense(self.amount));
        }
        if let Some(payers) = self.payers.as_deref().filter(|p| !p.is_empty()) {
            let paid: Money = payers.iter().map(|p| p.amount).sum();
            if !paid.approx_eq(self.amount, Money::EPSILON) {
                return Err(LedgerError::PayersMismatch {
                    payers: paid,
                    amount: self.amount,
                });
            }
        }
        Ok(())
    }

    /// Fold `extra_items` into `amount`, `splits` and (when an extra has its
    /// own payer) `payers`, leaving no extras behind.
    ///
    /// Each extra is divided with [`equal_splits`] among its `split_between`
    /// members, or among the members already present in `splits`.
    pub fn fold_extra_items(mut self) -> Self {
        if self.extra_items.is_empty() {
            return self;
        }

        let mut splits = self.splits.take().unwrap_or_default();
        let base_members: Vec<MemberId> = splits.iter().map(|s| s.member_id.clone()).collect();
        let mut credits = self.credits();
        let mut multi_payer = self.payers.as_ref().is_some_and(|p| !p.is_empty());

        for extra in std::mem::take(&mut self.extra_items) {
            let between = extra
                .split_between
                .filter(|members| !members.is_empty())
                .unwrap_or_else(|| base_members.clone());
            if between.is_empty() {
                log::warn!(
                    "expense {}: extra item of {} has nobody to split between; skipped",
                    self.id,
                    extra.amount
                );
                continue;
            }

            self.amount += extra.amount;
            for share in equal_splits(extra.amount, &between) {
                match splits.iter_mut().find(|s| s.member_id == share.member_id) {
                    Some(existing) => existing.amount += share.amount,
                    None => splits.push(share),
                }
            }

            let payer = extra.paid_by.unwrap_or_else(|| self.paid_by.clone());
            if payer != self.paid_by {
                multi_payer = true;
            }
            match credits.iter_mut().find(|p| p.member_id == payer) {
                Some(existing) => existing.amount += extra.amount,
                None => credits.push(Payer::new(payer, extra.amount)),
            }
        }

        self.splits = Some(splits);
        if multi_payer {
            self.payers = Some(credits);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn m(v: rust_decimal::Decimal) -> Money {
        Money::new(v)
    }

    fn dinner() -> Expense {
        Expense::new(
            "g",
            "A",
            m(dec!(90)),
            vec![
                Split::new("A", m(dec!(30))),
                Split::new("B", m(dec!(30))),
                Split::new("C", m(dec!(30))),
            ],
        )
        .with_id("e1")
    }

    #[test]
    fn test_credits_default_to_paid_by() {
        let credits = dinner().credits();
        assert_eq!(credits, vec![Payer::new("A", m(dec!(90)))]);
    }

    #[test]
    fn test_payers_supersede_paid_by() {
        let expense = dinner().with_payers(vec![
            Payer::new("B", m(dec!(50))),
            Payer::new("C", m(dec!(40))),
        ]);
        let credits = expense.credits();
        assert_eq!(credits.len(), 2);
        assert!(credits.iter().all(|p| p.member_id != MemberId::new("A")));
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn test_validate_payers_mismatch() {
        let expense = dinner().with_payers(vec![Payer::new("B", m(dec!(50)))]);
        assert!(matches!(
            expense.validate(),
            Err(LedgerError::PayersMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_non_positive_amount() {
        let expense = Expense::new("g", "A", Money::ZERO, vec![]);
        assert_eq!(
            expense.validate(),
            Err(LedgerError::NonPositiveExpense(Money::ZERO))
        );
    }

    #[test]
    fn test_fold_extra_items_same_payer() {
        let expense = dinner()
            .with_extra_items(vec![ExtraItem {
                amount: m(dec!(10)),
                paid_by: None,
                split_between: None,
            }])
            .fold_extra_items();

        assert_eq!(expense.amount(), m(dec!(100)));
        assert_eq!(expense.split_total(), m(dec!(100)));
        assert!(expense.payers().is_none());
        assert!(expense.extra_items().is_empty());
        let a = &expense.splits().unwrap()[0];
        assert_eq!(a.amount, m(dec!(33.34)));
    }

    #[test]
    fn test_fold_extra_items_other_payer_and_subset() {
        let expense = dinner()
            .with_extra_items(vec![ExtraItem {
                amount: m(dec!(20)),
                paid_by: Some(MemberId::new("D")),
                split_between: Some(vec![MemberId::new("B"), MemberId::new("D")]),
            }])
            .fold_extra_items();

        assert_eq!(expense.amount(), m(dec!(110)));
        assert_eq!(expense.split_total(), m(dec!(110)));
        let payers = expense.payers().unwrap();
        assert_eq!(payers.len(), 2);
        let paid: Money = payers.iter().map(|p| p.amount).sum();
        assert_eq!(paid, m(dec!(110)));
        let d = expense
            .splits()
            .unwrap()
            .iter()
            .find(|s| s.member_id == MemberId::new("D"))
            .unwrap();
        assert_eq!(d.amount, m(dec!(10)));
    }

    #[test]
    fn test_malformed_splits_deserialize_as_absent() {
        let json = r#"{
            "id": "e1", "groupId": "g", "amount": 50, "paidBy": "A",
            "splits": "everyone"
        }"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert!(expense.splits().is_none());
        assert_eq!(expense.split_total(), Money::ZERO);

        let json = r#"{"id": "e2", "groupId": "g", "amount": 50, "paidBy": "A"}"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert!(expense.splits().is_none());
    }

    #[test]
    fn test_well_formed_splits_deserialize() {
        let json = r#"{
            "id": "e1", "groupId": "g", "amount": "50.00", "paidBy": "A",
            "splits": [{"memberId": "A", "amount": 25}, {"memberId": "B", "amount": "25"}]
        }"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.splits().unwrap().len(), 2);
        assert_eq!(expense.split_total(), m(dec!(50)));
    }

    #[test]
    fn test_category_is_optional_in_json() {
        let json = r#"{
            "id": "e1", "groupId": "g", "amount": 20, "paidBy": "A",
            "category": "Food", "splits": []
        }"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.category(), Some("Food"));

        let plain = Expense::new("g", "A", m(dec!(20)), vec![]);
        assert_eq!(plain.category(), None);
        let out = serde_json::to_string(&plain).unwrap();
        assert!(!out.contains("category"));
    }
}
