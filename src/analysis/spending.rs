//! Spending analytics over a group's expenses: monthly totals, category
//! breakdown and month-over-month trends.
//!
//! Months are calendar months of [`Expense::created_at`] in UTC. Every
//! function that depends on "now" takes it as an argument.

use crate::core::expense::Expense;
use crate::core::ids::MemberId;
use crate::core::money::Money;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Category used for expenses without one.
pub const UNCATEGORIZED: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// Three-letter month name, e.g. `"Mar"`.
    pub month: String,
    pub year: i32,
    pub amount: Money,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingPattern {
    Consistent,
    Increasing,
    Decreasing,
    Sporadic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingTrends {
    /// Mean over months that have at least one expense.
    pub average_per_month: Money,
    /// Last two active months against the two before them, in percent.
    pub trend_percentage: f64,
    pub pattern: SpendingPattern,
    pub total_expenses: usize,
    /// `"YYYY-MM"` → total spent that month.
    pub monthly_breakdown: BTreeMap<String, Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMonthTotal {
    pub total: Money,
    pub count: usize,
    pub month: String,
    pub year: i32,
}

/// Month-level spending reports.
pub struct ExpenseAnalytics;

impl ExpenseAnalytics {
    /// Totals for the `months` calendar months ending with `now`'s month,
    /// oldest first. Empty months are listed with zero values.
    pub fn monthly_totals(expenses: &[Expense], months: usize, now: DateTime<Utc>) -> Vec<MonthlyTotal> {
        let mut by_month: HashMap<(i32, u32), (Money, usize)> = HashMap::new();
        for expense in expenses {
            let entry = by_month.entry(month_of(expense.created_at())).or_default();
            entry.0 += expense.amount();
            entry.1 += 1;
        }

        let current = month_of(now);
        (0..months)
            .rev()
            .map(|back| {
                let (year, month) = months_before(current, back);
                let (amount, count) = by_month.get(&(year, month)).copied().unwrap_or_default();
                MonthlyTotal {
                    month: month_name(month).to_string(),
                    year,
                    amount,
                    count,
                }
            })
            .collect()
    }

    /// Per-category totals of positive amounts, largest first.
    ///
    /// `start` and `end` are inclusive bounds on `created_at`.
    pub fn category_breakdown(
        expenses: &[Expense],
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<CategoryTotal> {
        let mut by_category: HashMap<&str, (Money, usize)> = HashMap::new();
        for expense in expenses {
            let at = expense.created_at();
            if start.is_some_and(|s| at < s) || end.is_some_and(|e| at > e) {
                continue;
            }
            if !expense.amount().is_positive() {
                continue;
            }
            let category = expense
                .category()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(UNCATEGORIZED);
            let entry = by_category.entry(category).or_default();
            entry.0 += expense.amount();
            entry.1 += 1;
        }

        let mut totals: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, (amount, count))| CategoryTotal {
                category: category.to_string(),
                amount,
                count,
            })
            .collect();
        totals.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
        totals
    }

    /// Average, trend and pattern of monthly spending, optionally limited to
    /// expenses paid by `member_id`.
    pub fn spending_trends(expenses: &[Expense], member_id: Option<&MemberId>) -> SpendingTrends {
        let filtered: Vec<&Expense> = expenses
            .iter()
            .filter(|e| member_id.map_or(true, |id| e.paid_by() == id))
            .collect();

        let mut monthly: BTreeMap<(i32, u32), Money> = BTreeMap::new();
        for expense in &filtered {
            *monthly.entry(month_of(expense.created_at())).or_default() += expense.amount();
        }

        if monthly.is_empty() {
            return SpendingTrends {
                average_per_month: Money::ZERO,
                trend_percentage: 0.0,
                pattern: SpendingPattern::Sporadic,
                total_expenses: filtered.len(),
                monthly_breakdown: BTreeMap::new(),
            };
        }

        let values: Vec<f64> = monthly.values().map(|m| m.to_f64()).collect();
        let average = values.iter().sum::<f64>() / values.len() as f64;

        // BTreeMap order is chronological.
        let mut trend = 0.0;
        if values.len() >= 4 {
            let n = values.len();
            let recent: f64 = values[n - 2..].iter().sum();
            let previous: f64 = values[n - 4..n - 2].iter().sum();
            if previous > 0.0 {
                trend = (recent - previous) / previous * 100.0;
            }
        }

        let pattern = if values.len() < 3 {
            SpendingPattern::Sporadic
        } else {
            let variance =
                values.iter().map(|v| (v - average).powi(2)).sum::<f64>() / values.len() as f64;
            let coefficient = if average > 0.0 { variance.sqrt() / average } else { 0.0 };
            if coefficient > 0.5 {
                SpendingPattern::Sporadic
            } else if trend > 20.0 {
                SpendingPattern::Increasing
            } else if trend < -20.0 {
                SpendingPattern::Decreasing
            } else {
                SpendingPattern::Consistent
            }
        };

        log::debug!(
            "spending trends over {} months: average {:.2}, trend {:.2}%",
            values.len(),
            average,
            trend
        );

        SpendingTrends {
            average_per_month: monthly.values().sum::<Money>().split_evenly(monthly.len()),
            trend_percentage: round2(trend),
            pattern,
            total_expenses: filtered.len(),
            monthly_breakdown: monthly
                .into_iter()
                .map(|((year, month), amount)| (format!("{}-{:02}", year, month), amount))
                .collect(),
        }
    }

    /// Total and count of expenses in `now`'s calendar month.
    pub fn current_month_total(expenses: &[Expense], now: DateTime<Utc>) -> CurrentMonthTotal {
        let current = month_of(now);
        let (total, count) = expenses
            .iter()
            .filter(|e| month_of(e.created_at()) == current)
            .fold((Money::ZERO, 0), |(total, count), e| (total + e.amount(), count + 1));
        CurrentMonthTotal {
            total,
            count,
            month: month_name(current.1).to_string(),
            year: current.0,
        }
    }
}

fn month_of(at: DateTime<Utc>) -> (i32, u32) {
    (at.year(), at.month())
}

/// The calendar month `back` months before `(year, month)`.
fn months_before((year, month): (i32, u32), back: usize) -> (i32, u32) {
    let index = year as i64 * 12 + (month as i64 - 1) - back as i64;
    (index.div_euclid(12) as i32, index.rem_euclid(12) as u32 + 1)
}

fn month_name(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[(month as usize + 11) % 12]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl std::fmt::Display for SpendingTrends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Spending Trends ===")?;
        writeln!(f, "Expenses:          {}", self.total_expenses)?;
        writeln!(f, "Average per month: {}", self.average_per_month)?;
        writeln!(f, "Trend:             {:+.2}%", self.trend_percentage)?;
        writeln!(f, "Pattern:           {:?}", self.pattern)?;
        for (month, amount) in &self.monthly_breakdown {
            writeln!(f, "  {}  {:>12}", month, amount)?;
        }
        Ok(())
    }
}
