use crate::core::expense::Expense;
use crate::core::group::Group;
use crate::core::ids::MemberId;
use crate::core::ledger::Balance;
use crate::core::money::Money;
use crate::core::settlement::Settlement;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coarse rating derived from a [`FairnessScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FairnessLevel {
    Unfair,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl FairnessLevel {
    fn from_score(score: u32) -> Self {
        match score {
            0..=49 => FairnessLevel::Unfair,
            50..=69 => FairnessLevel::Poor,
            70..=84 => FairnessLevel::Fair,
            85..=94 => FairnessLevel::Good,
            _ => FairnessLevel::Excellent,
        }
    }
}

/// Component scores, each 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessFactors {
    /// How evenly members have paid relative to an equal share.
    pub payment_distribution: f64,
    /// How close individual splits are to equal.
    pub split_equality: f64,
    /// How small outstanding balances are relative to an equal share.
    pub balance_distribution: f64,
}

/// How evenly a group shares its costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessScore {
    pub score: u32,
    pub level: FairnessLevel,
    pub factors: FairnessFactors,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl FairnessScore {
    /// Weighted score: payment distribution 40%, split equality 30%,
    /// balance distribution 30%.
    pub fn calculate(group: &Group, expenses: &[Expense], balances: &[Balance]) -> Self {
        if expenses.is_empty() {
            return Self {
                score: 100,
                level: FairnessLevel::Excellent,
                factors: FairnessFactors {
                    payment_distribution: 100.0,
                    split_equality: 100.0,
                    balance_distribution: 100.0,
                },
                issues: Vec::new(),
                recommendations: vec!["Add expenses to calculate fairness score".to_string()],
            };
        }

        let total: Money = expenses.iter().map(|e| e.amount()).sum();
        let expected_share = if group.members.is_empty() {
            0.0
        } else {
            total.to_f64() / group.members.len() as f64
        };

        let factors = FairnessFactors {
            payment_distribution: payment_distribution(group, expenses, expected_share),
            split_equality: split_equality(expenses),
            balance_distribution: balance_distribution(balances, expected_share),
        };

        let weighted = factors.payment_distribution * 0.4
            + factors.split_equality * 0.3
            + factors.balance_distribution * 0.3;
        let score = weighted.round().clamp(0.0, 100.0) as u32;

        let mut issues = Vec::new();
        if factors.payment_distribution < 70.0 {
            issues.push("Uneven payment distribution - some people pay more than others".to_string());
        }
        if factors.split_equality < 70.0 {
            issues.push("Many unequal splits - consider using equal splits more often".to_string());
        }
        if factors.balance_distribution < 70.0 {
            issues.push("Unbalanced final balances - consider settling up".to_string());
        }

        let mut recommendations = Vec::new();
        if factors.payment_distribution < 80.0 {
            recommendations
                .push("Try to distribute expenses more evenly among group members".to_string());
        }
        if factors.split_equality < 80.0 {
            recommendations.push("Use equal splits when possible for fairness".to_string());
        }
        if factors.balance_distribution < 80.0 {
            recommendations.push("Settle outstanding balances to maintain fairness".to_string());
        }
        if issues.is_empty() {
            recommendations.push("Great job! Your group maintains fair expense splitting".to_string());
        }

        Self {
            score,
            level: FairnessLevel::from_score(score),
            factors,
            issues,
            recommendations,
        }
    }
}

fn payment_distribution(group: &Group, expenses: &[Expense], expected_share: f64) -> f64 {
    let mut paid: HashMap<MemberId, Money> = HashMap::new();
    for expense in expenses {
        for payer in expense.credits() {
            *paid.entry(payer.member_id).or_default() += payer.amount;
        }
    }

    let deviations: Vec<f64> = group
        .members
        .iter()
        .map(|member| {
            let amount = paid.get(&member.id).map(Money::to_f64).unwrap_or(0.0);
            if expected_share > 0.0 {
                (amount - expected_share).abs() / expected_share
            } else {
                0.0
            }
        })
        .collect();

    (100.0 - mean(&deviations) * 100.0).max(0.0)
}

fn split_equality(expenses: &[Expense]) -> f64 {
    let inequalities: Vec<f64> = expenses
        .iter()
        .filter_map(|expense| {
            let amounts: Vec<f64> = expense
                .splits()?
                .iter()
                .map(|s| s.amount.to_f64())
                .collect();
            if amounts.len() < 2 {
                return None;
            }
            let avg = mean(&amounts);
            if avg <= 0.0 {
                return None;
            }
            let max_deviation = amounts
                .iter()
                .map(|a| (a - avg).abs())
                .fold(0.0, f64::max);
            let ratio = max_deviation / avg;
            // Rounding remainders never count as inequality.
            (ratio > 0.1).then_some(ratio)
        })
        .collect();

    if inequalities.is_empty() {
        100.0
    } else {
        (100.0 - mean(&inequalities) * 200.0).max(0.0)
    }
}

fn balance_distribution(balances: &[Balance], expected_share: f64) -> f64 {
    let deviations: Vec<f64> = balances
        .iter()
        .map(|b| {
            if expected_share > 0.0 {
                b.balance.abs().to_f64() / expected_share
            } else {
                0.0
            }
        })
        .collect();
    (100.0 - mean(&deviations) * 50.0).max(0.0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl std::fmt::Display for FairnessScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Fairness ===")?;
        writeln!(f, "Score:                {} ({:?})", self.score, self.level)?;
        writeln!(f, "Payment distribution: {:.0}", self.factors.payment_distribution)?;
        writeln!(f, "Split equality:       {:.0}", self.factors.split_equality)?;
        writeln!(f, "Balance distribution: {:.0}", self.factors.balance_distribution)?;
        for issue in &self.issues {
            writeln!(f, "  issue: {}", issue)?;
        }
        for rec in &self.recommendations {
            writeln!(f, "  tip:   {}", rec)?;
        }
        Ok(())
    }
}

/// Confidence rating for a group's recorded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReliabilityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityFactors {
    /// Share of expenses with a title, a positive amount and splits.
    pub data_completeness: f64,
    /// Share of expenses whose splits sum to the amount.
    pub split_accuracy: f64,
    /// Share of settlements that are completed.
    pub settlement_completeness: f64,
}

/// How much the recorded data can be trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityMeter {
    pub score: u32,
    pub level: ReliabilityLevel,
    pub factors: ReliabilityFactors,
    pub warnings: Vec<String>,
}

impl ReliabilityMeter {
    /// Weighted score: data completeness 40%, split accuracy 40%,
    /// settlement completeness 20%.
    pub fn calculate(expenses: &[Expense], settlements: &[Settlement]) -> Self {
        if expenses.is_empty() {
            return Self {
                score: 0,
                level: ReliabilityLevel::Low,
                factors: ReliabilityFactors {
                    data_completeness: 0.0,
                    split_accuracy: 0.0,
                    settlement_completeness: 0.0,
                },
                warnings: vec!["No expenses recorded yet".to_string()],
            };
        }

        let count = expenses.len() as f64;
        let complete = expenses
            .iter()
            .filter(|e| {
                e.title().is_some_and(|t| !t.trim().is_empty())
                    && e.amount().is_positive()
                    && e.splits().is_some_and(|s| !s.is_empty())
            })
            .count();
        let accurate = expenses
            .iter()
            .filter(|e| match e.splits() {
                Some(splits) if !splits.is_empty() => {
                    (e.split_total() - e.amount()).abs() < Money::EPSILON
                }
                _ => false,
            })
            .count();
        let completed = settlements.iter().filter(|s| s.is_completed()).count();

        let factors = ReliabilityFactors {
            data_completeness: complete as f64 / count * 100.0,
            split_accuracy: accurate as f64 / count * 100.0,
            settlement_completeness: if settlements.is_empty() {
                100.0
            } else {
                completed as f64 / settlements.len() as f64 * 100.0
            },
        };

        let score = (factors.data_completeness * 0.4
            + factors.split_accuracy * 0.4
            + factors.settlement_completeness * 0.2)
            .round() as u32;
        let level = match score {
            0..=69 => ReliabilityLevel::Low,
            70..=84 => ReliabilityLevel::Medium,
            _ => ReliabilityLevel::High,
        };

        let mut warnings = Vec::new();
        if factors.data_completeness < 90.0 {
            warnings.push("Some expenses are missing merchant names or splits".to_string());
        }
        if factors.split_accuracy < 95.0 {
            warnings.push("Some expense splits do not match the total amount".to_string());
        }
        if factors.settlement_completeness < 100.0 {
            warnings.push("Some settlements are marked as pending".to_string());
        }
        if warnings.is_empty() {
            warnings.push("All data looks accurate and complete".to_string());
        }

        Self {
            score,
            level,
            factors,
            warnings,
        }
    }
}

impl std::fmt::Display for ReliabilityMeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Reliability ===")?;
        writeln!(f, "Score:                   {} ({:?})", self.score, self.level)?;
        writeln!(f, "Data completeness:       {:.0}%", self.factors.data_completeness)?;
        writeln!(f, "Split accuracy:          {:.0}%", self.factors.split_accuracy)?;
        writeln!(f, "Settlement completeness: {:.0}%", self.factors.settlement_completeness)?;
        for warning in &self.warnings {
            writeln!(f, "  {}", warning)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::balances::BalanceAggregator;
    use crate::core::currency::CurrencyCode;
    use crate::core::expense::Split;
    use crate::core::group::Member;
    use crate::split::normalizer::equal_splits;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    fn group() -> Group {
        Group::new(
            "g",
            "Flat",
            vec![Member::new("A", "Asha"), Member::new("B", "Bilal")],
            CurrencyCode::new("INR"),
        )
        .unwrap()
    }

    fn equal(payer: &str, amount: rust_decimal::Decimal) -> Expense {
        let total = Money::new(amount);
        Expense::new("g", payer, total, equal_splits(total, &group().member_ids()))
            .with_title("Groceries")
    }

    #[test]
    fn test_empty_group_is_excellent() {
        let score = FairnessScore::calculate(&group(), &[], &[]);
        assert_eq!(score.score, 100);
        assert_eq!(score.level, FairnessLevel::Excellent);
    }

    #[test]
    fn test_alternating_payers_are_fair() {
        let expenses = vec![equal("A", dec!(100)), equal("B", dec!(100))];
        let balances = BalanceAggregator::compute_balances(&group(), &expenses, &[]);
        let score = FairnessScore::calculate(&group(), &expenses, &balances);

        assert_relative_eq!(score.factors.payment_distribution, 100.0);
        assert_relative_eq!(score.factors.split_equality, 100.0);
        assert_relative_eq!(score.factors.balance_distribution, 100.0);
        assert_eq!(score.level, FairnessLevel::Excellent);
        assert!(score.issues.is_empty());
    }

    #[test]
    fn test_one_sided_payment_and_uneven_split() {
        let total = Money::new(dec!(100));
        let expense = Expense::new(
            "g",
            "A",
            total,
            vec![
                Split::new("A", Money::new(dec!(20))),
                Split::new("B", Money::new(dec!(80))),
            ],
        );
        let expenses = vec![expense];
        let balances = BalanceAggregator::compute_balances(&group(), &expenses, &[]);
        let score = FairnessScore::calculate(&group(), &expenses, &balances);

        // expected share 50: A paid 100 (dev 1.0), B paid 0 (dev 1.0)
        assert_relative_eq!(score.factors.payment_distribution, 0.0);
        // avg 50, max deviation 30 -> ratio 0.6 -> 100 - 120
        assert_relative_eq!(score.factors.split_equality, 0.0);
        // balances +80/-80 -> 1.6 avg deviation -> 100 - 80
        assert_relative_eq!(score.factors.balance_distribution, 20.0, epsilon = 1e-9);
        assert_eq!(score.score, 6);
        assert_eq!(score.level, FairnessLevel::Unfair);
        assert_eq!(score.issues.len(), 3);
    }

    #[test]
    fn test_reliability_empty() {
        let meter = ReliabilityMeter::calculate(&[], &[]);
        assert_eq!(meter.score, 0);
        assert_eq!(meter.level, ReliabilityLevel::Low);
    }

    #[test]
    fn test_reliability_clean_data() {
        let meter = ReliabilityMeter::calculate(&[equal("A", dec!(10))], &[]);
        assert_eq!(meter.score, 100);
        assert_eq!(meter.level, ReliabilityLevel::High);
        assert_eq!(meter.warnings, vec!["All data looks accurate and complete"]);
    }

    #[test]
    fn test_reliability_flags_problems() {
        let untitled = Expense::new("g", "A", Money::new(dec!(10)), vec![]).without_splits();
        let pending = Settlement::pending("g", "B", "A", Money::new(dec!(5))).unwrap();
        let meter = ReliabilityMeter::calculate(&[equal("A", dec!(10)), untitled], &[pending]);

        assert_relative_eq!(meter.factors.data_completeness, 50.0);
        assert_relative_eq!(meter.factors.split_accuracy, 50.0);
        assert_relative_eq!(meter.factors.settlement_completeness, 0.0);
        assert_eq!(meter.score, 40);
        assert_eq!(meter.level, ReliabilityLevel::Low);
        assert_eq!(meter.warnings.len(), 3);
    }
}
