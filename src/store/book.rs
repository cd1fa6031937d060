use crate::aggregation::balances::BalanceAggregator;
use crate::core::error::LedgerError;
use crate::core::expense::Expense;
use crate::core::group::Group;
use crate::core::ids::{ExpenseId, GroupId};
use crate::core::ledger::Balance;
use crate::core::settlement::Settlement;
use crate::split::normalizer::{ensure_exact, NormalizationWarning};
use parking_lot::RwLock;
use std::sync::Arc;

/// One change to a group's history.
#[derive(Debug, Clone)]
pub enum Mutation {
    AddExpense(Expense),
    UpdateExpense(Expense),
    DeleteExpense(ExpenseId),
    RecordSettlement(Settlement),
}

/// An immutable view of a group's history at one version.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub version: u64,
    pub group: Group,
    pub expenses: Arc<[Expense]>,
    pub settlements: Arc<[Settlement]>,
}

impl LedgerSnapshot {
    pub fn balances(&self) -> Vec<Balance> {
        BalanceAggregator::compute_balances(&self.group, &self.expenses, &self.settlements)
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    pub version: u64,
    /// Set when an expense's splits had to be re-normalized on the way in.
    pub warning: Option<NormalizationWarning>,
}

#[derive(Debug)]
struct BookState {
    version: u64,
    group: Group,
    expenses: Vec<Expense>,
    settlements: Vec<Settlement>,
    cached_balances: Option<Vec<Balance>>,
}

/// In-process owner of one group's expense and settlement history.
///
/// Writers go through [`GroupBook::commit`], which checks the caller's
/// expected version and applies exactly one [`Mutation`] under the write
/// lock, so a read-modify-write cycle cannot lose another writer's update.
/// Cached balances are dropped on every successful commit.
///
/// # Examples
///
/// ```
/// use split_ledger::prelude::*;
/// use split_ledger::store::book::{GroupBook, Mutation};
/// use rust_decimal_macros::dec;
///
/// let group = Group::new(
///     "g",
///     "Flat",
///     vec![Member::new("A", "Asha"), Member::new("B", "Bilal")],
///     CurrencyCode::new("INR"),
/// ).unwrap();
/// let book = GroupBook::new(group);
///
/// let total = Money::new(dec!(80));
/// let expense = Expense::new("g", "A", total, equal_splits(total, &book.snapshot().group.member_ids()));
/// let receipt = book.commit(0, Mutation::AddExpense(expense)).unwrap();
/// assert_eq!(receipt.version, 1);
///
/// // A writer holding the stale version is turned away.
/// let late = Settlement::completed("g", "B", "A", Money::new(dec!(40))).unwrap();
/// assert!(book.commit(0, Mutation::RecordSettlement(late)).is_err());
/// ```
#[derive(Debug)]
pub struct GroupBook {
    state: RwLock<BookState>,
}

impl GroupBook {
    pub fn new(group: Group) -> Self {
        Self::with_history(group, Vec::new(), Vec::new())
    }

    /// Start from an existing history, e.g. one loaded by a persistence layer.
    pub fn with_history(group: Group, expenses: Vec<Expense>, settlements: Vec<Settlement>) -> Self {
        Self {
            state: RwLock::new(BookState {
                version: 0,
                group,
                expenses,
                settlements,
                cached_balances: None,
            }),
        }
    }

    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();
        LedgerSnapshot {
            version: state.version,
            group: state.group.clone(),
            expenses: state.expenses.clone().into(),
            settlements: state.settlements.clone().into(),
        }
    }

    /// Current balances, served from cache when nothing changed since the
    /// last computation.
    pub fn balances(&self) -> Vec<Balance> {
        if let Some(cached) = self.state.read().cached_balances.clone() {
            return cached;
        }

        let mut state = self.state.write();
        if let Some(cached) = state.cached_balances.clone() {
            return cached;
        }
        let balances =
            BalanceAggregator::compute_balances(&state.group, &state.expenses, &state.settlements);
        state.cached_balances = Some(balances.clone());
        balances
    }

    /// Apply `mutation` if the book is still at `expected_version`.
    pub fn commit(&self, expected_version: u64, mutation: Mutation) -> Result<CommitReceipt, LedgerError> {
        let mut state = self.state.write();
        if state.version != expected_version {
            return Err(LedgerError::VersionConflict {
                expected: expected_version,
                current: state.version,
            });
        }

        let group_id = state.group.id.clone();
        let warning = match mutation {
            Mutation::AddExpense(expense) => {
                check_group(&group_id, expense.group_id())?;
                if state.expenses.iter().any(|e| e.id() == expense.id()) {
                    return Err(LedgerError::DuplicateExpense(expense.id().clone()));
                }
                let (expense, warning) = prepare_expense(expense)?;
                state.expenses.push(expense);
                warning
            }
            Mutation::UpdateExpense(expense) => {
                check_group(&group_id, expense.group_id())?;
                let idx = state
                    .expenses
                    .iter()
                    .position(|e| e.id() == expense.id())
                    .ok_or_else(|| LedgerError::UnknownExpense(expense.id().clone()))?;
                let (expense, warning) = prepare_expense(expense)?;
                state.expenses[idx] = expense;
                warning
            }
            Mutation::DeleteExpense(id) => {
                let idx = state
                    .expenses
                    .iter()
                    .position(|e| e.id() == &id)
                    .ok_or(LedgerError::UnknownExpense(id))?;
                state.expenses.remove(idx);
                None
            }
            Mutation::RecordSettlement(settlement) => {
                check_group(&group_id, settlement.group_id())?;
                settlement.validate()?;
                state.settlements.push(settlement);
                None
            }
        };

        state.version += 1;
        state.cached_balances = None;
        log::debug!("group {} committed version {}", group_id, state.version);
        Ok(CommitReceipt {
            version: state.version,
            warning,
        })
    }
}

fn check_group(expected: &GroupId, found: &GroupId) -> Result<(), LedgerError> {
    if expected != found {
        return Err(LedgerError::GroupMismatch {
            expected: expected.clone(),
            found: found.clone(),
        });
    }
    Ok(())
}

/// Fold extras, validate, and make splits exact before the expense is stored.
///
/// Expenses without splits are refused with [`LedgerError::MissingSplits`];
/// only the read path tolerates them.
fn prepare_expense(expense: Expense) -> Result<(Expense, Option<NormalizationWarning>), LedgerError> {
    let expense = expense.fold_extra_items();
    expense.validate()?;
    match expense.splits() {
        Some(splits) if !splits.is_empty() => {
            let (splits, warning) = ensure_exact(splits, expense.amount());
            Ok((expense.with_splits(splits), warning))
        }
        _ => Err(LedgerError::MissingSplits(expense.id().clone())),
    }
}
