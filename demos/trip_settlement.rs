//! Settling up after a trip.
//!
//! Records a handful of expenses, suggests the payments that clear every
//! balance, records one of them and explains what changed.

use split_ledger::aggregation::audit::validate_ledger;
use split_ledger::analysis::fairness::{FairnessScore, ReliabilityMeter};
use split_ledger::prelude::*;
use split_ledger::store::book::{GroupBook, Mutation};
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  split-ledger: Trip Settlement Example   ║");
    println!("╚══════════════════════════════════════════╝\n");

    let group = Group::new(
        "goa",
        "Goa trip",
        vec![
            Member::new("A", "Asha"),
            Member::new("B", "Bilal"),
            Member::new("C", "Chen"),
            Member::new("D", "Dev"),
        ],
        CurrencyCode::new("INR"),
    )
    .expect("members are unique");
    let everyone = group.member_ids();
    let book = GroupBook::new(group.clone());

    let hotel = Money::new(dec!(200));
    let fuel = Money::new(dec!(100));
    let expenses = vec![
        Expense::new("goa", "A", hotel, equal_splits(hotel, &everyone)).with_title("Hotel"),
        Expense::new("goa", "B", fuel, equal_splits(fuel, &everyone)).with_title("Fuel"),
    ];
    for expense in expenses {
        let version = book.version();
        book.commit(version, Mutation::AddExpense(expense))
            .expect("expense is valid");
    }

    // --- Balances ---
    println!("━━━ Balances ━━━\n");
    let before = book.balances();
    for balance in &before {
        let name = group.member_name(&balance.member_id).unwrap_or("?");
        println!("  {:<6} {}", name, group.currency.format_amount(balance.balance));
    }
    println!();

    // --- Suggested payments ---
    println!("━━━ Suggested Payments ━━━\n");
    let plan = SettlementOptimizer::optimize(&before);
    println!("{}", plan);

    // --- Record the first payment ---
    println!("━━━ Recording A Payment ━━━\n");
    let Some(first) = plan.payments.first().cloned() else {
        println!("  Nothing to settle.");
        return;
    };
    let settlement = first.into_settlement("goa").expect("payment is positive");
    book.commit(book.version(), Mutation::RecordSettlement(settlement.clone()))
        .expect("settlement is valid");
    let after = book.balances();

    let explanation = SettlementExplainer::new(group.currency.clone())
        .explain(&settlement, &before, &after, &group.members);
    println!("  {}", explanation.summary);
    for change in &explanation.balance_changes {
        println!("    {}", change.explanation);
    }
    println!();

    // --- Audit ---
    let snapshot = book.snapshot();
    println!("{}", validate_ledger(&group, &snapshot.expenses, &snapshot.settlements));
    println!(
        "{}",
        FairnessScore::calculate(&group, &snapshot.expenses, &after)
    );
    println!(
        "{}",
        ReliabilityMeter::calculate(&snapshot.expenses, &snapshot.settlements)
    );
}
