//! Splitting a single dinner bill.
//!
//! Shows equal splits, custom shares that don't quite add up, and an extra
//! item (the tip) paid by someone else.

use split_ledger::prelude::*;
use split_ledger::split::normalizer::ensure_exact;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║    split-ledger: Dinner Split Example    ║");
    println!("╚══════════════════════════════════════════╝\n");

    let group = Group::new(
        "dinner",
        "Friday dinner",
        vec![
            Member::new("asha", "Asha"),
            Member::new("bilal", "Bilal"),
            Member::new("chen", "Chen"),
        ],
        CurrencyCode::new("INR"),
    )
    .expect("members are unique");
    let inr = group.currency.clone();

    // --- Scenario 1: Equal split ---
    println!("━━━ Scenario 1: Equal Split ━━━\n");

    let bill = Money::new(dec!(100));
    let splits = equal_splits(bill, &group.member_ids());
    for split in &splits {
        println!("  {:<6} {}", split.member_id, inr.format_amount(split.amount));
    }
    println!("  (the odd cent goes to the first member)\n");

    // --- Scenario 2: Custom shares ---
    println!("━━━ Scenario 2: Custom Shares ━━━\n");

    let typed = vec![
        Split::new("asha", Money::new(dec!(45))),
        Split::new("bilal", Money::new(dec!(30))),
        Split::new("chen", Money::new(dec!(24.50))),
    ];
    let (exact, warning) = ensure_exact(&typed, bill);
    if let Some(warning) = warning {
        println!("  {}", warning);
    }
    for split in &exact {
        println!("  {:<6} {}", split.member_id, inr.format_amount(split.amount));
    }
    println!();

    // --- Scenario 3: Tip paid separately ---
    println!("━━━ Scenario 3: Tip Paid By Someone Else ━━━\n");

    let expense = Expense::new("dinner", "asha", bill, exact)
        .with_title("Dinner")
        .with_extra_items(vec![ExtraItem {
            amount: Money::new(dec!(15)),
            paid_by: Some("chen".into()),
            split_between: None,
        }])
        .fold_extra_items();
    println!("  Total with tip: {}", inr.format_amount(expense.amount()));
    for payer in expense.credits() {
        println!("  {} paid {}", payer.member_id, inr.format_amount(payer.amount));
    }
    println!();

    let balances = BalanceAggregator::compute_balances(&group, &[expense], &[]);
    for balance in &balances {
        println!("  {:<6} {}", balance.member_id, inr.format_amount(balance.balance));
    }
    println!();
    println!("{}", SettlementOptimizer::optimize(&balances));
}
