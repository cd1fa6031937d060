//! split-ledger CLI
//!
//! Compute balances and settle-up payments for a group export from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! # Balances from a group export
//! split-ledger balances --input group.json
//!
//! # Suggested payments as JSON
//! split-ledger settle --input group.json --format json
//!
//! # Split a bill three ways
//! split-ledger split --amount 100 --members A,B,C
//!
//! # Generate a random group for testing
//! split-ledger generate --members 6 --expenses 40
//! ```
//!
//! Set `RUST_LOG=debug` to trace aggregation and matching steps.

use split_ledger::aggregation::audit::{validate_ledger, ValidationStatus};
use split_ledger::aggregation::balances::BalanceAggregator;
use split_ledger::analysis::fairness::{FairnessScore, ReliabilityMeter};
use split_ledger::analysis::spending::{
    CategoryTotal, CurrentMonthTotal, ExpenseAnalytics, MonthlyTotal, SpendingTrends,
};
use split_ledger::core::expense::Split;
use split_ledger::core::ids::MemberId;
use split_ledger::core::money::Money;
use split_ledger::core::settlement::Settlement;
use split_ledger::explain::explainer::SettlementExplainer;
use split_ledger::optimization::settle_up::{apply_payments, SettlementOptimizer};
use split_ledger::simulation::group_generator::{generate_random_group, GroupConfig, GroupHistory};
use split_ledger::split::normalizer::{ensure_exact, equal_splits};
use std::collections::HashMap;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"split-ledger — shared-expense balances and settle-up suggestions

USAGE:
    split-ledger <COMMAND> [OPTIONS]

COMMANDS:
    balances    Net balance of every member
    settle      Suggested payments that settle all balances
    validate    Audit trail and zero-sum check (exit 1 on error)
    explain     Describe the effect of recording a settlement
    split       Split an amount equally or normalize custom shares
    fairness    Fairness score and data reliability meter
    spending    Monthly totals, category breakdown and spending trends
    generate    Generate a random group export (for testing)
    help        Show this message

OPTIONS (balances, settle, validate, explain, fairness, spending):
    --input <FILE>      Path to a JSON group export
    --format <FORMAT>   Output format: text (default) or json
    --verify            (settle) re-apply payments and check all balances reach zero

OPTIONS (explain):
    --from <ID> --to <ID> --amount <AMOUNT>

OPTIONS (spending):
    --months <N>        Months of totals to show (default: 6)
    --member <ID>       Only trends for expenses paid by this member

OPTIONS (split):
    --amount <AMOUNT>   Total to split
    --members <LIST>    Comma-separated member ids (equal split)
    --custom <LIST>     Comma-separated id=amount shares (normalized to the total)

OPTIONS (generate):
    --members <N>       Number of members (default: 5)
    --expenses <N>      Number of expenses (default: 20)
    --settlements <N>   Number of completed settlements (default: 3)
    --seed <N>          Seed for reproducible output
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    split-ledger balances --input group.json
    split-ledger settle --input group.json --format json --verify
    split-ledger explain --input group.json --from B --to A --amount 50
    split-ledger split --amount 100 --custom A=30,B=30,C=39
    split-ledger spending --input group.json --months 12 --member A
    split-ledger generate --members 8 --expenses 50 --output group.json"#
    );
}

/// Parsed `--key value` options plus bare `--flag`s.
struct Options {
    values: HashMap<String, String>,
    flags: Vec<String>,
}

impl Options {
    fn parse(args: &[String], keys: &[&str], flags: &[&str]) -> Self {
        let mut values = HashMap::new();
        let mut found_flags = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            if flags.contains(&arg) {
                found_flags.push(arg.to_string());
            } else if keys.contains(&arg) {
                i += 1;
                let value = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("{} requires a value", arg);
                    process::exit(1);
                });
                values.insert(arg.to_string(), value);
            } else {
                eprintln!("Unknown option: {}", arg);
                process::exit(1);
            }
            i += 1;
        }
        Self {
            values,
            flags: found_flags,
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn require(&self, key: &str) -> &str {
        self.get(key).unwrap_or_else(|| {
            eprintln!("Error: {} is required", key);
            process::exit(1);
        })
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    fn json(&self) -> bool {
        self.get("--format") == Some("json")
    }

    fn number(&self, key: &str, default: usize) -> usize {
        match self.get(key) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                eprintln!("{} requires a number", key);
                process::exit(1);
            }),
        }
    }
}

fn parse_money(raw: &str) -> Money {
    raw.parse().unwrap_or_else(|e| {
        eprintln!("Invalid amount '{}': {}", raw, e);
        process::exit(1);
    })
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn load_history(path: &str) -> GroupHistory {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let history: GroupHistory = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "group": {{ "id": "trip", "name": "Goa", "members": [{{ "id": "A", "name": "Asha" }}], "currency": "INR" }},
  "expenses": [
    {{ "id": "e1", "groupId": "trip", "amount": "300", "paidBy": "A",
       "splits": [{{ "memberId": "A", "amount": "100" }}] }}
  ],
  "settlements": [
    {{ "id": "s1", "groupId": "trip", "fromMemberId": "B", "toMemberId": "A", "amount": "50", "status": "completed" }}
  ]
}}"#
        );
        process::exit(1);
    });

    if let Err(e) = history.group.check_unique_members() {
        eprintln!("Invalid group: {}", e);
        process::exit(1);
    }
    history
}

fn cmd_balances(args: &[String]) {
    let opts = Options::parse(args, &["--input", "--format"], &[]);
    let history = load_history(opts.require("--input"));
    let balances =
        BalanceAggregator::compute_balances(&history.group, &history.expenses, &history.settlements);

    if opts.json() {
        print_json(&balances);
        return;
    }

    let currency = &history.group.currency;
    println!("=== Balances: {} ===", history.group.name);
    for b in &balances {
        let name = history.group.member_name(&b.member_id).unwrap_or("(not a member)");
        let status = if b.balance.is_within_epsilon() {
            "SETTLED"
        } else if b.balance.is_positive() {
            "GETS"
        } else {
            "OWES"
        };
        println!(
            "  {:<12} {:<20} {:>14}  [{}]",
            b.member_id,
            name,
            currency.format_amount(b.balance),
            status
        );
    }
}

fn cmd_settle(args: &[String]) {
    let opts = Options::parse(args, &["--input", "--format"], &["--verify"]);
    let history = load_history(opts.require("--input"));
    let balances =
        BalanceAggregator::compute_balances(&history.group, &history.expenses, &history.settlements);
    let result = SettlementOptimizer::optimize(&balances);

    if opts.has_flag("--verify") {
        let after = apply_payments(&balances, &result.payments);
        if let Some(left) = after.iter().find(|b| !b.balance.is_within_epsilon()) {
            eprintln!(
                "Verification failed: {} still at {} after all payments",
                left.member_id, left.balance
            );
            process::exit(1);
        }
        eprintln!("Verified: all balances settle within one cent.");
    }

    if opts.json() {
        print_json(&result);
    } else {
        print!("{}", result);
    }
}

fn cmd_validate(args: &[String]) {
    let opts = Options::parse(args, &["--input", "--format"], &[]);
    let history = load_history(opts.require("--input"));
    let report = validate_ledger(&history.group, &history.expenses, &history.settlements);

    if opts.json() {
        print_json(&report);
    } else {
        print!("{}", report);
    }
    if report.status == ValidationStatus::Error {
        process::exit(1);
    }
}

fn cmd_explain(args: &[String]) {
    let opts = Options::parse(args, &["--input", "--format", "--from", "--to", "--amount"], &[]);
    let history = load_history(opts.require("--input"));
    let amount = parse_money(opts.require("--amount"));

    let settlement = Settlement::completed(
        history.group.id.clone(),
        opts.require("--from"),
        opts.require("--to"),
        amount,
    )
    .unwrap_or_else(|e| {
        eprintln!("Invalid settlement: {}", e);
        process::exit(1);
    });

    let before =
        BalanceAggregator::compute_balances(&history.group, &history.expenses, &history.settlements);
    let mut settlements = history.settlements.clone();
    settlements.push(settlement.clone());
    let after = BalanceAggregator::compute_balances(&history.group, &history.expenses, &settlements);

    let explanation = SettlementExplainer::new(history.group.currency.clone()).explain(
        &settlement,
        &before,
        &after,
        &history.group.members,
    );

    if opts.json() {
        print_json(&explanation);
    } else {
        println!("{}", explanation.summary);
        for change in &explanation.balance_changes {
            println!("  {}", change.explanation);
        }
    }
}

fn cmd_split(args: &[String]) {
    let opts = Options::parse(args, &["--amount", "--members", "--custom", "--format"], &[]);
    let total = parse_money(opts.require("--amount"));

    let splits = match (opts.get("--members"), opts.get("--custom")) {
        (Some(list), None) => {
            let members: Vec<MemberId> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(MemberId::new)
                .collect();
            equal_splits(total, &members)
        }
        (None, Some(list)) => {
            let shares: Vec<Split> = list
                .split(',')
                .map(|entry| {
                    let (id, amount) = entry.split_once('=').unwrap_or_else(|| {
                        eprintln!("Invalid share '{}': expected id=amount", entry);
                        process::exit(1);
                    });
                    Split::new(id.trim(), parse_money(amount))
                })
                .collect();
            let (splits, warning) = ensure_exact(&shares, total);
            if let Some(warning) = warning {
                eprintln!("Note: {}", warning);
            }
            splits
        }
        _ => {
            eprintln!("Error: exactly one of --members or --custom is required");
            process::exit(1);
        }
    };

    if opts.json() {
        print_json(&splits);
    } else {
        for split in &splits {
            println!("  {:<12} {:>12}", split.member_id, split.amount);
        }
        let sum: Money = splits.iter().map(|s| s.amount).sum();
        println!("  {:<12} {:>12}", "TOTAL", sum);
    }
}

fn cmd_fairness(args: &[String]) {
    let opts = Options::parse(args, &["--input", "--format"], &[]);
    let history = load_history(opts.require("--input"));
    let balances =
        BalanceAggregator::compute_balances(&history.group, &history.expenses, &history.settlements);
    let fairness = FairnessScore::calculate(&history.group, &history.expenses, &balances);
    let reliability = ReliabilityMeter::calculate(&history.expenses, &history.settlements);

    if opts.json() {
        #[derive(serde::Serialize)]
        struct Output<'a> {
            fairness: &'a FairnessScore,
            reliability: &'a ReliabilityMeter,
        }
        print_json(&Output {
            fairness: &fairness,
            reliability: &reliability,
        });
    } else {
        println!("{}", fairness);
        println!("{}", reliability);
    }
}

fn cmd_spending(args: &[String]) {
    let opts = Options::parse(args, &["--input", "--format", "--months", "--member"], &[]);
    let history = load_history(opts.require("--input"));
    let member = opts.get("--member").map(MemberId::new);
    let now = chrono::Utc::now();

    let monthly = ExpenseAnalytics::monthly_totals(&history.expenses, opts.number("--months", 6), now);
    let categories = ExpenseAnalytics::category_breakdown(&history.expenses, None, None);
    let trends = ExpenseAnalytics::spending_trends(&history.expenses, member.as_ref());
    let current = ExpenseAnalytics::current_month_total(&history.expenses, now);

    if opts.json() {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output<'a> {
            monthly_totals: &'a [MonthlyTotal],
            categories: &'a [CategoryTotal],
            trends: &'a SpendingTrends,
            current_month: &'a CurrentMonthTotal,
        }
        print_json(&Output {
            monthly_totals: &monthly,
            categories: &categories,
            trends: &trends,
            current_month: &current,
        });
        return;
    }

    let currency = &history.group.currency;
    println!("=== Monthly Totals ===");
    for m in &monthly {
        println!(
            "  {} {}  {:>14}  ({} expenses)",
            m.month,
            m.year,
            currency.format_amount(m.amount),
            m.count
        );
    }
    println!(
        "  This month ({} {}): {} across {} expenses",
        current.month,
        current.year,
        currency.format_amount(current.total),
        current.count
    );
    println!();
    println!("=== Categories ===");
    for c in &categories {
        println!(
            "  {:<16} {:>14}  ({})",
            c.category,
            currency.format_amount(c.amount),
            c.count
        );
    }
    println!();
    print!("{}", trends);
}

fn cmd_generate(args: &[String]) {
    let opts = Options::parse(
        args,
        &["--members", "--expenses", "--settlements", "--seed", "--output"],
        &[],
    );
    let defaults = GroupConfig::default();
    let config = GroupConfig {
        member_count: opts.number("--members", defaults.member_count),
        expense_count: opts.number("--expenses", defaults.expense_count),
        settlement_count: opts.number("--settlements", defaults.settlement_count),
        seed: opts.get("--seed").map(|raw| {
            raw.parse().unwrap_or_else(|_| {
                eprintln!("--seed requires a number");
                process::exit(1);
            })
        }),
        ..defaults
    };

    let history = generate_random_group(&config);
    let json = serde_json::to_string_pretty(&history).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    });

    if let Some(path) = opts.get("--output") {
        fs::write(path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} expenses across {} members → {}",
            history.expenses.len(),
            history.group.members.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "settle" => cmd_settle(rest),
        "validate" => cmd_validate(rest),
        "explain" => cmd_explain(rest),
        "split" => cmd_split(rest),
        "fairness" => cmd_fairness(rest),
        "spending" => cmd_spending(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
