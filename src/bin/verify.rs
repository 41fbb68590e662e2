//! Offline record-stream verifier for polisim output.
//!
//! Reads `records.ndjson` (or the first positional argument), deserializes
//! it using the same `MonthRecord` type the simulation writes, then prints
//! the ledger invariant status (PASS/FAIL per invariant) and the run
//! summary.

use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use polisim::{
    analysis::{self, LedgerViolation},
    record::MonthRecord,
};

fn main() {
    env_logger::init();

    let records_path = std::env::args().nth(1).unwrap_or_else(|| "records.ndjson".to_string());

    let file = File::open(&records_path).unwrap_or_else(|e| {
        eprintln!("error: cannot open {records_path} — {e}");
        eprintln!("Run `cargo run --release` first to generate the record stream.");
        std::process::exit(1);
    });

    let mut history: Vec<MonthRecord> = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("error reading line {}: {}", line_no + 1, e);
            std::process::exit(1);
        });
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<MonthRecord>(&line) {
            Ok(record) => history.push(record),
            Err(e) => {
                eprintln!("error: failed to deserialize line {}: {}", line_no + 1, e);
                eprintln!("  line: {line}");
                std::process::exit(1);
            }
        }
    }

    println!("Loaded {} record(s) from {records_path}", history.len());

    let violations = analysis::verify_ledger(&history);
    let has = |f: fn(&LedgerViolation) -> bool| violations.iter().any(f);

    println!("\n=== Ledger invariants ===");
    let checks: [(&str, bool); 6] = [
        ("Gapless month sequence", has(|v| matches!(v, LedgerViolation::MonthGap { .. }))),
        ("Accounting identity", has(|v| matches!(v, LedgerViolation::AccountingMismatch { .. }))),
        ("Capital change", has(|v| matches!(v, LedgerViolation::ChangeMismatch { .. }))),
        ("Capital continuity", has(|v| matches!(v, LedgerViolation::CapitalDiscontinuity { .. }))),
        ("Non-shrinking book", has(|v| matches!(v, LedgerViolation::ShrinkingBook { .. }))),
        ("Ledger frozen after ruin", has(|v| matches!(v, LedgerViolation::RecordAfterRuin { .. }))),
    ];
    for (name, failed) in checks {
        println!("  {name:<26} {}", if failed { "FAIL" } else { "PASS" });
    }

    if !violations.is_empty() {
        println!("\n{} violation(s):", violations.len());
        for v in &violations {
            println!("  {v}");
        }
    }

    let stats = analysis::summarise(&history);
    println!(
        "\nOutcome: {} after {} month(s), final capital {:.0}, loss ratio {:.2}",
        if stats.ruined { "ruin" } else { "survived" },
        stats.months,
        stats.final_capital,
        stats.loss_ratio(),
    );

    if !violations.is_empty() {
        std::process::exit(2);
    }
}
