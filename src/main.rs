use std::fs::File;
use std::io::{BufWriter, Write};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use polisim::analysis::{self, LedgerViolation, RunStats};
use polisim::company::Company;
use polisim::config::CompanyConfig;
use polisim::record::MonthRecord;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let mut seed_override: Option<u64> = None;
    let mut months_override: Option<u32> = None;
    let mut capital_override: Option<f64> = None;
    let mut tax_override: Option<f64> = None;
    let mut output_path = "records.ndjson".to_string();
    let mut quiet = false;
    let mut runs: Option<u64> = None;
    let mut output_dir_opt: Option<String> = None;
    let mut csv_path_opt: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                seed_override = Some(args[i].parse().expect("--seed requires a u64"));
            }
            "--months" => {
                i += 1;
                months_override = Some(args[i].parse().expect("--months requires a u32"));
            }
            "--capital" => {
                i += 1;
                capital_override = Some(args[i].parse().expect("--capital requires a number"));
            }
            "--tax" => {
                i += 1;
                tax_override =
                    Some(args[i].parse().expect("--tax requires a fraction, e.g. 0.09"));
            }
            "--output" => {
                i += 1;
                output_path = args[i].clone();
            }
            "--quiet" => quiet = true,
            "--runs" => {
                i += 1;
                runs = Some(args[i].parse().expect("--runs requires a positive integer"));
            }
            "--output-dir" => {
                i += 1;
                output_dir_opt = Some(args[i].clone());
            }
            "--csv" => {
                i += 1;
                csv_path_opt = Some(args[i].clone());
            }
            _ => {}
        }
        i += 1;
    }

    let mut base_config = CompanyConfig::canonical();
    let start_seed = seed_override.unwrap_or(base_config.seed);
    if let Some(m) = months_override {
        base_config.max_months = m;
    }
    if let Some(c) = capital_override {
        base_config.initial_capital = c;
    }
    if let Some(t) = tax_override {
        base_config.tax_rate = t;
    }

    if let Some(n) = runs {
        use rayon::prelude::*;

        if let Some(ref dir) = output_dir_opt {
            std::fs::create_dir_all(dir).expect("failed to create output directory");
        }

        let all_stats: Vec<RunStats> = (0u64..n)
            .into_par_iter()
            .map(|i| {
                let seed = start_seed + i;
                let history = run_once(&base_config, seed);

                if let Some(ref dir) = output_dir_opt {
                    let path = format!("{dir}/records_seed_{seed}.ndjson");
                    write_ndjson(&history, &path);
                    if !quiet {
                        println!("Seed {seed}: {} months → {path}", history.len());
                    }
                }

                analysis::summarise(&history)
            })
            .collect();

        if let Some(ref csv_path) = csv_path_opt {
            write_runs_csv(&all_stats, start_seed, csv_path);
        }

        if !quiet {
            print_run_outcomes(&all_stats, start_seed);
            print_distributions(&all_stats, n);
        }
    } else {
        let history = run_once(&base_config, start_seed);
        write_ndjson(&history, &output_path);

        if !quiet {
            println!("Months settled: {} → {output_path}", history.len());
            print_invariants(&history);
            print_report(&history);
        }
    }
}

/// Drive one company from month 1 until ruin or the configured horizon.
fn run_once(config: &CompanyConfig, seed: u64) -> Vec<MonthRecord> {
    let mut company = Company::from_config(config).expect("invalid product configuration");
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    for _ in 0..config.max_months {
        if company.simulate_month(&mut rng).is_none() {
            break;
        }
    }
    company.history().to_vec()
}

fn write_ndjson(history: &[MonthRecord], path: &str) {
    let file = File::create(path).unwrap_or_else(|e| panic!("failed to create {path}: {e}"));
    let mut writer = BufWriter::new(file);
    for record in history {
        serde_json::to_writer(&mut writer, record).expect("failed to serialize record");
        writeln!(writer).expect("failed to write newline");
    }
}

fn print_invariants(history: &[MonthRecord]) {
    let violations = analysis::verify_ledger(history);

    let inv = |variant: fn(&LedgerViolation) -> bool| {
        if violations.iter().any(variant) { "FAIL" } else { "PASS" }
    };

    println!("\n=== Ledger invariants ===");
    println!("  [1] Gapless month sequence:   {}", inv(|v| matches!(v, LedgerViolation::MonthGap { .. })));
    println!("  [2] Accounting identity:      {}", inv(|v| matches!(v, LedgerViolation::AccountingMismatch { .. })));
    println!("  [3] Capital change:           {}", inv(|v| matches!(v, LedgerViolation::ChangeMismatch { .. })));
    println!("  [4] Capital continuity:       {}", inv(|v| matches!(v, LedgerViolation::CapitalDiscontinuity { .. })));
    println!("  [5] Non-shrinking book:       {}", inv(|v| matches!(v, LedgerViolation::ShrinkingBook { .. })));
    println!("  [6] Ledger frozen after ruin: {}", inv(|v| matches!(v, LedgerViolation::RecordAfterRuin { .. })));

    if violations.is_empty() {
        println!("  All ledger invariants: PASS");
    } else {
        println!("\n  {} violation(s):", violations.len());
        for v in &violations {
            println!("    {v}");
        }
    }
}

fn print_report(history: &[MonthRecord]) {
    if history.is_empty() {
        return;
    }

    println!("\n=== Month ledger ===");
    println!(
        "{:>5} | {:>12} | {:>10} | {:>10} | {:>12} | {:>12} | {:>12} | {:>8}",
        "Month", "Before", "Tax", "Income", "Payouts", "After", "Change", "Status"
    );
    println!("{}", "-".repeat(100));

    for r in history {
        println!(
            "{:>5} | {:>12.0} | {:>10.0} | {:>10.0} | {:>12.0} | {:>12.0} | {:>12.0} | {:>8}",
            r.month.0,
            r.capital_before,
            r.tax,
            r.total_income,
            r.total_payouts,
            r.capital_after,
            r.capital_change,
            if r.insolvent { "RUINED" } else { "active" },
        );
    }

    // Per-product book at the end of the run.
    let last = history.last().unwrap();
    println!("\n=== Final book ({} month(s)) ===", history.len());
    println!(
        "{:>10} | {:>8} | {:>8} | {:>8} | {:>12} | {:>12}",
        "Product", "Book", "Sold", "Cases", "Income", "Payouts"
    );
    for p in &last.products {
        println!(
            "{:>10} | {:>8} | {:>8} | {:>8} | {:>12.0} | {:>12.0}",
            p.name, p.active_policies, p.sold, p.cases, p.income, p.payouts
        );
    }

    let stats = analysis::summarise(history);
    println!(
        "\nOutcome: {} after {} month(s), final capital {:.0}, loss ratio {:.2}",
        if stats.ruined { "ruin" } else { "survived" },
        stats.months,
        stats.final_capital,
        stats.loss_ratio(),
    );
}

fn print_run_outcomes(all_stats: &[RunStats], start_seed: u64) {
    println!("\n=== Per-run outcomes ===");
    println!(
        "{:>6} | {:>6} | {:>14} | {:>8} | {:>6}",
        "Seed", "Months", "Final capital", "LossR", "Ruined"
    );
    println!("{}", "-".repeat(54));
    for (i, s) in all_stats.iter().enumerate() {
        println!(
            "{:>6} | {:>6} | {:>14.0} | {:>8.2} | {:>6}",
            start_seed + i as u64,
            s.months,
            s.final_capital,
            s.loss_ratio(),
            if s.ruined { "yes" } else { "no" },
        );
    }
}

fn print_distributions(all_stats: &[RunStats], n_runs: u64) {
    println!("\n=== Cross-run distribution (N={n_runs} runs) ===");
    println!("Ruin probability: {:.1}%", analysis::ruin_probability(all_stats) * 100.0);

    let sections: [(&str, Option<analysis::DistStats>); 2] = [
        ("Months survived", analysis::survival_distribution(all_stats)),
        ("Final capital", analysis::final_capital_distribution(all_stats)),
    ];

    for (title, dist) in sections {
        let Some(d) = dist else { continue };
        println!("\n--- {title} ---");
        println!(
            "{:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7}",
            "min", "p5", "p25", "p50", "p75", "p95", "max", "mean", "stddev"
        );
        println!(
            "{:>7.1} | {:>7.1} | {:>7.1} | {:>7.1} | {:>7.1} | {:>7.1} | {:>7.1} | {:>7.1} | {:>7.1}",
            d.min, d.p5, d.p25, d.p50, d.p75, d.p95, d.max, d.mean, d.std_dev
        );
    }
}

fn write_runs_csv(all_stats: &[RunStats], start_seed: u64, path: &str) {
    let file = File::create(path).unwrap_or_else(|e| panic!("failed to create {path}: {e}"));
    let mut w = BufWriter::new(file);
    writeln!(w, "seed,months,final_capital,total_tax,total_income,total_payouts,loss_ratio,ruined")
        .expect("write");
    for (i, s) in all_stats.iter().enumerate() {
        writeln!(
            w,
            "{},{},{:.2},{:.2},{:.2},{:.2},{:.6},{}",
            start_seed + i as u64,
            s.months,
            s.final_capital,
            s.total_tax,
            s.total_income,
            s.total_payouts,
            s.loss_ratio(),
            s.ruined,
        )
        .expect("write");
    }
}
