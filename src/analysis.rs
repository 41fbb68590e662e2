use std::collections::HashMap;

use crate::record::MonthRecord;

/// Whole-run aggregate statistics derived from a month-record history.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Number of settled months (insolvency month included).
    pub months: u32,
    pub final_capital: f64,
    pub total_tax: f64,
    pub total_income: f64,
    /// Includes the withheld payout of an insolvency month.
    pub total_payouts: f64,
    pub ruined: bool,
}

impl RunStats {
    /// Claims paid out per unit of premium earned. Zero if no premium.
    pub fn loss_ratio(&self) -> f64 {
        if self.total_income == 0.0 {
            0.0
        } else {
            self.total_payouts / self.total_income
        }
    }
}

/// Fold a history into run-level totals.
pub fn summarise(history: &[MonthRecord]) -> RunStats {
    let mut stats = RunStats {
        months: history.len() as u32,
        final_capital: history.last().map(|r| r.capital_after).unwrap_or(0.0),
        total_tax: 0.0,
        total_income: 0.0,
        total_payouts: 0.0,
        ruined: history.last().map(|r| r.insolvent).unwrap_or(false),
    };
    for record in history {
        stats.total_tax += record.tax;
        stats.total_income += record.total_income;
        stats.total_payouts += record.total_payouts;
    }
    stats
}

/// A ledger invariant broken somewhere in a history. A correctly produced
/// history never contains any of these.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerViolation {
    /// Month indices are not the gapless sequence 1, 2, 3, …
    MonthGap { position: usize, expected: u32, actual: u32 },
    /// capital_after disagrees with before − tax + income − payouts
    /// (payouts withheld in the insolvency month).
    AccountingMismatch { month: u32, expected: f64, actual: f64 },
    /// capital_change disagrees with after − before.
    ChangeMismatch { month: u32, expected: f64, actual: f64 },
    /// A record's capital_before disagrees with the previous record's
    /// capital_after — nothing may touch capital between settlements.
    CapitalDiscontinuity { month: u32, expected: f64, actual: f64 },
    /// A product's book shrank between consecutive records.
    ShrinkingBook { month: u32, key: String, previous: u32, current: u32 },
    /// A record appears after an insolvent one — the terminal state must
    /// freeze the ledger.
    RecordAfterRuin { month: u32 },
}

impl std::fmt::Display for LedgerViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MonthGap { position, expected, actual } => {
                write!(f, "MonthGap at record {position}: expected month {expected}, got {actual}")
            }
            Self::AccountingMismatch { month, expected, actual } => {
                write!(f, "AccountingMismatch month {month}: expected {expected}, got {actual}")
            }
            Self::ChangeMismatch { month, expected, actual } => {
                write!(f, "ChangeMismatch month {month}: expected {expected}, got {actual}")
            }
            Self::CapitalDiscontinuity { month, expected, actual } => {
                write!(f, "CapitalDiscontinuity month {month}: expected {expected}, got {actual}")
            }
            Self::ShrinkingBook { month, key, previous, current } => {
                write!(f, "ShrinkingBook month {month} product {key}: {previous} → {current}")
            }
            Self::RecordAfterRuin { month } => {
                write!(f, "RecordAfterRuin: month {month} settled after insolvency")
            }
        }
    }
}

/// Tolerance for capital arithmetic, relative to the magnitude involved.
/// The ledger evaluates each identity in a fixed order, so real histories
/// agree to the last bit; the margin only covers serialization round-trips.
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Check every ledger invariant over a full history.
pub fn verify_ledger(history: &[MonthRecord]) -> Vec<LedgerViolation> {
    let mut violations = Vec::new();
    let mut book: HashMap<String, u32> = HashMap::new();
    let mut ruined = false;

    for (i, record) in history.iter().enumerate() {
        let month = record.month.0;

        if ruined {
            violations.push(LedgerViolation::RecordAfterRuin { month });
        }
        ruined |= record.insolvent;

        let expected_month = i as u32 + 1;
        if month != expected_month {
            violations.push(LedgerViolation::MonthGap {
                position: i,
                expected: expected_month,
                actual: month,
            });
        }

        let expected_after = if record.insolvent {
            record.capital_before - record.tax + record.total_income
        } else {
            record.capital_before - record.tax + record.total_income - record.total_payouts
        };
        if !close(record.capital_after, expected_after) {
            violations.push(LedgerViolation::AccountingMismatch {
                month,
                expected: expected_after,
                actual: record.capital_after,
            });
        }

        let expected_change = record.capital_after - record.capital_before;
        if !close(record.capital_change, expected_change) {
            violations.push(LedgerViolation::ChangeMismatch {
                month,
                expected: expected_change,
                actual: record.capital_change,
            });
        }

        if i > 0 {
            let previous_after = history[i - 1].capital_after;
            if !close(record.capital_before, previous_after) {
                violations.push(LedgerViolation::CapitalDiscontinuity {
                    month,
                    expected: previous_after,
                    actual: record.capital_before,
                });
            }
        }

        for product in &record.products {
            let previous = book.insert(product.key.clone(), product.active_policies);
            if let Some(previous) = previous
                && product.active_policies < previous
            {
                violations.push(LedgerViolation::ShrinkingBook {
                    month,
                    key: product.key.clone(),
                    previous,
                    current: product.active_policies,
                });
            }
        }
    }

    violations
}

/// Distribution of one metric across N independent runs.
#[derive(Debug, Clone)]
pub struct DistStats {
    pub n: usize,
    pub min: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl DistStats {
    /// Linear-interpolation quantiles over the sorted sample; sample
    /// standard deviation. `None` for an empty sample.
    fn from_samples(mut samples: Vec<f64>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = samples.len();

        let quantile = |p: f64| {
            let rank = p * (n - 1) as f64;
            let below = rank.floor() as usize;
            let above = (below + 1).min(n - 1);
            samples[below] + (samples[above] - samples[below]) * (rank - below as f64)
        };

        let mean = samples.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let ss: f64 = samples.iter().map(|x| (x - mean) * (x - mean)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(DistStats {
            n,
            min: samples[0],
            p5: quantile(0.05),
            p25: quantile(0.25),
            p50: quantile(0.50),
            p75: quantile(0.75),
            p95: quantile(0.95),
            max: samples[n - 1],
            mean,
            std_dev,
        })
    }
}

/// Cross-run distribution of final capital.
pub fn final_capital_distribution(runs: &[RunStats]) -> Option<DistStats> {
    DistStats::from_samples(runs.iter().map(|r| r.final_capital).collect())
}

/// Cross-run distribution of months survived.
pub fn survival_distribution(runs: &[RunStats]) -> Option<DistStats> {
    DistStats::from_samples(runs.iter().map(|r| r.months as f64).collect())
}

/// Fraction of runs that ended in insolvency.
pub fn ruin_probability(runs: &[RunStats]) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().filter(|r| r.ruined).count() as f64 / runs.len() as f64
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::company::Company;
    use crate::config::CompanyConfig;
    use crate::types::Month;

    fn solvent_history(months: u32, seed: u64) -> Vec<MonthRecord> {
        let mut config = CompanyConfig::canonical();
        config.initial_capital = 1_000_000_000.0;
        let mut company = Company::from_config(&config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        for _ in 0..months {
            company.simulate_month(&mut rng);
        }
        company.history().to_vec()
    }

    fn ruined_history(seed: u64) -> Vec<MonthRecord> {
        let mut config = CompanyConfig::canonical();
        config.initial_capital = 100.0;
        let mut company = Company::from_config(&config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        while company.simulate_month(&mut rng).is_some() {}
        company.history().to_vec()
    }

    // ── verify_ledger ─────────────────────────────────────────────────────────

    #[test]
    fn generated_solvent_history_has_no_violations() {
        let history = solvent_history(12, 42);
        let violations = verify_ledger(&history);
        assert!(violations.is_empty(), "unexpected violations: {violations:?}");
    }

    #[test]
    fn generated_ruined_history_has_no_violations() {
        let history = ruined_history(42);
        assert!(history.last().unwrap().insolvent, "tiny capital must be ruined");
        let violations = verify_ledger(&history);
        assert!(violations.is_empty(), "unexpected violations: {violations:?}");
    }

    #[test]
    fn detects_month_gaps() {
        let mut history = solvent_history(3, 1);
        history[2].month = Month(7);
        assert!(
            verify_ledger(&history)
                .iter()
                .any(|v| matches!(v, LedgerViolation::MonthGap { .. }))
        );
    }

    #[test]
    fn detects_tampered_capital() {
        let mut history = solvent_history(3, 1);
        history[1].capital_after += 1_000.0;
        let violations = verify_ledger(&history);
        assert!(violations.iter().any(|v| matches!(v, LedgerViolation::AccountingMismatch { .. })));
        assert!(violations.iter().any(|v| matches!(v, LedgerViolation::ChangeMismatch { .. })));
    }

    #[test]
    fn detects_capital_discontinuity() {
        let mut history = solvent_history(3, 1);
        // Shift one whole settlement so its internal identity still holds
        // but it no longer chains onto the previous record.
        history[2].capital_before += 500.0;
        history[2].capital_after += 500.0;
        assert!(
            verify_ledger(&history)
                .iter()
                .any(|v| matches!(v, LedgerViolation::CapitalDiscontinuity { .. }))
        );
    }

    #[test]
    fn detects_shrinking_book() {
        let mut history = solvent_history(3, 1);
        history[2].products[0].active_policies = 0;
        assert!(
            verify_ledger(&history)
                .iter()
                .any(|v| matches!(v, LedgerViolation::ShrinkingBook { .. }))
        );
    }

    #[test]
    fn detects_records_after_ruin() {
        let mut history = ruined_history(42);
        let mut extra = history.last().unwrap().clone();
        extra.month = Month(extra.month.0 + 1);
        history.push(extra);
        assert!(
            verify_ledger(&history)
                .iter()
                .any(|v| matches!(v, LedgerViolation::RecordAfterRuin { .. }))
        );
    }

    #[test]
    fn violations_display_with_context() {
        let v = LedgerViolation::ShrinkingBook {
            month: 4,
            key: "auto".to_string(),
            previous: 10,
            current: 3,
        };
        assert_eq!(v.to_string(), "ShrinkingBook month 4 product auto: 10 → 3");
    }

    // ── summarise ─────────────────────────────────────────────────────────────

    #[test]
    fn summarise_totals_match_the_records() {
        let history = solvent_history(6, 3);
        let stats = summarise(&history);
        assert_eq!(stats.months, 6);
        assert!(!stats.ruined);
        assert_eq!(stats.final_capital, history.last().unwrap().capital_after);

        let tax: f64 = history.iter().map(|r| r.tax).sum();
        assert!((stats.total_tax - tax).abs() < 1e-6);
    }

    #[test]
    fn summarise_empty_history() {
        let stats = summarise(&[]);
        assert_eq!(stats.months, 0);
        assert_eq!(stats.final_capital, 0.0);
        assert!(!stats.ruined);
        assert_eq!(stats.loss_ratio(), 0.0);
    }

    #[test]
    fn summarise_flags_ruin() {
        let stats = summarise(&ruined_history(42));
        assert!(stats.ruined);
    }

    // ── distributions ─────────────────────────────────────────────────────────

    fn stats_with(final_capital: f64, ruined: bool) -> RunStats {
        RunStats {
            months: 10,
            final_capital,
            total_tax: 0.0,
            total_income: 0.0,
            total_payouts: 0.0,
            ruined,
        }
    }

    #[test]
    fn ruin_probability_counts_ruined_fraction() {
        let runs = vec![
            stats_with(0.0, true),
            stats_with(100.0, false),
            stats_with(200.0, false),
            stats_with(0.0, true),
        ];
        assert_eq!(ruin_probability(&runs), 0.5);
        assert_eq!(ruin_probability(&[]), 0.0);
    }

    #[test]
    fn final_capital_distribution_orders_percentiles() {
        let runs: Vec<RunStats> = (0..100).map(|i| stats_with(i as f64, false)).collect();
        let dist = final_capital_distribution(&runs).unwrap();
        assert_eq!(dist.n, 100);
        assert_eq!(dist.min, 0.0);
        assert_eq!(dist.max, 99.0);
        assert!(dist.p5 <= dist.p25 && dist.p25 <= dist.p50);
        assert!(dist.p50 <= dist.p75 && dist.p75 <= dist.p95);
        assert!((dist.mean - 49.5).abs() < 1e-9);
    }

    #[test]
    fn empty_distribution_is_none() {
        assert!(final_capital_distribution(&[]).is_none());
        assert!(survival_distribution(&[]).is_none());
    }
}
