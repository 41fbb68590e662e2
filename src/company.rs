use rand::Rng;

use crate::claims;
use crate::config::{CompanyConfig, ConfigError, ProductConfig};
use crate::product::Product;
use crate::record::{MonthRecord, ProductRecord};
use crate::types::Month;
use crate::underwriting;

/// A single insurance company: the sole aggregate of mutable state in a
/// simulation run, owned exclusively by one caller.
///
/// The settlement order within a month is fixed — tax, then sales, then
/// claims — and every step sees the previous step's capital mutations.
/// Once insolvent, the ledger is frozen permanently.
#[derive(Debug, Clone)]
pub struct Company {
    /// Signed: taxation at out-of-convention rates may push it negative.
    pub(crate) capital: f64,
    initial_capital: f64,
    /// Fraction of capital taxed each month. Editable at any time.
    pub tax_rate: f64,
    /// Fixed set, created at construction; fields freely editable by the
    /// caller, iteration order fixed (it drives RNG draw order).
    pub products: Vec<Product>,
    month: Month,
    insolvent: bool,
    history: Vec<MonthRecord>,
}

impl Company {
    /// Build a fresh company. Validates every product; a reset is simply a
    /// new call with the desired config.
    pub fn from_config(config: &CompanyConfig) -> Result<Self, ConfigError> {
        for pc in &config.products {
            pc.validate()?;
        }
        Ok(Company {
            capital: config.initial_capital,
            initial_capital: config.initial_capital,
            tax_rate: config.tax_rate,
            products: config.products.iter().map(Product::from_config).collect(),
            month: Month(0),
            insolvent: false,
            history: Vec::new(),
        })
    }

    /// Fresh company over the default catalog — the reset command of the
    /// control surface. Product customisations do not survive a reset.
    pub fn reset(initial_capital: f64, tax_rate: f64) -> Self {
        let mut config = CompanyConfig::canonical();
        config.initial_capital = initial_capital;
        config.tax_rate = tax_rate;
        Self::from_config(&config).expect("canonical catalog is valid")
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn is_insolvent(&self) -> bool {
        self.insolvent
    }

    /// Chronological, append-only record of every settled month.
    pub fn history(&self) -> &[MonthRecord] {
        &self.history
    }

    pub fn product(&self, key: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.key == key)
    }

    /// Replace the starting capital. Only legal before the first
    /// settlement; also resets the running capital, since nothing else has
    /// touched it yet.
    pub fn set_initial_capital(&mut self, capital: f64) -> Result<(), ConfigError> {
        if self.month != Month(0) {
            return Err(ConfigError::SimulationStarted);
        }
        self.initial_capital = capital;
        self.capital = capital;
        Ok(())
    }

    /// Validated pricing edit for one product. Legal at any time — pricing
    /// changes take effect from the next settlement.
    pub fn update_product(&mut self, config: &ProductConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let product = self
            .products
            .iter_mut()
            .find(|p| p.key == config.key)
            .ok_or_else(|| ConfigError::UnknownProduct { key: config.key.to_string() })?;
        product.monthly_premium = config.monthly_premium;
        product.duration_months = config.duration_months;
        product.max_compensation = config.max_compensation;
        product.franchise = config.franchise;
        product.base_demand = config.base_demand;
        Ok(())
    }

    /// Settle one month: tax → sales → claims, in that order, then append
    /// the month's record to history and return it.
    ///
    /// Returns `None` without any state change once the company is
    /// insolvent — the terminal state rejects settlements rather than
    /// erroring.
    pub fn simulate_month(&mut self, rng: &mut impl Rng) -> Option<MonthRecord> {
        if self.insolvent {
            return None;
        }

        self.month = self.month.next();
        let capital_before = self.capital;

        // Tax is levied on prior months' accumulated capital, before any of
        // this month's income arrives. Never skipped.
        let tax = self.capital * self.tax_rate;
        self.capital -= tax;

        let (total_income, _sales) = underwriting::sell_policies(self, rng);
        let (total_payouts, _cases) = claims::settle_claims(self, rng);

        if total_payouts > self.capital {
            // Ruin freezes the ledger: the payout is withheld instead of
            // driving capital negative.
            self.insolvent = true;
            log::warn!(
                "month {}: claims {total_payouts:.0} exceed capital {:.0} — insolvent",
                self.month,
                self.capital
            );
        } else {
            self.capital -= total_payouts;
        }

        let record = MonthRecord {
            month: self.month,
            capital_before,
            capital_after: self.capital,
            capital_change: self.capital - capital_before,
            tax,
            total_income,
            total_payouts,
            insolvent: self.insolvent,
            products: self.products.iter().map(ProductRecord::from).collect(),
        };
        log::debug!(
            "month {}: tax {tax:.0}, income {total_income:.0}, payouts {total_payouts:.0}, capital {:.0}",
            self.month,
            self.capital
        );

        self.history.push(record.clone());
        Some(record)
    }
}
