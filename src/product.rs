use crate::config::ProductConfig;

/// A single insurance product: fixed identity, caller-editable pricing, and
/// the running statistics the settlement overwrites each month.
///
/// `active_policies` is cumulative and never decreases — sold policies stay
/// on the book for the life of the company (no expiry or lapse is modeled).
#[derive(Debug, Clone)]
pub struct Product {
    /// Stable lookup key, e.g. "auto".
    pub key: String,
    /// Display name for reports.
    pub name: String,
    /// Premium per policy per month (currency/month).
    pub monthly_premium: f64,
    /// Contract duration in months.
    pub duration_months: u32,
    /// Compensation ceiling per claim (currency).
    pub max_compensation: f64,
    /// Deductible threshold: claims at or below this pay nothing (currency).
    pub franchise: f64,
    /// Market size absent pricing effects (persons/month).
    pub base_demand: u32,

    /// Cumulative book size across the whole run.
    pub active_policies: u32,
    pub sold_this_month: u32,
    pub cases_this_month: u32,
    pub payouts_this_month: f64,
    pub income_this_month: f64,
}

impl Product {
    pub fn from_config(config: &ProductConfig) -> Self {
        Product {
            key: config.key.to_string(),
            name: config.name.to_string(),
            monthly_premium: config.monthly_premium,
            duration_months: config.duration_months,
            max_compensation: config.max_compensation,
            franchise: config.franchise,
            base_demand: config.base_demand,
            active_policies: 0,
            sold_this_month: 0,
            cases_this_month: 0,
            payouts_this_month: 0.0,
            income_this_month: 0.0,
        }
    }

    /// Total cost of one contract over its full duration:
    /// monthly premium × duration.
    pub fn total_contract_cost(&self) -> f64 {
        self.monthly_premium * self.duration_months as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompanyConfig;

    #[test]
    fn total_contract_cost_is_premium_times_duration() {
        let config = CompanyConfig::canonical();
        let housing = Product::from_config(&config.products[0]);
        assert_eq!(housing.total_contract_cost(), 90.0 * 12.0);
    }

    #[test]
    fn from_config_starts_with_empty_book() {
        let config = CompanyConfig::canonical();
        for pc in &config.products {
            let product = Product::from_config(pc);
            assert_eq!(product.active_policies, 0, "{}: book must start empty", product.key);
            assert_eq!(product.sold_this_month, 0);
            assert_eq!(product.cases_this_month, 0);
            assert_eq!(product.payouts_this_month, 0.0);
            assert_eq!(product.income_this_month, 0.0);
        }
    }

    #[test]
    fn from_config_copies_pricing_fields() {
        let config = CompanyConfig::canonical();
        let auto = Product::from_config(&config.products[1]);
        assert_eq!(auto.key, "auto");
        assert_eq!(auto.monthly_premium, 120.0);
        assert_eq!(auto.duration_months, 12);
        assert_eq!(auto.max_compensation, 15_000.0);
        assert_eq!(auto.franchise, 300.0);
        assert_eq!(auto.base_demand, 80);
    }
}
