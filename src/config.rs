use thiserror::Error;

/// A configuration edit the engine refuses. No state is mutated when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial capital can only be changed before the first settlement")]
    SimulationStarted,
    #[error("no product with key '{key}'")]
    UnknownProduct { key: String },
    #[error("{field} must be non-negative, got {value}")]
    NegativeParameter { field: &'static str, value: f64 },
    #[error("max_compensation must be positive, got {value}")]
    NonPositiveCompensation { value: f64 },
}

/// Pricing parameters for one product. Identity (`key`, `name`) is fixed at
/// construction; the pricing fields may be re-applied to a live company via
/// `Company::update_product` at any time.
#[derive(Debug, Clone)]
pub struct ProductConfig {
    pub key: &'static str,
    pub name: &'static str,
    pub monthly_premium: f64,
    pub duration_months: u32,
    pub max_compensation: f64,
    pub franchise: f64,
    pub base_demand: u32,
}

impl ProductConfig {
    /// Reject parameters the demand model cannot handle. The engines assume
    /// this has been called on every product that reaches them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monthly_premium < 0.0 {
            return Err(ConfigError::NegativeParameter {
                field: "monthly_premium",
                value: self.monthly_premium,
            });
        }
        if self.franchise < 0.0 {
            return Err(ConfigError::NegativeParameter {
                field: "franchise",
                value: self.franchise,
            });
        }
        if self.max_compensation <= 0.0 {
            return Err(ConfigError::NonPositiveCompensation { value: self.max_compensation });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CompanyConfig {
    pub seed: u64,
    pub initial_capital: f64,
    /// Fraction of capital taxed away each month. [0, 1) by convention;
    /// not enforced.
    pub tax_rate: f64,
    /// Run horizon enforced by the caller, not the ledger.
    pub max_months: u32,
    pub products: Vec<ProductConfig>,
}

impl CompanyConfig {
    /// The default single-line catalog: three products with fixed seed
    /// parameters. A reset restores exactly this configuration.
    pub fn canonical() -> Self {
        CompanyConfig {
            seed: 42,
            initial_capital: 30_000.0,
            tax_rate: 0.09,
            max_months: 24,
            products: vec![
                ProductConfig {
                    key: "housing",
                    name: "Housing",
                    monthly_premium: 90.0,
                    duration_months: 12,
                    max_compensation: 20_000.0,
                    franchise: 500.0,
                    base_demand: 100,
                },
                ProductConfig {
                    key: "auto",
                    name: "Auto",
                    monthly_premium: 120.0,
                    duration_months: 12,
                    max_compensation: 15_000.0,
                    franchise: 300.0,
                    base_demand: 80,
                },
                ProductConfig {
                    key: "health",
                    name: "Health",
                    monthly_premium: 150.0,
                    duration_months: 12,
                    max_compensation: 25_000.0,
                    franchise: 200.0,
                    base_demand: 60,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_has_three_products_in_catalog_order() {
        let config = CompanyConfig::canonical();
        let keys: Vec<&str> = config.products.iter().map(|p| p.key).collect();
        assert_eq!(keys, vec!["housing", "auto", "health"]);
    }

    #[test]
    fn canonical_products_all_validate() {
        let config = CompanyConfig::canonical();
        for pc in &config.products {
            assert_eq!(pc.validate(), Ok(()), "canonical product {} must validate", pc.key);
        }
    }

    #[test]
    fn canonical_company_defaults() {
        let config = CompanyConfig::canonical();
        assert_eq!(config.initial_capital, 30_000.0);
        assert_eq!(config.tax_rate, 0.09);
        assert_eq!(config.max_months, 24);
    }

    #[test]
    fn validate_rejects_zero_max_compensation() {
        let mut pc = CompanyConfig::canonical().products[0].clone();
        pc.max_compensation = 0.0;
        assert_eq!(
            pc.validate(),
            Err(ConfigError::NonPositiveCompensation { value: 0.0 }),
            "zero ceiling would fault the demand ratio"
        );
    }

    #[test]
    fn validate_rejects_negative_premium() {
        let mut pc = CompanyConfig::canonical().products[0].clone();
        pc.monthly_premium = -1.0;
        assert!(matches!(
            pc.validate(),
            Err(ConfigError::NegativeParameter { field: "monthly_premium", .. })
        ));
    }

    #[test]
    fn validate_rejects_negative_franchise() {
        let mut pc = CompanyConfig::canonical().products[0].clone();
        pc.franchise = -0.5;
        assert!(matches!(
            pc.validate(),
            Err(ConfigError::NegativeParameter { field: "franchise", .. })
        ));
    }

    #[test]
    fn config_error_messages_are_descriptive() {
        let err = ConfigError::SimulationStarted;
        assert_eq!(err.to_string(), "initial capital can only be changed before the first settlement");

        let err = ConfigError::UnknownProduct { key: "marine".to_string() };
        assert_eq!(err.to_string(), "no product with key 'marine'");
    }
}
