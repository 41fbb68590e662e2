use rand::Rng;

use crate::company::Company;
use crate::demand;

/// Uniform perturbation applied to each product's demand estimate, in
/// persons. Drawn inclusively from `[-DEMAND_NOISE, +DEMAND_NOISE]`.
pub const DEMAND_NOISE: i64 = 10;

/// Per-product sales outcome for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSales {
    pub key: String,
    pub sold: u32,
}

/// Sell one month of policies across every product.
///
/// Per product: demand estimate, ± noise, clamped at zero; units sold grow
/// the book permanently and the premium income lands on company capital
/// before the same month's claims are settled.
///
/// Returns the total premium income and the per-product unit counts.
pub fn sell_policies(company: &mut Company, rng: &mut impl Rng) -> (f64, Vec<ProductSales>) {
    let mut total_income = 0.0;
    let mut sales = Vec::with_capacity(company.products.len());

    for product in &mut company.products {
        let estimate = demand::calculate_demand(product) as i64;
        let noise = rng.random_range(-DEMAND_NOISE..=DEMAND_NOISE);
        let sold = (estimate + noise).max(0) as u32;

        let income = sold as f64 * product.monthly_premium;
        product.active_policies += sold;
        product.sold_this_month = sold;
        product.income_this_month = income;
        total_income += income;
        sales.push(ProductSales { key: product.key.clone(), sold });
    }

    company.capital += total_income;
    (total_income, sales)
}
