use crate::product::Product;

/// Demand never falls below this fraction of `base_demand`, however badly
/// the product is priced.
pub const DEMAND_FLOOR: f64 = 0.1;

/// Monthly demand for a product, in persons.
///
/// Demand falls linearly as the total contract cost approaches the payout
/// ceiling (poor value for money) and bottoms out at 10% of base demand:
/// `floor(base_demand × max(0.1, 2.0 − 3 × cost/ceiling))`.
///
/// Pure function. Assumes `max_compensation > 0` — enforced at
/// configuration time, not here.
pub fn calculate_demand(product: &Product) -> u32 {
    let ratio = product.total_contract_cost() / product.max_compensation;
    let multiplier = (2.0 - ratio * 3.0).max(DEMAND_FLOOR);
    (product.base_demand as f64 * multiplier) as u32
}
