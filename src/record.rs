use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::Month;

/// Per-product slice of a month record, copied out of the product's
/// statistics at settlement time. Covers every product, active or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub key: String,
    pub name: String,
    pub income: f64,
    pub sold: u32,
    pub cases: u32,
    pub payouts: f64,
    /// Book size at settlement time.
    pub active_policies: u32,
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        ProductRecord {
            key: product.key.clone(),
            name: product.name.clone(),
            income: product.income_this_month,
            sold: product.sold_this_month,
            cases: product.cases_this_month,
            payouts: product.payouts_this_month,
            active_policies: product.active_policies,
        }
    }
}

/// Immutable snapshot of one settled month — the only artifact the
/// rendering collaborator consumes. One record per line when streamed as
/// NDJSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    pub month: Month,
    pub capital_before: f64,
    pub capital_after: f64,
    pub capital_change: f64,
    pub tax: f64,
    pub total_income: f64,
    pub total_payouts: f64,
    /// True from the month the company is ruined onward; such a record is
    /// always the last one in a history.
    pub insolvent: bool,
    pub products: Vec<ProductRecord>,
}
