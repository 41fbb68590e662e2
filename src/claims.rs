use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::company::Company;

/// Hard cap on claim events per product per month.
pub const MAX_CASES_PER_MONTH: u32 = 25;
/// One potential claim event per this many active policies.
pub const POLICIES_PER_CASE: u32 = 4;
/// Damage severity coefficient bounds, as a fraction of `max_compensation`.
pub const SEVERITY_MIN: f64 = 0.1;
pub const SEVERITY_MAX: f64 = 1.0;

/// Per-product claims outcome for one month. Products with an empty book
/// generate no outcome at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductClaims {
    pub key: String,
    pub cases: u32,
    pub payout: f64,
}

/// Settle one month of claims across every product with a non-empty book.
///
/// The claim count scales with book size (one potential case per 4 active
/// policies), is capped at 25, and is at least 1 whenever any policy
/// exists. Each case draws a severity in [0.1, 1.0] against the product's
/// compensation ceiling; a case pays out only if the raw amount strictly
/// exceeds the franchise — sub-threshold cases are filed but reimburse
/// nothing.
///
/// Capital is NOT touched here: the ledger compares the returned total
/// against capital and decides between deduction and insolvency.
pub fn settle_claims(company: &mut Company, rng: &mut impl Rng) -> (f64, Vec<ProductClaims>) {
    let severity =
        Uniform::new_inclusive(SEVERITY_MIN, SEVERITY_MAX).expect("invalid severity bounds");

    let mut total_payouts = 0.0;
    let mut outcomes = Vec::new();

    for product in &mut company.products {
        if product.active_policies == 0 {
            continue;
        }

        let cap = (product.active_policies / POLICIES_PER_CASE)
            .min(MAX_CASES_PER_MONTH)
            .max(1);
        let cases = rng.random_range(1..=cap);
        product.cases_this_month = cases;

        let mut payout = 0.0;
        for _ in 0..cases {
            let claim = product.max_compensation * severity.sample(rng);
            if claim > product.franchise {
                payout += claim;
            }
        }

        product.payouts_this_month = payout;
        total_payouts += payout;
        outcomes.push(ProductClaims { key: product.key.clone(), cases, payout });
    }

    (total_payouts, outcomes)
}
