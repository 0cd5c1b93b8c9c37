//! Black-Scholes-Merton European option pricer.
//!
//! Boundary policy is explicit: an expired contract (T = 0) prices at its
//! intrinsic value and a zero-volatility contract prices at its discounted
//! forward payoff. d1/d2 are only ever evaluated for σ·√T > 0.

use crate::contract::{OptionContract, OptionType};
use crate::normal;
use crate::PricingResult;

/// Quantities shared by the pricer and the Greeks for one contract.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BsParams {
    pub d1: f64,
    pub d2: f64,
    pub sqrt_t: f64,
    pub exp_neg_qt: f64,
    pub exp_neg_rt: f64,
}

/// `None` when σ·√T is zero or subnormal, where d1/d2 are undefined or
/// lose all precision. This covers T = 0, σ = 0 and products that underflow.
pub(crate) fn compute_bs_params(c: &OptionContract) -> Option<BsParams> {
    let t = c.time_to_expiry;
    let sigma = c.volatility;
    if t <= 0.0 || sigma <= 0.0 {
        return None;
    }
    let sqrt_t = t.sqrt();
    let sigma_sqrt_t = sigma * sqrt_t;
    if !sigma_sqrt_t.is_normal() {
        return None;
    }
    let d1 = ((c.spot / c.strike).ln()
        + (c.risk_free_rate - c.dividend_yield + 0.5 * sigma * sigma) * t)
        / sigma_sqrt_t;
    let d2 = d1 - sigma_sqrt_t;
    Some(BsParams {
        d1,
        d2,
        sqrt_t,
        exp_neg_qt: c.dividend_discount(),
        exp_neg_rt: c.rate_discount(),
    })
}

fn closed_form(c: &OptionContract, p: &BsParams) -> f64 {
    let s = c.spot;
    let k = c.strike;
    match c.option_type {
        OptionType::Call => {
            s * p.exp_neg_qt * normal::cdf(p.d1) - k * p.exp_neg_rt * normal::cdf(p.d2)
        }
        OptionType::Put => {
            k * p.exp_neg_rt * normal::cdf(-p.d2) - s * p.exp_neg_qt * normal::cdf(-p.d1)
        }
    }
}

/// Price of a contract that has already passed validation.
pub(crate) fn price_validated(c: &OptionContract) -> f64 {
    if c.time_to_expiry <= 0.0 {
        return c.intrinsic_value();
    }
    match compute_bs_params(c) {
        Some(params) => closed_form(c, &params).max(0.0),
        None => c.forward_intrinsic_value(),
    }
}

/// Theoretical Black-Scholes-Merton price.
///
/// # Errors
/// [`crate::PricingError::InvalidInput`] if S ≤ 0, K ≤ 0, T < 0, σ < 0 or any
/// field is non-finite. Validation happens before any arithmetic.
pub fn price(contract: &OptionContract) -> PricingResult<f64> {
    contract.validate()?;
    Ok(price_validated(contract))
}

/// Standardized moneyness terms (d1, d2), or `None` at the T = 0 / σ = 0
/// boundary.
pub fn d1_d2(contract: &OptionContract) -> PricingResult<Option<(f64, f64)>> {
    contract.validate()?;
    Ok(compute_bs_params(contract).map(|p| (p.d1, p.d2)))
}
