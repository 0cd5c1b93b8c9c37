//! Analytic Black-Scholes-Merton Greeks.
//!
//! Every sensitivity comes from the same d1/d2 and Φ/φ evaluations the pricer
//! uses. Nothing here bumps inputs and reprices.
//!
//! Units are raw: vega per 1.00 of volatility, theta per year (as ∂V/∂t, so a
//! decaying long option has negative theta), rho per 1.00 of rate. Use
//! [`Greeks::in_convention`] for per-vol-point / per-day display units.

use serde::{Deserialize, Serialize};

use crate::contract::{OptionContract, OptionType};
use crate::normal;
use crate::pricing::{compute_bs_params, BsParams};
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
}

/// Display units for reported Greeks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GreeksConvention {
    /// Vega per 1.00 vol, theta per year, rho per 1.00 rate.
    #[default]
    #[serde(alias = "raw")]
    Raw,
    /// Vega per vol point, theta per calendar day, rho per 1% rate move.
    #[serde(alias = "market")]
    Market,
}

impl Greeks {
    pub fn in_convention(&self, convention: GreeksConvention) -> Greeks {
        match convention {
            GreeksConvention::Raw => *self,
            GreeksConvention::Market => Greeks {
                delta: self.delta,
                gamma: self.gamma,
                vega: self.vega / 100.0,
                theta: self.theta / 365.0,
                rho: self.rho / 100.0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Black-Scholes internals
// ---------------------------------------------------------------------------

/// Raw vega S·e^(−qT)·φ(d1)·√T.
pub(crate) fn vega_from_params(spot: f64, p: &BsParams) -> f64 {
    spot * p.exp_neg_qt * normal::pdf(p.d1) * p.sqrt_t
}

fn compute_greeks(c: &OptionContract, p: &BsParams) -> Greeks {
    let s = c.spot;
    let k = c.strike;
    let r = c.risk_free_rate;
    let q = c.dividend_yield;
    let t = c.time_to_expiry;
    let sigma = c.volatility;

    let nd1 = normal::pdf(p.d1);
    let cdf_d1 = normal::cdf(p.d1);

    let delta = match c.option_type {
        OptionType::Call => p.exp_neg_qt * cdf_d1,
        OptionType::Put => p.exp_neg_qt * (cdf_d1 - 1.0),
    };

    let gamma = p.exp_neg_qt * nd1 / (s * sigma * p.sqrt_t);

    let vega = vega_from_params(s, p);

    let decay = -s * p.exp_neg_qt * nd1 * sigma / (2.0 * p.sqrt_t);
    let theta = match c.option_type {
        OptionType::Call => {
            decay - r * k * p.exp_neg_rt * normal::cdf(p.d2) + q * s * p.exp_neg_qt * cdf_d1
        }
        OptionType::Put => {
            decay + r * k * p.exp_neg_rt * normal::cdf(-p.d2)
                - q * s * p.exp_neg_qt * normal::cdf(-p.d1)
        }
    };

    let rho = match c.option_type {
        OptionType::Call => k * t * p.exp_neg_rt * normal::cdf(p.d2),
        OptionType::Put => -k * t * p.exp_neg_rt * normal::cdf(-p.d2),
    };

    Greeks {
        delta,
        gamma,
        vega,
        theta,
        rho,
    }
}

/// Limits at T = 0 or σ = 0. Gamma, vega and theta are reported as zero.
fn boundary_greeks(c: &OptionContract) -> Greeks {
    let (delta, rho) = if c.time_to_expiry <= 0.0 {
        let delta = match c.option_type {
            OptionType::Call if c.spot > c.strike => 1.0,
            OptionType::Put if c.spot < c.strike => -1.0,
            _ => 0.0,
        };
        (delta, 0.0)
    } else {
        let exp_neg_qt = c.dividend_discount();
        let exp_neg_rt = c.rate_discount();
        let s_adj = c.spot * exp_neg_qt;
        let k_adj = c.strike * exp_neg_rt;
        let kt = c.strike * c.time_to_expiry * exp_neg_rt;
        match c.option_type {
            OptionType::Call if s_adj > k_adj => (exp_neg_qt, kt),
            OptionType::Put if k_adj > s_adj => (-exp_neg_qt, -kt),
            _ => (0.0, 0.0),
        }
    };
    Greeks {
        delta,
        gamma: 0.0,
        vega: 0.0,
        theta: 0.0,
        rho,
    }
}

/// Analytic Greeks in raw units.
///
/// # Errors
/// Same as [`crate::pricing::price`].
pub fn greeks(contract: &OptionContract) -> PricingResult<Greeks> {
    contract.validate()?;
    Ok(match compute_bs_params(contract) {
        Some(params) => compute_greeks(contract, &params),
        None => boundary_greeks(contract),
    })
}

/// Raw vega of a validated contract; zero at the boundary.
pub(crate) fn vega_validated(contract: &OptionContract) -> f64 {
    compute_bs_params(contract)
        .map(|p| vega_from_params(contract.spot, &p))
        .unwrap_or(0.0)
}
