//! Implied volatility by safeguarded Newton-Raphson.
//!
//! Each iteration takes a Newton step on σ using the analytic vega. A bracket
//! [lo, hi] that always contains the root is kept alongside; whenever vega is
//! too small or the Newton step leaves the bracket, the solver falls back to a
//! bisection step. This keeps deep in/out-of-the-money quotes from diverging.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, warn};

use crate::contract::{validate_finite, validate_positive, OptionContract, OptionType};
use crate::error::PricingError;
use crate::greeks::vega_validated;
use crate::pricing::price_validated;
use crate::PricingResult;

/// Below this vega a Newton step is not attempted.
const MIN_VEGA: f64 = 1e-12;

/// Used when no usable analytic starting point exists.
const FALLBACK_GUESS: f64 = 0.2;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// A contract without volatility plus the observed premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolInput {
    pub spot: f64,
    pub strike: f64,
    /// Years. Must be strictly positive.
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    pub option_type: OptionType,
    pub market_price: f64,
}

/// Solver settings. Every field has a default so partial configs deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpliedVolConfig {
    /// Starting σ. `None` uses the Brenner-Subrahmanyam approximation.
    pub initial_guess: Option<f64>,
    /// Absolute price error accepted as converged.
    ///
    /// The test is absolute, so a quote smaller than the tolerance (a deep
    /// out-of-the-money option) is accepted on the first evaluation at the
    /// starting σ, typically `lower_bound`. Tighten it for such quotes.
    pub tolerance: f64,
    pub max_iterations: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        Self {
            initial_guess: None,
            tolerance: 1e-6,
            max_iterations: 100,
            lower_bound: 1e-6,
            upper_bound: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolResult {
    /// Solved σ, or the best estimate seen when `converged` is false.
    pub volatility: f64,
    /// Pricing evaluations performed.
    pub iterations: u32,
    pub converged: bool,
    /// |model price − market price| at `volatility`.
    pub residual: f64,
}

impl ImpliedVolInput {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        option_type: OptionType,
        market_price: f64,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            dividend_yield: 0.0,
            option_type,
            market_price,
        }
    }

    pub fn with_dividend_yield(self, dividend_yield: f64) -> Self {
        Self {
            dividend_yield,
            ..self
        }
    }

    /// The full contract at volatility `sigma`.
    pub fn to_contract(&self, sigma: f64) -> OptionContract {
        OptionContract::new(
            self.spot,
            self.strike,
            self.time_to_expiry,
            self.risk_free_rate,
            sigma,
            self.option_type,
        )
        .with_dividend_yield(self.dividend_yield)
    }

    pub fn validate(&self) -> PricingResult<()> {
        validate_positive(self.spot, "spot")?;
        validate_positive(self.strike, "strike")?;
        validate_positive(self.time_to_expiry, "time_to_expiry")?;
        validate_finite(self.risk_free_rate, "risk_free_rate")?;
        validate_finite(self.dividend_yield, "dividend_yield")?;
        validate_positive(self.market_price, "market_price")?;
        self.to_contract(0.0).validate_scale()
    }

    /// (lower, upper) no-arbitrage premium range for a European option.
    ///
    /// Lower is the discounted forward payoff; upper is S·e^(−qT) for a call
    /// and K·e^(−rT) for a put.
    pub fn no_arbitrage_bounds(&self) -> (f64, f64) {
        let c = self.to_contract(0.0);
        let upper = match self.option_type {
            OptionType::Call => self.spot * c.dividend_discount(),
            OptionType::Put => self.strike * c.rate_discount(),
        };
        (c.forward_intrinsic_value(), upper)
    }
}

impl ImpliedVolConfig {
    pub fn validate(&self) -> PricingResult<()> {
        validate_positive(self.tolerance, "tolerance")?;
        if self.max_iterations == 0 {
            return Err(PricingError::invalid(
                "max_iterations",
                "must be at least 1",
            ));
        }
        validate_positive(self.lower_bound, "lower_bound")?;
        validate_positive(self.upper_bound, "upper_bound")?;
        if self.lower_bound >= self.upper_bound {
            return Err(PricingError::invalid(
                "upper_bound",
                format!(
                    "must exceed lower_bound ({} >= {})",
                    self.lower_bound, self.upper_bound
                ),
            ));
        }
        if let Some(guess) = self.initial_guess {
            validate_finite(guess, "initial_guess")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Brenner-Subrahmanyam: σ ≈ √(2π/T)·(time value)/(S·e^(−qT)), clamped.
fn starting_volatility(input: &ImpliedVolInput, config: &ImpliedVolConfig, floor: f64) -> f64 {
    let guess = config.initial_guess.unwrap_or_else(|| {
        let scale = input.spot * input.to_contract(0.0).dividend_discount();
        let time_value = input.market_price - floor;
        let approx = (2.0 * PI / input.time_to_expiry).sqrt() * time_value / scale;
        if approx.is_finite() && approx > 0.0 {
            approx
        } else {
            FALLBACK_GUESS
        }
    });
    guess.clamp(config.lower_bound, config.upper_bound)
}

/// Recover σ such that the model price matches `input.market_price`.
///
/// Running out of iterations is not an error: the result carries
/// `converged = false` and the σ with the smallest price error seen.
///
/// # Errors
/// [`PricingError::InvalidInput`] for a malformed input or config and
/// [`PricingError::OutOfBounds`] when the quote violates the no-arbitrage range.
pub fn implied_volatility(
    input: &ImpliedVolInput,
    config: &ImpliedVolConfig,
) -> PricingResult<ImpliedVolResult> {
    config.validate()?;
    input.validate()?;

    let target = input.market_price;
    let (lower, upper) = input.no_arbitrage_bounds();
    if target < lower || target > upper {
        return Err(PricingError::OutOfBounds {
            market_price: target,
            lower,
            upper,
        });
    }

    let mut lo = config.lower_bound;
    let mut hi = config.upper_bound;
    let mut sigma = starting_volatility(input, config, lower);

    let mut best_sigma = sigma;
    let mut best_residual = f64::INFINITY;
    let mut iterations: u32 = 0;

    while iterations < config.max_iterations {
        iterations += 1;
        let contract = input.to_contract(sigma);
        let diff = price_validated(&contract) - target;
        let residual = diff.abs();

        if residual < best_residual {
            best_residual = residual;
            best_sigma = sigma;
        }
        if residual < config.tolerance {
            return Ok(ImpliedVolResult {
                volatility: sigma,
                iterations,
                converged: true,
                residual,
            });
        }

        // Price is increasing in σ.
        if diff > 0.0 {
            hi = sigma;
        } else {
            lo = sigma;
        }
        if hi - lo <= f64::EPSILON * hi {
            break;
        }

        let vega = vega_validated(&contract);
        let newton = if vega > MIN_VEGA {
            sigma - diff / vega
        } else {
            f64::NAN
        };

        sigma = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            debug!(
                iteration = iterations,
                sigma,
                vega,
                lo,
                hi,
                "newton step rejected, bisecting"
            );
            0.5 * (lo + hi)
        };
    }

    warn!(
        iterations,
        volatility = best_sigma,
        residual = best_residual,
        "implied volatility did not converge"
    );

    Ok(ImpliedVolResult {
        volatility: best_sigma,
        iterations,
        converged: false,
        residual: best_residual,
    })
}
