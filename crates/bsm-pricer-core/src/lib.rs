//! Black-Scholes-Merton pricing for European options.
//!
//! Pure functions over an [`OptionContract`]: [`price`], analytic [`greeks`]
//! and [`implied_volatility`]. The `analysis` feature adds the
//! [`ComputationOutput`] envelope API used by the CLI.

pub mod contract;
pub mod error;
pub mod greeks;
pub mod implied_vol;
pub mod normal;
pub mod pricing;
pub mod time_value;
pub mod types;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use contract::{Moneyness, OptionContract, OptionType};
pub use error::PricingError;
pub use greeks::{greeks, Greeks, GreeksConvention};
pub use implied_vol::{implied_volatility, ImpliedVolConfig, ImpliedVolInput, ImpliedVolResult};
pub use pricing::{d1_d2, price};
pub use time_value::DayCount;
pub use types::*;

/// Standard result type for all pricing operations
pub type PricingResult<T> = Result<T, PricingError>;
