use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PricingError;
use crate::time_value::{year_fraction, DayCount};
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Deserializes through [`FromStr`], so any casing and `c`/`p` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff if exercised now.
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }
}

impl FromStr for OptionType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(PricingError::invalid(
                "option_type",
                format!("expected 'call' or 'put', got '{other}'"),
            )),
        }
    }
}

impl TryFrom<String> for OptionType {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Moneyness {
    InTheMoney,
    AtTheMoney,
    OutOfTheMoney,
}

impl Moneyness {
    pub fn label(&self) -> &'static str {
        match self {
            Moneyness::InTheMoney => "ITM",
            Moneyness::AtTheMoney => "ATM",
            Moneyness::OutOfTheMoney => "OTM",
        }
    }
}

/// One European option pricing query.
///
/// `time_to_expiry` and `volatility` may be zero; those are handled by
/// explicit boundary formulas in the pricer and Greeks, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub spot: f64,
    pub strike: f64,
    /// Years.
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    pub option_type: OptionType,
}

impl OptionContract {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            volatility,
            dividend_yield: 0.0,
            option_type,
        }
    }

    /// Build a contract from valuation and expiry dates.
    ///
    /// An expiry on or before the valuation date gives `time_to_expiry = 0`
    /// (the contract prices at intrinsic value).
    #[allow(clippy::too_many_arguments)]
    pub fn from_dates(
        spot: f64,
        strike: f64,
        valuation_date: NaiveDate,
        expiry_date: NaiveDate,
        day_count: DayCount,
        risk_free_rate: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Self {
        let t = year_fraction(valuation_date, expiry_date, day_count).max(0.0);
        Self::new(spot, strike, t, risk_free_rate, volatility, option_type)
    }

    pub fn with_dividend_yield(self, dividend_yield: f64) -> Self {
        Self {
            dividend_yield,
            ..self
        }
    }

    pub fn with_volatility(self, volatility: f64) -> Self {
        Self { volatility, ..self }
    }

    pub fn with_spot(self, spot: f64) -> Self {
        Self { spot, ..self }
    }

    pub fn with_strike(self, strike: f64) -> Self {
        Self { strike, ..self }
    }

    pub fn with_time_to_expiry(self, time_to_expiry: f64) -> Self {
        Self {
            time_to_expiry,
            ..self
        }
    }

    pub fn with_risk_free_rate(self, risk_free_rate: f64) -> Self {
        Self {
            risk_free_rate,
            ..self
        }
    }

    pub fn with_option_type(self, option_type: OptionType) -> Self {
        Self {
            option_type,
            ..self
        }
    }

    /// Reject anything the closed-form formulas are undefined for.
    pub fn validate(&self) -> PricingResult<()> {
        validate_positive(self.spot, "spot")?;
        validate_positive(self.strike, "strike")?;
        validate_non_negative(self.time_to_expiry, "time_to_expiry")?;
        validate_non_negative(self.volatility, "volatility")?;
        validate_finite(self.risk_free_rate, "risk_free_rate")?;
        validate_finite(self.dividend_yield, "dividend_yield")?;
        self.validate_scale()
    }

    /// Reject rate, dividend or variance terms that overflow over the horizon.
    pub(crate) fn validate_scale(&self) -> PricingResult<()> {
        let t = self.time_to_expiry;
        if !self.rate_discount().is_finite() {
            return Err(PricingError::invalid(
                "risk_free_rate",
                format!("e^(-rT) overflows for r = {}, T = {t}", self.risk_free_rate),
            ));
        }
        if !self.dividend_discount().is_finite() {
            return Err(PricingError::invalid(
                "dividend_yield",
                format!("e^(-qT) overflows for q = {}, T = {t}", self.dividend_yield),
            ));
        }
        if t > 0.0 && !(self.volatility * self.volatility).is_finite() {
            return Err(PricingError::invalid(
                "volatility",
                format!("variance overflows for sigma = {}, T = {t}", self.volatility),
            ));
        }
        Ok(())
    }

    pub fn intrinsic_value(&self) -> f64 {
        self.option_type.intrinsic(self.spot, self.strike)
    }

    /// e^(−qT)
    pub fn dividend_discount(&self) -> f64 {
        (-self.dividend_yield * self.time_to_expiry).exp()
    }

    /// e^(−rT)
    pub fn rate_discount(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_expiry).exp()
    }

    /// Discounted forward payoff, the zero-volatility price.
    pub fn forward_intrinsic_value(&self) -> f64 {
        let s_adj = self.spot * self.dividend_discount();
        let k_adj = self.strike * self.rate_discount();
        self.option_type.intrinsic(s_adj, k_adj)
    }

    /// Spot-over-strike classification with a 1% ATM band.
    pub fn moneyness(&self) -> Moneyness {
        let ratio = self.spot / self.strike;
        let atm_lo = 0.99;
        let atm_hi = 1.01;
        match self.option_type {
            OptionType::Call => {
                if ratio > atm_hi {
                    Moneyness::InTheMoney
                } else if ratio < atm_lo {
                    Moneyness::OutOfTheMoney
                } else {
                    Moneyness::AtTheMoney
                }
            }
            OptionType::Put => {
                if ratio < atm_lo {
                    Moneyness::InTheMoney
                } else if ratio > atm_hi {
                    Moneyness::OutOfTheMoney
                } else {
                    Moneyness::AtTheMoney
                }
            }
        }
    }

    /// Underlying level at expiry where a long position recovers `premium`.
    pub fn breakeven(&self, premium: f64) -> f64 {
        match self.option_type {
            OptionType::Call => self.strike + premium,
            OptionType::Put => self.strike - premium,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub(crate) fn validate_positive(value: f64, field: &str) -> PricingResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricingError::invalid(
            field,
            format!("must be positive and finite, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_non_negative(value: f64, field: &str) -> PricingResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PricingError::invalid(
            field,
            format!("must be non-negative and finite, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_finite(value: f64, field: &str) -> PricingResult<()> {
    if !value.is_finite() {
        return Err(PricingError::invalid(
            field,
            format!("must be finite, got {value}"),
        ));
    }
    Ok(())
}
