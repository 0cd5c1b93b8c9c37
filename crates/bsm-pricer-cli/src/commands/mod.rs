pub mod batch;
pub mod implied_vol;
pub mod pricing;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;

use bsm_pricer_core::time_value::year_fraction;
use bsm_pricer_core::{DayCount, GreeksConvention};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DayCountArg {
    Act365Fixed,
    Act360,
    #[value(name = "act365.25")]
    Act365_25,
}

impl From<DayCountArg> for DayCount {
    fn from(arg: DayCountArg) -> Self {
        match arg {
            DayCountArg::Act365Fixed => DayCount::Act365Fixed,
            DayCountArg::Act360 => DayCount::Act360,
            DayCountArg::Act365_25 => DayCount::Act365_25,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConventionArg {
    /// Vega per 1.00 vol, theta per year, rho per 1.00 rate
    Raw,
    /// Vega per vol point, theta per day, rho per 1%
    Market,
}

impl From<ConventionArg> for GreeksConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::Raw => GreeksConvention::Raw,
            ConventionArg::Market => GreeksConvention::Market,
        }
    }
}

/// Time to expiry as years or as a pair of dates.
#[derive(Args, Debug, Clone)]
pub struct ExpiryArgs {
    /// Time to expiry in years
    #[arg(long, conflicts_with = "expiry_date")]
    pub expiry: Option<f64>,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub expiry_date: Option<NaiveDate>,

    /// Valuation date (YYYY-MM-DD), defaults to today
    #[arg(long, requires = "expiry_date")]
    pub valuation_date: Option<NaiveDate>,

    /// Day-count basis for date-based expiry
    #[arg(long, value_enum, default_value = "act365-fixed")]
    pub day_count: DayCountArg,
}

impl ExpiryArgs {
    /// Years to expiry, floored at zero for past expiry dates.
    pub fn years(&self) -> Option<f64> {
        if let Some(t) = self.expiry {
            return Some(t);
        }
        let expiry = self.expiry_date?;
        let valuation = self
            .valuation_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Some(year_fraction(valuation, expiry, self.day_count.into()).max(0.0))
    }
}

/// Load a typed document from `--input` or piped stdin.
pub fn load_document<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return input::file::read_structured(path);
    }
    match input::stdin::read_stdin()? {
        Some(doc) => Ok(doc),
        None => Err(format!(
            "{what}: pass the values as flags, --input <file.json|file.yaml>, or pipe JSON on stdin"
        )
        .into()),
    }
}
