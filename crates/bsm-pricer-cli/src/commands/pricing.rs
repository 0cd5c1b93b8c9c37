use clap::Args;
use serde_json::Value;

use bsm_pricer_core::analysis::{self, OptionInput};
use bsm_pricer_core::{OptionContract, OptionType};

use super::{load_document, ConventionArg, ExpiryArgs};

/// Contract definition shared by `price` and `greeks`.
#[derive(Args, Debug, Clone)]
pub struct ContractArgs {
    /// Path to a JSON or YAML contract file
    #[arg(long)]
    pub input: Option<String>,

    /// Spot price of the underlying
    #[arg(long)]
    pub spot: Option<f64>,

    /// Strike price
    #[arg(long)]
    pub strike: Option<f64>,

    #[command(flatten)]
    pub expiry: ExpiryArgs,

    /// Continuously compounded risk-free rate (0.05 = 5%)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub rate: f64,

    /// Annualised volatility (0.2 = 20%)
    #[arg(long)]
    pub vol: Option<f64>,

    /// Continuous dividend yield
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub dividend_yield: f64,

    /// call or put
    #[arg(long = "type", default_value = "call")]
    pub option_type: String,

    /// Units for vega, theta and rho (overrides the input file)
    #[arg(long, value_enum)]
    pub greeks_convention: Option<ConventionArg>,
}

impl ContractArgs {
    fn contract_from_flags(
        &self,
    ) -> Result<Option<OptionContract>, Box<dyn std::error::Error>> {
        let (Some(spot), Some(strike), Some(t), Some(vol)) =
            (self.spot, self.strike, self.expiry.years(), self.vol)
        else {
            return Ok(None);
        };
        let option_type: OptionType = self.option_type.parse()?;
        Ok(Some(
            OptionContract::new(spot, strike, t, self.rate, vol, option_type)
                .with_dividend_yield(self.dividend_yield),
        ))
    }

    pub fn to_input(&self) -> Result<OptionInput, Box<dyn std::error::Error>> {
        let mut input: OptionInput = match self.contract_from_flags()? {
            Some(contract) if self.input.is_none() => contract.into(),
            _ => load_document(self.input.as_deref(), "option contract")?,
        };
        if let Some(convention) = self.greeks_convention {
            input.greeks_convention = convention.into();
        }
        Ok(input)
    }
}

/// Arguments for option pricing
#[derive(Args)]
pub struct PriceArgs {
    #[command(flatten)]
    pub contract: ContractArgs,
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = args.contract.to_input()?;
    tracing::debug!(contract = ?input.contract, "pricing option");
    let result = analysis::price_option(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for Greeks
#[derive(Args)]
pub struct GreeksArgs {
    #[command(flatten)]
    pub contract: ContractArgs,
}

/// Same envelope as `price`, with the Greeks as the result.
pub fn run_greeks(args: GreeksArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = args.contract.to_input()?;
    let result = analysis::price_option(&input)?;
    let mut value = serde_json::to_value(result)?;
    if let Some(greeks) = value.get("result").and_then(|r| r.get("greeks")).cloned() {
        value["result"] = greeks;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::DayCountArg;
    use bsm_pricer_core::GreeksConvention;
    use pretty_assertions::assert_eq;

    fn flags() -> ContractArgs {
        ContractArgs {
            input: None,
            spot: Some(100.0),
            strike: Some(100.0),
            expiry: ExpiryArgs {
                expiry: Some(1.0),
                expiry_date: None,
                valuation_date: None,
                day_count: DayCountArg::Act365Fixed,
            },
            rate: 0.05,
            vol: Some(0.2),
            dividend_yield: 0.0,
            option_type: "put".into(),
            greeks_convention: Some(ConventionArg::Market),
        }
    }

    #[test]
    fn test_flags_build_contract() {
        let input = flags().to_input().unwrap();
        assert_eq!(input.contract.option_type, OptionType::Put);
        assert_eq!(input.contract.risk_free_rate, 0.05);
        assert_eq!(input.greeks_convention, GreeksConvention::Market);
    }

    #[test]
    fn test_bad_option_type_flag() {
        let args = ContractArgs {
            option_type: "straddle".into(),
            ..flags()
        };
        let err = args.to_input().unwrap_err();
        assert!(err.to_string().contains("option_type"));
    }

    #[test]
    fn test_run_price_envelope() {
        let value = run_price(PriceArgs { contract: flags() }).unwrap();
        let price = value["result"]["price"].as_f64().unwrap();
        assert!((price - 5.573_526_022_256_971).abs() < 1e-9);
    }

    #[test]
    fn test_run_greeks_lifts_greeks_into_result() {
        let value = run_greeks(GreeksArgs { contract: flags() }).unwrap();
        let vega = value["result"]["vega"].as_f64().unwrap();
        assert!((vega - 0.375_240_346_916_937_9).abs() < 1e-9);
        assert!(value["result"].get("price").is_none());
    }
}
