use clap::Args;
use serde_json::Value;

use bsm_pricer_core::analysis::{self, ImpliedVolRequest};
use bsm_pricer_core::{ImpliedVolConfig, ImpliedVolInput, OptionType};

use super::{load_document, ConventionArg, ExpiryArgs};

/// Arguments for implied volatility
#[derive(Args)]
pub struct ImpliedVolArgs {
    /// Path to a JSON or YAML quote file
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

    /// Continuously compounded risk-free rate
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub rate: f64,

    /// Continuous dividend yield
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub dividend_yield: f64,

    /// call or put
    #[arg(long = "type", default_value = "call")]
    pub option_type: String,

    /// Observed option premium
    #[arg(long)]
    pub price: Option<f64>,

    /// Starting volatility (default: Brenner-Subrahmanyam estimate)
    #[arg(long)]
    pub initial_guess: Option<f64>,

    /// Price-space convergence tolerance
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Maximum pricing evaluations
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Lower volatility bound
    #[arg(long)]
    pub lower_bound: Option<f64>,

    /// Upper volatility bound
    #[arg(long)]
    pub upper_bound: Option<f64>,

    /// Units for the Greeks at the solved volatility
    #[arg(long, value_enum)]
    pub greeks_convention: Option<ConventionArg>,
}

impl ImpliedVolArgs {
    fn quote_from_flags(&self) -> Result<Option<ImpliedVolInput>, Box<dyn std::error::Error>> {
        let (Some(spot), Some(strike), Some(t), Some(price)) =
            (self.spot, self.strike, self.expiry.years(), self.price)
        else {
            return Ok(None);
        };
        let option_type: OptionType = self.option_type.parse()?;
        Ok(Some(
            ImpliedVolInput::new(spot, strike, t, self.rate, option_type, price)
                .with_dividend_yield(self.dividend_yield),
        ))
    }

    /// Flag overrides on top of whatever config the request carried.
    fn apply_overrides(&self, config: &mut ImpliedVolConfig) {
        if self.initial_guess.is_some() {
            config.initial_guess = self.initial_guess;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(lower) = self.lower_bound {
            config.lower_bound = lower;
        }
        if let Some(upper) = self.upper_bound {
            config.upper_bound = upper;
        }
    }

    pub fn to_request(&self) -> Result<ImpliedVolRequest, Box<dyn std::error::Error>> {
        let mut request = match self.quote_from_flags()? {
            Some(quote) if self.input.is_none() => ImpliedVolRequest {
                quote,
                config: ImpliedVolConfig::default(),
                greeks_convention: Default::default(),
            },
            _ => load_document(self.input.as_deref(), "implied volatility quote")?,
        };
        self.apply_overrides(&mut request.config);
        if let Some(convention) = self.greeks_convention {
            request.greeks_convention = convention.into();
        }
        Ok(request)
    }
}

pub fn run_implied_vol(args: ImpliedVolArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = args.to_request()?;
    tracing::debug!(
        quote = ?request.quote,
        config = ?request.config,
        "solving implied volatility"
    );
    let result = analysis::solve_implied_volatility(&request)?;
    Ok(serde_json::to_value(result)?)
}
