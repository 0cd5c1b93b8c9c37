use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::contract::{Moneyness, OptionContract, OptionType};
use crate::greeks::{greeks, Greeks, GreeksConvention};
use crate::implied_vol::{implied_volatility, ImpliedVolConfig, ImpliedVolInput};
use crate::pricing::{compute_bs_params, d1_d2, price};
use crate::types::*;
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionInput {
    #[serde(flatten)]
    pub contract: OptionContract,
    #[serde(default)]
    pub greeks_convention: GreeksConvention,
}

impl From<OptionContract> for OptionInput {
    fn from(contract: OptionContract) -> Self {
        Self {
            contract,
            greeks_convention: GreeksConvention::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionOutput {
    pub price: f64,
    pub intrinsic_value: f64,
    pub time_value: f64,
    pub greeks: Greeks,
    pub greeks_convention: GreeksConvention,
    /// Price of the opposite option type implied by put-call parity.
    pub put_call_parity_price: f64,
    pub moneyness: Moneyness,
    pub breakeven: f64,
    pub d1: Option<f64>,
    pub d2: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpliedVolRequest {
    #[serde(flatten)]
    pub quote: ImpliedVolInput,
    #[serde(default)]
    pub config: ImpliedVolConfig,
    #[serde(default)]
    pub greeks_convention: GreeksConvention,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpliedVolOutput {
    pub volatility: f64,
    pub iterations: u32,
    pub converged: bool,
    pub residual: f64,
    /// Model price at `volatility`.
    pub model_price: f64,
    pub no_arbitrage_lower: f64,
    pub no_arbitrage_upper: f64,
    pub greeks: Greeks,
}

/// One line of a batch run. Failed rows carry `error` and no figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRow {
    pub index: usize,
    pub option_type: OptionType,
    pub spot: f64,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub volatility: f64,
    pub price: Option<f64>,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub vega: Option<f64>,
    pub theta: Option<f64>,
    pub rho: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub results: Vec<BatchRow>,
    pub priced: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parity_counterpart(c: &OptionContract, premium: f64) -> f64 {
    let s_adj = c.spot * c.dividend_discount();
    let k_adj = c.strike * c.rate_discount();
    match c.option_type {
        // P = C − S·e^(−qT) + K·e^(−rT)
        OptionType::Call => premium - s_adj + k_adj,
        // C = P + S·e^(−qT) − K·e^(−rT)
        OptionType::Put => premium + s_adj - k_adj,
    }
}

fn boundary_warnings(c: &OptionContract) -> Vec<String> {
    let mut warnings = Vec::new();
    if c.time_to_expiry <= 0.0 {
        warnings.push("Contract has expired: priced at intrinsic value".into());
    } else if c.volatility <= 0.0 {
        warnings.push("Zero volatility: priced at the discounted forward payoff".into());
    } else if compute_bs_params(c).is_none() {
        warnings.push(format!(
            "sigma*sqrt(T) underflows for sigma = {}: priced at the discounted forward payoff",
            c.volatility
        ));
    }
    warnings
}

fn methodology_for(c: &OptionContract) -> &'static str {
    if c.time_to_expiry <= 0.0 {
        "Intrinsic value at expiry"
    } else if compute_bs_params(c).is_none() {
        "Deterministic forward payoff (zero volatility)"
    } else {
        "Black-Scholes-Merton (closed-form)"
    }
}

// ---------------------------------------------------------------------------
// Public API: price_option
// ---------------------------------------------------------------------------

/// Price one contract with Greeks, parity cross-check and moneyness.
pub fn price_option(input: &OptionInput) -> PricingResult<ComputationOutput<OptionOutput>> {
    let start = Instant::now();
    let c = &input.contract;

    let premium = price(c)?;
    let raw = greeks(c)?;
    let d = d1_d2(c)?;

    let intrinsic = c.intrinsic_value();
    let output = OptionOutput {
        price: premium,
        intrinsic_value: intrinsic,
        time_value: premium - intrinsic,
        greeks: raw.in_convention(input.greeks_convention),
        greeks_convention: input.greeks_convention,
        put_call_parity_price: parity_counterpart(c, premium),
        moneyness: c.moneyness(),
        breakeven: c.breakeven(premium),
        d1: d.map(|(d1, _)| d1),
        d2: d.map(|(_, d2)| d2),
    };

    let methodology = methodology_for(c);
    let assumptions = serde_json::json!({
        "model": methodology,
        "exercise_style": "European",
        "risk_free_rate": c.risk_free_rate,
        "volatility": c.volatility,
        "dividend_yield": c.dividend_yield,
        "greeks_convention": input.greeks_convention,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &assumptions,
        boundary_warnings(c),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Public API: solve_implied_volatility
// ---------------------------------------------------------------------------

/// Solve for implied volatility and report Greeks at the solution.
///
/// A solve that runs out of iterations is returned with a warning.
pub fn solve_implied_volatility(
    request: &ImpliedVolRequest,
) -> PricingResult<ComputationOutput<ImpliedVolOutput>> {
    let start = Instant::now();
    let quote = &request.quote;
    let config = &request.config;

    let solved = implied_volatility(quote, config)?;
    let contract = quote.to_contract(solved.volatility);
    let (lower, upper) = quote.no_arbitrage_bounds();

    let output = ImpliedVolOutput {
        volatility: solved.volatility,
        iterations: solved.iterations,
        converged: solved.converged,
        residual: solved.residual,
        model_price: price(&contract)?,
        no_arbitrage_lower: lower,
        no_arbitrage_upper: upper,
        greeks: greeks(&contract)?.in_convention(request.greeks_convention),
    };

    let mut warnings = Vec::new();
    if !solved.converged {
        warnings.push(format!(
            "Did not converge within {} iterations; best estimate has price error {:.3e}",
            solved.iterations, solved.residual
        ));
    }

    let assumptions = serde_json::json!({
        "model": "Black-Scholes-Merton",
        "solver": "Newton-Raphson with bisection fallback",
        "initial_guess": config.initial_guess,
        "tolerance": config.tolerance,
        "max_iterations": config.max_iterations,
        "volatility_bounds": [config.lower_bound, config.upper_bound],
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Implied volatility (safeguarded Newton-Raphson)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Public API: price_batch
// ---------------------------------------------------------------------------

fn batch_row(index: usize, input: &OptionInput) -> BatchRow {
    let c = &input.contract;
    let mut row = BatchRow {
        index,
        option_type: c.option_type,
        spot: c.spot,
        strike: c.strike,
        time_to_expiry: c.time_to_expiry,
        volatility: c.volatility,
        price: None,
        delta: None,
        gamma: None,
        vega: None,
        theta: None,
        rho: None,
        error: None,
    };
    match price(c).and_then(|p| greeks(c).map(|g| (p, g))) {
        Ok((p, g)) => {
            let g = g.in_convention(input.greeks_convention);
            row.price = Some(p);
            row.delta = Some(g.delta);
            row.gamma = Some(g.gamma);
            row.vega = Some(g.vega);
            row.theta = Some(g.theta);
            row.rho = Some(g.rho);
        }
        Err(e) => row.error = Some(e.to_string()),
    }
    row
}

/// Price every contract independently. Invalid contracts become error rows.
pub fn price_batch(inputs: &[OptionInput]) -> ComputationOutput<BatchOutput> {
    let start = Instant::now();

    let results: Vec<BatchRow> = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| batch_row(i, input))
        .collect();
    let failed = results.iter().filter(|r| r.error.is_some()).count();

    let mut warnings = Vec::new();
    if failed > 0 {
        warnings.push(format!("{failed} of {} contracts failed validation", results.len()));
    }

    let output = BatchOutput {
        priced: results.len() - failed,
        failed,
        results,
    };
    let assumptions = serde_json::json!({
        "model": "Black-Scholes-Merton (closed-form)",
        "contracts": inputs.len(),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Batch Black-Scholes-Merton pricing",
        &assumptions,
        warnings,
        elapsed,
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use pretty_assertions::assert_eq;

    fn atm_call() -> OptionContract {
        OptionContract::new(100.0, 100.0, 1.0, 0.05, 0.20, OptionType::Call)
    }

    #[test]
    fn test_underflowing_vol_warns_and_stays_finite() {
        let c = atm_call().with_time_to_expiry(0.25).with_volatility(5e-324);
        let out = price_option(&c.into()).unwrap();
        let r = &out.result;
        assert_eq!(r.d1, None);
        assert!(r.greeks.gamma.is_finite() && r.greeks.delta.is_finite());
        assert_eq!(r.price, c.forward_intrinsic_value());
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("underflows"));
    }

    #[test]
    fn test_price_option_envelope() {
        let out = price_option(&atm_call().into()).unwrap();
        let r = &out.result;
        assert!((r.price - 10.450_583_572_185_565).abs() < 1e-9);
        assert_eq!(r.intrinsic_value, 0.0);
        assert!((r.time_value - r.price).abs() < 1e-15);
        assert!((r.put_call_parity_price - 5.573_526_022_256_971).abs() < 1e-9);
        assert_eq!(r.moneyness, Moneyness::AtTheMoney);
        assert!((r.breakeven - (100.0 + r.price)).abs() < 1e-12);
        assert!((r.d1.unwrap() - 0.35).abs() < 1e-12);
        assert!(out.warnings.is_empty());
        assert_eq!(out.methodology, "Black-Scholes-Merton (closed-form)");
    }

    #[test]
    fn test_price_option_market_convention() {
        let input = OptionInput {
            contract: atm_call(),
            greeks_convention: GreeksConvention::Market,
        };
        let out = price_option(&input).unwrap();
        assert!((out.result.greeks.vega - 0.375_240_346_916_937_9).abs() < 1e-9);
        assert_eq!(out.assumptions["greeks_convention"], "Market");
    }

    #[test]
    fn test_expired_contract_warns() {
        let c = atm_call().with_strike(90.0).with_time_to_expiry(0.0);
        let out = price_option(&c.into()).unwrap();
        assert_eq!(out.result.price, 10.0);
        assert_eq!(out.result.d1, None);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.methodology, "Intrinsic value at expiry");
    }

    #[test]
    fn test_price_option_rejects_invalid() {
        let err = price_option(&atm_call().with_spot(-1.0).into()).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput { .. }));
    }

    #[test]
    fn test_option_input_flattened_json() {
        let json = r#"{
            "spot": 100.0, "strike": 105.0, "time_to_expiry": 0.5,
            "risk_free_rate": 0.04, "volatility": 0.3, "option_type": "put",
            "greeks_convention": "market"
        }"#;
        let input: OptionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.contract.option_type, OptionType::Put);
        assert_eq!(input.greeks_convention, GreeksConvention::Market);
        assert_eq!(input.contract.dividend_yield, 0.0);
    }

    #[test]
    fn test_solve_implied_volatility_envelope() {
        let request = ImpliedVolRequest {
            quote: ImpliedVolInput::new(100.0, 100.0, 1.0, 0.05, OptionType::Call, 10.450_583_572_185_565),
            config: ImpliedVolConfig::default(),
            greeks_convention: GreeksConvention::Raw,
        };
        let out = solve_implied_volatility(&request).unwrap();
        assert!(out.result.converged);
        assert!((out.result.volatility - 0.2).abs() < 1e-5);
        assert!((out.result.model_price - 10.450_583_572_185_565).abs() < 1e-6);
        assert!((out.result.greeks.delta - 0.636_830_651_175_619).abs() < 1e-5);
        assert!(out.warnings.is_empty());
        assert_eq!(out.assumptions["max_iterations"], 100);
    }

    #[test]
    fn test_non_converged_solve_is_a_warning() {
        let request = ImpliedVolRequest {
            quote: ImpliedVolInput::new(100.0, 100.0, 1.0, 0.05, OptionType::Call, 10.450_583_572_185_565),
            config: ImpliedVolConfig {
                max_iterations: 1,
                ..Default::default()
            },
            greeks_convention: GreeksConvention::Raw,
        };
        let out = solve_implied_volatility(&request).unwrap();
        assert!(!out.result.converged);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("Did not converge"));
    }

    #[test]
    fn test_implied_vol_request_json_defaults() {
        let json = r#"{
            "spot": 100.0, "strike": 100.0, "time_to_expiry": 1.0,
            "risk_free_rate": 0.05, "option_type": "call", "market_price": 10.45,
            "config": { "tolerance": 1e-8 }
        }"#;
        let request: ImpliedVolRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.config.tolerance, 1e-8);
        assert_eq!(request.config.max_iterations, 100);
        assert_eq!(request.quote.market_price, 10.45);
    }

    #[test]
    fn test_batch_keeps_going_past_bad_rows() {
        let inputs: Vec<OptionInput> = vec![
            atm_call().into(),
            atm_call().with_strike(0.0).into(),
            atm_call().with_option_type(OptionType::Put).into(),
        ];
        let out = price_batch(&inputs);
        let r = &out.result;
        assert_eq!(r.results.len(), 3);
        assert_eq!(r.priced, 2);
        assert_eq!(r.failed, 1);
        assert!(r.results[0].price.is_some());
        assert!(r.results[1].price.is_none());
        assert!(r.results[1].error.as_deref().unwrap().contains("strike"));
        assert!((r.results[2].price.unwrap() - 5.573_526_022_256_971).abs() < 1e-9);
        assert_eq!(r.results[2].index, 2);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let out = price_batch(&[]);
        assert!(out.result.results.is_empty());
        assert_eq!(out.result.priced, 0);
        assert!(out.warnings.is_empty());
    }
}
