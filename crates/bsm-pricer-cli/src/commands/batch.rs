use clap::Args;
use serde_json::Value;

use bsm_pricer_core::analysis::{self, OptionInput};
use bsm_pricer_core::OptionContract;

use super::{load_document, ConventionArg};
use crate::input;

/// Arguments for batch pricing
#[derive(Args)]
pub struct BatchArgs {
    /// CSV file with a header row, or a JSON/YAML array of contracts
    #[arg(long)]
    pub input: Option<String>,

    /// Units for vega, theta and rho on every row
    #[arg(long, value_enum)]
    pub greeks_convention: Option<ConventionArg>,
}

fn load_inputs(path: Option<&str>) -> Result<Vec<OptionInput>, Box<dyn std::error::Error>> {
    match path {
        Some(p) if input::file::is_csv(p) => {
            let contracts: Vec<OptionContract> = input::file::read_csv(p)?;
            Ok(contracts.into_iter().map(OptionInput::from).collect())
        }
        _ => load_document(path, "batch"),
    }
}

pub fn run_batch(args: BatchArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut inputs = load_inputs(args.input.as_deref())?;
    if let Some(convention) = args.greeks_convention {
        for input in &mut inputs {
            input.greeks_convention = convention.into();
        }
    }
    tracing::info!(contracts = inputs.len(), "pricing batch");
    let result = analysis::price_batch(&inputs);
    if result.result.failed > 0 {
        tracing::warn!(failed = result.result.failed, "batch contained invalid contracts");
    }
    Ok(serde_json::to_value(result)?)
}
