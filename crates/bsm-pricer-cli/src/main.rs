mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;

use commands::batch::BatchArgs;
use commands::implied_vol::ImpliedVolArgs;
use commands::pricing::{GreeksArgs, PriceArgs};
use logging::LogFormat;
use output::OutputFormat;

/// European option pricing under Black-Scholes-Merton
#[derive(Parser)]
#[command(
    name = "bsm",
    version,
    about = "European option pricing under Black-Scholes-Merton",
    long_about = "Prices European calls and puts with a continuous dividend yield, \
                  reports analytic Greeks, and solves for implied volatility from a \
                  market premium. Inputs come from flags, JSON/YAML files, CSV \
                  batches or piped stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    /// Diagnostic log format on stderr (pretty, json, compact)
    #[arg(long, default_value = "pretty", global = true)]
    log_format: LogFormat,

    /// Show solver diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a European option with Greeks and parity check
    Price(PriceArgs),
    /// Analytic Greeks for a European option
    Greeks(GreeksArgs),
    /// Solve for implied volatility from a market premium
    ImpliedVol(ImpliedVolArgs),
    /// Price many contracts from a CSV or JSON file
    Batch(BatchArgs),
    /// Print version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.log_format, cli.verbose) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow(), e);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Price(args) => commands::pricing::run_price(args),
        Commands::Greeks(args) => commands::pricing::run_greeks(args),
        Commands::ImpliedVol(args) => commands::implied_vol::run_implied_vol(args),
        Commands::Batch(args) => commands::batch::run_batch(args),
        Commands::Version => {
            println!("bsm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
