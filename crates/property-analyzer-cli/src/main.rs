mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::AnalyzeArgs;
use commands::costs::{PurchaseCostsArgs, RunningCostsArgs, SellingCostsArgs};
use commands::loan::LoanInterestArgs;
use commands::renting::RentingArgs;

/// Multi-year residential property investment analysis
#[derive(Parser)]
#[command(
    name = "pia",
    version,
    about = "Multi-year residential property investment analysis",
    long_about = "A CLI for projecting what buying, holding, and selling a residential \
                  property costs over a multi-year horizon, with decimal precision. \
                  Supports full buy-vs-rent comparisons across appreciation scenarios, \
                  standalone purchase/running/selling cost calculators, amortised loan \
                  interest, and a renting baseline."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Project buy scenarios against a renting baseline
    Analyze(AnalyzeArgs),
    /// Calculate one-off acquisition costs for a property
    PurchaseCosts(PurchaseCostsArgs),
    /// Calculate recurring ownership costs over the holding period
    RunningCosts(RunningCostsArgs),
    /// Calculate selling costs and capital gains tax at sale
    SellingCosts(SellingCostsArgs),
    /// Calculate mortgage interest accrued before sale
    LoanInterest(LoanInterestArgs),
    /// Project the total cost of renting over the holding period
    Renting(RentingArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::PurchaseCosts(args) => commands::costs::run_purchase_costs(args),
        Commands::RunningCosts(args) => commands::costs::run_running_costs(args),
        Commands::SellingCosts(args) => commands::costs::run_selling_costs(args),
        Commands::LoanInterest(args) => commands::loan::run_loan_interest(args),
        Commands::Renting(args) => commands::renting::run_renting(args),
        Commands::Version => {
            println!("pia {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
