use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use serde_json::Value;

use property_analyzer_core::loan;
use property_analyzer_core::types::LoanDetails;

use crate::input;

/// Arguments for the loan interest calculator
#[derive(Args)]
pub struct LoanInterestArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Purchase price; when --principal is omitted the loan is assumed
    /// at 80% of it
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Annual interest rate (e.g. 0.035 for 3.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Full amortisation term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Years between purchase and sale
    #[arg(long)]
    pub holding_years: Option<u32>,

    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// File form of the request: the loan terms plus the holding period
#[derive(Debug, Deserialize)]
struct LoanInterestRequest {
    principal: Decimal,
    annual_interest_rate: Decimal,
    term_years: u32,
    holding_years: u32,
}

pub fn run_loan_interest(args: LoanInterestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanInterestRequest = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let principal = match (args.principal, args.price) {
            (Some(principal), _) => principal,
            (None, Some(price)) => price * dec!(0.80),
            (None, None) => {
                return Err("--principal or --price is required (or provide --input)".into())
            }
        };
        LoanInterestRequest {
            principal,
            annual_interest_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args
                .term_years
                .ok_or("--term-years is required (or provide --input)")?,
            holding_years: args
                .holding_years
                .ok_or("--holding-years is required (or provide --input)")?,
        }
    };

    let details = LoanDetails {
        principal: request.principal,
        annual_interest_rate: request.annual_interest_rate,
        term_years: request.term_years,
    };
    let result = loan::calculate_loan_interest(&details, request.holding_years)?;
    Ok(serde_json::to_value(result)?)
}
