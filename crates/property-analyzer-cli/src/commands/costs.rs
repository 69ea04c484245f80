use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use property_analyzer_core::costs::purchase;
use property_analyzer_core::costs::running;
use property_analyzer_core::costs::selling::{self, SellingInput};
use property_analyzer_core::rates::StaticRateTable;
use property_analyzer_core::types::{Country, PropertyInputs};

use crate::input;

/// Arguments for the acquisition cost calculator
#[derive(Args)]
pub struct PurchaseCostsArgs {
    /// Market country: spain, denmark
    #[arg(long)]
    pub country: String,

    /// Market city the rate table is keyed on (e.g. barcelona)
    #[arg(long)]
    pub city: String,

    /// Path to a JSON or YAML file with the property inputs
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the recurring cost calculator
#[derive(Args)]
pub struct RunningCostsArgs {
    /// Market country: spain, denmark
    #[arg(long)]
    pub country: String,

    /// Market city the rate table is keyed on (e.g. barcelona)
    #[arg(long)]
    pub city: String,

    /// Holding period in years
    #[arg(long, default_value = "10")]
    pub years: u32,

    /// Path to a JSON or YAML file with the property inputs
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the selling cost calculator
#[derive(Args)]
pub struct SellingCostsArgs {
    /// Market country: spain, denmark
    #[arg(long)]
    pub country: String,

    /// Market city the rate table is keyed on (e.g. barcelona)
    #[arg(long)]
    pub city: String,

    /// Projected sale price
    #[arg(long)]
    pub sale_price: Option<Decimal>,

    /// Acquisition basis: price plus purchase costs plus renovations
    #[arg(long)]
    pub investment_cost: Option<Decimal>,

    /// Tax the gain under Spain's flat expatriate regime
    #[arg(long)]
    pub beckham_law: bool,

    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_purchase_costs(args: PurchaseCostsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let country = parse_country(&args.country)?;
    let inputs: PropertyInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file> or stdin required for purchase costs".into());
    };

    let result =
        purchase::calculate_purchase_costs(&inputs, &StaticRateTable, country, &args.city)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_running_costs(args: RunningCostsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let country = parse_country(&args.country)?;
    let inputs: PropertyInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file> or stdin required for running costs".into());
    };

    let result = running::calculate_running_costs(
        &inputs,
        &StaticRateTable,
        country,
        &args.city,
        args.years,
    )?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_selling_costs(args: SellingCostsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let country = parse_country(&args.country)?;
    let selling_input: SellingInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        SellingInput {
            sale_price: args
                .sale_price
                .ok_or("--sale-price is required (or provide --input)")?,
            total_investment_cost: args
                .investment_cost
                .ok_or("--investment-cost is required (or provide --input)")?,
            beckham_law_active: args.beckham_law,
        }
    };

    let result =
        selling::calculate_selling_costs(&selling_input, &StaticRateTable, country, &args.city)?;
    Ok(serde_json::to_value(result)?)
}

/// Parse the market country from its CLI spelling.
fn parse_country(raw: &str) -> Result<Country, Box<dyn std::error::Error>> {
    match raw.to_lowercase().as_str() {
        "spain" => Ok(Country::Spain),
        "denmark" => Ok(Country::Denmark),
        other => {
            Err(format!("Unknown country '{}'. Available countries: spain, denmark", other).into())
        }
    }
}
