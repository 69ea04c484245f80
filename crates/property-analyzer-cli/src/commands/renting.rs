use clap::Args;
use serde_json::Value;

use property_analyzer_core::renting::{self, RentingInput};

use crate::input;

/// Arguments for the renting baseline projection
#[derive(Args)]
pub struct RentingArgs {
    /// Path to a JSON or YAML file with the rental cost components
    #[arg(long)]
    pub input: Option<String>,

    /// Holding period in years
    #[arg(long, default_value = "10")]
    pub years: u32,
}

pub fn run_renting(args: RentingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let renting_input: RentingInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file> or stdin required for the renting baseline".into());
    };

    let result = renting::calculate_renting_costs(&renting_input, args.years)?;
    Ok(serde_json::to_value(result)?)
}
