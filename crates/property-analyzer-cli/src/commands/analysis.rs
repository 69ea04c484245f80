use clap::Args;
use serde_json::Value;

use property_analyzer_core::analysis::{self, AnalysisRequest};
use property_analyzer_core::rates::StaticRateTable;

use crate::input;

/// Arguments for the full buy-vs-rent comparison
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to a JSON or YAML request file with the scenario settings,
    /// the properties under consideration, and an optional renting baseline
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: AnalysisRequest = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file> or stdin required for a full analysis".into());
    };

    let result = analysis::analyze(&request, &StaticRateTable)?;
    Ok(serde_json::to_value(result)?)
}
