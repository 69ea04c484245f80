//! Total cost of renting over the holding period. Serves as the
//! comparison baseline an ownership outcome is measured against.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

use crate::error::AnalyzerError;
use crate::types::{with_metadata, ComputationOutput, CostBreakdown, Money, Rate};
use crate::AnalyzerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Monthly cost with its own annual escalation rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EscalatingCost {
    pub monthly: Money,
    #[serde(default)]
    pub annual_increase: Rate,
}

/// Rental cost components; each escalates independently
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentingInput {
    pub rent: EscalatingCost,
    #[serde(default)]
    pub water: Option<EscalatingCost>,
    #[serde(default)]
    pub utilities: Option<EscalatingCost>,
    #[serde(default)]
    pub parking: Option<EscalatingCost>,
}

/// Period totals per component; items sum to `total`
pub type RentingCosts = CostBreakdown;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project the total cost of renting over the holding period.
pub fn calculate_renting_costs(
    input: &RentingInput,
    years_to_sell: u32,
) -> AnalyzerResult<ComputationOutput<RentingCosts>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let costs = compute_renting_costs(input, years_to_sell)?;

    let assumptions = json!({
        "years_to_sell": years_to_sell,
        "input": input,
    });

    Ok(with_metadata(
        "Renting Cost Projection (Escalated Components)",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        costs,
    ))
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

pub(crate) fn compute_renting_costs(
    input: &RentingInput,
    years_to_sell: u32,
) -> AnalyzerResult<RentingCosts> {
    if input.rent.monthly <= Decimal::ZERO {
        return Err(AnalyzerError::InvalidInput {
            field: "rent.monthly".into(),
            reason: "Monthly rent must be positive".into(),
        });
    }
    if years_to_sell == 0 {
        return Err(AnalyzerError::InvalidInput {
            field: "years_to_sell".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }

    let mut breakdown = CostBreakdown::new();
    breakdown.add("rent", escalated_total(&input.rent, years_to_sell)?);

    let optional = [
        ("water", input.water),
        ("utilities", input.utilities),
        ("parking", input.parking),
    ];
    for (item, component) in optional {
        if let Some(component) = component {
            breakdown.add(item, escalated_total(&component, years_to_sell)?);
        }
    }

    Ok(breakdown)
}

/// Sum of `monthly * 12 * (1 + increase)^year` over the holding years.
fn escalated_total(cost: &EscalatingCost, years: u32) -> AnalyzerResult<Money> {
    let factor = Decimal::ONE + cost.annual_increase;
    let mut year_cost = cost.monthly * dec!(12);
    let mut total = Decimal::ZERO;

    for _ in 0..years {
        total += year_cost;
        year_cost = year_cost.checked_mul(factor).ok_or_else(|| {
            AnalyzerError::InvalidInput {
                field: "annual_increase".into(),
                reason: "Escalated cost overflows decimal range".into(),
            }
        })?;
    }

    Ok(total)
}
