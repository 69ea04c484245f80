//! Recurring ownership costs over the holding period.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::costs::rules::{self, RunningCostBasis};
use crate::rates::{RateContext, RateSource};
use crate::types::{
    with_metadata, ComputationOutput, Country, Money, PropertyInputs, PropertyType,
};
use crate::AnalyzerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Recurring costs over the years the property is actually held.
/// An under-construction property incurs nothing until completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningCosts {
    /// Annual costs times the effective years
    pub total: Money,
    /// Sum of the annual line items
    pub annual_total: Money,
    /// Cost per line item for one year of ownership
    pub annual_items: BTreeMap<String, Money>,
    /// Cost per line item over the effective years; sums to `total`
    pub period_items: BTreeMap<String, Money>,
    /// Holding years net of any construction delay
    pub effective_years: u32,
}

impl RunningCosts {
    fn zero(effective_years: u32) -> Self {
        Self {
            total: Decimal::ZERO,
            annual_total: Decimal::ZERO,
            annual_items: BTreeMap::new(),
            period_items: BTreeMap::new(),
            effective_years,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Calculate recurring ownership costs over the holding period.
pub fn calculate_running_costs(
    inputs: &PropertyInputs,
    source: &dyn RateSource,
    country: Country,
    city: &str,
    years_to_sell: u32,
) -> AnalyzerResult<ComputationOutput<RunningCosts>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let rates = RateContext::new(source, country, city);
    let costs = compute_running_costs(inputs, &rates, years_to_sell, &mut warnings);

    let assumptions = serde_json::json!({
        "country": country,
        "city": city,
        "years_to_sell": years_to_sell,
        "inputs": inputs,
    });
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Running Cost Projection (Annual Rule Table)",
        &assumptions,
        warnings,
        elapsed,
        costs,
    ))
}

pub(crate) fn compute_running_costs(
    inputs: &PropertyInputs,
    rates: &RateContext<'_>,
    years_to_sell: u32,
    warnings: &mut Vec<String>,
) -> RunningCosts {
    let completion_years = if inputs.property_type == PropertyType::UnderConstruction {
        inputs.construction_completion_years
    } else {
        0
    };
    let effective_years = years_to_sell.saturating_sub(completion_years);

    if inputs.price <= Decimal::ZERO || effective_years == 0 {
        return RunningCosts::zero(effective_years);
    }

    let mut annual_items = BTreeMap::new();
    let mut annual_total = Decimal::ZERO;

    for rule in rules::running_rules(rates.country()) {
        let rate = rates.scalar_or_zero(rule.rate_key, warnings);
        let annual = match rule.basis {
            RunningCostBasis::PriceFraction(fraction) => inputs.price * fraction * rate,
            RunningCostBasis::FixedMonthly => rate * dec!(12),
        };
        if let Some(note) = rule.proxy_note {
            if !warnings.iter().any(|w| w == note) {
                warnings.push(note.to_string());
            }
        }
        annual_items.insert(rule.line_item.to_string(), annual);
        annual_total += annual;
    }

    let years = Decimal::from(effective_years);
    let period_items: BTreeMap<String, Money> = annual_items
        .iter()
        .map(|(item, annual)| (item.clone(), *annual * years))
        .collect();

    RunningCosts {
        total: annual_total * years,
        annual_total,
        annual_items,
        period_items,
        effective_years,
    }
}
