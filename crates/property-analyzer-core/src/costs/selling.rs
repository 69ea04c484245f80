//! Disposal costs: agency fee, municipal charges, and capital gains tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::rates::{CapitalGainsRule, RateContext, RateSource};
use crate::tax::progressive_tax;
use crate::types::{with_metadata, ComputationOutput, CostBreakdown, Country, Money};
use crate::AnalyzerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Inputs for a standalone selling cost calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellingInput {
    /// Projected sale price
    pub sale_price: Money,
    /// Acquisition basis: price plus purchase costs plus renovations
    pub total_investment_cost: Money,
    /// Elects Spain's flat expatriate tax regime on the gain
    #[serde(default)]
    pub beckham_law_active: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Calculate the costs of selling a property in one market.
///
/// The gain basis is the full acquisition cost, so purchase taxes and
/// renovations reduce the taxable gain. Capital gains tax is charged only
/// on a positive gain; the agency fee and any fixed municipal charge apply
/// to every sale.
pub fn calculate_selling_costs(
    input: &SellingInput,
    source: &dyn RateSource,
    country: Country,
    city: &str,
) -> AnalyzerResult<ComputationOutput<CostBreakdown>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let rates = RateContext::new(source, country, city);
    let costs = compute_selling_costs(
        input.sale_price,
        input.total_investment_cost,
        input.beckham_law_active,
        &rates,
        &mut warnings,
    );

    let assumptions = serde_json::json!({
        "country": country,
        "city": city,
        "input": input,
    });
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Selling Cost Analysis (Agency, Municipal, Capital Gains)",
        &assumptions,
        warnings,
        elapsed,
        costs,
    ))
}

pub(crate) fn compute_selling_costs(
    sale_price: Money,
    total_investment_cost: Money,
    beckham_law_active: bool,
    rates: &RateContext<'_>,
    warnings: &mut Vec<String>,
) -> CostBreakdown {
    let mut costs = CostBreakdown::new();
    if sale_price <= Decimal::ZERO || total_investment_cost <= Decimal::ZERO {
        return costs;
    }

    let agency_fee = sale_price * rates.scalar_or_zero("selling_agency_fee_rate", warnings);
    costs.add("selling_agency_fee", agency_fee);

    // The municipal land-value charge falls due on every Spanish sale,
    // gain or loss
    if rates.country() == Country::Spain {
        let plusvalia = rates.scalar_or_zero("selling_plusvalia_municipal", warnings);
        costs.add("selling_plusvalia_municipal", plusvalia);
        push_once(
            warnings,
            "Spain selling costs use a placeholder for plusvalía and a simplified capital gains basis.",
        );
    }

    let gain = sale_price - total_investment_cost;
    if gain > Decimal::ZERO {
        costs.add(
            "capital_gains_tax",
            gains_tax(gain, beckham_law_active, rates, warnings),
        );
    }

    costs
}

// ---------------------------------------------------------------------------
// Capital gains
// ---------------------------------------------------------------------------

fn gains_tax(
    gain: Money,
    beckham_law_active: bool,
    rates: &RateContext<'_>,
    warnings: &mut Vec<String>,
) -> Money {
    if beckham_law_active {
        match rates.scalar("beckham_law_tax_rate") {
            Some(flat_rate) => {
                push_once(
                    warnings,
                    "Beckham law impact on capital gains needs verification.",
                );
                return gain * flat_rate;
            }
            None => push_once(
                warnings,
                "Beckham law election has no effect in this market; standard capital gains applied",
            ),
        }
    }

    match rates.capital_gains_rule(warnings) {
        CapitalGainsRule::Progressive(brackets) => progressive_tax(gain, &brackets),
        CapitalGainsRule::Flat(rate) => gain * rate,
        CapitalGainsRule::Exempt => {
            push_once(
                warnings,
                "Capital gains assumed exempt for an owner-occupied primary residence",
            );
            Decimal::ZERO
        }
    }
}

fn push_once(warnings: &mut Vec<String>, note: &str) {
    if !warnings.iter().any(|w| w == note) {
        warnings.push(note.to_string());
    }
}
