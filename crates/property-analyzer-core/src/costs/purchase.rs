//! One-off acquisition costs: price, jurisdiction taxes and fees, and
//! renovations, split into the total investment and the year-zero outlay.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::costs::rules::{self, CostBasis};
use crate::error::AnalyzerError;
use crate::rates::{RateContext, RateSource};
use crate::types::{
    with_metadata, ComputationOutput, CostBreakdown, Country, Money, PropertyInputs, PropertyType,
    Rate,
};
use crate::AnalyzerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Acquisition costs for one property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseCosts {
    /// Full price plus all taxes, fees, and renovations
    pub total_investment_cost: Money,
    /// Cash due at year zero: the initial price fraction plus all
    /// up-front taxes, fees, and renovations
    pub initial_outlay_year0: Money,
    /// Line items; these sum to `total_investment_cost`
    pub items: BTreeMap<String, Money>,
    /// Price fraction still owed on later construction milestones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_construction_payments: Option<Money>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Calculate the acquisition costs of a property in one market.
///
/// Taxes and fees are selected by the jurisdiction's rule table and charged
/// on the full price even when an under-construction payment schedule
/// spreads the price itself over several years.
pub fn calculate_purchase_costs(
    inputs: &PropertyInputs,
    source: &dyn RateSource,
    country: Country,
    city: &str,
) -> AnalyzerResult<ComputationOutput<PurchaseCosts>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let rates = RateContext::new(source, country, city);
    let costs = compute_purchase_costs(inputs, &rates, &mut warnings)?;

    let assumptions = serde_json::json!({
        "country": country,
        "city": city,
        "inputs": inputs,
    });
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Purchase Cost Analysis (Jurisdiction Rule Table)",
        &assumptions,
        warnings,
        elapsed,
        costs,
    ))
}

pub(crate) fn compute_purchase_costs(
    inputs: &PropertyInputs,
    rates: &RateContext<'_>,
    warnings: &mut Vec<String>,
) -> AnalyzerResult<PurchaseCosts> {
    if inputs.price <= Decimal::ZERO {
        return Err(AnalyzerError::InvalidInput {
            field: "price".into(),
            reason: "Purchase price must be positive".into(),
        });
    }

    let mut breakdown = CostBreakdown::new();
    breakdown.add("property_price", inputs.price);

    // Year-zero fraction of the price itself
    let initial_fraction = initial_payment_fraction(inputs, warnings);
    let initial_property_payment = inputs.price * initial_fraction;

    // Taxes and fees are charged on the full price and paid up front
    let mut taxes_and_fees = Decimal::ZERO;
    for rule in rules::purchase_rules(rates.country()) {
        if !rule.applies(inputs.property_type) {
            continue;
        }
        let rate = rates.scalar_or_zero(rule.rate_key, warnings);
        let amount = match rule.basis {
            CostBasis::Price => inputs.price * rate,
            CostBasis::LoanAmount => loan_basis(inputs, warnings) * rate,
            CostBasis::Fixed => rate,
        };
        breakdown.add(rule.line_item, amount);
        taxes_and_fees += amount;
        if let Some(note) = rule.advisory_note {
            if !warnings.iter().any(|w| w == note) {
                warnings.push(note.to_string());
            }
        }
    }

    // Renovations are priced and paid up front whatever the property type
    let renovation_total = priced_renovations(inputs, rates, &mut breakdown, warnings);

    let remaining_construction_payments = if inputs.property_type == PropertyType::UnderConstruction
        && initial_fraction < Decimal::ONE
    {
        Some(inputs.price * (Decimal::ONE - initial_fraction))
    } else {
        None
    };

    Ok(PurchaseCosts {
        total_investment_cost: breakdown.total,
        initial_outlay_year0: initial_property_payment + taxes_and_fees + renovation_total,
        items: breakdown.items,
        remaining_construction_payments,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fraction of the price due at year zero. Completed properties pay in
/// full; under-construction properties pay the scheduled year-0 milestones,
/// or an assumed 10% when no schedule was given.
fn initial_payment_fraction(inputs: &PropertyInputs, warnings: &mut Vec<String>) -> Rate {
    if inputs.property_type != PropertyType::UnderConstruction {
        return Decimal::ONE;
    }

    warnings.push(
        "Under construction uses a simplified payment schedule impact: the initial outlay is \
         staged but the net result charges the full investment cost"
            .to_string(),
    );

    match &inputs.payment_schedule {
        Some(schedule) if !schedule.is_empty() => schedule
            .iter()
            .filter(|m| m.due_year == Some(0))
            .map(|m| m.percentage)
            .sum(),
        _ => {
            warnings.push(
                "No payment schedule provided for under construction; assumed 10% initial payment"
                    .to_string(),
            );
            dec!(0.10)
        }
    }
}

fn loan_basis(inputs: &PropertyInputs, warnings: &mut Vec<String>) -> Money {
    match &inputs.loan {
        Some(loan) => loan.principal,
        None => {
            warnings.push(
                "No loan details provided; loan-based duties assume an 80% loan-to-value"
                    .to_string(),
            );
            inputs.price * dec!(0.80)
        }
    }
}

fn priced_renovations(
    inputs: &PropertyInputs,
    rates: &RateContext<'_>,
    breakdown: &mut CostBreakdown,
    warnings: &mut Vec<String>,
) -> Money {
    if inputs.renovations.is_empty() {
        return Decimal::ZERO;
    }

    let defaults = rates.renovation_costs(warnings);
    let mut total = Decimal::ZERO;

    for renovation in &inputs.renovations {
        let cost = match renovation.cost {
            Some(cost) => cost,
            None => match defaults.get(&renovation.kind) {
                Some(default) => *default,
                None => {
                    warnings.push(format!(
                        "No default cost for renovation type '{}'; treated as zero",
                        renovation.kind
                    ));
                    Decimal::ZERO
                }
            },
        };
        breakdown.add(&format!("renovation_{}", renovation.kind), cost);
        total += cost;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::StaticRateTable;
    use crate::types::{LoanDetails, PaymentMilestone, Renovation};

    fn barcelona(inputs: &PropertyInputs) -> (AnalyzerResult<PurchaseCosts>, Vec<String>) {
        let table = StaticRateTable;
        let rates = RateContext::new(&table, Country::Spain, "barcelona");
        let mut warnings = Vec::new();
        let result = compute_purchase_costs(inputs, &rates, &mut warnings);
        (result, warnings)
    }

    fn copenhagen(inputs: &PropertyInputs) -> (AnalyzerResult<PurchaseCosts>, Vec<String>) {
        let table = StaticRateTable;
        let rates = RateContext::new(&table, Country::Denmark, "copenhagen");
        let mut warnings = Vec::new();
        let result = compute_purchase_costs(inputs, &rates, &mut warnings);
        (result, warnings)
    }

    fn sample_inputs(price: Money, property_type: PropertyType) -> PropertyInputs {
        PropertyInputs {
            price,
            property_type,
            payment_schedule: None,
            construction_completion_years: 0,
            renovations: Vec::new(),
            loan: None,
            beckham_law_active: false,
        }
    }

    #[test]
    fn test_spain_new_build_taxes() {
        let inputs = sample_inputs(dec!(500000), PropertyType::New);
        let (result, warnings) = barcelona(&inputs);
        let costs = result.unwrap();

        // VAT 10% = 50000, AJD 1.5% = 7500, notary 0.5% = 2500, registry 0.4% = 2000
        assert_eq!(costs.items["purchase_tax_vat"], dec!(50000));
        assert_eq!(costs.items["purchase_tax_ajd"], dec!(7500));
        assert_eq!(costs.items["notary_fee"], dec!(2500));
        assert_eq!(costs.items["registry_fee"], dec!(2000));
        assert!(!costs.items.contains_key("purchase_tax_itp"));
        assert_eq!(costs.total_investment_cost, dec!(562000));
        // Completed property: everything is due at year zero
        assert_eq!(costs.initial_outlay_year0, dec!(562000));
        assert_eq!(costs.remaining_construction_payments, None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_spain_second_hand_pays_itp_not_vat() {
        let inputs = sample_inputs(dec!(450000), PropertyType::SecondHand);
        let (result, _) = barcelona(&inputs);
        let costs = result.unwrap();

        assert_eq!(costs.items["purchase_tax_itp"], dec!(45000));
        assert!(!costs.items.contains_key("purchase_tax_vat"));
        assert!(!costs.items.contains_key("purchase_tax_ajd"));
        // 450000 * (1 + 0.10 + 0.005 + 0.004) = 499050
        assert_eq!(costs.total_investment_cost, dec!(499050));
    }

    #[test]
    fn test_renovation_with_explicit_cost() {
        let mut inputs = sample_inputs(dec!(450000), PropertyType::SecondHand);
        inputs.renovations = vec![Renovation {
            kind: "kitchen".to_string(),
            cost: Some(dec!(20000)),
        }];
        let (result, _) = barcelona(&inputs);
        let costs = result.unwrap();

        assert_eq!(costs.items["renovation_kitchen"], dec!(20000));
        // 499050 + 20000
        assert_eq!(costs.total_investment_cost, dec!(519050));
        assert_eq!(costs.initial_outlay_year0, dec!(519050));
    }

    #[test]
    fn test_renovation_priced_from_market_default() {
        let mut inputs = sample_inputs(dec!(300000), PropertyType::SecondHand);
        inputs.renovations = vec![
            Renovation {
                kind: "kitchen".to_string(),
                cost: None,
            },
            Renovation {
                kind: "bathroom".to_string(),
                cost: None,
            },
        ];
        let (result, _) = barcelona(&inputs);
        let costs = result.unwrap();

        assert_eq!(costs.items["renovation_kitchen"], dec!(15000));
        assert_eq!(costs.items["renovation_bathroom"], dec!(8000));
    }

    #[test]
    fn test_renovation_applies_to_new_builds_too() {
        let mut inputs = sample_inputs(dec!(500000), PropertyType::New);
        inputs.renovations = vec![Renovation {
            kind: "kitchen".to_string(),
            cost: None,
        }];
        let (result, _) = barcelona(&inputs);
        let costs = result.unwrap();

        assert_eq!(costs.items["renovation_kitchen"], dec!(15000));
        assert_eq!(costs.total_investment_cost, dec!(577000));
    }

    #[test]
    fn test_unknown_renovation_kind_warns_and_costs_nothing() {
        let mut inputs = sample_inputs(dec!(300000), PropertyType::SecondHand);
        inputs.renovations = vec![Renovation {
            kind: "swimming_pool".to_string(),
            cost: None,
        }];
        let (result, warnings) = barcelona(&inputs);
        let costs = result.unwrap();

        assert_eq!(costs.items["renovation_swimming_pool"], Decimal::ZERO);
        assert!(warnings.iter().any(|w| w.contains("swimming_pool")));
    }

    #[test]
    fn test_under_construction_schedule_drives_initial_outlay() {
        let mut inputs = sample_inputs(dec!(300000), PropertyType::UnderConstruction);
        inputs.payment_schedule = Some(vec![
            PaymentMilestone {
                due_year: Some(0),
                percentage: dec!(0.30),
            },
            PaymentMilestone {
                due_year: Some(1),
                percentage: dec!(0.30),
            },
            PaymentMilestone {
                due_year: Some(2),
                percentage: dec!(0.40),
            },
        ]);
        let (result, warnings) = barcelona(&inputs);
        let costs = result.unwrap();

        // Taxes on the full price: VAT 30000 + AJD 4500 + notary 1500 + registry 1200
        let taxes = dec!(37200);
        assert_eq!(costs.total_investment_cost, dec!(300000) + taxes);
        // Initial outlay: 30% of price plus all taxes up front
        assert_eq!(costs.initial_outlay_year0, dec!(90000) + taxes);
        assert_eq!(costs.remaining_construction_payments, Some(dec!(210000)));
        // Simplification is flagged, but the schedule was honoured
        assert!(warnings.iter().any(|w| w.contains("simplified payment schedule")));
        assert!(!warnings.iter().any(|w| w.contains("assumed 10%")));
    }

    #[test]
    fn test_under_construction_without_schedule_assumes_ten_percent() {
        let inputs = sample_inputs(dec!(300000), PropertyType::UnderConstruction);
        let (result, warnings) = barcelona(&inputs);
        let costs = result.unwrap();

        let taxes = dec!(37200);
        assert_eq!(costs.initial_outlay_year0, dec!(30000) + taxes);
        assert_eq!(costs.remaining_construction_payments, Some(dec!(270000)));
        assert!(warnings.iter().any(|w| w.contains("assumed 10% initial")));
    }

    #[test]
    fn test_denmark_ejer_duties() {
        let mut inputs = sample_inputs(dec!(4000000), PropertyType::Ejer);
        inputs.loan = Some(LoanDetails {
            principal: dec!(3200000),
            annual_interest_rate: dec!(0.02),
            term_years: 30,
        });
        let (result, warnings) = copenhagen(&inputs);
        let costs = result.unwrap();

        // Tinglysning: 1850 + 0.6% of price = 25850
        assert_eq!(costs.items["purchase_tax_tinglysningsafgift"], dec!(25850));
        // Loan stamp duty: 1825 + 1.45% of 3.2m = 48225
        assert_eq!(costs.items["loan_stamp_duty"], dec!(48225));
        assert_eq!(costs.items["lawyer_fee"], dec!(15000));
        assert_eq!(costs.total_investment_cost, dec!(4089075));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_denmark_without_loan_assumes_eighty_percent_ltv() {
        let inputs = sample_inputs(dec!(4000000), PropertyType::Ejer);
        let (result, warnings) = copenhagen(&inputs);
        let costs = result.unwrap();

        // Stamp duty on an assumed 3.2m loan: 1825 + 46400
        assert_eq!(costs.items["loan_stamp_duty"], dec!(48225));
        assert!(warnings.iter().any(|w| w.contains("80% loan-to-value")));
    }

    #[test]
    fn test_denmark_new_build_pays_vat_not_tinglysning() {
        let inputs = sample_inputs(dec!(2000000), PropertyType::New);
        let (result, warnings) = copenhagen(&inputs);
        let costs = result.unwrap();

        assert_eq!(costs.items["purchase_tax_vat"], dec!(500000));
        assert!(!costs.items.contains_key("purchase_tax_tinglysningsafgift"));
        assert!(warnings
            .iter()
            .any(|w| w.contains("Danish VAT and tinglysning")));
    }

    #[test]
    fn test_zero_price_is_invalid() {
        let inputs = sample_inputs(Decimal::ZERO, PropertyType::New);
        let (result, _) = barcelona(&inputs);
        assert!(matches!(
            result,
            Err(AnalyzerError::InvalidInput { ref field, .. }) if field == "price"
        ));
    }

    #[test]
    fn test_items_sum_to_total() {
        let mut inputs = sample_inputs(dec!(450000), PropertyType::SecondHand);
        inputs.renovations = vec![Renovation {
            kind: "general".to_string(),
            cost: Some(dec!(12000)),
        }];
        let (result, _) = barcelona(&inputs);
        let costs = result.unwrap();

        let summed: Money = costs.items.values().copied().sum();
        assert_eq!(summed, costs.total_investment_cost);
    }

    #[test]
    fn test_public_api_wraps_envelope() {
        let inputs = sample_inputs(dec!(500000), PropertyType::New);
        let output =
            calculate_purchase_costs(&inputs, &StaticRateTable, Country::Spain, "barcelona")
                .unwrap();
        assert_eq!(output.result.total_investment_cost, dec!(562000));
        assert!(output.methodology.contains("Purchase Cost"));
    }
}
