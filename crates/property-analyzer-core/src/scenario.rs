//! Multi-year outcome projection across appreciation scenarios.
//!
//! One property is projected under four market assumptions derived from
//! the jurisdiction's mean appreciation rate and its standard deviation.
//! Each scenario compounds the price forward, prices the exit, and nets
//! every cost of the holding period against the sale proceeds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

use crate::costs::purchase::{compute_purchase_costs, PurchaseCosts};
use crate::costs::running::{compute_running_costs, RunningCosts};
use crate::costs::selling::compute_selling_costs;
use crate::error::AnalyzerError;
use crate::loan::interest_over_holding;
use crate::rates::{RateContext, RateSource};
use crate::report::{assemble_breakdown, DetailedBreakdown};
use crate::time_value::future_value;
use crate::types::{
    with_metadata, ComputationOutput, CostBreakdown, Country, Money, PropertyInputs, PropertyType,
    Rate, ScenarioSettings,
};
use crate::AnalyzerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Market assumption for annual price appreciation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppreciationScenario {
    #[serde(rename = "zero_growth")]
    ZeroGrowth,
    #[serde(rename = "average")]
    Average,
    #[serde(rename = "low_risk")]
    LowRisk,
    #[serde(rename = "high_risk")]
    HighRisk,
}

impl AppreciationScenario {
    /// Every scenario, in reporting order
    pub const ALL: [AppreciationScenario; 4] = [
        AppreciationScenario::ZeroGrowth,
        AppreciationScenario::Average,
        AppreciationScenario::LowRisk,
        AppreciationScenario::HighRisk,
    ];

    /// Annual appreciation rate under this scenario.
    ///
    /// Low risk subtracts one standard deviation from the mean and, when
    /// `floor_at_zero` is set, never projects outright depreciation.
    pub fn annual_rate(self, mean: Rate, std_dev: Rate, floor_at_zero: bool) -> Rate {
        match self {
            AppreciationScenario::ZeroGrowth => Decimal::ZERO,
            AppreciationScenario::Average => mean,
            AppreciationScenario::LowRisk => {
                let rate = mean - std_dev;
                if floor_at_zero {
                    rate.max(Decimal::ZERO)
                } else {
                    rate
                }
            }
            AppreciationScenario::HighRisk => mean + std_dev,
        }
    }
}

impl std::fmt::Display for AppreciationScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppreciationScenario::ZeroGrowth => write!(f, "zero_growth"),
            AppreciationScenario::Average => write!(f, "average"),
            AppreciationScenario::LowRisk => write!(f, "low_risk"),
            AppreciationScenario::HighRisk => write!(f, "high_risk"),
        }
    }
}

/// Outcome of one appreciation scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario: AppreciationScenario,
    pub annual_appreciation_rate: Rate,
    pub projected_sale_price: Money,
    pub selling_costs: CostBreakdown,
    /// Sale price minus investment, running costs, loan interest, and selling costs
    pub net_profit_loss: Money,
    /// Net result minus the cost of renting over the same period
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_adjusted_profit_loss: Option<Money>,
    pub report: DetailedBreakdown,
}

/// Full projection for a single property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAnalysis {
    pub country: Country,
    pub city: String,
    pub property_type: PropertyType,
    pub purchase_costs: PurchaseCosts,
    pub running_costs: RunningCosts,
    pub total_loan_interest: Money,
    pub scenarios: Vec<ScenarioOutcome>,
    /// Net result under the average scenario, used for rankings
    pub default_net_profit_loss: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project a property's outcome across all appreciation scenarios.
pub fn analyze_property(
    inputs: &PropertyInputs,
    settings: &ScenarioSettings,
    source: &dyn RateSource,
    country: Country,
    city: &str,
) -> AnalyzerResult<ComputationOutput<PropertyAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let analysis =
        compute_property_analysis(inputs, settings, source, country, city, None, &mut warnings)?;

    let assumptions = json!({
        "country": country,
        "city": city,
        "years_to_sell": settings.years_to_sell,
        "floor_low_risk_at_zero": settings.floor_low_risk_at_zero,
        "inputs": inputs,
    });

    Ok(with_metadata(
        "Multi-Year Property Investment Projection",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        analysis,
    ))
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

pub(crate) fn compute_property_analysis(
    inputs: &PropertyInputs,
    settings: &ScenarioSettings,
    source: &dyn RateSource,
    country: Country,
    city: &str,
    renting_total: Option<Money>,
    warnings: &mut Vec<String>,
) -> AnalyzerResult<PropertyAnalysis> {
    if settings.years_to_sell == 0 {
        return Err(AnalyzerError::InvalidInput {
            field: "years_to_sell".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }

    let rates = RateContext::new(source, country, city);

    let purchase_costs = compute_purchase_costs(inputs, &rates, warnings)?;
    let running_costs = compute_running_costs(inputs, &rates, settings.years_to_sell, warnings);

    // Interest accrues only when financing was actually declared; the 80%
    // loan proxy covers loan-based duties, not a real amortisation schedule.
    let total_loan_interest = inputs
        .loan
        .as_ref()
        .map(|loan| interest_over_holding(loan, settings.years_to_sell, warnings))
        .unwrap_or(Decimal::ZERO);

    let mean = rates.scalar_or_zero("avg_appreciation_rate", warnings);
    let std_dev = rates.scalar_or_zero("appreciation_std_dev", warnings);
    let holding_years = Decimal::from(settings.years_to_sell);

    let mut scenarios = Vec::with_capacity(AppreciationScenario::ALL.len());
    let mut default_net_profit_loss = Decimal::ZERO;

    for scenario in AppreciationScenario::ALL {
        let rate = scenario.annual_rate(mean, std_dev, settings.floor_low_risk_at_zero);
        let projected_sale_price = future_value(inputs.price, rate, holding_years)?;

        let selling_costs = compute_selling_costs(
            projected_sale_price,
            purchase_costs.total_investment_cost,
            inputs.beckham_law_active,
            &rates,
            warnings,
        );

        let net_profit_loss = projected_sale_price
            - purchase_costs.total_investment_cost
            - running_costs.total
            - total_loan_interest
            - selling_costs.total;
        let index_adjusted_profit_loss = renting_total.map(|renting| net_profit_loss - renting);

        if scenario == AppreciationScenario::Average {
            default_net_profit_loss = net_profit_loss;
        }

        let report = assemble_breakdown(
            &purchase_costs,
            &running_costs,
            &selling_costs,
            inputs.loan.as_ref(),
            total_loan_interest,
            inputs.price,
            projected_sale_price,
            net_profit_loss,
            index_adjusted_profit_loss,
        );

        scenarios.push(ScenarioOutcome {
            scenario,
            annual_appreciation_rate: rate,
            projected_sale_price,
            selling_costs,
            net_profit_loss,
            index_adjusted_profit_loss,
            report,
        });
    }

    Ok(PropertyAnalysis {
        country,
        city: city.to_string(),
        property_type: inputs.property_type,
        purchase_costs,
        running_costs,
        total_loan_interest,
        scenarios,
        default_net_profit_loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::StaticRateTable;
    use crate::types::LoanDetails;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn barcelona_new_build() -> PropertyInputs {
        PropertyInputs {
            price: dec!(500000),
            property_type: PropertyType::New,
            payment_schedule: None,
            construction_completion_years: 0,
            renovations: Vec::new(),
            loan: Some(LoanDetails {
                principal: dec!(400000),
                annual_interest_rate: dec!(0.035),
                term_years: 30,
            }),
            beckham_law_active: false,
        }
    }

    fn settings(years: u32) -> ScenarioSettings {
        ScenarioSettings {
            years_to_sell: years,
            currency: Default::default(),
            floor_low_risk_at_zero: true,
        }
    }

    #[test]
    fn test_scenario_rates_for_barcelona() {
        // Mean 3%, std dev 5%; low risk floors at zero
        let mean = dec!(0.03);
        let std = dec!(0.05);

        assert_eq!(
            AppreciationScenario::ZeroGrowth.annual_rate(mean, std, true),
            dec!(0)
        );
        assert_eq!(
            AppreciationScenario::Average.annual_rate(mean, std, true),
            dec!(0.03)
        );
        assert_eq!(
            AppreciationScenario::LowRisk.annual_rate(mean, std, true),
            dec!(0)
        );
        assert_eq!(
            AppreciationScenario::LowRisk.annual_rate(mean, std, false),
            dec!(-0.02)
        );
        assert_eq!(
            AppreciationScenario::HighRisk.annual_rate(mean, std, true),
            dec!(0.08)
        );
    }

    #[test]
    fn test_zero_growth_sale_price_equals_purchase_price() {
        let inputs = barcelona_new_build();
        let mut warnings = Vec::new();
        let analysis = compute_property_analysis(
            &inputs,
            &settings(3),
            &StaticRateTable,
            Country::Spain,
            "barcelona",
            None,
            &mut warnings,
        )
        .unwrap();

        let zero = &analysis.scenarios[0];
        assert_eq!(zero.scenario, AppreciationScenario::ZeroGrowth);
        assert_eq!(zero.projected_sale_price, dec!(500000));
    }

    #[test]
    fn test_net_profit_identity_holds_for_every_scenario() {
        let inputs = barcelona_new_build();
        let mut warnings = Vec::new();
        let analysis = compute_property_analysis(
            &inputs,
            &settings(3),
            &StaticRateTable,
            Country::Spain,
            "barcelona",
            None,
            &mut warnings,
        )
        .unwrap();

        for outcome in &analysis.scenarios {
            let expected = outcome.projected_sale_price
                - analysis.purchase_costs.total_investment_cost
                - analysis.running_costs.total
                - analysis.total_loan_interest
                - outcome.selling_costs.total;
            assert_eq!(outcome.net_profit_loss, expected, "{}", outcome.scenario);
            assert_eq!(outcome.report.outcome.raw_profit_loss, expected);
        }
    }

    #[test]
    fn test_average_scenario_drives_default_net() {
        let inputs = barcelona_new_build();
        let mut warnings = Vec::new();
        let analysis = compute_property_analysis(
            &inputs,
            &settings(3),
            &StaticRateTable,
            Country::Spain,
            "barcelona",
            None,
            &mut warnings,
        )
        .unwrap();

        let average = analysis
            .scenarios
            .iter()
            .find(|outcome| outcome.scenario == AppreciationScenario::Average)
            .unwrap();
        assert_eq!(analysis.default_net_profit_loss, average.net_profit_loss);
    }

    #[test]
    fn test_renting_total_shifts_every_scenario() {
        let inputs = barcelona_new_build();
        let mut warnings = Vec::new();
        let renting = dec!(60000);
        let analysis = compute_property_analysis(
            &inputs,
            &settings(3),
            &StaticRateTable,
            Country::Spain,
            "barcelona",
            Some(renting),
            &mut warnings,
        )
        .unwrap();

        for outcome in &analysis.scenarios {
            assert_eq!(
                outcome.index_adjusted_profit_loss,
                Some(outcome.net_profit_loss - renting)
            );
        }
    }

    #[test]
    fn test_no_renting_baseline_leaves_adjusted_figure_absent() {
        let inputs = barcelona_new_build();
        let mut warnings = Vec::new();
        let analysis = compute_property_analysis(
            &inputs,
            &settings(3),
            &StaticRateTable,
            Country::Spain,
            "barcelona",
            None,
            &mut warnings,
        )
        .unwrap();

        for outcome in &analysis.scenarios {
            assert_eq!(outcome.index_adjusted_profit_loss, None);
        }
    }

    #[test]
    fn test_interest_only_charged_with_declared_loan() {
        let mut inputs = barcelona_new_build();
        inputs.loan = None;
        let mut warnings = Vec::new();
        let analysis = compute_property_analysis(
            &inputs,
            &settings(3),
            &StaticRateTable,
            Country::Spain,
            "barcelona",
            None,
            &mut warnings,
        )
        .unwrap();

        assert_eq!(analysis.total_loan_interest, dec!(0));
        // No stray loan warning either: Spanish duties are price-based
        assert!(!warnings.iter().any(|warning| warning.contains("loan")));
    }

    #[test]
    fn test_zero_holding_period_rejected() {
        let inputs = barcelona_new_build();
        let mut warnings = Vec::new();
        let err = compute_property_analysis(
            &inputs,
            &settings(0),
            &StaticRateTable,
            Country::Spain,
            "barcelona",
            None,
            &mut warnings,
        )
        .unwrap_err();

        assert!(matches!(err, AnalyzerError::InvalidInput { ref field, .. } if field == "years_to_sell"));
    }

    #[test]
    fn test_envelope_carries_methodology_and_warnings() {
        let inputs = barcelona_new_build();
        let output = analyze_property(
            &inputs,
            &settings(3),
            &StaticRateTable,
            Country::Spain,
            "barcelona",
        )
        .unwrap();

        assert_eq!(output.methodology, "Multi-Year Property Investment Projection");
        assert!(output
            .warnings
            .iter()
            .any(|warning| warning.contains("proxy values for IBI")));
        assert_eq!(output.result.scenarios.len(), 4);
    }

    #[test]
    fn test_copenhagen_scenarios_use_danish_rates() {
        let inputs = PropertyInputs {
            price: dec!(4000000),
            property_type: PropertyType::Ejer,
            payment_schedule: None,
            construction_completion_years: 0,
            renovations: Vec::new(),
            loan: None,
            beckham_law_active: false,
        };
        let mut warnings = Vec::new();
        let analysis = compute_property_analysis(
            &inputs,
            &settings(5),
            &StaticRateTable,
            Country::Denmark,
            "copenhagen",
            None,
            &mut warnings,
        )
        .unwrap();

        // Mean 4%, std dev 6%: average 4%, high risk 10%, low risk floored
        let rates: Vec<Rate> = analysis
            .scenarios
            .iter()
            .map(|outcome| outcome.annual_appreciation_rate)
            .collect();
        assert_eq!(rates, vec![dec!(0), dec!(0.04), dec!(0), dec!(0.10)]);
    }
}
