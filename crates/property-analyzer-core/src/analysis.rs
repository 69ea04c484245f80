//! Request-level orchestration: analyzes a set of named property
//! scenarios side by side, optionally against a renting baseline.
//!
//! A malformed scenario fails on its own; siblings still produce full
//! projections. Advisory warnings from every calculation are merged and
//! de-duplicated into the response envelope.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use crate::error::AnalyzerError;
use crate::rates::RateSource;
use crate::renting::{compute_renting_costs, RentingCosts, RentingInput};
use crate::scenario::{compute_property_analysis, PropertyAnalysis};
use crate::types::{
    with_metadata, ComputationOutput, Country, Currency, Money, PropertyInputs, PropertyType,
    ScenarioSettings,
};
use crate::AnalyzerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A full comparison request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub settings: ScenarioSettings,
    pub properties: Vec<PropertyScenario>,
    #[serde(default)]
    pub renting: Option<RentingInput>,
}

/// One named property under consideration. Location and inputs are
/// optional so that an incomplete scenario fails on its own instead of
/// failing the whole request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyScenario {
    pub name: String,
    #[serde(default)]
    pub country: Option<Country>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub inputs: Option<PropertyInputs>,
}

/// Projection or failure for one named scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyOutcome {
    Analyzed(Box<PropertyAnalysis>),
    Failed { error: String },
}

/// Renting baseline result or failure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RentingOutcome {
    Computed(RentingCosts),
    Failed { error: String },
}

/// Headline block of the comparison response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub executive_summary: String,
    /// Per-scenario "City - Property type" display labels
    pub scenario_labels: BTreeMap<String, String>,
    /// Display currency label carried through from the request
    pub currency: Currency,
}

/// Full comparison response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub summary: AnalysisSummary,
    pub results: BTreeMap<String, PropertyOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renting: Option<RentingOutcome>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyze every property scenario in the request and, when supplied,
/// the renting baseline the ownership outcomes are measured against.
pub fn analyze(
    request: &AnalysisRequest,
    source: &dyn RateSource,
) -> AnalyzerResult<ComputationOutput<AnalysisResponse>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if request.settings.years_to_sell == 0 {
        return Err(AnalyzerError::InvalidInput {
            field: "years_to_sell".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }
    if request.properties.is_empty() {
        return Err(AnalyzerError::MissingInput(
            "at least one property scenario".into(),
        ));
    }

    // The renting total feeds every property's index-adjusted figure,
    // so it is computed first. Its failure is isolated like any other.
    let (renting, renting_total) = match &request.renting {
        None => (None, None),
        Some(input) => match compute_renting_costs(input, request.settings.years_to_sell) {
            Ok(costs) => {
                let total = costs.total;
                (Some(RentingOutcome::Computed(costs)), Some(total))
            }
            Err(error) => (
                Some(RentingOutcome::Failed {
                    error: error.to_string(),
                }),
                None,
            ),
        },
    };

    let mut results = BTreeMap::new();
    let mut scenario_labels = BTreeMap::new();

    for scenario in &request.properties {
        let outcome = match analyze_scenario(
            scenario,
            &request.settings,
            source,
            renting_total,
            &mut warnings,
        ) {
            Ok(analysis) => {
                scenario_labels.insert(
                    scenario.name.clone(),
                    scenario_label(&analysis.city, analysis.country, analysis.property_type),
                );
                PropertyOutcome::Analyzed(Box::new(analysis))
            }
            Err(error) => PropertyOutcome::Failed {
                error: error.to_string(),
            },
        };
        results.insert(scenario.name.clone(), outcome);
    }

    dedup_preserving_order(&mut warnings);

    let response = AnalysisResponse {
        summary: AnalysisSummary {
            executive_summary: "Comparison results generated. Review scenarios and detailed \
                                breakdowns. Note warnings regarding assumptions."
                .to_string(),
            scenario_labels,
            currency: request.settings.currency.clone(),
        },
        results,
        renting,
    };

    let assumptions = json!({
        "years_to_sell": request.settings.years_to_sell,
        "currency": request.settings.currency,
        "property_scenarios": request.properties.len(),
        "renting_baseline": request.renting.is_some(),
    });

    Ok(with_metadata(
        "Comparative Property Investment Analysis",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        response,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn analyze_scenario(
    scenario: &PropertyScenario,
    settings: &ScenarioSettings,
    source: &dyn RateSource,
    renting_total: Option<Money>,
    warnings: &mut Vec<String>,
) -> AnalyzerResult<PropertyAnalysis> {
    let country = scenario.country.ok_or_else(|| {
        AnalyzerError::MissingInput(format!("country for scenario '{}'", scenario.name))
    })?;
    let city = scenario.city.as_deref().ok_or_else(|| {
        AnalyzerError::MissingInput(format!("city for scenario '{}'", scenario.name))
    })?;
    let inputs = scenario.inputs.as_ref().ok_or_else(|| {
        AnalyzerError::MissingInput(format!("property inputs for scenario '{}'", scenario.name))
    })?;

    compute_property_analysis(inputs, settings, source, country, city, renting_total, warnings)
}

/// "City - Property type" display label. Danish segments keep their
/// local names.
fn scenario_label(city: &str, country: Country, property_type: PropertyType) -> String {
    let type_display = match (country, property_type) {
        (Country::Denmark, PropertyType::Ejer) => "Ejerlejlighed".to_string(),
        (Country::Denmark, PropertyType::Andels) => "Andelslejlighed".to_string(),
        (Country::Denmark, PropertyType::UnderConstruction) => "Under Construction".to_string(),
        (_, other) => humanize(&other.to_string()),
    };
    format!("{} - {}", capitalize(city), type_display)
}

/// "under_construction" becomes "Under construction"
fn humanize(snake: &str) -> String {
    capitalize(&snake.replace('_', " "))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn dedup_preserving_order(warnings: &mut Vec<String>) {
    let mut seen = HashSet::new();
    warnings.retain(|warning| seen.insert(warning.clone()));
}
