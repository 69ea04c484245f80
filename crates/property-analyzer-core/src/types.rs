use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Currency label carried through for display. No conversion is performed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    EUR,
    DKK,
    GBP,
    USD,
    Other(String),
}

/// Supported property markets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "spain")]
    Spain,
    #[serde(rename = "denmark")]
    Denmark,
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Country::Spain => write!(f, "spain"),
            Country::Denmark => write!(f, "denmark"),
        }
    }
}

/// Market segment the property trades in. Which purchase taxes apply
/// depends on both the segment and the country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "under_construction")]
    UnderConstruction,
    #[serde(rename = "second_hand")]
    SecondHand,
    #[serde(rename = "ejer")]
    Ejer,
    #[serde(rename = "andels")]
    Andels,
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::New => write!(f, "new"),
            PropertyType::UnderConstruction => write!(f, "under_construction"),
            PropertyType::SecondHand => write!(f, "second_hand"),
            PropertyType::Ejer => write!(f, "ejer"),
            PropertyType::Andels => write!(f, "andels"),
        }
    }
}

/// One staged payment due on an under-construction property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMilestone {
    /// Years after signing the payment falls due; entries due at year 0
    /// form the initial outlay
    #[serde(default)]
    pub due_year: Option<u32>,
    /// Fraction of the purchase price due at this milestone
    pub percentage: Rate,
}

/// A planned renovation line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Renovation {
    /// Renovation kind, matched against the jurisdiction's cost table
    /// (e.g. "kitchen", "bathroom", "general")
    #[serde(rename = "type")]
    pub kind: String,
    /// Explicit cost; when absent the jurisdiction default is used
    #[serde(default)]
    pub cost: Option<Money>,
}

/// Mortgage financing terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetails {
    /// Amount borrowed
    pub principal: Money,
    /// Nominal annual interest rate (0.035 = 3.5%)
    pub annual_interest_rate: Rate,
    /// Full amortization term in years
    pub term_years: u32,
}

/// Inputs describing a single property under consideration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyInputs {
    /// Purchase price in the market's local currency
    #[serde(default)]
    pub price: Money,
    /// Market segment
    pub property_type: PropertyType,

    // Under-construction fields
    /// Staged payment plan; absent for a completed property
    #[serde(default)]
    pub payment_schedule: Option<Vec<PaymentMilestone>>,
    /// Years until an under-construction property completes
    #[serde(default)]
    pub construction_completion_years: u32,

    /// Planned renovations, priced from the rate table when no cost is given
    #[serde(default)]
    pub renovations: Vec<Renovation>,
    /// Financing; loan interest accrues only when this is present
    #[serde(default)]
    pub loan: Option<LoanDetails>,
    /// Elects Spain's flat expatriate tax regime on the eventual sale
    #[serde(default)]
    pub beckham_law_active: bool,
}

/// Holding-period settings shared by every analyzed property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSettings {
    /// Years between purchase and sale
    pub years_to_sell: u32,
    /// Display currency label
    #[serde(default)]
    pub currency: Currency,
    /// Clamp the low-risk appreciation rate at zero (mean minus one
    /// standard deviation can go negative in volatile markets)
    #[serde(default = "default_true")]
    pub floor_low_risk_at_zero: bool,
}

fn default_true() -> bool {
    true
}

/// A total together with the named line items that produced it.
/// Line items always sum to the total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub total: Money,
    pub items: BTreeMap<String, Money>,
}

impl CostBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an amount under a line item, accumulating if the item exists
    pub fn add(&mut self, item: &str, amount: Money) {
        *self.items.entry(item.to_string()).or_insert(Decimal::ZERO) += amount;
        self.total += amount;
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
