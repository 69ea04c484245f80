use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tax::TaxBracket;
use crate::types::{Country, Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a jurisdiction taxes the gain on a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CapitalGainsRule {
    /// Progressive table applied to the positive gain
    Progressive(Vec<TaxBracket>),
    /// Single flat rate applied to the positive gain
    Flat(Rate),
    /// No tax on the gain (owner-occupied exemptions)
    Exempt,
}

/// Read-only source of jurisdiction rates injected into every calculator.
///
/// Implementations return owned copies so callers never borrow from the
/// source. `None` means the rate is unknown; calculators substitute a
/// zero-equivalent default and emit a warning rather than failing.
pub trait RateSource {
    fn scalar(&self, country: Country, city: &str, key: &str) -> Option<Decimal>;
    fn capital_gains_rule(&self, country: Country, city: &str) -> Option<CapitalGainsRule>;
    fn renovation_costs(&self, country: Country, city: &str) -> Option<BTreeMap<String, Money>>;
}

/// Binds a rate source to one market and standardises the miss behaviour
pub struct RateContext<'a> {
    source: &'a dyn RateSource,
    country: Country,
    city: &'a str,
}

impl<'a> RateContext<'a> {
    pub fn new(source: &'a dyn RateSource, country: Country, city: &'a str) -> Self {
        Self {
            source,
            country,
            city,
        }
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn city(&self) -> &str {
        self.city
    }

    /// Scalar rate, `None` when the market does not carry the key
    pub fn scalar(&self, key: &str) -> Option<Decimal> {
        self.source.scalar(self.country, self.city, key)
    }

    /// Scalar rate; unknown keys resolve to zero with a warning
    pub fn scalar_or_zero(&self, key: &str, warnings: &mut Vec<String>) -> Decimal {
        match self.source.scalar(self.country, self.city, key) {
            Some(value) => value,
            None => {
                warnings.push(format!(
                    "Rate not found for {}/{}/{}",
                    self.country, self.city, key
                ));
                Decimal::ZERO
            }
        }
    }

    /// Gains rule; unknown markets resolve to exempt with a warning
    pub fn capital_gains_rule(&self, warnings: &mut Vec<String>) -> CapitalGainsRule {
        match self.source.capital_gains_rule(self.country, self.city) {
            Some(rule) => rule,
            None => {
                warnings.push(format!(
                    "Capital gains rule not found for {}/{}; gain assumed untaxed",
                    self.country, self.city
                ));
                CapitalGainsRule::Exempt
            }
        }
    }

    /// Renovation price list; unknown markets resolve to empty with a warning
    pub fn renovation_costs(&self, warnings: &mut Vec<String>) -> BTreeMap<String, Money> {
        match self.source.renovation_costs(self.country, self.city) {
            Some(table) => table,
            None => {
                warnings.push(format!(
                    "Rate not found for {}/{}/renovation_rates",
                    self.country, self.city
                ));
                BTreeMap::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in rate table
// ---------------------------------------------------------------------------

/// Placeholder rates for the seeded markets (Barcelona, Copenhagen).
/// Indicative values only; regional rules vary and change year to year.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRateTable;

impl RateSource for StaticRateTable {
    fn scalar(&self, country: Country, city: &str, key: &str) -> Option<Decimal> {
        match country {
            Country::Spain if city.eq_ignore_ascii_case("barcelona") => barcelona_scalar(key),
            Country::Denmark if city.eq_ignore_ascii_case("copenhagen") => copenhagen_scalar(key),
            _ => None,
        }
    }

    fn capital_gains_rule(&self, country: Country, city: &str) -> Option<CapitalGainsRule> {
        match country {
            Country::Spain if city.eq_ignore_ascii_case("barcelona") => {
                Some(CapitalGainsRule::Progressive(spanish_gains_brackets()))
            }
            // Owner-occupied exemption assumed; investment sales would be Flat(0.42)
            Country::Denmark if city.eq_ignore_ascii_case("copenhagen") => {
                Some(CapitalGainsRule::Exempt)
            }
            _ => None,
        }
    }

    fn renovation_costs(&self, country: Country, city: &str) -> Option<BTreeMap<String, Money>> {
        match country {
            Country::Spain if city.eq_ignore_ascii_case("barcelona") => Some(BTreeMap::from([
                ("kitchen".to_string(), dec!(15000)),
                ("bathroom".to_string(), dec!(8000)),
                ("general".to_string(), dec!(500)),
            ])),
            Country::Denmark if city.eq_ignore_ascii_case("copenhagen") => Some(BTreeMap::from([
                ("kitchen".to_string(), dec!(100000)),
                ("bathroom".to_string(), dec!(60000)),
                ("general".to_string(), dec!(3000)),
            ])),
            _ => None,
        }
    }
}

fn barcelona_scalar(key: &str) -> Option<Rate> {
    let value = match key {
        "purchase_tax_itp_new" => dec!(0.10),
        "purchase_tax_itp_resale" => dec!(0.10),
        "purchase_tax_vat_construction" => dec!(0.10),
        "purchase_tax_ajd_construction" => dec!(0.015),
        "purchase_notary_fee_rate" => dec!(0.005),
        "purchase_registry_fee_rate" => dec!(0.004),
        "purchase_agency_fee_rate" => dec!(0.03),
        "running_ibi_rate" => dec!(0.007),
        "running_community_fee_monthly" => dec!(100),
        "selling_agency_fee_rate" => dec!(0.05),
        "selling_plusvalia_municipal" => dec!(1500),
        "beckham_law_tax_rate" => dec!(0.24),
        "standard_income_tax_rate" => dec!(0.35),
        "avg_appreciation_rate" => dec!(0.03),
        "appreciation_std_dev" => dec!(0.05),
        _ => return None,
    };
    Some(value)
}

fn copenhagen_scalar(key: &str) -> Option<Rate> {
    let value = match key {
        "purchase_tax_tinglysningsafgift_fixed" => dec!(1850),
        "purchase_tax_tinglysningsafgift_variable" => dec!(0.006),
        "purchase_tax_vat_construction" => dec!(0.25),
        "purchase_stamp_duty_loan" => dec!(0.0145),
        "purchase_stamp_duty_loan_fixed" => dec!(1825),
        "purchase_lawyer_fee" => dec!(15000),
        "purchase_agency_fee_rate" => dec!(0.01),
        "running_property_tax_ejendomsskat" => dec!(0.0092),
        "running_property_value_tax_ejendomsværdiskat" => dec!(0.0051),
        "running_community_fee_monthly" => dec!(1500),
        "selling_agency_fee_rate" => dec!(0.02),
        "standard_income_tax_rate" => dec!(0.45),
        "avg_appreciation_rate" => dec!(0.04),
        "appreciation_std_dev" => dec!(0.06),
        _ => return None,
    };
    Some(value)
}

fn spanish_gains_brackets() -> Vec<TaxBracket> {
    vec![
        TaxBracket {
            up_to: Some(dec!(6000)),
            rate: dec!(0.19),
        },
        TaxBracket {
            up_to: Some(dec!(50000)),
            rate: dec!(0.21),
        },
        TaxBracket {
            up_to: Some(dec!(200000)),
            rate: dec!(0.23),
        },
        TaxBracket {
            up_to: None,
            rate: dec!(0.26),
        },
    ]
}
