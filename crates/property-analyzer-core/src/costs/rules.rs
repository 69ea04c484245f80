use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Country, PropertyType};

// ---------------------------------------------------------------------------
// Purchase cost rules
// ---------------------------------------------------------------------------

/// What a purchase cost line is charged against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBasis {
    /// rate * purchase price
    Price,
    /// rate * loan principal
    LoanAmount,
    /// the rate value itself is the amount
    Fixed,
}

/// One jurisdiction-conditional purchase cost. Rules sharing a line item
/// accumulate into a single breakdown line (fixed plus variable parts of
/// the same duty, for instance).
#[derive(Debug, Clone, Copy)]
pub struct PurchaseCostRule {
    /// Breakdown line the amount accumulates under
    pub line_item: &'static str,
    /// Rate table key
    pub rate_key: &'static str,
    pub basis: CostBasis,
    /// Property types the rule applies to; empty means all
    pub applies_to: &'static [PropertyType],
    /// Advisory note emitted whenever the rule is charged
    pub advisory_note: Option<&'static str>,
}

impl PurchaseCostRule {
    pub fn applies(&self, property_type: PropertyType) -> bool {
        self.applies_to.is_empty() || self.applies_to.contains(&property_type)
    }
}

use PropertyType::{Andels, Ejer, New, SecondHand, UnderConstruction};

const SPAIN_PURCHASE_RULES: &[PurchaseCostRule] = &[
    PurchaseCostRule {
        line_item: "purchase_tax_vat",
        rate_key: "purchase_tax_vat_construction",
        basis: CostBasis::Price,
        applies_to: &[New, UnderConstruction],
        advisory_note: None,
    },
    PurchaseCostRule {
        line_item: "purchase_tax_ajd",
        rate_key: "purchase_tax_ajd_construction",
        basis: CostBasis::Price,
        applies_to: &[New, UnderConstruction],
        advisory_note: None,
    },
    PurchaseCostRule {
        line_item: "purchase_tax_itp",
        rate_key: "purchase_tax_itp_resale",
        basis: CostBasis::Price,
        applies_to: &[SecondHand],
        advisory_note: None,
    },
    PurchaseCostRule {
        line_item: "notary_fee",
        rate_key: "purchase_notary_fee_rate",
        basis: CostBasis::Price,
        applies_to: &[],
        advisory_note: None,
    },
    PurchaseCostRule {
        line_item: "registry_fee",
        rate_key: "purchase_registry_fee_rate",
        basis: CostBasis::Price,
        applies_to: &[],
        advisory_note: None,
    },
];

const DENMARK_PURCHASE_RULES: &[PurchaseCostRule] = &[
    PurchaseCostRule {
        line_item: "purchase_tax_vat",
        rate_key: "purchase_tax_vat_construction",
        basis: CostBasis::Price,
        applies_to: &[New, UnderConstruction],
        advisory_note: Some("Danish VAT and tinglysning rules for new builds need verification."),
    },
    PurchaseCostRule {
        line_item: "purchase_tax_tinglysningsafgift",
        rate_key: "purchase_tax_tinglysningsafgift_fixed",
        basis: CostBasis::Fixed,
        applies_to: &[Ejer, Andels],
        advisory_note: None,
    },
    PurchaseCostRule {
        line_item: "purchase_tax_tinglysningsafgift",
        rate_key: "purchase_tax_tinglysningsafgift_variable",
        basis: CostBasis::Price,
        applies_to: &[Ejer, Andels],
        advisory_note: None,
    },
    PurchaseCostRule {
        line_item: "loan_stamp_duty",
        rate_key: "purchase_stamp_duty_loan_fixed",
        basis: CostBasis::Fixed,
        applies_to: &[],
        advisory_note: None,
    },
    PurchaseCostRule {
        line_item: "loan_stamp_duty",
        rate_key: "purchase_stamp_duty_loan",
        basis: CostBasis::LoanAmount,
        applies_to: &[],
        advisory_note: None,
    },
    PurchaseCostRule {
        line_item: "lawyer_fee",
        rate_key: "purchase_lawyer_fee",
        basis: CostBasis::Fixed,
        applies_to: &[],
        advisory_note: None,
    },
];

pub fn purchase_rules(country: Country) -> &'static [PurchaseCostRule] {
    match country {
        Country::Spain => SPAIN_PURCHASE_RULES,
        Country::Denmark => DENMARK_PURCHASE_RULES,
    }
}

// ---------------------------------------------------------------------------
// Running cost rules
// ---------------------------------------------------------------------------

/// What a recurring annual cost line is charged against
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunningCostBasis {
    /// rate * (fraction of purchase price); the fraction proxies an
    /// assessed value the caller has not supplied
    PriceFraction(Decimal),
    /// the rate value is a monthly amount, charged twelve times a year
    FixedMonthly,
}

#[derive(Debug, Clone, Copy)]
pub struct RunningCostRule {
    pub line_item: &'static str,
    pub rate_key: &'static str,
    pub basis: RunningCostBasis,
    /// Advisory note emitted when the rule relies on a proxy value
    pub proxy_note: Option<&'static str>,
}

const SPAIN_RUNNING_RULES: &[RunningCostRule] = &[
    RunningCostRule {
        line_item: "property_tax_ibi",
        rate_key: "running_ibi_rate",
        basis: RunningCostBasis::PriceFraction(dec!(0.5)),
        proxy_note: Some("Spain running costs use proxy values for IBI calculation."),
    },
    RunningCostRule {
        line_item: "community_fees",
        rate_key: "running_community_fee_monthly",
        basis: RunningCostBasis::FixedMonthly,
        proxy_note: None,
    },
];

const DENMARK_RUNNING_RULES: &[RunningCostRule] = &[
    RunningCostRule {
        line_item: "property_tax_ejendomsskat",
        rate_key: "running_property_tax_ejendomsskat",
        basis: RunningCostBasis::PriceFraction(dec!(0.3)),
        proxy_note: Some("Denmark running costs use proxy values for tax calculations."),
    },
    RunningCostRule {
        line_item: "property_value_tax_ejendomsværdiskat",
        rate_key: "running_property_value_tax_ejendomsværdiskat",
        basis: RunningCostBasis::PriceFraction(dec!(1)),
        proxy_note: Some("Denmark running costs use proxy values for tax calculations."),
    },
    RunningCostRule {
        line_item: "community_fees",
        rate_key: "running_community_fee_monthly",
        basis: RunningCostBasis::FixedMonthly,
        proxy_note: None,
    },
];

pub fn running_rules(country: Country) -> &'static [RunningCostRule] {
    match country {
        Country::Spain => SPAIN_RUNNING_RULES,
        Country::Denmark => DENMARK_RUNNING_RULES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{RateSource, StaticRateTable};

    #[test]
    fn test_empty_applies_to_matches_every_type() {
        let rule = PurchaseCostRule {
            line_item: "x",
            rate_key: "y",
            basis: CostBasis::Price,
            applies_to: &[],
            advisory_note: None,
        };
        for pt in [New, UnderConstruction, SecondHand, Ejer, Andels] {
            assert!(rule.applies(pt));
        }
    }

    #[test]
    fn test_itp_applies_only_to_second_hand() {
        let itp = SPAIN_PURCHASE_RULES
            .iter()
            .find(|r| r.line_item == "purchase_tax_itp")
            .unwrap();
        assert!(itp.applies(SecondHand));
        assert!(!itp.applies(New));
        assert!(!itp.applies(UnderConstruction));
    }

    #[test]
    fn test_tinglysning_has_fixed_and_variable_parts() {
        let parts: Vec<_> = DENMARK_PURCHASE_RULES
            .iter()
            .filter(|r| r.line_item == "purchase_tax_tinglysningsafgift")
            .collect();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().any(|r| r.basis == CostBasis::Fixed));
        assert!(parts.iter().any(|r| r.basis == CostBasis::Price));
    }

    #[test]
    fn test_every_rule_key_is_seeded() {
        let table = StaticRateTable;
        for (country, city) in [
            (Country::Spain, "barcelona"),
            (Country::Denmark, "copenhagen"),
        ] {
            for rule in purchase_rules(country) {
                assert!(
                    table.scalar(country, city, rule.rate_key).is_some(),
                    "{country}: {} not seeded",
                    rule.rate_key
                );
            }
            for rule in running_rules(country) {
                assert!(
                    table.scalar(country, city, rule.rate_key).is_some(),
                    "{country}: {} not seeded",
                    rule.rate_key
                );
            }
        }
    }
}
