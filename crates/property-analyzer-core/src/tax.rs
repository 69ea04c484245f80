use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// One tier of a progressive tax table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Cumulative upper bound of the tier; `None` marks the unbounded final tier
    #[serde(default)]
    pub up_to: Option<Money>,
    /// Marginal rate applied within the tier
    pub rate: Rate,
}

/// Progressive tax on `amount` against ascending cumulative brackets.
///
/// Each tier taxes the slice of the amount between the previous bound and its
/// own; a `None` bound captures everything above. Non-positive amounts and
/// empty tables tax to zero. If the final tier is bounded, the excess above
/// it is untaxed.
pub fn progressive_tax(amount: Money, brackets: &[TaxBracket]) -> Money {
    if amount <= Decimal::ZERO || brackets.is_empty() {
        return Decimal::ZERO;
    }

    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;

    for bracket in brackets {
        let upper = match bracket.up_to {
            Some(bound) => bound.min(amount),
            None => amount,
        };
        if upper > lower {
            tax += (upper - lower) * bracket.rate;
        }
        match bracket.up_to {
            Some(bound) if bound < amount => lower = bound,
            _ => break, // amount fully covered
        }
    }

    tax
}
