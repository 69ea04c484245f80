use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal::prelude::ToPrimitive;

use crate::error::AnalyzerError;
use crate::types::{Money, Rate, Years};
use crate::AnalyzerResult;

/// Compound future value: present * (1 + rate)^years.
///
/// Zero rate or a zero horizon returns the present amount exactly.
/// Whole-year horizons compound by repeated multiplication, which is exact
/// in Decimal; fractional horizons fall back to `powd`.
pub fn future_value(present: Money, annual_rate: Rate, years: Years) -> AnalyzerResult<Money> {
    if years < Decimal::ZERO {
        return Err(AnalyzerError::InvalidInput {
            field: "years".into(),
            reason: "Projection horizon must not be negative".into(),
        });
    }
    if annual_rate.is_zero() || years.is_zero() || present.is_zero() {
        return Ok(present);
    }

    let base = Decimal::ONE + annual_rate;

    let factor = if years.fract().is_zero() {
        match years.to_u32() {
            Some(n) => {
                let mut compound = Decimal::ONE;
                for _ in 0..n {
                    compound = compound.checked_mul(base).ok_or_else(overflow)?;
                }
                compound
            }
            None => base.checked_powd(years).ok_or_else(overflow)?,
        }
    } else {
        base.checked_powd(years).ok_or_else(overflow)?
    };

    present.checked_mul(factor).ok_or_else(overflow)
}

fn overflow() -> AnalyzerError {
    AnalyzerError::InvalidInput {
        field: "years".into(),
        reason: "Compound factor overflows decimal range".into(),
    }
}
