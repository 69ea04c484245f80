use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

use crate::error::AnalyzerError;
use crate::types::{with_metadata, ComputationOutput, LoanDetails, Money, Rate};
use crate::AnalyzerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Interest accrued on a mortgage over the holding period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInterest {
    pub total_interest: Money,
    /// Level payment to two decimal places, absent for degenerate terms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Interest a mortgage accrues between purchase and sale, wrapped in the
/// standard output envelope.
pub fn calculate_loan_interest(
    loan: &LoanDetails,
    holding_years: u32,
) -> AnalyzerResult<ComputationOutput<LoanInterest>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let total_interest = interest_over_holding(loan, holding_years, &mut warnings);
    let interest = LoanInterest {
        total_interest,
        monthly_payment: level_payment(loan),
    };

    let assumptions = json!({
        "loan": loan,
        "holding_years": holding_years,
    });

    Ok(with_metadata(
        "Amortised Loan Interest Over Holding Period",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        interest,
    ))
}

/// Standard fixed-rate mortgage payment: P * r(1+r)^n / ((1+r)^n - 1)
pub fn monthly_payment(
    principal: Money,
    monthly_rate: Rate,
    total_months: u32,
) -> AnalyzerResult<Money> {
    if monthly_rate.is_zero() {
        // Interest-free: straight-line amortisation
        if total_months == 0 {
            return Err(AnalyzerError::DivisionByZero {
                context: "monthly payment with zero rate and zero months".into(),
            });
        }
        return Ok(principal / Decimal::from(total_months));
    }

    // (1 + r)^n via iterative multiplication
    let mut compound = Decimal::ONE;
    for _ in 0..total_months {
        compound = compound
            .checked_mul(Decimal::ONE + monthly_rate)
            .ok_or_else(|| AnalyzerError::InvalidInput {
                field: "term_years".into(),
                reason: "Amortisation term too long to compound".into(),
            })?;
    }

    let numerator = principal
        .checked_mul(monthly_rate)
        .and_then(|x| x.checked_mul(compound))
        .ok_or_else(|| AnalyzerError::InvalidInput {
            field: "principal".into(),
            reason: "Loan terms overflow decimal range".into(),
        })?;
    let denominator = compound - Decimal::ONE;

    if denominator.is_zero() {
        return Err(AnalyzerError::DivisionByZero {
            context: "mortgage payment denominator".into(),
        });
    }

    Ok(numerator / denominator)
}

/// Level payment for a declared loan, rounded to the cent. `None` when the
/// terms are degenerate and nothing amortises.
pub fn level_payment(loan: &LoanDetails) -> Option<Money> {
    if loan.principal <= Decimal::ZERO
        || loan.annual_interest_rate <= Decimal::ZERO
        || loan.term_years == 0
    {
        return None;
    }
    let monthly_rate = loan.annual_interest_rate / dec!(12);
    monthly_payment(loan.principal, monthly_rate, loan.term_years.saturating_mul(12))
        .ok()
        .map(|payment| payment.round_dp(2))
}

/// Total interest paid over the holding period of an amortising loan.
///
/// Payments stop at the earlier of the holding horizon and the full term.
/// Degenerate terms (non-positive principal or rate, zero term or holding)
/// accrue nothing and leave a warning; a zero-rate loan therefore reports
/// zero interest even though payments are still owed on it.
pub fn interest_over_holding(
    loan: &LoanDetails,
    holding_years: u32,
    warnings: &mut Vec<String>,
) -> Money {
    if loan.principal <= Decimal::ZERO
        || loan.annual_interest_rate <= Decimal::ZERO
        || loan.term_years == 0
        || holding_years == 0
    {
        warnings.push(
            "Loan interest treated as zero: interest accrues only for a positive principal, \
             rate, term, and holding period"
                .to_string(),
        );
        return Decimal::ZERO;
    }

    let monthly_rate = loan.annual_interest_rate / dec!(12);
    let total_months = loan.term_years.saturating_mul(12);
    let payments_made = holding_years.saturating_mul(12).min(total_months);

    let payment = match monthly_payment(loan.principal, monthly_rate, total_months) {
        Ok(p) => p,
        Err(e) => {
            warnings.push(format!("Loan interest treated as zero: {e}"));
            return Decimal::ZERO;
        }
    };

    // Walk the amortisation schedule to the end of the holding period
    let mut balance = loan.principal;
    let mut applied: u32 = 0;
    for _ in 0..payments_made {
        let interest = balance * monthly_rate;
        balance -= payment - interest;
        applied += 1;
        if balance <= Decimal::ZERO {
            balance = Decimal::ZERO;
            break;
        }
    }

    let principal_repaid = loan.principal - balance;
    let total_paid = match payment.checked_mul(Decimal::from(applied)) {
        Some(p) => p,
        None => {
            warnings.push("Loan interest treated as zero: payment total overflows".to_string());
            return Decimal::ZERO;
        }
    };

    (total_paid - principal_repaid).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::MathematicalOps;

    fn sample_loan() -> LoanDetails {
        LoanDetails {
            principal: dec!(300000),
            annual_interest_rate: dec!(0.035),
            term_years: 30,
        }
    }

    /// Closed-form interest over k payments, for cross-checking the
    /// schedule walk: k*M - (P - B_k) with B_k = P(1+i)^k - M((1+i)^k - 1)/i
    fn closed_form_interest(loan: &LoanDetails, holding_years: u32) -> Money {
        let i = loan.annual_interest_rate / dec!(12);
        let n = Decimal::from(loan.term_years * 12);
        let k_months = (holding_years * 12).min(loan.term_years * 12);
        let k = Decimal::from(k_months);

        let growth_n = (Decimal::ONE + i).powd(n);
        let m = loan.principal * i * growth_n / (growth_n - Decimal::ONE);

        let growth_k = (Decimal::ONE + i).powd(k);
        let balance = loan.principal * growth_k - m * (growth_k - Decimal::ONE) / i;

        (k * m - (loan.principal - balance)).max(Decimal::ZERO)
    }

    #[test]
    fn test_monthly_payment_benchmark() {
        // 300k at 3.5% over 30 years: the textbook payment is 1347.13
        let m = monthly_payment(dec!(300000), dec!(0.035) / dec!(12), 360).unwrap();
        assert!((m - dec!(1347.13)).abs() < dec!(0.01), "got {m}");
    }

    #[test]
    fn test_monthly_payment_zero_rate_is_straight_line() {
        let m = monthly_payment(dec!(120000), Decimal::ZERO, 120).unwrap();
        assert_eq!(m, dec!(1000));
    }

    #[test]
    fn test_monthly_payment_zero_rate_zero_months_errors() {
        let result = monthly_payment(dec!(120000), Decimal::ZERO, 0);
        assert!(matches!(
            result,
            Err(AnalyzerError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_level_payment_rounds_to_the_cent() {
        let payment = level_payment(&sample_loan()).unwrap();
        assert_eq!(payment, dec!(1347.13));
    }

    #[test]
    fn test_level_payment_absent_for_degenerate_terms() {
        let loan = LoanDetails {
            principal: dec!(200000),
            annual_interest_rate: Decimal::ZERO,
            term_years: 20,
        };
        assert_eq!(level_payment(&loan), None);
    }

    #[test]
    fn test_interest_matches_closed_form() {
        let loan = sample_loan();
        let mut warnings = Vec::new();
        for holding in [1u32, 3, 10, 30] {
            let walked = interest_over_holding(&loan, holding, &mut warnings);
            let expected = closed_form_interest(&loan, holding);
            let tolerance = expected * dec!(0.001);
            assert!(
                (walked - expected).abs() <= tolerance,
                "holding {holding}: walked {walked}, closed form {expected}"
            );
        }
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_interest_increases_with_holding() {
        let loan = sample_loan();
        let mut warnings = Vec::new();
        let short = interest_over_holding(&loan, 2, &mut warnings);
        let medium = interest_over_holding(&loan, 5, &mut warnings);
        let long = interest_over_holding(&loan, 15, &mut warnings);
        assert!(short < medium);
        assert!(medium < long);
    }

    #[test]
    fn test_interest_capped_at_full_term() {
        let loan = sample_loan();
        let mut warnings = Vec::new();
        let full = interest_over_holding(&loan, 30, &mut warnings);
        let beyond = interest_over_holding(&loan, 45, &mut warnings);
        assert_eq!(full, beyond);
    }

    #[test]
    fn test_zero_rate_loan_accrues_nothing() {
        let loan = LoanDetails {
            principal: dec!(200000),
            annual_interest_rate: Decimal::ZERO,
            term_years: 20,
        };
        let mut warnings = Vec::new();
        let interest = interest_over_holding(&loan, 5, &mut warnings);
        assert_eq!(interest, Decimal::ZERO);
        assert!(warnings.iter().any(|w| w.contains("treated as zero")));
    }

    #[test]
    fn test_zero_principal_accrues_nothing() {
        let loan = LoanDetails {
            principal: Decimal::ZERO,
            annual_interest_rate: dec!(0.04),
            term_years: 20,
        };
        let mut warnings = Vec::new();
        assert_eq!(
            interest_over_holding(&loan, 5, &mut warnings),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_zero_term_accrues_nothing() {
        let loan = LoanDetails {
            principal: dec!(100000),
            annual_interest_rate: dec!(0.04),
            term_years: 0,
        };
        let mut warnings = Vec::new();
        assert_eq!(
            interest_over_holding(&loan, 5, &mut warnings),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_zero_holding_accrues_nothing() {
        let loan = sample_loan();
        let mut warnings = Vec::new();
        assert_eq!(
            interest_over_holding(&loan, 0, &mut warnings),
            Decimal::ZERO
        );
    }
}
