//! Presentation-ready regrouping of the calculator outputs. Pure
//! assembly: every subtotal here must equal the total reported by the
//! calculator that produced it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::costs::purchase::PurchaseCosts;
use crate::costs::running::RunningCosts;
use crate::loan::level_payment;
use crate::types::{CostBreakdown, LoanDetails, Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Structured report for one appreciation scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedBreakdown {
    pub purchase_costs: PurchaseSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_costs: Option<LoanSection>,
    pub running_costs: RunningSection,
    pub selling_costs: SellingSection,
    pub outcome: OutcomeSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseSection {
    /// Price, taxes, fees, and renovation lines
    pub items: BTreeMap<String, Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renovation_total: Option<Money>,
    pub total_purchase_costs: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSection {
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub term_years: u32,
    /// Level payment to two decimal places, absent for degenerate terms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
    pub total_interest_paid: Money,
    pub total_loan_costs: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningSection {
    pub annual_items: BTreeMap<String, Money>,
    pub period_items: BTreeMap<String, Money>,
    pub years_held: u32,
    pub total_running_costs: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellingSection {
    pub items: BTreeMap<String, Money>,
    pub total_selling_costs: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeSection {
    pub purchase_price: Money,
    pub total_investment: Money,
    pub selling_price: Money,
    /// Running costs plus loan interest plus selling costs
    pub total_costs: Money,
    pub raw_profit_loss: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_adjusted_profit_loss: Option<Money>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Regroup calculator outputs into the per-scenario report.
#[allow(clippy::too_many_arguments)]
pub fn assemble_breakdown(
    purchase: &PurchaseCosts,
    running: &RunningCosts,
    selling: &CostBreakdown,
    loan: Option<&LoanDetails>,
    total_loan_interest: Money,
    purchase_price: Money,
    selling_price: Money,
    net_profit_loss: Money,
    index_adjusted_profit_loss: Option<Money>,
) -> DetailedBreakdown {
    let renovation_total: Money = purchase
        .items
        .iter()
        .filter(|(item, _)| item.starts_with("renovation_"))
        .map(|(_, amount)| *amount)
        .sum();

    let purchase_costs = PurchaseSection {
        items: purchase.items.clone(),
        renovation_total: (renovation_total > Decimal::ZERO).then_some(renovation_total),
        total_purchase_costs: purchase.total_investment_cost,
    };

    let loan_costs = loan.map(|details| LoanSection {
        loan_amount: details.principal,
        interest_rate: details.annual_interest_rate,
        term_years: details.term_years,
        monthly_payment: level_payment(details),
        total_interest_paid: total_loan_interest,
        total_loan_costs: total_loan_interest,
    });

    let running_costs = RunningSection {
        annual_items: running.annual_items.clone(),
        period_items: running.period_items.clone(),
        years_held: running.effective_years,
        total_running_costs: running.total,
    };

    let selling_costs = SellingSection {
        items: selling.items.clone(),
        total_selling_costs: selling.total,
    };

    let outcome = OutcomeSection {
        purchase_price,
        total_investment: purchase.total_investment_cost,
        selling_price,
        total_costs: running.total + total_loan_interest + selling.total,
        raw_profit_loss: net_profit_loss,
        index_adjusted_profit_loss,
    };

    DetailedBreakdown {
        purchase_costs,
        loan_costs,
        running_costs,
        selling_costs,
        outcome,
    }
}
