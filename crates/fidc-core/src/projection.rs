//! Month-by-month projection.
//!
//! Each month opens on the previous month's closing balances, applies the
//! net subscriptions or redemptions of that month, and runs the waterfall at
//! month granularity. Senior and mezzanine capitalise their coupon; the
//! junior class capitalises the residual.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aging::blend_expected_loss;
use crate::fund::{FundSnapshot, FundStructure, RiskParameters};
use crate::types::{clamp_recorded, ratio_or_zero, Adjustment, Money, Period, Rate};
use crate::waterfall::{run_waterfall, WaterfallOptions};

pub const DEFAULT_PROJECTION_MONTHS: usize = 12;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Per-month deviations from the snapshot. Unset fields keep the snapshot value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthOverride {
    pub portfolio_yield: Option<Rate>,
    pub receivables_share: Option<Rate>,
    pub other_income: Option<Money>,
    pub other_costs: Option<Money>,
    /// Provisioning booked on top of the model charge.
    pub manual_provisioning: Money,
    /// Net subscription (+) or redemption (-) per class.
    pub junior_flow: Money,
    pub mezzanine_flow: Money,
    pub senior_flow: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub month: u32,
    pub opening_nav: Money,
    pub nav_after_flows: Money,
    pub receivables_balance: Money,
    pub portfolio_income: Money,
    pub cash_income: Money,
    pub other_income: Money,
    pub gross_income: Money,
    pub senior_cost: Money,
    pub mezzanine_cost: Money,
    pub admin_fee: Money,
    pub management_fee: Money,
    pub provisioning: Money,
    pub other_costs: Money,
    pub junior_result: Money,
    /// Junior result over junior balance after flows; zero when that is zero.
    pub junior_return: Rate,
    pub closing_senior: Money,
    pub closing_mezzanine: Money,
    pub closing_junior: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub rows: Vec<ProjectionRow>,
    pub total_junior_result: Money,
    pub total_provisioning: Money,
    pub closing_structure: FundStructure,
    pub adjustments: Vec<Adjustment>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project `months` months. Missing overrides leave that month on the
/// snapshot's parameters.
pub fn project_months(
    snapshot: &FundSnapshot,
    overrides: &[MonthOverride],
    months: usize,
) -> ProjectionResult {
    let (snap, mut adjustments) = snapshot.sanitized();
    let blended = blend_expected_loss(&snap.aging_buckets).blended_loss_rate;
    let options = WaterfallOptions {
        period: Period::Month,
        include_provisioning: snap.include_provisioning,
        ..Default::default()
    };
    let default_override = MonthOverride::default();

    let mut balances = snap.structure.clone();
    let mut rows = Vec::with_capacity(months);

    for index in 0..months {
        let month = index as u32 + 1;
        let ov = overrides.get(index).unwrap_or(&default_override);
        let opening_nav = balances.net_asset_value();

        let after_flows = FundStructure {
            senior_principal: apply_flow(
                month,
                "senior",
                balances.senior_principal,
                ov.senior_flow,
                &mut adjustments,
            ),
            mezzanine_principal: apply_flow(
                month,
                "mezzanine",
                balances.mezzanine_principal,
                ov.mezzanine_flow,
                &mut adjustments,
            ),
            junior_principal: apply_flow(
                month,
                "junior",
                balances.junior_principal,
                ov.junior_flow,
                &mut adjustments,
            ),
        };

        let risk = month_risk(&snap.risk, ov, month, &mut adjustments);
        let wf = run_waterfall(&after_flows, &risk, blended, &options);

        let manual = ov.manual_provisioning.max(Decimal::ZERO);
        let provisioning = wf.provisioning + manual;
        let junior_result = wf.junior_residual - manual;

        rows.push(ProjectionRow {
            month,
            opening_nav,
            nav_after_flows: after_flows.net_asset_value(),
            receivables_balance: wf.receivables_balance,
            portfolio_income: wf.portfolio_income,
            cash_income: wf.cash_income,
            other_income: wf.other_income,
            gross_income: wf.gross_income,
            senior_cost: wf.senior_cost,
            mezzanine_cost: wf.mezzanine_cost,
            admin_fee: wf.admin_fee,
            management_fee: wf.management_fee,
            provisioning,
            other_costs: wf.other_costs,
            junior_result,
            junior_return: ratio_or_zero(junior_result, after_flows.junior_principal),
            closing_senior: after_flows.senior_principal + wf.senior_cost,
            closing_mezzanine: after_flows.mezzanine_principal + wf.mezzanine_cost,
            closing_junior: after_flows.junior_principal + junior_result,
        });

        balances = FundStructure {
            senior_principal: after_flows.senior_principal + wf.senior_cost,
            mezzanine_principal: after_flows.mezzanine_principal + wf.mezzanine_cost,
            junior_principal: after_flows.junior_principal + junior_result,
        };
        if balances.junior_principal < Decimal::ZERO {
            warn!(month, junior = %balances.junior_principal, "junior class wiped out");
        }
    }

    let total_junior_result = rows.iter().map(|r| r.junior_result).sum();
    let total_provisioning = rows.iter().map(|r| r.provisioning).sum();
    debug!(months, total_junior_result = %total_junior_result, "projection complete");

    ProjectionResult {
        rows,
        total_junior_result,
        total_provisioning,
        closing_structure: balances,
        adjustments,
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Balance after a flow; a redemption larger than the balance is capped.
fn apply_flow(
    month: u32,
    class: &str,
    balance: Money,
    flow: Money,
    adjustments: &mut Vec<Adjustment>,
) -> Money {
    let after = balance + flow;
    if after < Decimal::ZERO && flow < Decimal::ZERO {
        adjustments.push(Adjustment::new(
            format!("month[{month}].{class}_flow"),
            flow,
            -balance.max(Decimal::ZERO),
            "redemption exceeds balance",
        ));
        return Decimal::ZERO;
    }
    after
}

fn month_risk(
    base: &RiskParameters,
    ov: &MonthOverride,
    month: u32,
    adjustments: &mut Vec<Adjustment>,
) -> RiskParameters {
    let mut clamp = |name: &str,
                     value: Option<Decimal>,
                     upper: Option<Decimal>,
                     fallback: Decimal| {
        value
            .map(|v| {
                clamp_recorded(
                    &format!("month[{month}].{name}"),
                    v,
                    Decimal::ZERO,
                    upper,
                    adjustments,
                )
            })
            .unwrap_or(fallback)
    };
    RiskParameters {
        portfolio_yield: clamp("portfolio_yield", ov.portfolio_yield, None, base.portfolio_yield),
        receivables_share: clamp(
            "receivables_share",
            ov.receivables_share,
            Some(Decimal::ONE),
            base.receivables_share,
        ),
        fixed_monthly_other_income: clamp(
            "other_income",
            ov.other_income,
            None,
            base.fixed_monthly_other_income,
        ),
        fixed_monthly_costs: clamp("other_costs", ov.other_costs, None, base.fixed_monthly_costs),
        ..base.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
