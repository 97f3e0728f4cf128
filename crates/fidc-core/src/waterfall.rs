//! Tranche waterfall.
//!
//! Every line is first computed per business day with simple interest and
//! then multiplied by the period's business-day count, so a daily result
//! times 252 is the yearly result line by line.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fund::{FundStructure, RiskParameters, Tranche};
use crate::rates::{simple_daily_from_annual, simple_daily_from_monthly};
use crate::types::{
    ratio_or_zero, Money, Multiple, Period, Rate, BUSINESS_DAYS_PER_MONTH, BUSINESS_DAYS_PER_YEAR,
    MONTHS_PER_YEAR,
};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Caller-side switches of a waterfall run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterfallOptions {
    pub period: Period,
    /// When false the provisioning line is zero; `expected_provisioning`
    /// still carries the risk figure.
    pub include_provisioning: bool,
    /// Stress factor applied to the blended loss rate.
    pub provisioning_multiplier: Multiple,
    /// Fraction of the cash balance actually earning the reference rate.
    pub cash_deployed_share: Rate,
}

impl Default for WaterfallOptions {
    fn default() -> Self {
        WaterfallOptions {
            period: Period::Day,
            include_provisioning: true,
            provisioning_multiplier: Decimal::ONE,
            cash_deployed_share: Decimal::ONE,
        }
    }
}

impl WaterfallOptions {
    pub fn for_period(period: Period) -> Self {
        WaterfallOptions {
            period,
            ..Default::default()
        }
    }
}

/// Income, costs and junior residual of one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallResult {
    pub period: Period,
    pub business_days: Decimal,
    pub receivables_balance: Money,
    pub cash_balance: Money,
    pub portfolio_income: Money,
    pub cash_income: Money,
    pub other_income: Money,
    pub gross_income: Money,
    pub senior_cost: Money,
    pub mezzanine_cost: Money,
    pub tranche_costs: Money,
    pub admin_fee: Money,
    pub management_fee: Money,
    pub other_costs: Money,
    pub fixed_costs: Money,
    /// Provisioning charged in this waterfall.
    pub provisioning: Money,
    /// Provisioning implied by the loss model whether charged or not.
    pub expected_provisioning: Money,
    /// May be negative; never clamped.
    pub junior_residual: Money,
    /// Residual over junior principal for the period (0 when junior is 0).
    pub junior_return: Rate,
}

/// One line of the rendered cascade, in waterfall order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeItem {
    PortfolioIncome,
    CashIncome,
    OtherIncome,
    SeniorCost,
    MezzanineCost,
    AdminFee,
    ManagementFee,
    Provisioning,
    OtherCosts,
    JuniorResidual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeLine {
    pub item: CascadeItem,
    /// Income positive, costs negative; the residual carries its own sign.
    pub amount: Money,
}

impl WaterfallResult {
    /// Signed lines whose income and cost entries sum to the residual.
    pub fn cascade(&self) -> Vec<CascadeLine> {
        let line = |item, amount| CascadeLine { item, amount };
        vec![
            line(CascadeItem::PortfolioIncome, self.portfolio_income),
            line(CascadeItem::CashIncome, self.cash_income),
            line(CascadeItem::OtherIncome, self.other_income),
            line(CascadeItem::SeniorCost, -self.senior_cost),
            line(CascadeItem::MezzanineCost, -self.mezzanine_cost),
            line(CascadeItem::AdminFee, -self.admin_fee),
            line(CascadeItem::ManagementFee, -self.management_fee),
            line(CascadeItem::Provisioning, -self.provisioning),
            line(CascadeItem::OtherCosts, -self.other_costs),
            line(CascadeItem::JuniorResidual, self.junior_residual),
        ]
    }

    /// Everything deducted from gross income before the junior residual.
    pub fn total_deductions(&self) -> Money {
        self.tranche_costs + self.fixed_costs + self.provisioning
    }
}

/// Linear return of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheReturn {
    pub tranche: Tranche,
    pub principal: Money,
    pub daily: Rate,
    pub monthly: Rate,
    pub annual: Rate,
}

/// Average yield on NAV, monthly and annualised linearly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavYield {
    pub gross_monthly: Rate,
    /// Gross less provisioning over NAV.
    pub net_monthly: Rate,
    pub gross_annual: Rate,
    pub net_annual: Rate,
}

/// Value-weighted annual cost of the fund's capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostOfCapital {
    pub senior_weight: Rate,
    pub mezzanine_weight: Rate,
    pub junior_weight: Rate,
    pub senior_rate: Rate,
    pub mezzanine_rate: Rate,
    pub junior_hurdle: Rate,
    pub annual: Rate,
    pub monthly: Rate,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Run the waterfall for `options.period`.
pub fn run_waterfall(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
) -> WaterfallResult {
    let daily = daily_lines(structure, risk, blended_loss_rate, options);
    let days = options.period.business_days();
    let scale = |v: Money| v * days;

    let portfolio_income = scale(daily.portfolio_income);
    let cash_income = scale(daily.cash_income);
    let other_income = scale(daily.other_income);
    let senior_cost = scale(daily.senior_cost);
    let mezzanine_cost = scale(daily.mezzanine_cost);
    let admin_fee = scale(daily.admin_fee);
    let management_fee = scale(daily.management_fee);
    let other_costs = scale(daily.other_costs);
    let expected_provisioning = scale(daily.provisioning);
    let provisioning = if options.include_provisioning {
        expected_provisioning
    } else {
        Decimal::ZERO
    };

    let gross_income = portfolio_income + cash_income + other_income;
    let tranche_costs = senior_cost + mezzanine_cost;
    let fixed_costs = admin_fee + management_fee + other_costs;
    let junior_residual = gross_income - tranche_costs - fixed_costs - provisioning;

    debug!(
        period = %options.period,
        gross_income = %gross_income,
        junior_residual = %junior_residual,
        "waterfall evaluated"
    );

    WaterfallResult {
        period: options.period,
        business_days: days,
        receivables_balance: daily.receivables_balance,
        cash_balance: daily.cash_balance,
        portfolio_income,
        cash_income,
        other_income,
        gross_income,
        senior_cost,
        mezzanine_cost,
        tranche_costs,
        admin_fee,
        management_fee,
        other_costs,
        fixed_costs,
        provisioning,
        expected_provisioning,
        junior_residual,
        junior_return: ratio_or_zero(junior_residual, structure.junior_principal),
    }
}

/// Linear daily, monthly and annual return of every class.
///
/// Senior and mezzanine earn their coupon; junior earns the daily residual
/// over its principal.
pub fn tranche_returns(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
) -> Vec<TrancheReturn> {
    let day = WaterfallOptions {
        period: Period::Day,
        ..options.clone()
    };
    let daily = run_waterfall(structure, risk, blended_loss_rate, &day);

    Tranche::ALL
        .iter()
        .map(|&tranche| {
            let daily_rate = match risk.coupon_rate(tranche) {
                Some(coupon) => simple_daily_from_annual(coupon),
                None => daily.junior_return,
            };
            TrancheReturn {
                tranche,
                principal: structure.principal(tranche),
                daily: daily_rate,
                monthly: daily_rate * BUSINESS_DAYS_PER_MONTH,
                annual: daily_rate * BUSINESS_DAYS_PER_YEAR,
            }
        })
        .collect()
}

/// Annual linear junior return: daily residual × 252 / junior.
pub fn junior_annual_return(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
) -> Rate {
    let year = WaterfallOptions {
        period: Period::Year,
        ..options.clone()
    };
    run_waterfall(structure, risk, blended_loss_rate, &year).junior_return
}

/// Average monthly yield on NAV, gross and net of provisioning.
pub fn nav_yield(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
) -> NavYield {
    let month = WaterfallOptions {
        period: Period::Month,
        include_provisioning: true,
        ..options.clone()
    };
    let wf = run_waterfall(structure, risk, blended_loss_rate, &month);
    let nav = structure.net_asset_value();

    let gross_monthly = ratio_or_zero(wf.portfolio_income + wf.cash_income, nav);
    let net_monthly = gross_monthly - ratio_or_zero(wf.provisioning, nav);
    NavYield {
        gross_monthly,
        net_monthly,
        gross_annual: gross_monthly * MONTHS_PER_YEAR,
        net_annual: net_monthly * MONTHS_PER_YEAR,
    }
}

/// Value-weighted opportunity cost: senior and mezzanine at their coupon,
/// junior at `junior_hurdle`.
pub fn cost_of_capital(
    structure: &FundStructure,
    risk: &RiskParameters,
    junior_hurdle: Rate,
) -> CostOfCapital {
    let senior_weight = structure.share(Tranche::Senior);
    let mezzanine_weight = structure.share(Tranche::Mezzanine);
    let junior_weight = structure.share(Tranche::Junior);
    let senior_rate = risk.reference_rate + risk.senior_spread;
    let mezzanine_rate = risk.reference_rate + risk.mezzanine_spread;

    let annual = senior_weight * senior_rate
        + mezzanine_weight * mezzanine_rate
        + junior_weight * junior_hurdle;

    CostOfCapital {
        senior_weight,
        mezzanine_weight,
        junior_weight,
        senior_rate,
        mezzanine_rate,
        junior_hurdle,
        annual,
        monthly: annual / MONTHS_PER_YEAR,
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

struct DailyLines {
    receivables_balance: Money,
    cash_balance: Money,
    portfolio_income: Money,
    cash_income: Money,
    other_income: Money,
    senior_cost: Money,
    mezzanine_cost: Money,
    admin_fee: Money,
    management_fee: Money,
    other_costs: Money,
    provisioning: Money,
}

fn daily_lines(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
) -> DailyLines {
    let nav = structure.net_asset_value();
    let receivables_balance = nav * risk.receivables_share;
    let cash_balance = nav - receivables_balance;
    let deployed = options.cash_deployed_share.max(Decimal::ZERO).min(dec!(1));
    let multiplier = options.provisioning_multiplier.max(Decimal::ZERO);

    let senior_rate = risk.reference_rate + risk.senior_spread;
    let mezzanine_rate = risk.reference_rate + risk.mezzanine_spread;

    DailyLines {
        receivables_balance,
        cash_balance,
        portfolio_income: receivables_balance * simple_daily_from_monthly(risk.portfolio_yield),
        cash_income: cash_balance * deployed * simple_daily_from_annual(risk.reference_rate),
        other_income: simple_daily_from_monthly(risk.fixed_monthly_other_income),
        senior_cost: structure.senior_principal * simple_daily_from_annual(senior_rate),
        mezzanine_cost: structure.mezzanine_principal * simple_daily_from_annual(mezzanine_rate),
        admin_fee: nav * simple_daily_from_annual(risk.admin_fee_rate),
        management_fee: nav * simple_daily_from_annual(risk.management_fee_rate),
        other_costs: simple_daily_from_monthly(risk.fixed_monthly_costs),
        provisioning: receivables_balance
            * simple_daily_from_annual(blended_loss_rate * multiplier),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
