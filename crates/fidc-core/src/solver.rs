//! Portfolio-yield solver.
//!
//! The daily junior residual is affine in the monthly portfolio yield `y`:
//!
//! `residual(y) = residual(0) + receivables × y × 12 / 252`
//!
//! so both the breakeven yield and the yield for a target junior ROE are a
//! single division, with no iteration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fund::{FundStructure, RiskParameters};
use crate::rates::simple_daily_from_monthly;
use crate::types::{ratio_or_zero, Multiple, Period, Rate, BUSINESS_DAYS_PER_YEAR, MONTHS_PER_YEAR};
use crate::waterfall::{junior_annual_return, run_waterfall, WaterfallOptions};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub portfolio_yield: Rate,
    pub junior_annual_return: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashDeploymentPoint {
    pub cash_deployed_share: Rate,
    pub junior_annual_return: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakevenPoint {
    pub provisioning_multiplier: Multiple,
    pub breakeven_yield: Rate,
}

/// Junior annual return over a yield × loss-multiplier grid.
/// `junior_annual_returns[i][j]` pairs `multipliers[i]` with `yields[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapGrid {
    pub yields: Vec<Rate>,
    pub multipliers: Vec<Multiple>,
    pub junior_annual_returns: Vec<Vec<Rate>>,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Monthly yield at which the junior residual is exactly zero, floored at 0.
/// Zero when there are no receivables.
pub fn breakeven_portfolio_yield(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
) -> Rate {
    solve_for_daily_residual(structure, risk, blended_loss_rate, options, Decimal::ZERO)
        .map(|y| y.max(Decimal::ZERO))
        .unwrap_or(Decimal::ZERO)
}

/// Monthly yield giving an annual linear junior return of `target_annual_roe`.
/// Not floored; zero when there are no receivables.
pub fn required_yield_for_junior_roe(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
    target_annual_roe: Rate,
) -> Rate {
    let target_daily = target_annual_roe * structure.junior_principal / BUSINESS_DAYS_PER_YEAR;
    solve_for_daily_residual(structure, risk, blended_loss_rate, options, target_daily)
        .unwrap_or(Decimal::ZERO)
}

/// Junior annual return at each monthly yield.
pub fn yield_sensitivity(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
    yields: &[Rate],
) -> Vec<SensitivityPoint> {
    yields
        .iter()
        .map(|&portfolio_yield| SensitivityPoint {
            portfolio_yield,
            junior_annual_return: junior_annual_return(
                structure,
                &with_yield(risk, portfolio_yield),
                blended_loss_rate,
                options,
            ),
        })
        .collect()
}

/// Junior annual return at each share of the cash balance invested at the
/// reference rate. Shares are clamped to `[0, 1]`.
pub fn cash_deployment_sensitivity(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
    shares: &[Rate],
) -> Vec<CashDeploymentPoint> {
    shares
        .iter()
        .map(|&share| {
            let cash_deployed_share = share.max(Decimal::ZERO).min(Decimal::ONE);
            let deployed = WaterfallOptions {
                cash_deployed_share,
                ..options.clone()
            };
            CashDeploymentPoint {
                cash_deployed_share,
                junior_annual_return: junior_annual_return(
                    structure,
                    risk,
                    blended_loss_rate,
                    &deployed,
                ),
            }
        })
        .collect()
}

/// Percentage change in junior ROE per percentage change in yield, at the
/// current yield. Zero when the junior return or principal is zero.
pub fn junior_return_elasticity(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
) -> Multiple {
    let roe = junior_annual_return(structure, risk, blended_loss_rate, options);
    let receivables = structure.net_asset_value() * risk.receivables_share;
    let slope = ratio_or_zero(receivables * MONTHS_PER_YEAR, structure.junior_principal);
    ratio_or_zero(slope * risk.portfolio_yield, roe)
}

/// Breakeven yield at each provisioning multiplier.
pub fn breakeven_curve(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
    multipliers: &[Multiple],
) -> Vec<BreakevenPoint> {
    multipliers
        .iter()
        .map(|&provisioning_multiplier| {
            let stressed = WaterfallOptions {
                provisioning_multiplier,
                ..options.clone()
            };
            BreakevenPoint {
                provisioning_multiplier,
                breakeven_yield: breakeven_portfolio_yield(
                    structure,
                    risk,
                    blended_loss_rate,
                    &stressed,
                ),
            }
        })
        .collect()
}

/// Largest provisioning multiplier keeping the junior residual non-negative
/// at the current yield. `None` when provisioning is zero or switched off.
pub fn max_supportable_multiplier(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
) -> Option<Multiple> {
    let day = WaterfallOptions {
        period: Period::Day,
        provisioning_multiplier: Decimal::ONE,
        ..options.clone()
    };
    let wf = run_waterfall(structure, risk, blended_loss_rate, &day);
    if wf.provisioning.is_zero() {
        return None;
    }
    let before_provisioning = wf.junior_residual + wf.provisioning;
    Some((before_provisioning / wf.provisioning).max(Decimal::ZERO))
}

/// Junior annual return over every (multiplier, yield) pair.
pub fn yield_loss_heatmap(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
    yields: &[Rate],
    multipliers: &[Multiple],
) -> HeatmapGrid {
    let row = |multiplier: &Multiple| -> Vec<Rate> {
        let stressed = WaterfallOptions {
            provisioning_multiplier: *multiplier,
            ..options.clone()
        };
        yields
            .iter()
            .map(|&y| {
                junior_annual_return(structure, &with_yield(risk, y), blended_loss_rate, &stressed)
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let junior_annual_returns: Vec<Vec<Rate>> = {
        use rayon::prelude::*;
        multipliers.par_iter().map(row).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let junior_annual_returns: Vec<Vec<Rate>> = multipliers.iter().map(row).collect();

    debug!(
        rows = multipliers.len(),
        columns = yields.len(),
        "heatmap evaluated"
    );

    HeatmapGrid {
        yields: yields.to_vec(),
        multipliers: multipliers.to_vec(),
        junior_annual_returns,
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn with_yield(risk: &RiskParameters, portfolio_yield: Rate) -> RiskParameters {
    RiskParameters {
        portfolio_yield,
        ..risk.clone()
    }
}

/// Yield `y` with `residual(y) = target_daily`, or `None` without receivables.
fn solve_for_daily_residual(
    structure: &FundStructure,
    risk: &RiskParameters,
    blended_loss_rate: Rate,
    options: &WaterfallOptions,
    target_daily: Rate,
) -> Option<Rate> {
    let receivables = structure.net_asset_value() * risk.receivables_share;
    if receivables <= Decimal::ZERO {
        return None;
    }
    let day = WaterfallOptions {
        period: Period::Day,
        ..options.clone()
    };
    let constant = run_waterfall(
        structure,
        &with_yield(risk, Decimal::ZERO),
        blended_loss_rate,
        &day,
    )
    .junior_residual;
    let slope = receivables * simple_daily_from_monthly(Decimal::ONE);
    Some((target_daily - constant) / slope)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
