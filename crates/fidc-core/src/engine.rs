//! Fund evaluation: one snapshot in, the full report out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::aging::{blend_expected_loss, ExpectedLoss};
use crate::fund::FundSnapshot;
use crate::solver::{
    breakeven_portfolio_yield, junior_return_elasticity, max_supportable_multiplier,
    required_yield_for_junior_roe,
};
use crate::subordination::{evaluate_subordination, SubordinationState, SubordinationStatus};
use crate::types::{with_metadata, Adjustment, ComputationOutput, Money, Multiple, Period, Rate};
use crate::waterfall::{
    cost_of_capital, nav_yield, run_waterfall, tranche_returns, CascadeLine, CostOfCapital,
    NavYield, TrancheReturn, WaterfallOptions, WaterfallResult,
};

// ---------------------------------------------------------------------------
// Prepared snapshot
// ---------------------------------------------------------------------------

/// A sanitized snapshot with its expected-loss model, shared by every
/// evaluation path.
#[derive(Debug, Clone)]
pub struct FundContext {
    pub snapshot: FundSnapshot,
    pub adjustments: Vec<Adjustment>,
    pub expected_loss: ExpectedLoss,
}

impl FundContext {
    pub fn new(snapshot: &FundSnapshot) -> Self {
        let (snapshot, mut adjustments) = snapshot.sanitized();
        let expected_loss = blend_expected_loss(&snapshot.aging_buckets);
        adjustments.extend(expected_loss.adjustments.iter().cloned());
        FundContext {
            snapshot,
            adjustments,
            expected_loss,
        }
    }

    pub fn blended_loss_rate(&self) -> Rate {
        self.expected_loss.blended_loss_rate
    }

    pub fn receivables_balance(&self) -> Money {
        self.snapshot.net_asset_value() * self.snapshot.risk.receivables_share
    }

    /// Annual expected-loss stock on the receivables balance.
    pub fn provisioning_stock(&self) -> Money {
        self.expected_loss
            .provisioning_stock(self.receivables_balance())
    }

    pub fn options(&self, period: Period) -> WaterfallOptions {
        WaterfallOptions {
            period,
            include_provisioning: self.snapshot.include_provisioning,
            ..Default::default()
        }
    }

    pub fn waterfall(&self, period: Period) -> WaterfallResult {
        run_waterfall(
            &self.snapshot.structure,
            &self.snapshot.risk,
            self.blended_loss_rate(),
            &self.options(period),
        )
    }

    pub fn subordination(&self) -> SubordinationState {
        evaluate_subordination(
            &self.snapshot.structure,
            self.snapshot.risk.minimum_subordination_ratio,
            self.provisioning_stock(),
            self.receivables_balance(),
        )
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyFlags {
    pub subordination_below_minimum: bool,
    pub expected_loss_exceeds_limit: bool,
    pub receivables_below_minimum: bool,
    pub negative_junior_residual: bool,
    pub degenerate_aging: bool,
}

impl PolicyFlags {
    pub fn any(&self) -> bool {
        self.subordination_below_minimum
            || self.expected_loss_exceeds_limit
            || self.receivables_below_minimum
            || self.negative_junior_residual
            || self.degenerate_aging
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldTargets {
    pub current_yield: Rate,
    pub breakeven_yield: Rate,
    /// Present when the snapshot carries a junior ROE target.
    pub target_junior_roe: Option<Rate>,
    pub required_yield_for_target: Option<Rate>,
    /// `None` when provisioning is zero or switched off.
    pub max_supportable_loss_multiplier: Option<Multiple>,
    pub junior_return_elasticity: Multiple,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundReport {
    pub net_asset_value: Money,
    pub receivables_balance: Money,
    pub expected_loss: ExpectedLoss,
    pub provisioning_stock: Money,
    pub daily: WaterfallResult,
    pub monthly: WaterfallResult,
    pub yearly: WaterfallResult,
    pub monthly_cascade: Vec<CascadeLine>,
    pub tranche_returns: Vec<TrancheReturn>,
    pub nav_yield: NavYield,
    pub cost_of_capital: CostOfCapital,
    pub subordination: SubordinationState,
    pub yields: YieldTargets,
    pub flags: PolicyFlags,
    pub adjustments: Vec<Adjustment>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Evaluate a snapshot end to end. Never fails: out-of-range inputs are
/// clamped and reported, policy breaches come back as flags.
pub fn evaluate_fund(snapshot: &FundSnapshot) -> ComputationOutput<FundReport> {
    let start = Instant::now();
    let ctx = FundContext::new(snapshot);
    let snap = &ctx.snapshot;
    let blended = ctx.blended_loss_rate();
    let options = ctx.options(Period::Day);

    let daily = ctx.waterfall(Period::Day);
    let monthly = ctx.waterfall(Period::Month);
    let yearly = ctx.waterfall(Period::Year);
    let subordination = ctx.subordination();

    let structure = &snap.structure;
    let risk = &snap.risk;
    let yields = YieldTargets {
        current_yield: risk.portfolio_yield,
        breakeven_yield: breakeven_portfolio_yield(structure, risk, blended, &options),
        target_junior_roe: snap.policy.target_junior_roe,
        required_yield_for_target: snap
            .policy
            .target_junior_roe
            .map(|roe| required_yield_for_junior_roe(structure, risk, blended, &options, roe)),
        max_supportable_loss_multiplier: max_supportable_multiplier(
            structure, risk, blended, &options,
        ),
        junior_return_elasticity: junior_return_elasticity(structure, risk, blended, &options),
    };

    let flags = PolicyFlags {
        subordination_below_minimum: subordination.status == SubordinationStatus::BelowMinimum,
        expected_loss_exceeds_limit: subordination.breached_at_expected_loss,
        receivables_below_minimum: risk.receivables_share
            < snap.policy.minimum_receivables_share,
        negative_junior_residual: daily.junior_residual < Decimal::ZERO,
        degenerate_aging: ctx.expected_loss.degenerate,
    };

    let mut warnings: Vec<String> = ctx.adjustments.iter().map(|a| a.to_string()).collect();
    if flags.subordination_below_minimum {
        warnings.push(format!(
            "Subordination {} below minimum {}",
            subordination.current_ratio.round_dp(4),
            subordination.minimum_ratio
        ));
    }
    if subordination.status == SubordinationStatus::NothingAbsorbable {
        warnings.push("Minimum subordination of 100%: no loss absorbable".into());
    }
    if flags.expected_loss_exceeds_limit {
        warnings.push("Expected loss exceeds the maximum absorbable loss".into());
    }
    if flags.receivables_below_minimum {
        warnings.push(format!(
            "Receivables allocation {} below the minimum {}",
            risk.receivables_share, snap.policy.minimum_receivables_share
        ));
    }
    if flags.negative_junior_residual {
        warnings.push("Negative junior residual: junior class is eroding".into());
    }
    if flags.degenerate_aging {
        warnings.push("Aging distribution totals zero: expected loss set to 0".into());
    }
    if ctx.expected_loss.renormalized {
        warnings.push(format!(
            "Aging shares total {}%, renormalized to 100%",
            ctx.expected_loss.raw_total_pct
        ));
    }
    if flags.any() {
        warn!(?flags, "fund evaluation raised policy flags");
    }

    let report = FundReport {
        net_asset_value: snap.net_asset_value(),
        receivables_balance: ctx.receivables_balance(),
        provisioning_stock: ctx.provisioning_stock(),
        expected_loss: ctx.expected_loss.clone(),
        monthly_cascade: monthly.cascade(),
        tranche_returns: tranche_returns(structure, risk, blended, &options),
        nav_yield: nav_yield(structure, risk, blended, &options),
        cost_of_capital: cost_of_capital(structure, risk, snap.policy.junior_hurdle_rate),
        daily,
        monthly,
        yearly,
        subordination,
        yields,
        flags,
        adjustments: ctx.adjustments.clone(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    debug!(elapsed_us = elapsed, "fund evaluated");
    with_metadata(
        "Receivables fund: linear tranche waterfall, aging-bucket expected loss, subordination limits",
        &serde_json::json!({
            "accrual": "simple interest, 252 business days, 21 per month",
            "net_asset_value": snap.net_asset_value().to_string(),
            "blended_loss_rate": blended.to_string(),
            "include_provisioning": snap.include_provisioning,
            "minimum_subordination_ratio": risk.minimum_subordination_ratio.to_string(),
        }),
        warnings,
        elapsed,
        report,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aging::AgingBucket;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_fund_report() {
        let out = evaluate_fund(&FundSnapshot::default());
        let r = &out.result;
        assert_eq!(r.net_asset_value, dec!(40_000_000));
        assert_eq!(r.receivables_balance, dec!(32_000_000));
        assert_eq!(r.provisioning_stock, dec!(936_000));
        assert!(r.daily.junior_residual > Decimal::ZERO);
        assert_eq!(r.subordination.status, SubordinationStatus::Compliant);
        assert!(!r.flags.any());
        assert!(out.warnings.is_empty());
        assert_eq!(r.tranche_returns.len(), 3);
        assert_eq!(r.monthly_cascade.len(), 10);
        assert!(r.yields.required_yield_for_target.is_none());
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_target_roe_reported() {
        let mut snap = FundSnapshot::default();
        snap.policy.target_junior_roe = Some(dec!(0.30));
        let out = evaluate_fund(&snap);
        let y = out.result.yields.required_yield_for_target.unwrap();
        assert!(y < snap.risk.portfolio_yield);
        assert!(y > out.result.yields.breakeven_yield);
    }

    #[test]
    fn test_flags_and_warnings() {
        let mut snap = FundSnapshot::default();
        snap.risk.receivables_share = dec!(0.5);
        snap.risk.portfolio_yield = dec!(0.005);
        snap.risk.reference_rate = dec!(-0.01);
        snap.structure.junior_principal = dec!(4_000_000);
        let out = evaluate_fund(&snap);
        let flags = &out.result.flags;
        assert!(flags.receivables_below_minimum);
        assert!(flags.negative_junior_residual);
        assert!(flags.subordination_below_minimum);
        assert_eq!(out.result.adjustments.len(), 1);
        assert!(out.warnings.iter().any(|w| w.contains("reference_rate")));
    }

    #[test]
    fn test_degenerate_aging_flagged() {
        let mut snap = FundSnapshot::default();
        snap.aging_buckets = vec![AgingBucket::new("0-30", dec!(0), dec!(0))];
        let out = evaluate_fund(&snap);
        assert!(out.result.flags.degenerate_aging);
        assert_eq!(out.result.provisioning_stock, Decimal::ZERO);
        assert!(out.result.subordination.no_expected_loss);
        assert_eq!(out.result.yields.max_supportable_loss_multiplier, None);
    }
}
