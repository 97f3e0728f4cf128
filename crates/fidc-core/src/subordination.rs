//! Subordination and loss absorption.
//!
//! The junior class absorbs losses first. The largest loss `L` that keeps
//! the fund at its minimum ratio `s` solves `(J - L) / (N - L) = s`:
//!
//! `L = (J - s·N) / (1 - s)`, clamped to `[0, J]`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fund::{FundStructure, MAX_SUBORDINATION_RATIO};
use crate::types::{clamp_recorded, ratio_or_zero, Adjustment, Money, Multiple, Rate};

/// Floor for the post-loss NAV denominator.
const NAV_EPSILON: Money = dec!(0.000001);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubordinationStatus {
    /// Current ratio at or above the minimum.
    Compliant,
    /// Current ratio already below the minimum.
    BelowMinimum,
    /// Minimum ratio of 100%: no loss can be absorbed.
    NothingAbsorbable,
}

/// Issuance capacity for senior and mezzanine classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuanceHeadroom {
    /// `junior / minRatio`; zero when unbounded.
    pub max_net_asset_value: Money,
    /// May be negative when the fund is already over-levered.
    pub headroom: Money,
    /// Minimum ratio of zero places no cap on issuance.
    pub unbounded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubordinationState {
    pub net_asset_value: Money,
    pub junior_principal: Money,
    pub minimum_ratio: Rate,
    pub current_ratio: Rate,
    /// Annual expected-loss stock the limit is compared against.
    pub expected_loss: Money,
    pub max_absorbable_loss: Money,
    /// `max_absorbable_loss / expected_loss`; zero when expected loss is zero.
    pub rupture_multiple: Multiple,
    pub no_expected_loss: bool,
    /// `max_absorbable_loss - expected_loss`.
    pub safety_margin: Money,
    /// Loss limit over the receivables balance.
    pub limit_share_of_receivables: Rate,
    /// Junior principal over expected loss; zero when expected loss is zero.
    pub junior_coverage: Multiple,
    /// Ratio after the expected loss hits the junior class.
    pub post_loss_ratio: Rate,
    /// Capital that restores the minimum after the expected loss.
    pub required_top_up: Money,
    pub issuance: IssuanceHeadroom,
    pub status: SubordinationStatus,
    /// Expected loss already exceeds what the junior class can absorb.
    pub breached_at_expected_loss: bool,
    pub adjustments: Vec<Adjustment>,
}

/// One point of a loss-multiplier stress run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressPoint {
    pub multiplier: Multiple,
    pub loss: Money,
    pub post_loss_ratio: Rate,
    /// `max_absorbable_loss - loss`.
    pub remaining_margin: Money,
    pub compliant: bool,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// `max(J - loss, 0) / max(N - loss, ε)`
pub fn current_ratio(structure: &FundStructure, loss: Money) -> Rate {
    let junior = (structure.junior_principal - loss).max(Decimal::ZERO);
    let nav = (structure.net_asset_value() - loss).max(NAV_EPSILON);
    junior / nav
}

/// Largest loss keeping the ratio at `min_ratio`, clamped to `[0, junior]`.
pub fn max_absorbable_loss(structure: &FundStructure, min_ratio: Rate) -> Money {
    let s = min_ratio.max(Decimal::ZERO);
    if s >= MAX_SUBORDINATION_RATIO {
        return Decimal::ZERO;
    }
    let junior = structure.junior_principal;
    let limit = (junior - s * structure.net_asset_value()) / (Decimal::ONE - s);
    limit.max(Decimal::ZERO).min(junior)
}

/// Capital `X` with `(J - loss + X) / (N - loss + X) = min_ratio`, when the
/// post-loss ratio is below the minimum; otherwise zero.
pub fn required_top_up(structure: &FundStructure, min_ratio: Rate, loss: Money) -> Money {
    let s = min_ratio.max(Decimal::ZERO);
    if s >= MAX_SUBORDINATION_RATIO || current_ratio(structure, loss) >= s {
        return Decimal::ZERO;
    }
    let junior_after = (structure.junior_principal - loss).max(Decimal::ZERO);
    let nav_after = (structure.net_asset_value() - loss).max(Decimal::ZERO);
    ((s * nav_after - junior_after) / (Decimal::ONE - s)).max(Decimal::ZERO)
}

/// How much more senior/mezzanine capital the junior class can support.
pub fn issuance_headroom(structure: &FundStructure, min_ratio: Rate) -> IssuanceHeadroom {
    let s = min_ratio.max(Decimal::ZERO);
    if s.is_zero() {
        return IssuanceHeadroom {
            max_net_asset_value: Decimal::ZERO,
            headroom: Decimal::ZERO,
            unbounded: true,
        };
    }
    let max_nav = structure.junior_principal / s;
    IssuanceHeadroom {
        max_net_asset_value: max_nav,
        headroom: max_nav - structure.net_asset_value(),
        unbounded: false,
    }
}

/// Full subordination picture against an expected-loss stock.
pub fn evaluate_subordination(
    structure: &FundStructure,
    min_ratio: Rate,
    expected_loss: Money,
    receivables_balance: Money,
) -> SubordinationState {
    let mut adjustments = Vec::new();
    let s = clamp_recorded(
        "minimum_subordination_ratio",
        min_ratio,
        Decimal::ZERO,
        Some(MAX_SUBORDINATION_RATIO),
        &mut adjustments,
    );
    let expected_loss = clamp_recorded(
        "expected_loss",
        expected_loss,
        Decimal::ZERO,
        None,
        &mut adjustments,
    );

    let current = current_ratio(structure, Decimal::ZERO);
    let limit = max_absorbable_loss(structure, s);
    let no_expected_loss = expected_loss.is_zero();
    let rupture_multiple = ratio_or_zero(limit, expected_loss);

    let status = if s >= MAX_SUBORDINATION_RATIO {
        SubordinationStatus::NothingAbsorbable
    } else if current < s {
        SubordinationStatus::BelowMinimum
    } else {
        SubordinationStatus::Compliant
    };
    let breached_at_expected_loss = expected_loss > limit;

    match status {
        SubordinationStatus::BelowMinimum => {
            warn!(current = %current, minimum = %s, "subordination below minimum")
        }
        SubordinationStatus::NothingAbsorbable => {
            warn!("minimum subordination ratio of 100% leaves nothing absorbable")
        }
        SubordinationStatus::Compliant => {}
    }
    debug!(limit = %limit, rupture_multiple = %rupture_multiple, "subordination evaluated");

    SubordinationState {
        net_asset_value: structure.net_asset_value(),
        junior_principal: structure.junior_principal,
        minimum_ratio: s,
        current_ratio: current,
        expected_loss,
        max_absorbable_loss: limit,
        rupture_multiple,
        no_expected_loss,
        safety_margin: limit - expected_loss,
        limit_share_of_receivables: ratio_or_zero(limit, receivables_balance),
        junior_coverage: ratio_or_zero(structure.junior_principal, expected_loss),
        post_loss_ratio: current_ratio(structure, expected_loss),
        required_top_up: required_top_up(structure, s, expected_loss),
        issuance: issuance_headroom(structure, s),
        status,
        breached_at_expected_loss,
        adjustments,
    }
}

/// Post-loss ratio and margin at each multiple of the expected loss.
pub fn stress_curve(
    structure: &FundStructure,
    min_ratio: Rate,
    expected_loss: Money,
    multipliers: &[Multiple],
) -> Vec<StressPoint> {
    let s = min_ratio.max(Decimal::ZERO).min(MAX_SUBORDINATION_RATIO);
    let limit = max_absorbable_loss(structure, s);
    multipliers
        .iter()
        .map(|&multiplier| {
            let loss = expected_loss.max(Decimal::ZERO) * multiplier.max(Decimal::ZERO);
            let post_loss_ratio = current_ratio(structure, loss);
            StressPoint {
                multiplier,
                loss,
                post_loss_ratio,
                remaining_margin: limit - loss,
                compliant: s < MAX_SUBORDINATION_RATIO && post_loss_ratio >= s,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
