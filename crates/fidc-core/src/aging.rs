//! Aging-bucket expected-loss model.
//!
//! Raw bucket shares are renormalised by their total before use, so inputs
//! that do not sum to 100% are accepted as-is. The blended annual loss rate
//! is the share-weighted provision rate:
//!
//! `blended = Σ (share_i / Σ share) × provision_i / 100`

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{clamp_recorded, Adjustment, Money, Rate, BUSINESS_DAYS_PER_YEAR};

const HUNDRED: Decimal = dec!(100);

/// Tolerance (in percentage points) before a raw total counts as "not 100".
const RENORMALISATION_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// One delinquency range of the receivables portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingBucket {
    /// Human-readable range, e.g. "0-30".
    pub label: String,
    /// Share of the portfolio in this range, in percent (need not sum to 100).
    pub raw_share_pct: Decimal,
    /// Provision rate for this range, in percent of the balance.
    pub provision_rate_pct: Decimal,
}

impl AgingBucket {
    pub fn new(label: &str, raw_share_pct: Decimal, provision_rate_pct: Decimal) -> Self {
        AgingBucket {
            label: label.to_string(),
            raw_share_pct,
            provision_rate_pct,
        }
    }
}

/// The internal provisioning policy: 95% current, a thin tail, 1.5% over 300 days.
pub fn default_buckets() -> Vec<AgingBucket> {
    vec![
        AgingBucket::new("0-30", dec!(95.0), dec!(0)),
        AgingBucket::new("31-60", dec!(0.5), dec!(5)),
        AgingBucket::new("61-90", dec!(0.5), dec!(15)),
        AgingBucket::new("91-120", dec!(0.5), dec!(20)),
        AgingBucket::new("121-150", dec!(0.5), dec!(40)),
        AgingBucket::new("151-180", dec!(0.5), dec!(50)),
        AgingBucket::new("181-240", dec!(0.5), dec!(70)),
        AgingBucket::new("241-300", dec!(0.5), dec!(85)),
        AgingBucket::new(">300", dec!(1.5), dec!(100)),
    ]
}

/// Per-bucket detail after normalisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketDetail {
    pub label: String,
    pub raw_share_pct: Decimal,
    /// Normalised share as a decimal (sums to 1 across buckets).
    pub normalized_share: Rate,
    /// Provision rate as a decimal.
    pub provision_rate: Rate,
    /// Contribution to the blended loss rate.
    pub loss_contribution: Rate,
}

/// Blended expected-loss model derived from an aging distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedLoss {
    pub buckets: Vec<BucketDetail>,
    /// Sum of the raw shares, in percent.
    pub raw_total_pct: Decimal,
    /// Blended annual loss rate as a decimal.
    pub blended_loss_rate: Rate,
    /// Raw total was zero: every share and the blended rate are zero.
    pub degenerate: bool,
    /// Raw total differed from 100 and shares were rescaled.
    pub renormalized: bool,
    pub adjustments: Vec<Adjustment>,
}

impl ExpectedLoss {
    /// Provisioning stock on a receivables balance: `receivables × blended`.
    pub fn provisioning_stock(&self, receivables: Money) -> Money {
        receivables * self.blended_loss_rate
    }

    /// Linear provisioning expense over `business_days`.
    pub fn provisioning_expense(&self, receivables: Money, business_days: Decimal) -> Money {
        receivables * self.blended_loss_rate * business_days / BUSINESS_DAYS_PER_YEAR
    }

    /// Expected loss per bucket on a receivables balance.
    pub fn bucket_losses(&self, receivables: Money) -> Vec<(String, Money)> {
        self.buckets
            .iter()
            .map(|b| (b.label.clone(), receivables * b.loss_contribution))
            .collect()
    }

    pub fn normalized_shares(&self) -> Vec<Rate> {
        self.buckets.iter().map(|b| b.normalized_share).collect()
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Normalise the bucket shares and blend the provision rates.
pub fn blend_expected_loss(buckets: &[AgingBucket]) -> ExpectedLoss {
    let mut adjustments = Vec::new();

    let sanitized: Vec<(String, Decimal, Decimal)> = buckets
        .iter()
        .map(|b| {
            let share = clamp_recorded(
                &format!("aging[{}].raw_share_pct", b.label),
                b.raw_share_pct,
                Decimal::ZERO,
                None,
                &mut adjustments,
            );
            let provision = clamp_recorded(
                &format!("aging[{}].provision_rate_pct", b.label),
                b.provision_rate_pct,
                Decimal::ZERO,
                Some(HUNDRED),
                &mut adjustments,
            );
            (b.label.clone(), share, provision)
        })
        .collect();

    let raw_total: Decimal = sanitized.iter().map(|(_, share, _)| *share).sum();
    let degenerate = raw_total.is_zero();
    let renormalized = !degenerate && (raw_total - HUNDRED).abs() > RENORMALISATION_TOLERANCE;

    if degenerate {
        warn!("aging distribution has zero total share; blended loss rate set to 0");
    }

    let details: Vec<BucketDetail> = sanitized
        .into_iter()
        .map(|(label, share, provision)| {
            let normalized_share = if degenerate {
                Decimal::ZERO
            } else {
                share / raw_total
            };
            let provision_rate = provision / HUNDRED;
            BucketDetail {
                label,
                raw_share_pct: share,
                normalized_share,
                provision_rate,
                loss_contribution: normalized_share * provision_rate,
            }
        })
        .collect();

    let blended_loss_rate = details.iter().map(|d| d.loss_contribution).sum();

    ExpectedLoss {
        buckets: details,
        raw_total_pct: raw_total,
        blended_loss_rate,
        degenerate,
        renormalized,
        adjustments,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_policy_blend() {
        let el = blend_expected_loss(&default_buckets());
        // 0.5 × (5+15+20+40+50+70+85) + 1.5 × 100 = 292.5 → 2.925%
        assert_eq!(el.raw_total_pct, dec!(100));
        assert_eq!(el.blended_loss_rate, dec!(0.02925));
        assert!(!el.renormalized);
        assert!(!el.degenerate);
    }

    #[test]
    fn test_normalized_shares_sum_to_one() {
        let buckets = vec![
            AgingBucket::new("a", dec!(30), dec!(1)),
            AgingBucket::new("b", dec!(30), dec!(10)),
            AgingBucket::new("c", dec!(10), dec!(50)),
        ];
        let el = blend_expected_loss(&buckets);
        let total: Decimal = el.normalized_shares().iter().sum();
        assert!((total - Decimal::ONE).abs() < dec!(0.000000001));
        assert!(el.renormalized);
        // (30×1 + 30×10 + 10×50) / 70 / 100 = 830/7000
        assert!((el.blended_loss_rate - dec!(830) / dec!(7000)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_all_zero_shares_degenerate() {
        let buckets = vec![
            AgingBucket::new("a", dec!(0), dec!(10)),
            AgingBucket::new("b", dec!(0), dec!(100)),
        ];
        let el = blend_expected_loss(&buckets);
        assert!(el.degenerate);
        assert_eq!(el.blended_loss_rate, Decimal::ZERO);
        assert!(el.normalized_shares().iter().all(|s| s.is_zero()));
    }

    #[test]
    fn test_empty_distribution_degenerate() {
        let el = blend_expected_loss(&[]);
        assert!(el.degenerate);
        assert_eq!(el.blended_loss_rate, Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_inputs_clamped_and_recorded() {
        let buckets = vec![
            AgingBucket::new("a", dec!(-5), dec!(10)),
            AgingBucket::new("b", dec!(100), dec!(150)),
        ];
        let el = blend_expected_loss(&buckets);
        assert_eq!(el.adjustments.len(), 2);
        assert_eq!(el.buckets[0].normalized_share, Decimal::ZERO);
        assert_eq!(el.buckets[1].provision_rate, Decimal::ONE);
        assert_eq!(el.blended_loss_rate, Decimal::ONE);
    }

    #[test]
    fn test_provisioning_helpers() {
        let el = blend_expected_loss(&default_buckets());
        let receivables = dec!(32_000_000);
        assert_eq!(el.provisioning_stock(receivables), dec!(936_000));
        assert_eq!(
            el.provisioning_expense(receivables, dec!(252)),
            el.provisioning_stock(receivables)
        );
        let losses = el.bucket_losses(receivables);
        assert_eq!(losses.len(), 9);
        assert_eq!(losses[0].1, Decimal::ZERO);
        assert_eq!(losses[8].1, dec!(480_000));
    }
}
