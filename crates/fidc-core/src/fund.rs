//! Fund structure and parameter snapshot.
//!
//! A [`FundSnapshot`] is the complete, explicit input of every engine call.
//! All fields carry serde defaults so partial JSON documents and persisted
//! profiles with missing keys load into a usable snapshot.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aging::{default_buckets, AgingBucket};
use crate::types::{clamp_recorded, ratio_or_zero, Adjustment, Money, Rate};

/// Upper bound for the minimum subordination ratio. At 1 nothing can be
/// absorbed and the subordination module reports it as such.
pub const MAX_SUBORDINATION_RATIO: Rate = dec!(1);

// ---------------------------------------------------------------------------
// Tranches
// ---------------------------------------------------------------------------

/// Fund participation classes in seniority order (most senior first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tranche {
    Senior,
    Mezzanine,
    Junior,
}

impl Tranche {
    pub const ALL: [Tranche; 3] = [Tranche::Senior, Tranche::Mezzanine, Tranche::Junior];
}

impl std::fmt::Display for Tranche {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tranche::Senior => write!(f, "Senior"),
            Tranche::Mezzanine => write!(f, "Mezzanine"),
            Tranche::Junior => write!(f, "Junior"),
        }
    }
}

/// Principal outstanding in each class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundStructure {
    pub senior_principal: Money,
    pub mezzanine_principal: Money,
    pub junior_principal: Money,
}

impl Default for FundStructure {
    fn default() -> Self {
        FundStructure {
            senior_principal: dec!(20_000_000),
            mezzanine_principal: dec!(10_000_000),
            junior_principal: dec!(10_000_000),
        }
    }
}

impl FundStructure {
    pub fn new(senior: Money, mezzanine: Money, junior: Money) -> Self {
        FundStructure {
            senior_principal: senior,
            mezzanine_principal: mezzanine,
            junior_principal: junior,
        }
    }

    pub fn net_asset_value(&self) -> Money {
        self.senior_principal + self.mezzanine_principal + self.junior_principal
    }

    pub fn principal(&self, tranche: Tranche) -> Money {
        match tranche {
            Tranche::Senior => self.senior_principal,
            Tranche::Mezzanine => self.mezzanine_principal,
            Tranche::Junior => self.junior_principal,
        }
    }

    /// Share of NAV held by `tranche`; zero when NAV is zero.
    pub fn share(&self, tranche: Tranche) -> Rate {
        ratio_or_zero(self.principal(tranche), self.net_asset_value())
    }

    /// Junior / NAV.
    pub fn subordination_ratio(&self) -> Rate {
        self.share(Tranche::Junior)
    }

    fn sanitized(&self, adjustments: &mut Vec<Adjustment>) -> FundStructure {
        FundStructure {
            senior_principal: clamp_recorded(
                "senior_principal",
                self.senior_principal,
                Decimal::ZERO,
                None,
                adjustments,
            ),
            mezzanine_principal: clamp_recorded(
                "mezzanine_principal",
                self.mezzanine_principal,
                Decimal::ZERO,
                None,
                adjustments,
            ),
            junior_principal: clamp_recorded(
                "junior_principal",
                self.junior_principal,
                Decimal::ZERO,
                None,
                adjustments,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Risk parameters
// ---------------------------------------------------------------------------

/// Market, portfolio and fee assumptions. Rates are decimals; the portfolio
/// yield is monthly, every other rate is annual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParameters {
    /// Minimum junior / NAV ratio required by the fund's rules.
    pub minimum_subordination_ratio: Rate,
    /// Reference (CDI-like) annual rate.
    pub reference_rate: Rate,
    /// Portfolio yield on receivables, per month.
    pub portfolio_yield: Rate,
    /// Fraction of NAV invested in receivables; the rest sits in cash.
    pub receivables_share: Rate,
    /// Annual spread over the reference rate paid to the senior class.
    pub senior_spread: Rate,
    /// Annual spread over the reference rate paid to the mezzanine class.
    pub mezzanine_spread: Rate,
    /// Annual administration fee on NAV.
    pub admin_fee_rate: Rate,
    /// Annual management fee on NAV.
    pub management_fee_rate: Rate,
    /// Other fixed costs per month.
    pub fixed_monthly_costs: Money,
    /// Other fixed income per month (rebates, services).
    pub fixed_monthly_other_income: Money,
}

impl Default for RiskParameters {
    fn default() -> Self {
        RiskParameters {
            minimum_subordination_ratio: dec!(0.20),
            reference_rate: dec!(0.10),
            portfolio_yield: dec!(0.025),
            receivables_share: dec!(0.80),
            senior_spread: dec!(0.01),
            mezzanine_spread: dec!(0.025),
            admin_fee_rate: dec!(0.005),
            management_fee_rate: dec!(0.01),
            fixed_monthly_costs: Decimal::ZERO,
            fixed_monthly_other_income: Decimal::ZERO,
        }
    }
}

impl RiskParameters {
    /// Annual coupon of a debt-like class: reference + spread.
    pub fn coupon_rate(&self, tranche: Tranche) -> Option<Rate> {
        match tranche {
            Tranche::Senior => Some(self.reference_rate + self.senior_spread),
            Tranche::Mezzanine => Some(self.reference_rate + self.mezzanine_spread),
            Tranche::Junior => None,
        }
    }

    fn sanitized(&self, adjustments: &mut Vec<Adjustment>) -> RiskParameters {
        let non_negative = |field: &str, v: Decimal, adj: &mut Vec<Adjustment>| {
            clamp_recorded(field, v, Decimal::ZERO, None, adj)
        };
        RiskParameters {
            minimum_subordination_ratio: clamp_recorded(
                "minimum_subordination_ratio",
                self.minimum_subordination_ratio,
                Decimal::ZERO,
                Some(MAX_SUBORDINATION_RATIO),
                adjustments,
            ),
            reference_rate: non_negative("reference_rate", self.reference_rate, adjustments),
            portfolio_yield: non_negative("portfolio_yield", self.portfolio_yield, adjustments),
            receivables_share: clamp_recorded(
                "receivables_share",
                self.receivables_share,
                Decimal::ZERO,
                Some(Decimal::ONE),
                adjustments,
            ),
            senior_spread: non_negative("senior_spread", self.senior_spread, adjustments),
            mezzanine_spread: non_negative("mezzanine_spread", self.mezzanine_spread, adjustments),
            admin_fee_rate: non_negative("admin_fee_rate", self.admin_fee_rate, adjustments),
            management_fee_rate: non_negative(
                "management_fee_rate",
                self.management_fee_rate,
                adjustments,
            ),
            fixed_monthly_costs: non_negative(
                "fixed_monthly_costs",
                self.fixed_monthly_costs,
                adjustments,
            ),
            fixed_monthly_other_income: non_negative(
                "fixed_monthly_other_income",
                self.fixed_monthly_other_income,
                adjustments,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Fund rules evaluated as status flags, never as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundPolicy {
    /// Minimum fraction of NAV that must sit in receivables.
    pub minimum_receivables_share: Rate,
    /// Annual return the junior class is expected to earn (opportunity cost).
    pub junior_hurdle_rate: Rate,
    /// Optional annual junior ROE target fed to the rate solver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_junior_roe: Option<Rate>,
}

impl Default for FundPolicy {
    fn default() -> Self {
        FundPolicy {
            minimum_receivables_share: dec!(0.67),
            junior_hurdle_rate: dec!(0.20),
            target_junior_roe: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything an evaluation needs, in one flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundSnapshot {
    #[serde(flatten)]
    pub structure: FundStructure,
    #[serde(flatten)]
    pub risk: RiskParameters,
    #[serde(flatten)]
    pub policy: FundPolicy,
    pub aging_buckets: Vec<AgingBucket>,
    /// Charge provisioning in the waterfall. The risk figure is unaffected.
    pub include_provisioning: bool,
}

impl Default for FundSnapshot {
    fn default() -> Self {
        FundSnapshot {
            structure: FundStructure::default(),
            risk: RiskParameters::default(),
            policy: FundPolicy::default(),
            aging_buckets: default_buckets(),
            include_provisioning: true,
        }
    }
}

impl FundSnapshot {
    pub fn net_asset_value(&self) -> Money {
        self.structure.net_asset_value()
    }

    /// Copy with every out-of-range field moved to its nearest boundary.
    /// Each move is returned as an [`Adjustment`] and logged.
    pub fn sanitized(&self) -> (FundSnapshot, Vec<Adjustment>) {
        let mut adjustments = Vec::new();
        let structure = self.structure.sanitized(&mut adjustments);
        let risk = self.risk.sanitized(&mut adjustments);
        let policy = FundPolicy {
            minimum_receivables_share: clamp_recorded(
                "minimum_receivables_share",
                self.policy.minimum_receivables_share,
                Decimal::ZERO,
                Some(Decimal::ONE),
                &mut adjustments,
            ),
            junior_hurdle_rate: clamp_recorded(
                "junior_hurdle_rate",
                self.policy.junior_hurdle_rate,
                Decimal::ZERO,
                None,
                &mut adjustments,
            ),
            target_junior_roe: self.policy.target_junior_roe,
        };
        for adj in &adjustments {
            warn!(
                field = %adj.field,
                original = %adj.original,
                applied = %adj.applied,
                "parameter clamped"
            );
        }
        (
            FundSnapshot {
                structure,
                risk,
                policy,
                aging_buckets: self.aging_buckets.clone(),
                include_provisioning: self.include_provisioning,
            },
            adjustments,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_structure_nav_and_shares() {
        let s = FundStructure::default();
        assert_eq!(s.net_asset_value(), dec!(40_000_000));
        assert_eq!(s.share(Tranche::Senior), dec!(0.5));
        assert_eq!(s.subordination_ratio(), dec!(0.25));
    }

    #[test]
    fn test_zero_nav_shares_are_zero() {
        let s = FundStructure::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(s.subordination_ratio(), Decimal::ZERO);
    }

    #[test]
    fn test_seniority_order_is_fixed() {
        let mut tranches = vec![Tranche::Junior, Tranche::Senior, Tranche::Mezzanine];
        tranches.sort();
        assert_eq!(tranches, Tranche::ALL.to_vec());
    }

    #[test]
    fn test_coupon_rates() {
        let r = RiskParameters::default();
        assert_eq!(r.coupon_rate(Tranche::Senior), Some(dec!(0.11)));
        assert_eq!(r.coupon_rate(Tranche::Mezzanine), Some(dec!(0.125)));
        assert_eq!(r.coupon_rate(Tranche::Junior), None);
    }

    #[test]
    fn test_sanitize_clean_snapshot_has_no_adjustments() {
        let (clean, adj) = FundSnapshot::default().sanitized();
        assert!(adj.is_empty());
        assert_eq!(clean, FundSnapshot::default());
    }

    #[test]
    fn test_sanitize_clamps_and_records() {
        let mut snap = FundSnapshot::default();
        snap.risk.reference_rate = dec!(-0.02);
        snap.risk.receivables_share = dec!(1.3);
        snap.risk.minimum_subordination_ratio = dec!(1.5);
        snap.structure.junior_principal = dec!(-1);
        let (clean, adj) = snap.sanitized();
        assert_eq!(clean.risk.reference_rate, Decimal::ZERO);
        assert_eq!(clean.risk.receivables_share, Decimal::ONE);
        assert_eq!(clean.risk.minimum_subordination_ratio, Decimal::ONE);
        assert_eq!(clean.structure.junior_principal, Decimal::ZERO);
        let fields: Vec<&str> = adj.iter().map(|a| a.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "junior_principal",
                "minimum_subordination_ratio",
                "reference_rate",
                "receivables_share"
            ]
        );
    }

    #[test]
    fn test_snapshot_missing_keys_fall_back_to_defaults() {
        let json = r#"{ "junior_principal": "12000000", "portfolio_yield": "0.03" }"#;
        let snap: FundSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.structure.junior_principal, dec!(12_000_000));
        assert_eq!(snap.structure.senior_principal, dec!(20_000_000));
        assert_eq!(snap.risk.portfolio_yield, dec!(0.03));
        assert_eq!(snap.risk.reference_rate, dec!(0.10));
        assert_eq!(snap.aging_buckets.len(), 9);
        assert!(snap.include_provisioning);
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let value = serde_json::to_value(FundSnapshot::default()).unwrap();
        let map = value.as_object().unwrap();
        assert!(map.contains_key("senior_principal"));
        assert!(map.contains_key("minimum_subordination_ratio"));
        assert!(map.contains_key("minimum_receivables_share"));
        assert!(!map.contains_key("structure"));
    }
}
