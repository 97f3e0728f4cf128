//! Credit rating and pricing of receivables originated into the fund.
//!
//! A logistic score maps counterparty factors to an annual PD, the PD to a
//! bucket on an ordered scale, and the bucket to a spread. The offered rate
//! is an additive monthly waterfall whose terms are reported one by one.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FidcError;
use crate::types::{Rate, BUSINESS_DAYS_PER_YEAR, MONTHS_PER_YEAR};
use crate::FidcResult;

/// Scores beyond this magnitude saturate the logistic curve.
const SCORE_LIMIT: Decimal = dec!(40);

// ---------------------------------------------------------------------------
// Rating scale
// ---------------------------------------------------------------------------

/// Ordered credit scale, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreditRating {
    AA,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl std::fmt::Display for CreditRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CreditRating::AA => "AA",
            CreditRating::A => "A",
            CreditRating::B => "B",
            CreditRating::C => "C",
            CreditRating::D => "D",
            CreditRating::E => "E",
            CreditRating::F => "F",
            CreditRating::G => "G",
            CreditRating::H => "H",
        };
        write!(f, "{label}")
    }
}

/// One rung of the rating scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingCut {
    pub rating: CreditRating,
    /// Highest annual PD still mapped to this rating.
    pub pd_ceiling: Rate,
    /// Annual spread charged at this rating.
    pub annual_spread: Rate,
}

impl RatingCut {
    pub fn new(rating: CreditRating, pd_ceiling: Rate, annual_spread: Rate) -> Self {
        RatingCut {
            rating,
            pd_ceiling,
            annual_spread,
        }
    }
}

pub fn standard_scale() -> Vec<RatingCut> {
    use CreditRating::*;
    vec![
        RatingCut::new(AA, dec!(0.005), dec!(0)),
        RatingCut::new(A, dec!(0.01), dec!(0.005)),
        RatingCut::new(B, dec!(0.03), dec!(0.01)),
        RatingCut::new(C, dec!(0.05), dec!(0.02)),
        RatingCut::new(D, dec!(0.10), dec!(0.035)),
        RatingCut::new(E, dec!(0.20), dec!(0.05)),
        RatingCut::new(F, dec!(0.35), dec!(0.08)),
        RatingCut::new(G, dec!(0.60), dec!(0.12)),
        RatingCut::new(H, dec!(1), dec!(0.18)),
    ]
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Counterparty factors fed to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFactors {
    /// Current ratio (current assets / current liabilities).
    pub liquidity: Decimal,
    /// Net debt / EBITDA.
    pub leverage: Decimal,
    /// EBITDA margin as a decimal.
    pub margin: Decimal,
    /// Years of relationship with the fund.
    pub relationship_years: Decimal,
    /// Any delinquency in the recent window.
    pub recent_delinquency: bool,
    /// Share of the counterparty's receivables owed by its largest debtor.
    pub concentration: Decimal,
    /// Sector risk factor (0 = lowest risk).
    pub sector_factor: Decimal,
}

impl Default for RiskFactors {
    fn default() -> Self {
        RiskFactors {
            liquidity: dec!(1.2),
            leverage: dec!(2.0),
            margin: dec!(0.10),
            relationship_years: dec!(2),
            recent_delinquency: false,
            concentration: dec!(0.20),
            sector_factor: dec!(0.5),
        }
    }
}

/// Logistic weights. Signs are fixed so improving a factor never raises PD:
/// liquidity, margin and tenure weights are non-positive, the rest
/// non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub intercept: Decimal,
    pub liquidity: Decimal,
    pub leverage: Decimal,
    pub margin: Decimal,
    pub relationship_years: Decimal,
    pub recent_delinquency: Decimal,
    pub concentration: Decimal,
    pub sector_factor: Decimal,
}

impl Default for FactorWeights {
    fn default() -> Self {
        FactorWeights {
            intercept: dec!(-3.0),
            liquidity: dec!(-0.8),
            leverage: dec!(0.35),
            margin: dec!(-4.0),
            relationship_years: dec!(-0.15),
            recent_delinquency: dec!(1.5),
            concentration: dec!(3.0),
            sector_factor: dec!(1.0),
        }
    }
}

/// Validated scoring model: weights plus an ordered scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingModel {
    weights: FactorWeights,
    scale: Vec<RatingCut>,
}

impl Default for RatingModel {
    fn default() -> Self {
        RatingModel {
            weights: FactorWeights::default(),
            scale: standard_scale(),
        }
    }
}

impl RatingModel {
    /// Build a model, rejecting weights with the wrong sign and scales that
    /// are empty, out of order or outside `(0, 1]`.
    pub fn new(weights: FactorWeights, scale: Vec<RatingCut>) -> FidcResult<Self> {
        let non_positive = [
            ("liquidity", weights.liquidity),
            ("margin", weights.margin),
            ("relationship_years", weights.relationship_years),
        ];
        let non_negative = [
            ("leverage", weights.leverage),
            ("recent_delinquency", weights.recent_delinquency),
            ("concentration", weights.concentration),
            ("sector_factor", weights.sector_factor),
        ];
        for (name, w) in non_positive {
            if w > Decimal::ZERO {
                return Err(FidcError::InvalidInput {
                    field: format!("weights.{name}"),
                    reason: "Weight must be non-positive".into(),
                });
            }
        }
        for (name, w) in non_negative {
            if w < Decimal::ZERO {
                return Err(FidcError::InvalidInput {
                    field: format!("weights.{name}"),
                    reason: "Weight must be non-negative".into(),
                });
            }
        }

        if scale.is_empty() {
            return Err(FidcError::InvalidInput {
                field: "scale".into(),
                reason: "Rating scale must have at least one cut".into(),
            });
        }
        for cut in &scale {
            if cut.pd_ceiling <= Decimal::ZERO || cut.pd_ceiling > Decimal::ONE {
                return Err(FidcError::InvalidInput {
                    field: format!("scale.{}", cut.rating),
                    reason: "PD ceiling must be in (0, 1]".into(),
                });
            }
            if cut.annual_spread < Decimal::ZERO {
                return Err(FidcError::InvalidInput {
                    field: format!("scale.{}", cut.rating),
                    reason: "Spread must be non-negative".into(),
                });
            }
        }
        for pair in scale.windows(2) {
            if pair[1].rating <= pair[0].rating || pair[1].pd_ceiling <= pair[0].pd_ceiling {
                return Err(FidcError::InvalidInput {
                    field: format!("scale.{}", pair[1].rating),
                    reason: "Ratings and PD ceilings must be strictly increasing".into(),
                });
            }
        }

        Ok(RatingModel { weights, scale })
    }

    pub fn weights(&self) -> &FactorWeights {
        &self.weights
    }

    pub fn scale(&self) -> &[RatingCut] {
        &self.scale
    }

    /// Linear score `intercept + Σ wᵢ·xᵢ`.
    pub fn score(&self, f: &RiskFactors) -> Decimal {
        let w = &self.weights;
        let delinquent = if f.recent_delinquency {
            Decimal::ONE
        } else {
            Decimal::ZERO
        };
        w.intercept
            + w.liquidity * f.liquidity
            + w.leverage * f.leverage
            + w.margin * f.margin
            + w.relationship_years * f.relationship_years
            + w.recent_delinquency * delinquent
            + w.concentration * f.concentration
            + w.sector_factor * f.sector_factor
    }

    /// `1 / (1 + e^(-score))`
    pub fn annual_pd(&self, f: &RiskFactors) -> Rate {
        logistic(self.score(f))
    }

    /// First cut, best to worst, whose ceiling covers `pd`; the worst rating
    /// when none does.
    pub fn rating_for_pd(&self, pd: Rate) -> CreditRating {
        self.scale
            .iter()
            .find(|cut| pd <= cut.pd_ceiling)
            .or(self.scale.last())
            .map(|cut| cut.rating)
            .unwrap_or(CreditRating::H)
    }

    /// Shift `rating` by `notches` along the scale; positive upgrades.
    /// Clamped at both ends. A rating absent from the scale is returned as-is.
    pub fn notch(&self, rating: CreditRating, notches: i32) -> CreditRating {
        let Some(index) = self.scale.iter().position(|c| c.rating == rating) else {
            return rating;
        };
        let last = self.scale.len() as i64 - 1;
        let shifted = (index as i64 - notches as i64).clamp(0, last) as usize;
        self.scale[shifted].rating
    }

    pub fn cut(&self, rating: CreditRating) -> Option<&RatingCut> {
        self.scale.iter().find(|c| c.rating == rating)
    }
}

// ---------------------------------------------------------------------------
// Operation terms and pricing policy
// ---------------------------------------------------------------------------

/// Restrictions found on the counterparty (protests, lawsuits, bureau hits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionLevel {
    #[default]
    None,
    Minor,
    /// Blocks the operation.
    Severe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationTerms {
    pub tenor_days: u32,
    pub loss_given_default: Rate,
    pub non_standard_settlement: bool,
    pub without_recourse: bool,
    pub offshore_domicile: bool,
    pub restriction: RestrictionLevel,
    /// Analyst override on the model rating; positive upgrades.
    pub notch_override: i32,
}

impl Default for OperationTerms {
    fn default() -> Self {
        OperationTerms {
            tenor_days: 63,
            loss_given_default: dec!(0.60),
            non_standard_settlement: false,
            without_recourse: false,
            offshore_domicile: false,
            restriction: RestrictionLevel::None,
            notch_override: 0,
        }
    }
}

/// Fixed add-ons and adjustments, all monthly rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    pub non_standard_settlement_premium: Rate,
    pub without_recourse_premium: Rate,
    pub offshore_domicile_premium: Rate,
    pub minor_restriction_surcharge: Rate,
    pub tenure_discount_per_year: Rate,
    pub max_tenure_discount: Rate,
    /// Worst rating the fund accepts without a policy flag.
    pub minimum_rating: CreditRating,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            non_standard_settlement_premium: dec!(0.001),
            without_recourse_premium: dec!(0.0025),
            offshore_domicile_premium: dec!(0.0015),
            minor_restriction_surcharge: dec!(0.002),
            tenure_discount_per_year: dec!(0.0005),
            max_tenure_discount: dec!(0.002),
            minimum_rating: CreditRating::D,
        }
    }
}

/// Monthly rate build-up. `total_monthly` is the signed sum of the terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub cost_of_capital: Rate,
    pub rating_spread: Rate,
    pub settlement_premium: Rate,
    pub recourse_premium: Rate,
    pub domicile_premium: Rate,
    pub structural_premium: Rate,
    pub restriction_surcharge: Rate,
    pub tenure_discount: Rate,
    /// Surcharge less tenure discount; may be negative.
    pub relationship_adjustment: Rate,
    /// Subtracted; never negative.
    pub expected_loss_discount: Rate,
    pub total_monthly: Rate,
    pub total_annual_linear: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAssessment {
    pub score: Decimal,
    pub annual_pd: Rate,
    pub period_pd: Rate,
    /// `period_pd × LGD`.
    pub expected_loss: Rate,
    pub model_rating: CreditRating,
    pub final_rating: CreditRating,
    pub eligible: bool,
    pub below_minimum_rating: bool,
    /// `None` when the operation is ineligible.
    pub pricing: Option<PricingBreakdown>,
    pub flags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Rate and price one operation. `cost_of_capital_monthly` is the fund's
/// value-weighted cost of capital on a monthly basis.
pub fn assess_operation(
    model: &RatingModel,
    factors: &RiskFactors,
    terms: &OperationTerms,
    policy: &PricingPolicy,
    cost_of_capital_monthly: Rate,
) -> CreditAssessment {
    let score = model.score(factors);
    let annual_pd = logistic(score);
    let period_pd = period_pd(annual_pd, terms.tenor_days);
    let lgd = terms.loss_given_default.max(Decimal::ZERO).min(Decimal::ONE);

    let model_rating = model.rating_for_pd(annual_pd);
    let final_rating = model.notch(model_rating, terms.notch_override);
    let below_minimum_rating = final_rating > policy.minimum_rating;
    let eligible = terms.restriction != RestrictionLevel::Severe;

    let mut flags = Vec::new();
    if !eligible {
        warn!(rating = %final_rating, "severe restriction: operation ineligible");
        flags.push("Severe restriction: operation ineligible".to_string());
    }
    if below_minimum_rating {
        flags.push(format!(
            "Rating {final_rating} is below the fund minimum {}",
            policy.minimum_rating
        ));
    }
    if terms.notch_override != 0 && final_rating != model_rating {
        flags.push(format!(
            "Analyst override moved rating from {model_rating} to {final_rating}"
        ));
    }

    let pricing = if eligible {
        Some(price(
            model,
            factors,
            terms,
            policy,
            cost_of_capital_monthly,
            annual_pd,
            lgd,
            model_rating,
            final_rating,
        ))
    } else {
        None
    };

    debug!(score = %score, pd = %annual_pd, rating = %final_rating, "operation assessed");

    CreditAssessment {
        score,
        annual_pd,
        period_pd,
        expected_loss: period_pd * lgd,
        model_rating,
        final_rating,
        eligible,
        below_minimum_rating,
        pricing,
        flags,
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn price(
    model: &RatingModel,
    factors: &RiskFactors,
    terms: &OperationTerms,
    policy: &PricingPolicy,
    cost_of_capital: Rate,
    annual_pd: Rate,
    lgd: Rate,
    model_rating: CreditRating,
    final_rating: CreditRating,
) -> PricingBreakdown {
    let rating_spread = model
        .cut(final_rating)
        .map(|c| c.annual_spread / MONTHS_PER_YEAR)
        .unwrap_or(Decimal::ZERO);

    let flag = |on: bool, premium: Rate| if on { premium } else { Decimal::ZERO };
    let settlement_premium = flag(
        terms.non_standard_settlement,
        policy.non_standard_settlement_premium,
    );
    let recourse_premium = flag(terms.without_recourse, policy.without_recourse_premium);
    let domicile_premium = flag(terms.offshore_domicile, policy.offshore_domicile_premium);
    let structural_premium = settlement_premium + recourse_premium + domicile_premium;

    let restriction_surcharge = flag(
        terms.restriction == RestrictionLevel::Minor,
        policy.minor_restriction_surcharge,
    );
    let tenure_discount = (policy.tenure_discount_per_year
        * factors.relationship_years.max(Decimal::ZERO))
    .min(policy.max_tenure_discount);
    let relationship_adjustment = restriction_surcharge - tenure_discount;

    let ceiling = model
        .cut(model_rating)
        .map(|c| c.pd_ceiling)
        .unwrap_or(annual_pd);
    let expected_loss_discount =
        ((ceiling * lgd - annual_pd * lgd) / MONTHS_PER_YEAR).max(Decimal::ZERO);

    let total_monthly = cost_of_capital + rating_spread + structural_premium
        + relationship_adjustment
        - expected_loss_discount;

    PricingBreakdown {
        cost_of_capital,
        rating_spread,
        settlement_premium,
        recourse_premium,
        domicile_premium,
        structural_premium,
        restriction_surcharge,
        tenure_discount,
        relationship_adjustment,
        expected_loss_discount,
        total_monthly,
        total_annual_linear: total_monthly * MONTHS_PER_YEAR,
    }
}

/// Logistic curve with the score saturated at ±40, where `exp` stays well
/// inside the decimal range.
fn logistic(score: Decimal) -> Rate {
    let s = score.max(-SCORE_LIMIT).min(SCORE_LIMIT);
    match (-s).checked_exp() {
        Some(e) => Decimal::ONE / (Decimal::ONE + e),
        None if s > Decimal::ZERO => Decimal::ONE,
        None => Decimal::ZERO,
    }
}

/// `1 - (1 - PD_annual)^(tenor / 252)`
fn period_pd(annual_pd: Rate, tenor_days: u32) -> Rate {
    if tenor_days == 0 || annual_pd <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if annual_pd >= Decimal::ONE {
        return Decimal::ONE;
    }
    let exponent = Decimal::from(tenor_days) / BUSINESS_DAYS_PER_YEAR;
    Decimal::ONE - (Decimal::ONE - annual_pd).powd(exponent)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.0000001);

    fn good_company() -> RiskFactors {
        RiskFactors {
            liquidity: dec!(1.5),
            leverage: dec!(2.0),
            margin: dec!(0.15),
            relationship_years: dec!(5),
            recent_delinquency: false,
            concentration: dec!(0.10),
            sector_factor: dec!(0.5),
        }
    }

    #[test]
    fn test_score_linear_combination() {
        let model = RatingModel::default();
        // -3 - 1.2 + 0.7 - 0.6 - 0.75 + 0 + 0.3 + 0.5
        assert_eq!(model.score(&good_company()), dec!(-4.05));
    }

    #[test]
    fn test_logistic_properties() {
        assert!((logistic(Decimal::ZERO) - dec!(0.5)).abs() < TOL);
        let p = logistic(dec!(1.3));
        let q = logistic(dec!(-1.3));
        assert!((p + q - Decimal::ONE).abs() < TOL);
        assert!(logistic(dec!(1000)) <= Decimal::ONE);
        assert!(logistic(dec!(-1000)) > Decimal::ZERO);
    }

    #[test]
    fn test_logistic_saturates_without_overflow() {
        assert_eq!(logistic(dec!(100_000_000_000_000_000_000)), logistic(SCORE_LIMIT));
        assert_eq!(logistic(dec!(-100_000_000_000_000_000_000)), logistic(-SCORE_LIMIT));
        // e^-40 ≈ 4.25e-18
        assert!(Decimal::ONE - logistic(SCORE_LIMIT) < dec!(0.00000000000000001));
        assert!(logistic(-SCORE_LIMIT) > Decimal::ZERO);
    }

    #[test]
    fn test_good_company_rated_b() {
        let model = RatingModel::default();
        let pd = model.annual_pd(&good_company());
        // 1 / (1 + e^4.05) ≈ 1.71%
        assert!((pd - dec!(0.01712)).abs() < dec!(0.0001));
        assert_eq!(model.rating_for_pd(pd), CreditRating::B);
    }

    #[test]
    fn test_rating_boundaries_inclusive() {
        let model = RatingModel::default();
        assert_eq!(model.rating_for_pd(dec!(0.005)), CreditRating::AA);
        assert_eq!(model.rating_for_pd(dec!(0.0050001)), CreditRating::A);
        assert_eq!(model.rating_for_pd(dec!(0.99)), CreditRating::H);
    }

    #[test]
    fn test_rating_beyond_last_ceiling_is_worst() {
        let scale = vec![
            RatingCut::new(CreditRating::AA, dec!(0.01), dec!(0)),
            RatingCut::new(CreditRating::B, dec!(0.10), dec!(0.02)),
        ];
        let model = RatingModel::new(FactorWeights::default(), scale).unwrap();
        assert_eq!(model.rating_for_pd(dec!(0.5)), CreditRating::B);
    }

    #[test]
    fn test_notch_clamped() {
        let model = RatingModel::default();
        assert_eq!(model.notch(CreditRating::B, 1), CreditRating::A);
        assert_eq!(model.notch(CreditRating::B, -2), CreditRating::D);
        assert_eq!(model.notch(CreditRating::A, 5), CreditRating::AA);
        assert_eq!(model.notch(CreditRating::G, -5), CreditRating::H);
    }

    #[test]
    fn test_model_rejects_wrong_sign() {
        let weights = FactorWeights {
            leverage: dec!(-0.1),
            ..Default::default()
        };
        let err = RatingModel::new(weights, standard_scale()).unwrap_err();
        assert!(err.to_string().contains("leverage"));
    }

    #[test]
    fn test_model_rejects_unordered_scale() {
        let scale = vec![
            RatingCut::new(CreditRating::A, dec!(0.05), dec!(0)),
            RatingCut::new(CreditRating::B, dec!(0.03), dec!(0.01)),
        ];
        assert!(RatingModel::new(FactorWeights::default(), scale).is_err());
        assert!(RatingModel::new(FactorWeights::default(), vec![]).is_err());
    }

    #[test]
    fn test_period_pd() {
        assert_eq!(period_pd(dec!(0.10), 0), Decimal::ZERO);
        let full_year = period_pd(dec!(0.10), 252);
        assert!((full_year - dec!(0.10)).abs() < TOL);
        let quarter = period_pd(dec!(0.10), 63);
        assert!(quarter > Decimal::ZERO && quarter < dec!(0.10));
    }

    #[test]
    fn test_pricing_terms_add_up() {
        let model = RatingModel::default();
        let terms = OperationTerms {
            non_standard_settlement: true,
            without_recourse: true,
            restriction: RestrictionLevel::Minor,
            ..Default::default()
        };
        let a = assess_operation(
            &model,
            &good_company(),
            &terms,
            &PricingPolicy::default(),
            dec!(0.011),
        );
        assert!(a.eligible);
        let p = a.pricing.unwrap();
        assert_eq!(p.structural_premium, dec!(0.0035));
        // 5 years × 0.05% capped at 0.20%
        assert_eq!(p.tenure_discount, dec!(0.002));
        assert_eq!(p.relationship_adjustment, Decimal::ZERO);
        assert!(p.expected_loss_discount >= Decimal::ZERO);
        let rebuilt = p.cost_of_capital + p.rating_spread + p.structural_premium
            + p.relationship_adjustment
            - p.expected_loss_discount;
        assert_eq!(rebuilt, p.total_monthly);
        assert_eq!(p.rating_spread, dec!(0.01) / dec!(12));
    }

    #[test]
    fn test_severe_restriction_short_circuits() {
        let terms = OperationTerms {
            restriction: RestrictionLevel::Severe,
            ..Default::default()
        };
        let a = assess_operation(
            &RatingModel::default(),
            &good_company(),
            &terms,
            &PricingPolicy::default(),
            dec!(0.011),
        );
        assert!(!a.eligible);
        assert!(a.pricing.is_none());
        assert!(a.annual_pd > Decimal::ZERO);
    }

    #[test]
    fn test_below_floor_still_priced() {
        let weak = RiskFactors {
            liquidity: dec!(0.5),
            leverage: dec!(6),
            margin: dec!(0.01),
            relationship_years: dec!(0),
            recent_delinquency: true,
            concentration: dec!(0.6),
            sector_factor: dec!(1.5),
        };
        let a = assess_operation(
            &RatingModel::default(),
            &weak,
            &OperationTerms::default(),
            &PricingPolicy::default(),
            dec!(0.011),
        );
        assert!(a.below_minimum_rating);
        assert!(a.eligible);
        assert!(a.pricing.is_some());
        assert!(!a.flags.is_empty());
    }

    #[test]
    fn test_notch_override_applied_to_spread() {
        let terms = OperationTerms {
            notch_override: -2,
            ..Default::default()
        };
        let a = assess_operation(
            &RatingModel::default(),
            &good_company(),
            &terms,
            &PricingPolicy::default(),
            dec!(0.011),
        );
        assert_eq!(a.model_rating, CreditRating::B);
        assert_eq!(a.final_rating, CreditRating::D);
        assert_eq!(a.pricing.unwrap().rating_spread, dec!(0.035) / dec!(12));
    }
}
