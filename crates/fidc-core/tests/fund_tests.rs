use fidc_core::aging::{blend_expected_loss, AgingBucket};
use fidc_core::engine::evaluate_fund;
use fidc_core::fund::{FundSnapshot, FundStructure, RiskParameters};
use fidc_core::profile::{MemoryProfileStore, ProfileStore};
use fidc_core::projection::project_months;
use fidc_core::rating::{
    assess_operation, CreditRating, OperationTerms, PricingPolicy, RatingModel, RiskFactors,
};
use fidc_core::solver::breakeven_portfolio_yield;
use fidc_core::subordination::{evaluate_subordination, stress_curve, SubordinationStatus};
use fidc_core::waterfall::{run_waterfall, WaterfallOptions};
use fidc_core::{FidcError, Period};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TOL: Decimal = dec!(0.0001);

// ===========================================================================
// Reference fund: 40M NAV, aging skewed to current receivables
// ===========================================================================

fn current_heavy_buckets() -> Vec<AgingBucket> {
    vec![
        AgingBucket::new("0-30", dec!(95), dec!(0)),
        AgingBucket::new("31-60", dec!(2), dec!(5)),
        AgingBucket::new("61-90", dec!(1), dec!(10)),
        AgingBucket::new("91-180", dec!(1), dec!(20)),
        AgingBucket::new(">180", dec!(1), dec!(36)),
    ]
}

fn reference_fund() -> FundSnapshot {
    FundSnapshot {
        structure: FundStructure::new(dec!(20_000_000), dec!(10_000_000), dec!(10_000_000)),
        risk: RiskParameters {
            minimum_subordination_ratio: dec!(0.20),
            reference_rate: dec!(0.10),
            portfolio_yield: dec!(0.025),
            receivables_share: dec!(0.80),
            senior_spread: dec!(0.01),
            mezzanine_spread: dec!(0.025),
            admin_fee_rate: dec!(0.005),
            management_fee_rate: dec!(0.01),
            ..Default::default()
        },
        aging_buckets: current_heavy_buckets(),
        ..Default::default()
    }
}

#[test]
fn test_reference_fund_blended_loss() {
    let el = blend_expected_loss(&current_heavy_buckets());
    assert_eq!(el.blended_loss_rate, dec!(0.0076));
    assert!(!el.renormalized);
    assert!(!el.degenerate);
}

#[test]
fn test_reference_fund_daily_residual_positive() {
    let snap = reference_fund();
    let wf = run_waterfall(
        &snap.structure,
        &snap.risk,
        dec!(0.0076),
        &WaterfallOptions::for_period(Period::Day),
    );
    // (9.6M + 0.8M - 2.2M - 1.25M - 0.6M - 243.2k) / 252
    let expected = dec!(6_106_800) / dec!(252);
    assert!((wf.junior_residual - expected).abs() < TOL);
    assert!(wf.junior_residual > Decimal::ZERO);
}

#[test]
fn test_reference_fund_rupture_multiple() {
    let snap = reference_fund();
    let stock = dec!(32_000_000) * dec!(0.0076);
    let state = evaluate_subordination(&snap.structure, dec!(0.20), stock, dec!(32_000_000));
    assert_eq!(state.status, SubordinationStatus::Compliant);
    assert_eq!(state.max_absorbable_loss, dec!(2_500_000));
    assert!(state.rupture_multiple > dec!(10));
    assert!(!state.breached_at_expected_loss);
    assert_eq!(state.required_top_up, Decimal::ZERO);
}

#[test]
fn test_reference_fund_stress_breaks_past_rupture() {
    let snap = reference_fund();
    let stock = dec!(243_200);
    let curve = stress_curve(
        &snap.structure,
        dec!(0.20),
        stock,
        &[dec!(1), dec!(5), dec!(10), dec!(11), dec!(20)],
    );
    let compliant: Vec<bool> = curve.iter().map(|p| p.compliant).collect();
    assert_eq!(compliant, vec![true, true, true, false, false]);
}

#[test]
fn test_reference_fund_end_to_end() {
    let out = evaluate_fund(&reference_fund());
    let r = &out.result;
    assert!((r.yearly.junior_residual - dec!(6_106_800)).abs() < TOL);
    assert_eq!(r.provisioning_stock, dec!(243_200));
    assert!(!r.flags.any());
    assert!(r.yields.breakeven_yield < dec!(0.025));
    assert!(r.yields.max_supportable_loss_multiplier.unwrap() > dec!(20));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_halving_receivables_raises_breakeven_for_reference_fund() {
    let snap = reference_fund();
    let options = WaterfallOptions::default();
    let base = breakeven_portfolio_yield(&snap.structure, &snap.risk, dec!(0.0076), &options);
    let halved = RiskParameters {
        receivables_share: dec!(0.40),
        ..snap.risk.clone()
    };
    let after = breakeven_portfolio_yield(&snap.structure, &halved, dec!(0.0076), &options);
    assert!(after > base);
}

// ===========================================================================
// Cross-module flows
// ===========================================================================

#[test]
fn test_projection_month_one_matches_month_waterfall() {
    let snap = reference_fund();
    let projection = project_months(&snap, &[], 3);
    let month = run_waterfall(
        &snap.structure,
        &snap.risk,
        dec!(0.0076),
        &WaterfallOptions::for_period(Period::Month),
    );
    assert_eq!(projection.rows[0].junior_result, month.junior_residual);
    assert_eq!(projection.rows.len(), 3);
}

#[test]
fn test_profile_round_trip_then_evaluate() {
    let mut store = MemoryProfileStore::new();
    store.save("reference", &reference_fund()).unwrap();
    let loaded = store.load_required("reference").unwrap();
    let out = evaluate_fund(&loaded);
    assert_eq!(out.result.expected_loss.blended_loss_rate, dec!(0.0076));

    let missing = store.load_required("other");
    assert!(matches!(missing, Err(FidcError::ProfileNotFound(_))));
}

#[test]
fn test_rating_priced_against_fund_cost_of_capital() {
    let out = evaluate_fund(&reference_fund());
    let coc = out.result.cost_of_capital.monthly;
    let model = RatingModel::default();
    let assessment = assess_operation(
        &model,
        &RiskFactors::default(),
        &OperationTerms::default(),
        &PricingPolicy::default(),
        coc,
    );
    assert!(assessment.eligible);
    assert!(assessment.final_rating <= CreditRating::D);
    let pricing = assessment.pricing.unwrap();
    assert_eq!(pricing.cost_of_capital, coc);
    let rebuilt = coc + pricing.rating_spread + pricing.structural_premium
        + pricing.relationship_adjustment
        - pricing.expected_loss_discount;
    assert_eq!(pricing.total_monthly, rebuilt);
    assert!(pricing.total_monthly > Decimal::ZERO);
}
