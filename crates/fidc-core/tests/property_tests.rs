use fidc_core::aging::{blend_expected_loss, AgingBucket};
use fidc_core::fund::{FundStructure, RiskParameters};
use fidc_core::rating::{RatingModel, RiskFactors};
use fidc_core::solver::{breakeven_portfolio_yield, required_yield_for_junior_roe};
use fidc_core::subordination::max_absorbable_loss;
use fidc_core::waterfall::{junior_annual_return, run_waterfall, WaterfallOptions};
use fidc_core::Period;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Strategies
// ===========================================================================

/// Whole currency units between 0 and `max`.
fn money(max: i64) -> impl Strategy<Value = Decimal> {
    (0..=max).prop_map(Decimal::from)
}

/// `lo..=hi` expressed in basis points.
fn bps(lo: i64, hi: i64) -> impl Strategy<Value = Decimal> {
    (lo..=hi).prop_map(|b| Decimal::new(b, 4))
}

fn structure() -> impl Strategy<Value = FundStructure> {
    (money(500_000_000), money(200_000_000), 1_000_000i64..=200_000_000)
        .prop_map(|(s, m, j)| FundStructure::new(s, m, Decimal::from(j)))
}

fn risk() -> impl Strategy<Value = RiskParameters> {
    (
        bps(0, 2_500),
        bps(0, 600),
        bps(100, 10_000),
        bps(0, 500),
        bps(0, 800),
        bps(0, 200),
        bps(0, 300),
        money(500_000),
        money(200_000),
    )
        .prop_map(
            |(reference, yield_m, recv, ss, ms, admin, mgmt, costs, other)| RiskParameters {
                reference_rate: reference,
                portfolio_yield: yield_m,
                receivables_share: recv,
                senior_spread: ss,
                mezzanine_spread: ms,
                admin_fee_rate: admin,
                management_fee_rate: mgmt,
                fixed_monthly_costs: costs,
                fixed_monthly_other_income: other,
                ..Default::default()
            },
        )
}

fn buckets() -> impl Strategy<Value = Vec<AgingBucket>> {
    prop::collection::vec((0i64..=10_000, 0i64..=100), 1..12).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (share, rate))| {
                AgingBucket::new(
                    &format!("b{i}"),
                    Decimal::new(share, 2),
                    Decimal::from(rate),
                )
            })
            .collect()
    })
}

fn factors() -> impl Strategy<Value = RiskFactors> {
    (
        0i64..=500,
        0i64..=800,
        -300i64..=600,
        0u32..=30,
        any::<bool>(),
        0i64..=100,
        0i64..=100,
    )
        .prop_map(|(liq, lev, margin, years, delinquent, conc, sector)| RiskFactors {
            liquidity: Decimal::new(liq, 2),
            leverage: Decimal::new(lev, 2),
            margin: Decimal::new(margin, 3),
            relationship_years: Decimal::from(years),
            recent_delinquency: delinquent,
            concentration: Decimal::new(conc, 2),
            sector_factor: Decimal::new(sector, 2),
        })
}

fn close(a: Decimal, b: Decimal, tol: Decimal) -> bool {
    (a - b).abs() <= tol
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn daily_lines_scale_linearly_to_year(
        st in structure(),
        rk in risk(),
        blended in bps(0, 3_000),
    ) {
        let day = run_waterfall(&st, &rk, blended, &WaterfallOptions::for_period(Period::Day));
        let year = run_waterfall(&st, &rk, blended, &WaterfallOptions::for_period(Period::Year));
        let tol = dec!(0.000000001);
        prop_assert!(close(day.gross_income * dec!(252), year.gross_income, tol));
        prop_assert!(close(day.junior_residual * dec!(252), year.junior_residual, tol));
        prop_assert!(close(day.provisioning * dec!(252), year.provisioning, tol));
    }

    #[test]
    fn residual_plus_deductions_is_gross_income(
        st in structure(),
        rk in risk(),
        blended in bps(0, 3_000),
        include in any::<bool>(),
    ) {
        let options = WaterfallOptions {
            period: Period::Month,
            include_provisioning: include,
            ..Default::default()
        };
        let wf = run_waterfall(&st, &rk, blended, &options);
        let rebuilt = wf.junior_residual
            + wf.senior_cost
            + wf.mezzanine_cost
            + wf.fixed_costs
            + wf.provisioning;
        prop_assert!(close(rebuilt, wf.gross_income, dec!(0.000000001)));
        let cascade_sum: Decimal = wf.cascade()[..9].iter().map(|l| l.amount).sum();
        prop_assert!(close(cascade_sum, wf.junior_residual, dec!(0.000000001)));
    }

    #[test]
    fn normalized_shares_sum_to_one(b in buckets()) {
        let el = blend_expected_loss(&b);
        let total: Decimal = el.normalized_shares().iter().copied().sum();
        if el.degenerate {
            prop_assert_eq!(el.blended_loss_rate, Decimal::ZERO);
            prop_assert_eq!(total, Decimal::ZERO);
        } else {
            prop_assert!(close(total, Decimal::ONE, dec!(0.000000001)));
            prop_assert!(el.blended_loss_rate <= Decimal::ONE);
        }
    }

    #[test]
    fn absorbable_loss_grows_as_minimum_falls(
        st in structure(),
        lo in bps(0, 9_999),
        hi in bps(0, 9_999),
    ) {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let at_lo = max_absorbable_loss(&st, lo);
        let at_hi = max_absorbable_loss(&st, hi);
        prop_assert!(at_lo + dec!(0.000001) >= at_hi);
        prop_assert!(at_lo <= st.junior_principal);
    }

    #[test]
    fn required_yield_reproduces_target_roe(
        st in structure(),
        rk in risk(),
        blended in bps(0, 3_000),
        target in bps(-5_000, 10_000),
    ) {
        let options = WaterfallOptions::default();
        prop_assume!(st.net_asset_value() * rk.receivables_share > Decimal::ZERO);
        let y = required_yield_for_junior_roe(&st, &rk, blended, &options, target);
        let solved = RiskParameters { portfolio_yield: y, ..rk.clone() };
        let roe = junior_annual_return(&st, &solved, blended, &options);
        prop_assert!(close(roe, target, dec!(0.00000001)), "roe {} target {}", roe, target);
    }

    #[test]
    fn improving_one_factor_never_worsens_rating(
        base in factors(),
        which in 0usize..7,
        step in 1i64..=200,
    ) {
        let model = RatingModel::default();
        let delta = Decimal::new(step, 2);
        let mut better = base.clone();
        match which {
            0 => better.liquidity += delta,
            1 => better.leverage = (better.leverage - delta).max(Decimal::ZERO),
            2 => better.margin += delta / dec!(10),
            3 => better.relationship_years += Decimal::ONE,
            4 => better.recent_delinquency = false,
            5 => better.concentration = (better.concentration - delta).max(Decimal::ZERO),
            _ => better.sector_factor = (better.sector_factor - delta).max(Decimal::ZERO),
        }
        let before = model.rating_for_pd(model.annual_pd(&base));
        let after = model.rating_for_pd(model.annual_pd(&better));
        prop_assert!(after <= before, "{} worsened to {}", before, after);
    }

    #[test]
    fn halving_receivables_raises_breakeven(
        st in structure(),
        rk in risk(),
        blended in bps(0, 3_000),
    ) {
        let options = WaterfallOptions::default();
        // Only meaningful when an all-cash fund cannot cover its charges.
        let all_cash = RiskParameters { receivables_share: Decimal::ZERO, ..rk.clone() };
        let cash_only = run_waterfall(&st, &all_cash, blended, &options);
        prop_assume!(cash_only.junior_residual < dec!(-0.01));

        let halved = RiskParameters {
            receivables_share: rk.receivables_share / dec!(2),
            ..rk.clone()
        };
        let base = breakeven_portfolio_yield(&st, &rk, blended, &options);
        let after = breakeven_portfolio_yield(&st, &halved, blended, &options);
        prop_assert!(after > base, "breakeven {} -> {}", base, after);
    }
}
