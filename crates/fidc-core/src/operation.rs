//! Single receivable purchase simulator.
//!
//! A bullet receivable is bought at a discount set by the monthly rate over
//! 30-day months. Late payment adds a flat fine plus linear late interest on
//! face value. Returns compound on calendar days (30 per month, 365 per
//! year); PD scales the monthly rate down rather than the cash flow.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{clamp_recorded, Adjustment, Money, Rate};

const DAYS_PER_MONTH: Decimal = dec!(30);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationInput {
    /// Amount the debtor pays at maturity.
    pub face_value: Money,
    /// Monthly discount rate.
    pub monthly_rate: Rate,
    pub tenor_days: u32,
    /// Fees withheld from the disbursement.
    pub upfront_fees: Money,
    /// Monthly late interest on face value, accrued per day late.
    pub late_interest_monthly: Rate,
    /// Flat fine on face value when paid late.
    pub late_fine: Rate,
    pub probability_of_default: Rate,
    pub days_late: u32,
}

impl Default for OperationInput {
    fn default() -> Self {
        OperationInput {
            face_value: dec!(1_000_000),
            monthly_rate: dec!(0.025),
            tenor_days: 360,
            upfront_fees: dec!(20_000),
            late_interest_monthly: dec!(0.01),
            late_fine: dec!(0.02),
            probability_of_default: dec!(0.05),
            days_late: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrFigures {
    pub daily: Rate,
    pub monthly: Rate,
    pub annual: Rate,
    /// Receipt over disbursement, less one.
    pub period: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub discount: Money,
    pub discount_share: Rate,
    pub purchase_price: Money,
    pub net_disbursement: Money,
    pub late_fine: Money,
    pub late_interest: Money,
    pub receipt: Money,
    /// False when the disbursement is not positive; every IRR is then zero.
    pub irr_valid: bool,
    pub gross: IrrFigures,
    pub net_monthly: Rate,
    pub net_annual: Rate,
    pub net_period: Rate,
    pub gross_revenue: Money,
    pub expected_provision: Money,
    pub net_revenue: Money,
    /// Gross monthly IRR with fees less the IRR without them.
    pub fee_impact_monthly: Rate,
    pub adjustments: Vec<Adjustment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayScenario {
    pub days_late: u32,
    pub probability_of_default: Rate,
    pub receipt: Money,
    pub net_monthly: Rate,
    pub net_annual: Rate,
    pub net_revenue: Money,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

pub fn simulate_operation(input: &OperationInput) -> OperationResult {
    let (op, mut adjustments) = sanitize(input);

    let months = Decimal::from(op.tenor_days) / DAYS_PER_MONTH;
    let discount = if op.monthly_rate.is_zero() {
        Decimal::ZERO
    } else {
        let base = Decimal::ONE.checked_add(op.monthly_rate).unwrap_or(op.monthly_rate);
        match base.checked_powd(months) {
            Some(factor) => op.face_value * (Decimal::ONE - Decimal::ONE / factor),
            // Present value below the decimal resolution: the whole face is discount.
            None => {
                warn!(rate = %op.monthly_rate, months = %months, "discount factor overflowed");
                adjustments.push(Adjustment::new(
                    "purchase_price",
                    op.face_value,
                    Decimal::ZERO,
                    "discount factor beyond decimal range",
                ));
                op.face_value
            }
        }
    };
    let purchase_price = op.face_value - discount;
    let net_disbursement = purchase_price - op.upfront_fees;

    let (late_fine, late_interest) = penalties(&op, op.days_late);
    let receipt = op.face_value + late_fine + late_interest;

    let gross = gross_irr(receipt, net_disbursement, op.tenor_days);
    let irr_valid = gross.is_some();
    if !irr_valid && receipt > Decimal::ZERO && net_disbursement > Decimal::ZERO {
        warn!(receipt = %receipt, disbursement = %net_disbursement, "IRR compounding overflowed");
        adjustments.push(Adjustment::new(
            "gross_irr",
            receipt / net_disbursement,
            Decimal::ZERO,
            "compounded return beyond decimal range",
        ));
    } else if !irr_valid {
        warn!(disbursement = %net_disbursement, "non-positive disbursement; IRR undefined");
    }
    let gross = gross.unwrap_or(IrrFigures {
        daily: Decimal::ZERO,
        monthly: Decimal::ZERO,
        annual: Decimal::ZERO,
        period: Decimal::ZERO,
    });

    let keep = Decimal::ONE - op.probability_of_default;
    let net_monthly = gross.monthly * keep;
    let net_annual = if irr_valid {
        compound(net_monthly, 12).unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    };

    let gross_revenue = receipt - net_disbursement;
    let expected_provision = gross_revenue * op.probability_of_default;

    let fee_impact_monthly = match (irr_valid, gross_irr(receipt, purchase_price, op.tenor_days)) {
        (true, Some(without_fees)) => gross.monthly - without_fees.monthly,
        _ => Decimal::ZERO,
    };

    OperationResult {
        discount,
        discount_share: if op.face_value.is_zero() {
            Decimal::ZERO
        } else {
            discount / op.face_value
        },
        purchase_price,
        net_disbursement,
        late_fine,
        late_interest,
        receipt,
        irr_valid,
        net_period: gross.period * keep,
        gross,
        net_monthly,
        net_annual,
        gross_revenue,
        expected_provision,
        net_revenue: gross_revenue - expected_provision,
        fee_impact_monthly,
        adjustments,
    }
}

/// On time, then 1, 5, 10, 30 and 60 days late. Only the 60-day case
/// carries provisioning, at 30% of the input PD.
pub fn delay_scenarios(input: &OperationInput) -> Vec<DelayScenario> {
    let (op, _) = sanitize(input);
    let base = simulate_operation(&op);
    let cases: [(u32, Rate); 6] = [
        (0, Decimal::ZERO),
        (1, Decimal::ZERO),
        (5, Decimal::ZERO),
        (10, Decimal::ZERO),
        (30, Decimal::ZERO),
        (60, op.probability_of_default * dec!(0.3)),
    ];

    cases
        .iter()
        .map(|&(days_late, pd)| {
            let (fine, interest) = penalties(&op, days_late);
            let receipt = op.face_value + fine + interest;
            match gross_irr(receipt, base.net_disbursement, op.tenor_days) {
                Some(irr) => {
                    let net_monthly = irr.monthly * (Decimal::ONE - pd);
                    let gross_revenue = receipt - base.net_disbursement;
                    DelayScenario {
                        days_late,
                        probability_of_default: pd,
                        receipt,
                        net_monthly,
                        net_annual: compound(net_monthly, 12).unwrap_or(Decimal::MAX),
                        net_revenue: gross_revenue - gross_revenue * pd,
                    }
                }
                None => DelayScenario {
                    days_late,
                    probability_of_default: pd,
                    receipt,
                    net_monthly: Decimal::ZERO,
                    net_annual: Decimal::ZERO,
                    net_revenue: Decimal::ZERO,
                },
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn sanitize(input: &OperationInput) -> (OperationInput, Vec<Adjustment>) {
    let mut adj = Vec::new();
    let op = OperationInput {
        face_value: clamp_recorded(
            "face_value",
            input.face_value,
            Decimal::ZERO,
            None,
            &mut adj,
        ),
        monthly_rate: clamp_recorded(
            "monthly_rate",
            input.monthly_rate,
            Decimal::ZERO,
            None,
            &mut adj,
        ),
        tenor_days: input.tenor_days.max(1),
        upfront_fees: clamp_recorded(
            "upfront_fees",
            input.upfront_fees,
            Decimal::ZERO,
            None,
            &mut adj,
        ),
        late_interest_monthly: clamp_recorded(
            "late_interest_monthly",
            input.late_interest_monthly,
            Decimal::ZERO,
            None,
            &mut adj,
        ),
        late_fine: clamp_recorded("late_fine", input.late_fine, Decimal::ZERO, None, &mut adj),
        probability_of_default: clamp_recorded(
            "probability_of_default",
            input.probability_of_default,
            Decimal::ZERO,
            Some(Decimal::ONE),
            &mut adj,
        ),
        days_late: input.days_late,
    };
    if input.tenor_days == 0 {
        adj.push(Adjustment::new(
            "tenor_days",
            Decimal::ZERO,
            Decimal::ONE,
            "below lower bound",
        ));
    }
    (op, adj)
}

/// Flat fine and linear late interest, both on face value.
fn penalties(op: &OperationInput, days_late: u32) -> (Money, Money) {
    if days_late == 0 {
        return (Decimal::ZERO, Decimal::ZERO);
    }
    let fine = op.face_value * op.late_fine;
    let interest =
        op.face_value * op.late_interest_monthly * Decimal::from(days_late) / DAYS_PER_MONTH;
    (fine, interest)
}

/// `None` when the disbursement is not positive or any compounded figure
/// leaves the decimal range.
fn gross_irr(receipt: Money, disbursement: Money, tenor_days: u32) -> Option<IrrFigures> {
    if receipt <= Decimal::ZERO || disbursement <= Decimal::ZERO || tenor_days == 0 {
        return None;
    }
    let multiple = receipt.checked_div(disbursement)?;
    let daily = multiple.checked_powd(Decimal::ONE / Decimal::from(tenor_days))? - Decimal::ONE;
    Some(IrrFigures {
        daily,
        monthly: compound(daily, 30)?,
        annual: compound(daily, 365)?,
        period: multiple - Decimal::ONE,
    })
}

fn compound(rate: Rate, periods: i64) -> Option<Rate> {
    Some((Decimal::ONE + rate).checked_powi(periods)? - Decimal::ONE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
