use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use fidc_core::operation::{delay_scenarios, simulate_operation, OperationInput};

use super::{envelope, read_payload};

/// Arguments for the receivable purchase simulator
#[derive(Args)]
pub struct OperationArgs {
    /// Path to a JSON or YAML operation (flags below override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount paid at maturity
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Monthly discount rate
    #[arg(long)]
    pub monthly_rate: Option<Decimal>,

    /// Tenor in calendar days
    #[arg(long)]
    pub tenor_days: Option<u32>,

    /// Fees withheld from the disbursement
    #[arg(long)]
    pub upfront_fees: Option<Decimal>,

    /// Probability of default
    #[arg(long, alias = "pd")]
    pub probability_of_default: Option<Decimal>,

    /// Days the payment arrives late
    #[arg(long)]
    pub days_late: Option<u32>,

    /// Append the payment-delay scenario table
    #[arg(long)]
    pub scenarios: bool,
}

pub fn run_operation(args: OperationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut op: OperationInput = read_payload(args.input.as_deref())?;
    if let Some(v) = args.face_value {
        op.face_value = v;
    }
    if let Some(v) = args.monthly_rate {
        op.monthly_rate = v;
    }
    if let Some(v) = args.tenor_days {
        op.tenor_days = v;
    }
    if let Some(v) = args.upfront_fees {
        op.upfront_fees = v;
    }
    if let Some(v) = args.probability_of_default {
        op.probability_of_default = v;
    }
    if let Some(v) = args.days_late {
        op.days_late = v;
    }

    let result = simulate_operation(&op);
    let mut warnings: Vec<String> = result.adjustments.iter().map(|a| a.to_string()).collect();
    if !result.irr_valid {
        warnings.push("Returns not computable (non-positive disbursement or compounding overflow): reported as 0".into());
    }

    let output = if args.scenarios {
        json!({ "operation": result, "delay_scenarios": delay_scenarios(&op) })
    } else {
        serde_json::to_value(&result)?
    };
    envelope(
        "Discounted bullet receivable: compound monthly discount, calendar-day IRR",
        json!({
            "face_value": op.face_value.to_string(),
            "monthly_rate": op.monthly_rate.to_string(),
            "tenor_days": op.tenor_days,
            "month_days": 30,
            "year_days": 365,
        }),
        warnings,
        start,
        output,
    )
}
