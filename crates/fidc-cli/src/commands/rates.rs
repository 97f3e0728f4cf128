use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

use fidc_core::rates::{
    annual_to_daily, annual_to_monthly, monthly_to_annual, monthly_to_daily,
    simple_daily_from_annual, simple_daily_from_monthly, DEFAULT_BUSINESS_DAYS,
};
use fidc_core::{Rate, MONTHS_PER_YEAR};

use super::envelope;

/// Arguments for rate conversion
#[derive(Args)]
pub struct ConvertArgs {
    /// Annual rate to convert
    #[arg(long, conflicts_with = "monthly", required_unless_present = "monthly")]
    pub annual: Option<Decimal>,

    /// Monthly rate to convert
    #[arg(long)]
    pub monthly: Option<Decimal>,

    /// Business days per year for the compounded daily rate
    #[arg(long, default_value_t = DEFAULT_BUSINESS_DAYS)]
    pub business_days: u32,
}

#[derive(Serialize)]
struct RateQuote {
    annual_compounded: Rate,
    monthly_compounded: Rate,
    daily_compounded: Rate,
    annual_simple: Rate,
    monthly_simple: Rate,
    daily_simple: Rate,
}

pub fn run_convert(args: ConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut warnings = Vec::new();
    let quote = match (args.annual, args.monthly) {
        (Some(annual), _) => {
            if annual < Decimal::ZERO {
                warnings.push("Negative rate floored at 0 for compounding".to_string());
            }
            RateQuote {
                annual_compounded: annual,
                monthly_compounded: annual_to_monthly(annual),
                daily_compounded: annual_to_daily(annual, args.business_days),
                annual_simple: annual,
                monthly_simple: annual / MONTHS_PER_YEAR,
                daily_simple: simple_daily_from_annual(annual),
            }
        }
        (None, Some(monthly)) => {
            if monthly < Decimal::ZERO {
                warnings.push("Negative rate floored at 0 for compounding".to_string());
            }
            let annual = monthly_to_annual(monthly);
            if annual == Decimal::MAX {
                warnings.push("Compounded annual rate exceeds the decimal range; saturated".to_string());
            }
            RateQuote {
                annual_compounded: annual,
                monthly_compounded: monthly,
                daily_compounded: if args.business_days == DEFAULT_BUSINESS_DAYS {
                    monthly_to_daily(monthly)
                } else {
                    annual_to_daily(annual, args.business_days)
                },
                annual_simple: monthly * MONTHS_PER_YEAR,
                monthly_simple: monthly,
                daily_simple: simple_daily_from_monthly(monthly),
            }
        }
        (None, None) => return Err("one of --annual or --monthly is required".into()),
    };
    envelope(
        "Effective (compounded) and linear (simple) rate equivalents",
        json!({ "business_days": args.business_days, "simple_daily_basis": 252 }),
        warnings,
        start,
        quote,
    )
}
