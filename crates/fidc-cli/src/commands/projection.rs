use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use fidc_core::projection::{project_months, MonthOverride, DEFAULT_PROJECTION_MONTHS};

use super::{envelope, SnapshotArgs};
use crate::input;

/// Arguments for the monthly projection
#[derive(Args)]
pub struct ProjectionArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// JSON or YAML list of per-month overrides, month 1 first
    #[arg(long)]
    pub overrides: Option<String>,

    /// Months to project
    #[arg(long, default_value_t = DEFAULT_PROJECTION_MONTHS)]
    pub months: usize,
}

pub fn run_projection(args: ProjectionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    if args.months == 0 || args.months > 600 {
        return Err("--months must be between 1 and 600".into());
    }
    let snapshot = args.snapshot.load()?;
    let overrides: Vec<MonthOverride> = match args.overrides {
        Some(ref path) => input::file::read_input(path)?,
        None => Vec::new(),
    };
    if overrides.len() > args.months {
        return Err(format!(
            "{} overrides given for a {}-month projection",
            overrides.len(),
            args.months
        )
        .into());
    }

    let result = project_months(&snapshot, &overrides, args.months);
    let mut warnings: Vec<String> = result.adjustments.iter().map(|a| a.to_string()).collect();
    if let Some(row) = result.rows.iter().find(|r| r.closing_junior < Decimal::ZERO) {
        warnings.push(format!("Junior class wiped out in month {}", row.month));
    }
    envelope(
        "Monthly roll-forward: month waterfall on post-flow balances, coupons capitalised",
        json!({
            "months": args.months,
            "overridden_months": overrides.len(),
            "business_days_per_month": 21,
        }),
        warnings,
        start,
        result,
    )
}
