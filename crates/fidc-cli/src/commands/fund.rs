use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use fidc_core::engine::{evaluate_fund, FundContext};
use fidc_core::subordination::stress_curve;
use fidc_core::waterfall::{run_waterfall as core_run_waterfall, WaterfallOptions};
use fidc_core::Period;

use super::{envelope, SnapshotArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PeriodArg {
    Day,
    Month,
    Year,
}

/// Arguments for commands that only need a fund snapshot
#[derive(Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// Arguments for a single-period waterfall
#[derive(Args)]
pub struct WaterfallArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Accrual period
    #[arg(long, value_enum, default_value = "month")]
    pub period: PeriodArg,

    /// Custom horizon in business days (overrides --period)
    #[arg(long)]
    pub business_days: Option<u32>,

    /// Leave the provisioning charge out of the residual
    #[arg(long)]
    pub no_provisioning: bool,

    /// Multiplier applied to the blended loss rate
    #[arg(long, default_value = "1")]
    pub provisioning_multiplier: Decimal,

    /// Share of the cash balance earning the reference rate
    #[arg(long, default_value = "1")]
    pub cash_deployed_share: Decimal,
}

/// Arguments for subordination stress
#[derive(Args)]
pub struct StressArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Comma-separated multiples of the expected loss
    #[arg(long, value_delimiter = ',', default_value = "1,2,3,5,8,10,15")]
    pub multipliers: Vec<Decimal>,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot = args.snapshot.load()?;
    let result = evaluate_fund(&snapshot);
    Ok(serde_json::to_value(result)?)
}

pub fn run_waterfall(args: WaterfallArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let ctx = FundContext::new(&args.snapshot.load()?);
    let period = match (args.business_days, args.period) {
        (Some(days), _) => Period::BusinessDays(days),
        (None, PeriodArg::Day) => Period::Day,
        (None, PeriodArg::Month) => Period::Month,
        (None, PeriodArg::Year) => Period::Year,
    };
    let options = WaterfallOptions {
        period,
        include_provisioning: ctx.snapshot.include_provisioning && !args.no_provisioning,
        provisioning_multiplier: args.provisioning_multiplier.max(Decimal::ZERO),
        cash_deployed_share: args.cash_deployed_share.max(Decimal::ZERO).min(Decimal::ONE),
    };
    let result = core_run_waterfall(
        &ctx.snapshot.structure,
        &ctx.snapshot.risk,
        ctx.blended_loss_rate(),
        &options,
    );

    let mut warnings: Vec<String> = ctx.adjustments.iter().map(|a| a.to_string()).collect();
    if result.junior_residual < Decimal::ZERO {
        warnings.push("Negative junior residual".into());
    }
    envelope(
        "Linear income waterfall: senior, mezzanine, fees, provisioning, junior residual",
        json!({
            "period": period.to_string(),
            "business_days": period.business_days().to_string(),
            "blended_loss_rate": ctx.blended_loss_rate().to_string(),
            "include_provisioning": options.include_provisioning,
        }),
        warnings,
        start,
        result,
    )
}

pub fn run_subordination(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let ctx = FundContext::new(&args.snapshot.load()?);
    let state = ctx.subordination();
    let mut warnings: Vec<String> = ctx.adjustments.iter().map(|a| a.to_string()).collect();
    if state.breached_at_expected_loss {
        warnings.push("Expected loss exceeds the maximum absorbable loss".into());
    }
    envelope(
        "Subordination: junior / NAV against the minimum, loss limit and rupture multiple",
        json!({
            "expected_loss": "receivables balance × blended loss rate",
            "blended_loss_rate": ctx.blended_loss_rate().to_string(),
        }),
        warnings,
        start,
        state,
    )
}

pub fn run_stress(args: StressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let ctx = FundContext::new(&args.snapshot.load()?);
    let curve = stress_curve(
        &ctx.snapshot.structure,
        ctx.snapshot.risk.minimum_subordination_ratio,
        ctx.provisioning_stock(),
        &args.multipliers,
    );
    envelope(
        "Subordination stress: post-loss ratio at multiples of expected loss",
        json!({
            "expected_loss": ctx.provisioning_stock().to_string(),
            "minimum_subordination_ratio":
                ctx.snapshot.risk.minimum_subordination_ratio.to_string(),
        }),
        ctx.adjustments.iter().map(|a| a.to_string()).collect(),
        start,
        curve,
    )
}
