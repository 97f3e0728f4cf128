use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::time::Instant;

use fidc_core::engine::FundContext;
use fidc_core::linspace;
use fidc_core::solver::{
    breakeven_curve, breakeven_portfolio_yield, cash_deployment_sensitivity,
    junior_return_elasticity,
    max_supportable_multiplier, required_yield_for_junior_roe, yield_loss_heatmap,
    yield_sensitivity,
};
use fidc_core::Period;

use super::{envelope, SnapshotArgs};

/// Arguments for the yield solver
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SolveArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Target annual junior ROE (defaults to the snapshot's target, if any)
    #[arg(long)]
    pub target_roe: Option<Decimal>,

    /// Comma-separated provisioning multipliers for the breakeven curve
    #[arg(long, value_delimiter = ',', default_value = "0,1,2,3,5")]
    pub multipliers: Vec<Decimal>,
}

/// Variable swept by `fidc sensitivity`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SweepAxis {
    /// Monthly portfolio yield
    Yield,
    /// Share of the cash balance invested at the reference rate
    Cash,
}

/// Range and resolution of a sweep
#[derive(Args)]
pub struct SweepRange {
    /// Lowest value (default 0.01 for yields, 0 for cash share)
    #[arg(long)]
    pub from: Option<Decimal>,

    /// Highest value (default 0.04 for yields, 1 for cash share)
    #[arg(long)]
    pub to: Option<Decimal>,

    /// Number of points
    #[arg(long, default_value_t = 7)]
    pub steps: usize,
}

/// Arguments for a one-variable sweep
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    #[command(flatten)]
    pub range: SweepRange,

    /// Variable to sweep
    #[arg(long, value_enum, default_value = "yield")]
    pub axis: SweepAxis,
}

/// Arguments for the yield × loss heatmap
#[derive(Args)]
pub struct HeatmapArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    // monthly yield columns
    #[command(flatten)]
    pub range: SweepRange,

    /// Comma-separated provisioning multipliers (rows)
    #[arg(long, value_delimiter = ',', default_value = "0.5,1,1.5,2,3")]
    pub multipliers: Vec<Decimal>,
}

pub fn run_solve(args: SolveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let ctx = FundContext::new(&args.snapshot.load()?);
    let (structure, risk) = (&ctx.snapshot.structure, &ctx.snapshot.risk);
    let blended = ctx.blended_loss_rate();
    let options = ctx.options(Period::Day);

    let target = args.target_roe.or(ctx.snapshot.policy.target_junior_roe);
    let mut warnings: Vec<String> = ctx.adjustments.iter().map(|a| a.to_string()).collect();
    if ctx.receivables_balance() <= Decimal::ZERO {
        warnings.push("No receivables: solved yields reported as 0".into());
    }

    let result = json!({
        "current_yield": risk.portfolio_yield,
        "breakeven_yield": breakeven_portfolio_yield(structure, risk, blended, &options),
        "target_junior_roe": target,
        "required_yield_for_target": target
            .map(|roe| required_yield_for_junior_roe(structure, risk, blended, &options, roe)),
        "max_supportable_loss_multiplier":
            max_supportable_multiplier(structure, risk, blended, &options),
        "junior_return_elasticity": junior_return_elasticity(structure, risk, blended, &options),
        "breakeven_curve": breakeven_curve(structure, risk, blended, &options, &args.multipliers),
    });
    envelope(
        "Closed-form yield inversion of the linear daily junior residual",
        json!({ "blended_loss_rate": blended.to_string() }),
        warnings,
        start,
        result,
    )
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let ctx = FundContext::new(&args.snapshot.load()?);
    let (structure, risk) = (&ctx.snapshot.structure, &ctx.snapshot.risk);
    let blended = ctx.blended_loss_rate();
    let options = ctx.options(Period::Year);
    let warnings = ctx.adjustments.iter().map(|a| a.to_string()).collect();

    match args.axis {
        SweepAxis::Yield => {
            let yields = sweep(&args.range, YIELD_DEFAULTS)?;
            envelope(
                "Junior annual linear return across monthly portfolio yields",
                sweep_assumptions(&yields),
                warnings,
                start,
                yield_sensitivity(structure, risk, blended, &options, &yields),
            )
        }
        SweepAxis::Cash => {
            let shares = sweep(&args.range, CASH_DEFAULTS)?;
            envelope(
                "Junior annual linear return across the share of cash invested at the reference rate",
                sweep_assumptions(&shares),
                warnings,
                start,
                cash_deployment_sensitivity(structure, risk, blended, &options, &shares),
            )
        }
    }
}

pub fn run_heatmap(args: HeatmapArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let ctx = FundContext::new(&args.snapshot.load()?);
    let yields = sweep(&args.range, YIELD_DEFAULTS)?;
    let grid = yield_loss_heatmap(
        &ctx.snapshot.structure,
        &ctx.snapshot.risk,
        ctx.blended_loss_rate(),
        &ctx.options(Period::Year),
        &yields,
        &args.multipliers,
    );
    envelope(
        "Junior annual linear return over portfolio yield × provisioning multiplier",
        json!({ "rows": "provisioning multiplier", "columns": "monthly portfolio yield" }),
        ctx.adjustments.iter().map(|a| a.to_string()).collect(),
        start,
        grid,
    )
}

const YIELD_DEFAULTS: (Decimal, Decimal) = (dec!(0.01), dec!(0.04));
const CASH_DEFAULTS: (Decimal, Decimal) = (Decimal::ZERO, Decimal::ONE);

fn sweep(
    range: &SweepRange,
    defaults: (Decimal, Decimal),
) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    let from = range.from.unwrap_or(defaults.0);
    let to = range.to.unwrap_or(defaults.1);
    if range.steps == 0 || range.steps > 1_000 {
        return Err("--steps must be between 1 and 1000".into());
    }
    if to < from || from < Decimal::ZERO {
        return Err("--from must be non-negative and not above --to".into());
    }
    if to > dec!(1) {
        return Err("--to must not exceed 1".into());
    }
    Ok(linspace(from, to, range.steps))
}

fn sweep_assumptions(points: &[Decimal]) -> Value {
    json!({
        "from": points.first().map(|d| d.to_string()),
        "to": points.last().map(|d| d.to_string()),
        "steps": points.len(),
    })
}
