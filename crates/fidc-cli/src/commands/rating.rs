use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;

use fidc_core::engine::FundContext;
use fidc_core::fund::FundSnapshot;
use fidc_core::rating::{
    assess_operation, standard_scale, FactorWeights, OperationTerms, PricingPolicy, RatingCut,
    RatingModel, RiskFactors,
};
use fidc_core::waterfall::cost_of_capital;
use fidc_core::Rate;

use super::{envelope, read_payload};

/// Arguments for counterparty rating and pricing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RateArgs {
    /// Path to a JSON or YAML rating request
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly cost of capital (otherwise taken from the request's fund)
    #[arg(long)]
    pub cost_of_capital: Option<Decimal>,

    /// Analyst notch override; positive upgrades
    #[arg(long)]
    pub notch: Option<i32>,
}

/// Everything needed to rate one operation. Missing sections take defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RateRequest {
    factors: RiskFactors,
    terms: OperationTerms,
    policy: PricingPolicy,
    weights: FactorWeights,
    scale: Option<Vec<RatingCut>>,
    cost_of_capital_monthly: Option<Rate>,
    fund: FundSnapshot,
}

pub fn run_rate(args: RateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut request: RateRequest = read_payload(args.input.as_deref())?;
    if let Some(notch) = args.notch {
        request.terms.notch_override = notch;
    }

    let model = RatingModel::new(
        request.weights.clone(),
        request.scale.clone().unwrap_or_else(standard_scale),
    )?;

    let ctx = FundContext::new(&request.fund);
    let fund_cost = cost_of_capital(
        &ctx.snapshot.structure,
        &ctx.snapshot.risk,
        ctx.snapshot.policy.junior_hurdle_rate,
    )
    .monthly;
    let coc = args
        .cost_of_capital
        .or(request.cost_of_capital_monthly)
        .unwrap_or(fund_cost);

    let assessment = assess_operation(
        &model,
        &request.factors,
        &request.terms,
        &request.policy,
        coc,
    );
    let warnings = assessment.flags.clone();
    envelope(
        "Logistic PD score, bucketed rating scale, additive monthly pricing",
        json!({
            "tenor_days": request.terms.tenor_days,
            "loss_given_default": request.terms.loss_given_default.to_string(),
            "cost_of_capital_monthly": coc.to_string(),
            "minimum_rating": request.policy.minimum_rating.to_string(),
        }),
        warnings,
        start,
        assessment,
    )
}
