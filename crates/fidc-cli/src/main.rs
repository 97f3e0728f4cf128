mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::fund::{EvaluateArgs, StressArgs, WaterfallArgs};
use commands::operation::OperationArgs;
use commands::profile::ProfileArgs;
use commands::projection::ProjectionArgs;
use commands::rates::ConvertArgs;
use commands::rating::RateArgs;
use commands::solver::{HeatmapArgs, SensitivityArgs, SolveArgs};

/// Receivables fund tranche waterfall and credit-risk calculations
#[derive(Parser)]
#[command(
    name = "fidc",
    version,
    about = "Receivables fund tranche waterfall and credit-risk calculations",
    long_about = "A CLI for evaluating a senior/mezzanine/junior receivables fund with \
                  decimal precision. Supports the linear income waterfall, aging-based \
                  expected loss, subordination limits and stress, yield solving, \
                  counterparty rating and pricing, operation simulation, monthly \
                  projection and named parameter profiles."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine decisions to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full fund report: waterfalls, returns, subordination, yields, flags
    Evaluate(EvaluateArgs),
    /// Income waterfall for one period
    Waterfall(WaterfallArgs),
    /// Subordination ratio, loss limit and rupture multiple
    Subordination(EvaluateArgs),
    /// Subordination under multiples of the expected loss
    Stress(StressArgs),
    /// Breakeven and target-ROE portfolio yields
    Solve(SolveArgs),
    /// Junior return across portfolio yields or invested cash shares
    Sensitivity(SensitivityArgs),
    /// Junior return over a yield × loss-multiplier grid
    Heatmap(HeatmapArgs),
    /// Rate and price a counterparty operation
    Rate(RateArgs),
    /// Simulate a discounted receivable purchase
    Operation(OperationArgs),
    /// Month-by-month fund projection
    Projection(ProjectionArgs),
    /// Convert between annual, monthly and daily rates
    Convert(ConvertArgs),
    /// Manage named parameter profiles
    Profile(ProfileArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::fund::run_evaluate(args),
        Commands::Waterfall(args) => commands::fund::run_waterfall(args),
        Commands::Subordination(args) => commands::fund::run_subordination(args),
        Commands::Stress(args) => commands::fund::run_stress(args),
        Commands::Solve(args) => commands::solver::run_solve(args),
        Commands::Sensitivity(args) => commands::solver::run_sensitivity(args),
        Commands::Heatmap(args) => commands::solver::run_heatmap(args),
        Commands::Rate(args) => commands::rating::run_rate(args),
        Commands::Operation(args) => commands::operation::run_operation(args),
        Commands::Projection(args) => commands::projection::run_projection(args),
        Commands::Convert(args) => commands::rates::run_convert(args),
        Commands::Profile(args) => commands::profile::run_profile(args),
        Commands::Version => {
            println!("fidc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
