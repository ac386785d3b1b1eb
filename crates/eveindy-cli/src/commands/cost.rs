//! Cost command handler.

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use eveindy_cli::output::{render_cost_text, render_json, CostReport, OutputFormat};
use eveindy_lib::{
    assess_profit, compute_build_cost, compute_job_time, Activity, BuildRequest, Error as LibError,
    ItemRef, JobFeeEstimator,
};

use super::{AppContext, BlueprintArgs, FeeArgs, InventionSkillArgs};

#[derive(Args, Debug, Clone)]
pub struct CostArgs {
    /// Item name or type id to build.
    #[arg(long)]
    pub item: ItemRef,

    /// Units to produce.
    #[arg(long, default_value_t = 1)]
    pub quantity: u64,

    #[command(flatten)]
    pub blueprint: BlueprintArgs,

    #[command(flatten)]
    pub fees: FeeArgs,

    /// Add the cost of inventing the product's blueprint.
    ///
    /// Unless --me, --te or --max-runs is given, the build uses the invented copy's settings.
    #[arg(long)]
    pub invent: bool,

    #[command(flatten)]
    pub invention: InventionSkillArgs,
}

/// Print the cost breakdown and, when the product has a price, the profit report.
pub fn handle_cost(ctx: &AppContext, args: &CostArgs) -> Result<()> {
    let catalog = ctx.load_catalog()?;
    let prices = ctx.require_prices()?;
    let fees = args.fees.config();

    let mut request = BuildRequest::new(args.item.clone(), args.quantity)
        .with_params(args.blueprint.params())
        .with_overrides(args.blueprint.overrides())
        .with_fees(fees);
    if args.invent {
        request = request.with_invention(args.invention.plan(!args.blueprint.is_explicit()));
    }

    let estimator = JobFeeEstimator::new();
    let breakdown = compute_build_cost(&catalog, &prices, &request, &estimator)
        .with_context(|| format!("failed to compute build cost for {}", args.item))?;

    let job_seconds = match compute_job_time(
        &catalog,
        breakdown.product,
        Activity::Manufacturing,
        breakdown.runs,
        breakdown.params.time_efficiency,
        &breakdown.params.additional_time_efficiencies,
    ) {
        Ok(seconds) => Some(seconds),
        Err(err) => {
            warn!(error = %err, "job time unavailable; profit per hour omitted");
            None
        }
    };

    let profit = match assess_profit(&catalog, &prices, &breakdown, &fees, job_seconds) {
        Ok(report) => Some(report),
        Err(LibError::MissingPrice { item, side }) => {
            warn!(%item, %side, "no price for the product; profit omitted");
            None
        }
        Err(err) => return Err(err).context("failed to assess profit"),
    };

    let report = CostReport::new(&catalog, breakdown, profit);
    match ctx.format {
        OutputFormat::Text => render_cost_text(&report, &ctx.palette()),
        OutputFormat::Json => render_json(&report)?,
    }
    Ok(())
}
