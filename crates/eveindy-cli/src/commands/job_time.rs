//! Job time command handler.

use anyhow::{Context, Result};
use clap::Args;

use eveindy_cli::output::{render_job_time_text, render_json, JobTimeReport, OutputFormat};
use eveindy_lib::{compute_job_time, resolve_invention_base, Activity, Catalog, ItemRef};

use super::AppContext;

#[derive(Args, Debug, Clone)]
pub struct JobTimeArgs {
    /// Item name or type id (product or blueprint).
    #[arg(long)]
    pub item: ItemRef,

    /// Number of runs.
    #[arg(long, default_value_t = 1)]
    pub runs: u64,

    /// Time efficiency of the blueprint (0-10).
    #[arg(long = "te", default_value_t = 0)]
    pub time_efficiency: u8,

    /// Extra time reduction as a fraction. Repeatable.
    #[arg(long = "extra-te")]
    pub extra_time: Vec<f64>,

    /// Time the invention job that produces the item's blueprint instead of manufacturing.
    #[arg(long)]
    pub invention: bool,
}

pub fn handle_job_time(ctx: &AppContext, args: &JobTimeArgs) -> Result<()> {
    let catalog = ctx.load_catalog()?;
    let item = catalog.resolve(&args.item)?;

    let (blueprint_or_item, activity) = if args.invention {
        (resolve_invention_base(&catalog, item)?, Activity::Invention)
    } else {
        (item, Activity::Manufacturing)
    };
    let seconds = compute_job_time(
        &catalog,
        blueprint_or_item,
        activity,
        args.runs,
        args.time_efficiency,
        &args.extra_time,
    )
    .with_context(|| format!("failed to compute {activity} time for {}", args.item))?;

    let report = JobTimeReport {
        item,
        name: catalog.display_name(item),
        runs: args.runs,
        time_efficiency: args.time_efficiency,
        seconds,
    };
    match ctx.format {
        OutputFormat::Text => render_job_time_text(&report, &ctx.palette()),
        OutputFormat::Json => render_json(&report)?,
    }
    Ok(())
}
