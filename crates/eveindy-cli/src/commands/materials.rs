//! Materials command handler.

use anyhow::{Context, Result};
use clap::Args;

use eveindy_cli::output::{render_json, render_materials_text, MaterialsReport, OutputFormat};
use eveindy_lib::{resolve_build_plan, runs_for_quantity, Catalog, ItemRef};

use super::{AppContext, BlueprintArgs};

#[derive(Args, Debug, Clone)]
pub struct MaterialsArgs {
    /// Item name or type id to build.
    #[arg(long)]
    pub item: ItemRef,

    /// Units to produce.
    #[arg(long, default_value_t = 1)]
    pub quantity: u64,

    #[command(flatten)]
    pub blueprint: BlueprintArgs,
}

/// Print first-level components and fully expanded base materials.
pub fn handle_materials(ctx: &AppContext, args: &MaterialsArgs) -> Result<()> {
    let catalog = ctx.load_catalog()?;
    let item = catalog.resolve(&args.item)?;
    let plan = resolve_build_plan(
        &catalog,
        &args.item,
        args.quantity,
        &args.blueprint.params(),
        &args.blueprint.overrides(),
    )
    .with_context(|| format!("failed to resolve materials for {}", args.item))?;
    let runs = runs_for_quantity(&catalog, &args.item, args.quantity)?;

    let report = MaterialsReport::new(&catalog, item, args.quantity, runs, &plan);
    match ctx.format {
        OutputFormat::Text => render_materials_text(&report, &ctx.palette()),
        OutputFormat::Json => render_json(&report)?,
    }
    Ok(())
}
