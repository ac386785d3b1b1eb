//! Invention command handler.

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use eveindy_cli::output::{
    material_lines, render_invention_text, render_json, InventionReport, OutputFormat,
};
use eveindy_lib::{
    compute_invention_stats, invented_blueprint, invention_category, invention_cost_per_run,
    invention_materials_for_base, materials_cost, resolve_explicit_invention_base,
    resolve_invention_base, Catalog, FeeConfig, ItemRef,
};

use super::{AppContext, InventionSkillArgs};

#[derive(Args, Debug, Clone)]
pub struct InventionArgs {
    /// Invented item or blueprint, or the tech-1 item or blueprint it starts from.
    #[arg(long)]
    pub item: ItemRef,

    #[command(flatten)]
    pub skills: InventionSkillArgs,
}

/// Print invention chance, output runs and per-attempt materials.
///
/// Attempt costs are included when a price list is available.
pub fn handle_invention(ctx: &AppContext, args: &InventionArgs) -> Result<()> {
    let catalog = ctx.load_catalog()?;
    let item = catalog.resolve(&args.item)?;
    let base = match &args.skills.base {
        Some(base) => resolve_explicit_invention_base(&catalog, item, catalog.resolve(base)?),
        None => resolve_invention_base(&catalog, item),
    }
    .with_context(|| format!("failed to find an invention base for {}", args.item))?;
    debug!(item, base, "resolved invention base");

    let skills = &args.skills;
    let base_ref = ItemRef::ById(base);
    let stats = compute_invention_stats(
        &catalog,
        &base_ref,
        skills.encryption,
        skills.physics1,
        skills.physics2,
        skills.decryptor,
    )?;
    let materials = invention_materials_for_base(&catalog, &base_ref, skills.decryptor)?;

    let (cost_per_attempt, cost_per_run) = match ctx.load_prices()? {
        Some(prices) => {
            let side = FeeConfig::default().buy_via;
            let attempt = materials_cost(&catalog, &prices, &materials, side)
                .context("failed to price invention materials")?;
            (Some(attempt), Some(invention_cost_per_run(attempt, &stats)))
        }
        None => (None, None),
    };

    let report = InventionReport {
        base,
        base_name: catalog.display_name(base),
        category: invention_category(&catalog, base)?,
        invented_blueprint: invented_blueprint(&catalog, base).map(|id| catalog.display_name(id)),
        decryptor: skills.decryptor,
        stats,
        materials: material_lines(&catalog, &materials),
        cost_per_attempt,
        cost_per_run,
    };
    match ctx.format {
        OutputFormat::Text => render_invention_text(&report, &ctx.palette()),
        OutputFormat::Json => render_json(&report)?,
    }
    Ok(())
}
