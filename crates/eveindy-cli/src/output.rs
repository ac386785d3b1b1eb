//! Report types and renderers for CLI output.
//!
//! Each subcommand builds a serializable report that carries display names
//! alongside type ids, then renders it either as aligned text or as JSON.

use std::collections::BTreeMap;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use eveindy_lib::{
    BuildPlan, Catalog, CostBreakdown, Decryptor, InventionStats, MaterialRequirement,
    ProfitReport, TypeId,
};

use crate::terminal::{
    format_duration, format_isk, format_with_separators, supports_color, ColorPalette,
};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned human-readable tables.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn is_text(self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

/// Print the CLI banner.
pub fn print_logo() {
    use crate::terminal::colors;

    let (orange, reset) = if supports_color() {
        (colors::ORANGE, colors::RESET)
    } else {
        ("", "")
    };
    println!(
        "{orange}+--------------------------------------------------+
|  EVE INDUSTRY                                    |
|  >> MATERIALS, INVENTION AND BUILD COST          |
+--------------------------------------------------+{reset}"
    );
}

/// Print the footer with elapsed time.
pub fn print_footer(elapsed: std::time::Duration) {
    use crate::terminal::colors;

    let (gray, reset) = if supports_color() {
        (colors::GRAY, colors::RESET)
    } else {
        ("", "")
    };

    let elapsed_ms = elapsed.as_millis();
    let time_str = if elapsed_ms < 1000 {
        format!("{}ms", elapsed_ms)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    };

    println!("\n{gray}Completed in {}{reset}", time_str);
}

/// Render any report as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn render_json<T: Serialize>(report: &T) -> io::Result<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, report).map_err(io::Error::other)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// One named entry of a material list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialLine {
    pub type_id: TypeId,
    pub name: String,
    pub quantity: u64,
}

/// Attach display names to a material requirement.
pub fn material_lines(
    catalog: &impl Catalog,
    materials: &MaterialRequirement,
) -> Vec<MaterialLine> {
    materials
        .iter()
        .map(|(type_id, quantity)| MaterialLine {
            type_id,
            name: catalog.display_name(type_id),
            quantity,
        })
        .collect()
}

/// Result of the `materials` subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialsReport {
    pub item: TypeId,
    pub name: String,
    pub quantity: u64,
    pub runs: u64,
    pub components: Vec<MaterialLine>,
    pub base_materials: Vec<MaterialLine>,
}

impl MaterialsReport {
    pub fn new(
        catalog: &impl Catalog,
        item: TypeId,
        quantity: u64,
        runs: u64,
        plan: &BuildPlan,
    ) -> Self {
        Self {
            item,
            name: catalog.display_name(item),
            quantity,
            runs,
            components: material_lines(catalog, &plan.components),
            base_materials: material_lines(catalog, &plan.base_materials),
        }
    }
}

/// Result of the `invention` subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct InventionReport {
    pub base: TypeId,
    pub base_name: String,
    pub category: String,
    pub invented_blueprint: Option<String>,
    pub decryptor: Decryptor,
    pub stats: InventionStats,
    pub materials: Vec<MaterialLine>,
    /// Present when a price list was available.
    pub cost_per_attempt: Option<f64>,
    pub cost_per_run: Option<f64>,
}

/// Result of the `job-time` subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct JobTimeReport {
    pub item: TypeId,
    pub name: String,
    pub runs: u64,
    pub time_efficiency: u8,
    pub seconds: u64,
}

/// Result of the `cost` subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct CostReport {
    pub name: String,
    pub breakdown: CostBreakdown,
    pub profit: Option<ProfitReport>,
    /// Display names for every type id in the breakdown.
    pub item_names: BTreeMap<TypeId, String>,
}

impl CostReport {
    pub fn new(
        catalog: &impl Catalog,
        breakdown: CostBreakdown,
        profit: Option<ProfitReport>,
    ) -> Self {
        let ids = std::iter::once(breakdown.product)
            .chain(breakdown.components.items())
            .chain(breakdown.base_materials.items())
            .chain(
                breakdown
                    .invention
                    .iter()
                    .flat_map(|invention| invention.materials.items()),
            );
        let item_names = ids.map(|id| (id, catalog.display_name(id))).collect();
        Self {
            name: catalog.display_name(breakdown.product),
            breakdown,
            profit,
            item_names,
        }
    }

    fn name_of(&self, id: TypeId) -> &str {
        self.item_names.get(&id).map_or("<unknown>", String::as_str)
    }
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(str::len).max().unwrap_or(0)
}

fn print_material_lines(palette: &ColorPalette, lines: &[MaterialLine]) {
    if lines.is_empty() {
        println!("  (none)");
        return;
    }
    let width = name_width(lines.iter().map(|line| line.name.as_str()));
    for line in lines {
        println!(
            "  {name:<width$}  {cyan}{quantity:>15}{reset}",
            name = line.name,
            quantity = format_with_separators(line.quantity),
            cyan = palette.cyan,
            reset = palette.reset,
        );
    }
}

pub fn render_materials_text(report: &MaterialsReport, palette: &ColorPalette) {
    println!(
        "{}Materials for {} x {} ({} runs){}",
        palette.heading,
        format_with_separators(report.quantity),
        report.name,
        format_with_separators(report.runs),
        palette.reset
    );
    println!("\nComponents:");
    print_material_lines(palette, &report.components);
    println!("\nBase materials:");
    print_material_lines(palette, &report.base_materials);
}

pub fn render_invention_text(report: &InventionReport, palette: &ColorPalette) {
    println!(
        "{}Invention from {} ({}){}",
        palette.heading, report.base_name, report.category, palette.reset
    );
    if let Some(blueprint) = &report.invented_blueprint {
        println!("Produces:      {blueprint}");
    }
    println!("Decryptor:     {}", report.decryptor);
    println!("Chance:        {:.1}%", report.stats.chance * 100.0);
    println!("Runs per copy: {}", report.stats.runs);
    println!(
        "Blueprint:     ME {} / TE {}",
        report.stats.material_efficiency, report.stats.time_efficiency
    );
    println!("\nMaterials per attempt:");
    print_material_lines(palette, &report.materials);

    if let (Some(attempt), Some(per_run)) = (report.cost_per_attempt, report.cost_per_run) {
        println!();
        println!("Cost per attempt: {} ISK", format_isk(attempt));
        println!("Cost per run:     {} ISK", format_isk(per_run));
    }
}

pub fn render_job_time_text(report: &JobTimeReport, palette: &ColorPalette) {
    println!(
        "{}{} x {} (TE {}){}",
        palette.heading,
        format_with_separators(report.runs),
        report.name,
        report.time_efficiency,
        palette.reset
    );
    println!(
        "Job time: {} ({} s)",
        format_duration(report.seconds),
        format_with_separators(report.seconds)
    );
}

pub fn render_cost_text(report: &CostReport, palette: &ColorPalette) {
    let breakdown = &report.breakdown;
    println!(
        "{}Build cost for {} x {} ({} runs, ME {}, TE {}){}",
        palette.heading,
        format_with_separators(breakdown.quantity),
        report.name,
        format_with_separators(breakdown.runs),
        breakdown.params.material_efficiency,
        breakdown.params.time_efficiency,
        palette.reset
    );

    println!("\nBase materials:");
    let width = name_width(breakdown.base_materials.items().map(|id| report.name_of(id)));
    for (id, quantity) in breakdown.base_materials.iter() {
        let cost = breakdown.base_materials_cost.get(&id).copied().unwrap_or(0.0);
        let fee = breakdown
            .base_materials_buy_fees
            .get(&id)
            .copied()
            .unwrap_or(0.0);
        println!(
            "  {name:<width$}  {cyan}{quantity:>15}{reset}  {cost:>18} ISK  {gray}fee {fee}{reset}",
            name = report.name_of(id),
            quantity = format_with_separators(quantity),
            cost = format_isk(cost),
            fee = format_isk(fee),
            cyan = palette.cyan,
            gray = palette.gray,
            reset = palette.reset,
        );
    }

    let charged: Vec<(TypeId, f64)> = breakdown
        .component_build_fees
        .iter()
        .filter(|(_, fee)| **fee > 0.0)
        .map(|(id, fee)| (*id, *fee))
        .collect();
    if !charged.is_empty() {
        println!("\nComponent job fees:");
        let width = name_width(charged.iter().map(|(id, _)| report.name_of(*id)));
        for (id, fee) in charged {
            println!(
                "  {name:<width$}  {fee:>18} ISK",
                name = report.name_of(id),
                fee = format_isk(fee)
            );
        }
    }

    println!();
    println!("Materials:        {:>18} ISK", format_isk(breakdown.materials_cost()));
    println!("Buy fees:         {:>18} ISK", format_isk(breakdown.buy_fees()));
    println!("Component jobs:   {:>18} ISK", format_isk(breakdown.component_fees()));
    println!("Product job:      {:>18} ISK", format_isk(breakdown.product_build_fee));

    if let Some(invention) = &breakdown.invention {
        println!(
            "Invention:        {:>18} ISK  {gray}({} from {}, {:.1}% chance, {} per run){reset}",
            format_isk(invention.total),
            format_isk(invention.cost_per_attempt),
            report.name_of(invention.base),
            invention.stats.chance * 100.0,
            format_isk(invention.cost_per_run),
            gray = palette.gray,
            reset = palette.reset,
        );
    }

    println!(
        "{orange}Total cost:       {:>18} ISK{reset}  ({} ISK per unit)",
        format_isk(breakdown.total_cost),
        format_isk(breakdown.unit_cost()),
        orange = palette.orange,
        reset = palette.reset,
    );

    if let Some(profit) = &report.profit {
        println!();
        println!("Revenue:          {:>18} ISK", format_isk(profit.revenue));
        println!("Sell fees:        {:>18} ISK", format_isk(profit.sell_fee));
        println!(
            "{color}Profit:           {:>18} ISK{reset}  ({:.2}% margin)",
            format_isk(profit.profit),
            profit.margin * 100.0,
            color = palette.signed(profit.profit),
            reset = palette.reset,
        );
        if let (Some(seconds), Some(per_hour)) = (profit.job_seconds, profit.profit_per_hour) {
            println!(
                "Profit per hour:  {:>18} ISK  {gray}(job time {}){reset}",
                format_isk(per_hour),
                format_duration(seconds),
                gray = palette.gray,
                reset = palette.reset,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eveindy_lib::{Activity, CatalogBuilder};

    #[test]
    fn material_lines_carry_names_in_id_order() {
        let catalog = CatalogBuilder::new()
            .item(35, "Pyerite")
            .item(34, "Tritanium")
            .build()
            .expect("catalog");
        let materials: MaterialRequirement = [(35, 2), (34, 1)].into_iter().collect();

        let lines = material_lines(&catalog, &materials);
        assert_eq!(lines[0].name, "Tritanium");
        assert_eq!(lines[1].quantity, 2);
    }

    #[test]
    fn report_json_includes_names() {
        let catalog = CatalogBuilder::new()
            .item(34, "Tritanium")
            .item(587, "Rifter")
            .item(691, "Rifter Blueprint")
            .product(691, Activity::Manufacturing, 587, 1)
            .material(691, Activity::Manufacturing, 34, 10)
            .build()
            .expect("catalog");
        let plan = BuildPlan {
            components: [(34, 10)].into_iter().collect(),
            base_materials: [(34, 10)].into_iter().collect(),
        };

        let report = MaterialsReport::new(&catalog, 587, 1, 1, &plan);
        let value = serde_json::to_value(&report).expect("serializes");
        assert_eq!(value["name"], "Rifter");
        assert_eq!(value["base_materials"][0]["name"], "Tritanium");
        assert_eq!(value["base_materials"][0]["quantity"], 10);
    }
}
