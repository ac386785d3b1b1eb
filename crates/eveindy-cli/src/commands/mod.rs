//! Subcommand handlers.
//!
//! `main.rs` parses arguments and dispatches here; each module owns one
//! subcommand. Argument groups shared between subcommands live in this file.

pub mod cost;
pub mod invention;
pub mod job_time;
pub mod materials;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use eveindy_cli::output::OutputFormat;
use eveindy_cli::terminal::ColorPalette;
use eveindy_lib::market::DEFAULT_SYSTEM_COST_INDEX;
use eveindy_lib::{
    load_catalog, resolve_catalog_path, resolve_prices_path, BuildLocation, ComponentOverrides,
    Decryptor, FeeConfig, InventionPlan, ItemRef, OrderType, PriceList, ProductionParameters,
    StaticCatalog,
};

/// Global options every handler needs.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub catalog: Option<PathBuf>,
    pub prices: Option<PathBuf>,
    pub format: OutputFormat,
}

impl AppContext {
    pub fn load_catalog(&self) -> Result<StaticCatalog> {
        let path = resolve_catalog_path(self.catalog.as_deref())
            .context("failed to locate the industry catalog; pass --catalog or set EVEINDY_CATALOG")?;
        load_catalog(&path)
            .with_context(|| format!("failed to load catalog from {}", path.display()))
    }

    /// Price list from `--prices` or `EVEINDY_PRICES`, when either is set.
    pub fn load_prices(&self) -> Result<Option<PriceList>> {
        let Some(path) = resolve_prices_path(self.prices.as_deref()) else {
            return Ok(None);
        };
        PriceList::from_path(&path)
            .map(Some)
            .with_context(|| format!("failed to load prices from {}", path.display()))
    }

    pub fn require_prices(&self) -> Result<PriceList> {
        self.load_prices()?
            .ok_or_else(|| anyhow!("no price list given; pass --prices or set EVEINDY_PRICES"))
    }

    pub fn palette(&self) -> ColorPalette {
        ColorPalette::detect()
    }
}

/// Blueprint settings for the product and its components.
#[derive(Args, Debug, Clone, Default)]
pub struct BlueprintArgs {
    /// Material efficiency of the product blueprint (0-10).
    #[arg(long = "me")]
    pub material_efficiency: Option<u8>,

    /// Time efficiency of the product blueprint (0-10).
    #[arg(long = "te")]
    pub time_efficiency: Option<u8>,

    /// Extra material reduction as a fraction, e.g. 0.01 for a structure bonus. Repeatable.
    #[arg(long = "extra-me")]
    pub extra_material: Vec<f64>,

    /// Extra time reduction as a fraction. Repeatable.
    #[arg(long = "extra-te")]
    pub extra_time: Vec<f64>,

    /// Runs allowed per blueprint copy; 0 or absent means unlimited.
    #[arg(long = "max-runs")]
    pub max_runs: Option<u64>,

    /// Material efficiency applied to every first-level component blueprint.
    #[arg(long = "component-me")]
    pub component_material_efficiency: Option<u8>,

    /// Extra material reduction for component builds. Repeatable.
    #[arg(long = "component-extra-me")]
    pub component_extra_material: Vec<f64>,
}

impl BlueprintArgs {
    pub fn params(&self) -> ProductionParameters {
        ProductionParameters::new(
            self.material_efficiency.unwrap_or(0),
            self.time_efficiency.unwrap_or(0),
        )
        .with_max_runs(self.max_runs.unwrap_or(0))
        .with_material_bonuses(self.extra_material.clone())
        .with_time_bonuses(self.extra_time.clone())
    }

    pub fn overrides(&self) -> ComponentOverrides {
        if self.component_material_efficiency.is_none() && self.component_extra_material.is_empty()
        {
            return ComponentOverrides::none();
        }
        ComponentOverrides::uniform(
            ProductionParameters::new(self.component_material_efficiency.unwrap_or(0), 0)
                .with_material_bonuses(self.component_extra_material.clone()),
        )
    }

    /// True when the product blueprint's ME, TE or run limit was given explicitly.
    pub fn is_explicit(&self) -> bool {
        self.material_efficiency.is_some()
            || self.time_efficiency.is_some()
            || self.max_runs.is_some()
    }
}

/// Trade skills and market choices.
#[derive(Args, Debug, Clone)]
pub struct FeeArgs {
    /// Broker Relations skill level (0-5).
    #[arg(long, default_value_t = 0)]
    pub broker_relations: u8,

    /// Accounting skill level (0-5).
    #[arg(long, default_value_t = 0)]
    pub accounting: u8,

    /// Buy materials by placing buy orders (`buy`) or from sell orders (`sell`).
    #[arg(long, default_value = "buy")]
    pub buy_via: OrderType,

    /// Sell output by listing sell orders (`sell`) or into buy orders (`buy`).
    #[arg(long, default_value = "sell")]
    pub sell_via: OrderType,

    /// Install jobs in an NPC station instead of a player structure.
    #[arg(long)]
    pub station: bool,

    /// System cost index as a fraction.
    #[arg(long, default_value_t = DEFAULT_SYSTEM_COST_INDEX)]
    pub system_cost_index: f64,
}

impl FeeArgs {
    pub fn config(&self) -> FeeConfig {
        FeeConfig {
            broker_relations: self.broker_relations,
            accounting: self.accounting,
            buy_via: self.buy_via,
            sell_via: self.sell_via,
            build_location: if self.station {
                BuildLocation::Station
            } else {
                BuildLocation::Structure
            },
            system_cost_index: self.system_cost_index,
        }
    }
}

/// Science skills, decryptor and base selection for invention.
#[derive(Args, Debug, Clone)]
pub struct InventionSkillArgs {
    /// Decryptor name, e.g. "Accelerant" or "Parity Decryptor".
    #[arg(long, default_value = "none")]
    pub decryptor: Decryptor,

    /// Encryption Methods skill level (0-5).
    #[arg(long, default_value_t = 0)]
    pub encryption: u8,

    /// First science skill level (0-5).
    #[arg(long, default_value_t = 0)]
    pub physics1: u8,

    /// Second science skill level (0-5).
    #[arg(long, default_value_t = 0)]
    pub physics2: u8,

    /// Invention base when several exist (e.g. a specific hull section).
    #[arg(long)]
    pub base: Option<ItemRef>,
}

impl InventionSkillArgs {
    pub fn plan(&self, use_invented_blueprint: bool) -> InventionPlan {
        InventionPlan {
            encryption_skill: self.encryption,
            physics_skill_1: self.physics1,
            physics_skill_2: self.physics2,
            decryptor: self.decryptor,
            base: self.base.clone(),
            use_invented_blueprint,
        }
    }
}
