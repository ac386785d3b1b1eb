//! EVE industry library entry points.
//!
//! This crate resolves recursive bills of materials for manufactured items,
//! models invention for tech-2 and tech-3 blueprints, and rolls material
//! prices, trade fees and job fees up into a build cost. Static data is read
//! through the [`Catalog`] trait and prices through [`PriceOracle`]; the
//! computations themselves perform no I/O. Higher-level consumers (the CLI)
//! should only depend on the functions exported here instead of
//! reimplementing behavior.
//!

#![deny(warnings)]

pub mod bom;
pub mod catalog;
pub mod cost;
pub mod dataset;
pub mod efficiency;
pub mod error;
pub mod invention;
pub mod item;
pub mod market;
pub mod prices;

pub use bom::{
    resolve_base_materials, resolve_build_plan, resolve_components, runs_for_quantity, BuildPlan,
    ComponentOverrides, ProductionParameters,
};
pub use catalog::{
    load_catalog, load_catalog_from_connection, Catalog, CatalogBuilder, StaticCatalog,
};
pub use cost::{
    assess_profit, compute_build_cost, materials_cost, BuildRequest, CostBreakdown, InventionCost,
    InventionPlan, JobFeeEstimator, ProfitReport,
};
pub use dataset::{default_catalog_path, resolve_catalog_path, resolve_prices_path};
pub use efficiency::{compute_job_time, scale_by_efficiency, scale_time};
pub use error::{Error, Result};
pub use invention::{
    compute_invention_materials, compute_invention_stats, invented_blueprint, invention_bases,
    invention_category, invention_cost_per_run, invention_materials_for_base, invention_stats,
    resolve_explicit_invention_base, resolve_invention_base, Decryptor, InventionParameters,
    InventionStats,
};
pub use item::{Activity, ItemRef, MaterialRequirement, TypeId};
pub use market::{BuildLocation, FeeConfig, OrderType};
pub use prices::{PriceList, PriceOracle};
