//! Build cost rollup and profit assessment.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bom::{
    build_plan_for, manufacturing_blueprint, runs_needed, ComponentOverrides, ProductionParameters,
};
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::invention::{
    compute_invention_stats, invention_cost_per_run, materials_for_base,
    resolve_explicit_invention_base, resolve_invention_base, Decryptor, InventionStats,
};
use crate::item::{Activity, ItemRef, MaterialRequirement, TypeId};
use crate::market::{round2, FeeConfig, OrderType};
use crate::prices::PriceOracle;

/// Invention settings for a build that starts from an invented blueprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventionPlan {
    pub encryption_skill: u8,
    pub physics_skill_1: u8,
    pub physics_skill_2: u8,
    pub decryptor: Decryptor,
    /// Explicit invention base for items with several candidates.
    pub base: Option<ItemRef>,
    /// Build with the invented copy's ME, TE and run limit instead of the request's.
    pub use_invented_blueprint: bool,
}

/// Everything needed to cost a build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub product: ItemRef,
    pub quantity: u64,
    pub params: ProductionParameters,
    pub overrides: ComponentOverrides,
    pub fees: FeeConfig,
    pub invention: Option<InventionPlan>,
}

impl BuildRequest {
    pub fn new(product: impl Into<ItemRef>, quantity: u64) -> Self {
        Self {
            product: product.into(),
            quantity,
            params: ProductionParameters::default(),
            overrides: ComponentOverrides::default(),
            fees: FeeConfig::default(),
            invention: None,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: ProductionParameters) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: ComponentOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn with_fees(mut self, fees: FeeConfig) -> Self {
        self.fees = fees;
        self
    }

    #[must_use]
    pub fn with_invention(mut self, plan: InventionPlan) -> Self {
        self.invention = Some(plan);
        self
    }
}

/// Estimates manufacturing job installation fees.
///
/// The base cost of one run of an item's blueprint is computed once per item
/// and reused for the lifetime of the estimator.
#[derive(Debug, Default)]
pub struct JobFeeEstimator {
    base_costs: Mutex<HashMap<TypeId, f64>>,
}

impl JobFeeEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-run, zero-efficiency materials of `item` valued at adjusted prices.
    pub fn base_cost_per_run(&self, catalog: &impl Catalog, item: TypeId) -> Result<f64> {
        if let Some(cost) = self.lock().get(&item) {
            return Ok(*cost);
        }

        let (blueprint, _) = manufacturing_blueprint(catalog, item)?;
        let materials = catalog.blueprint_materials(blueprint, Activity::Manufacturing);
        let mut total = 0.0;
        for (material, quantity) in materials.iter() {
            let price = catalog
                .adjusted_price(material)
                .ok_or_else(|| Error::MissingPrice {
                    item: catalog.display_name(material),
                    side: "adjusted".to_string(),
                })?;
            total += price * quantity as f64;
        }
        let cost = round2(total);
        debug!(item, cost, "cached job base cost");

        self.lock().insert(item, cost);
        Ok(cost)
    }

    /// Installation fee for `runs` manufacturing runs of `item`.
    pub fn job_fee(
        &self,
        catalog: &impl Catalog,
        item: TypeId,
        runs: u64,
        fees: &FeeConfig,
    ) -> Result<f64> {
        if runs == 0 {
            return Ok(0.0);
        }
        let base = self.base_cost_per_run(catalog, item)?;
        Ok(round2(
            base * runs as f64 * fees.system_cost_index * fees.build_location.fee_multiplier(),
        ))
    }

    /// Number of items with a cached base cost.
    pub fn cached_items(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TypeId, f64>> {
        self.base_costs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Invention share of a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventionCost {
    pub base: TypeId,
    pub stats: InventionStats,
    pub materials: MaterialRequirement,
    pub cost_per_attempt: f64,
    pub cost_per_run: f64,
    pub total: f64,
}

/// Itemised cost of a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub product: TypeId,
    pub quantity: u64,
    pub runs: u64,
    /// Blueprint settings the product was built with.
    pub params: ProductionParameters,
    pub components: MaterialRequirement,
    pub base_materials: MaterialRequirement,
    pub base_materials_cost: BTreeMap<TypeId, f64>,
    pub base_materials_buy_fees: BTreeMap<TypeId, f64>,
    pub component_build_fees: BTreeMap<TypeId, f64>,
    pub product_build_fee: f64,
    pub invention: Option<InventionCost>,
    pub total_cost: f64,
}

impl CostBreakdown {
    pub fn materials_cost(&self) -> f64 {
        self.base_materials_cost.values().sum()
    }

    pub fn buy_fees(&self) -> f64 {
        self.base_materials_buy_fees.values().sum()
    }

    pub fn component_fees(&self) -> f64 {
        self.component_build_fees.values().sum()
    }

    /// Total cost divided over the produced quantity.
    pub fn unit_cost(&self) -> f64 {
        if self.quantity == 0 {
            0.0
        } else {
            self.total_cost / self.quantity as f64
        }
    }
}

fn unit_price(
    catalog: &impl Catalog,
    prices: &impl PriceOracle,
    item: TypeId,
    side: OrderType,
) -> Result<f64> {
    prices
        .unit_price(item, side)
        .ok_or_else(|| Error::MissingPrice {
            item: catalog.display_name(item),
            side: side.to_string(),
        })
}

/// Value of `materials` on one side of the order book, before fees.
pub fn materials_cost(
    catalog: &impl Catalog,
    prices: &impl PriceOracle,
    materials: &MaterialRequirement,
    side: OrderType,
) -> Result<f64> {
    materials.iter().try_fold(0.0, |total, (item, quantity)| {
        Ok(total + unit_price(catalog, prices, item, side)? * quantity as f64)
    })
}

/// Price and fee every part of a build.
///
/// Fails as a whole if any required price is missing.
pub fn compute_build_cost(
    catalog: &impl Catalog,
    prices: &impl PriceOracle,
    request: &BuildRequest,
    estimator: &JobFeeEstimator,
) -> Result<CostBreakdown> {
    let fees = &request.fees;
    fees.validate()?;
    let product = catalog.resolve(&request.product)?;

    let invention = match &request.invention {
        Some(plan) => Some(plan_invention(catalog, prices, product, plan, fees.buy_via)?),
        None => None,
    };

    let mut params = request.params.clone();
    if let (Some(plan), Some(planned)) = (&request.invention, &invention) {
        if plan.use_invented_blueprint {
            let invented = ProductionParameters::from_invention(&planned.stats);
            params.material_efficiency = invented.material_efficiency;
            params.time_efficiency = invented.time_efficiency;
            params.max_runs_per_blueprint = invented.max_runs_per_blueprint;
        }
    }

    let plan = build_plan_for(catalog, product, request.quantity, &params, &request.overrides)?;
    let runs = runs_needed(catalog, product, request.quantity)?;

    let mut base_materials_cost = BTreeMap::new();
    let mut base_materials_buy_fees = BTreeMap::new();
    for (item, quantity) in plan.base_materials.iter() {
        let cost = unit_price(catalog, prices, item, fees.buy_via)? * quantity as f64;
        base_materials_cost.insert(item, cost);
        base_materials_buy_fees.insert(item, fees.buy_fee(cost));
    }

    let mut component_build_fees = BTreeMap::new();
    for (component, quantity) in plan.components.iter() {
        let fee = if plan.base_materials.contains(component) {
            0.0
        } else {
            let component_runs = runs_needed(catalog, component, quantity)?;
            estimator.job_fee(catalog, component, component_runs, fees)?
        };
        component_build_fees.insert(component, fee);
    }

    let product_build_fee = match params.max_runs_per_blueprint.map(|max| max.get()) {
        Some(max_runs) if runs > max_runs => {
            let full_batches = runs / max_runs;
            let remainder = runs % max_runs;
            estimator.job_fee(catalog, product, max_runs, fees)? * full_batches as f64
                + estimator.job_fee(catalog, product, remainder, fees)?
        }
        _ => estimator.job_fee(catalog, product, runs, fees)?,
    };

    let invention = invention.map(|planned| {
        let cost_per_run = invention_cost_per_run(planned.cost_per_attempt, &planned.stats);
        InventionCost {
            base: planned.base,
            stats: planned.stats,
            materials: planned.materials,
            cost_per_attempt: planned.cost_per_attempt,
            cost_per_run,
            total: round2(cost_per_run * runs as f64),
        }
    });

    let total_cost = base_materials_cost.values().sum::<f64>()
        + base_materials_buy_fees.values().sum::<f64>()
        + component_build_fees.values().sum::<f64>()
        + product_build_fee
        + invention.as_ref().map_or(0.0, |cost| cost.total);

    debug!(
        product,
        quantity = request.quantity,
        runs,
        total_cost,
        "computed build cost"
    );

    Ok(CostBreakdown {
        product,
        quantity: request.quantity,
        runs,
        params,
        components: plan.components,
        base_materials: plan.base_materials,
        base_materials_cost,
        base_materials_buy_fees,
        component_build_fees,
        product_build_fee,
        invention,
        total_cost,
    })
}

struct PlannedInvention {
    base: TypeId,
    stats: InventionStats,
    materials: MaterialRequirement,
    cost_per_attempt: f64,
}

fn plan_invention(
    catalog: &impl Catalog,
    prices: &impl PriceOracle,
    product: TypeId,
    plan: &InventionPlan,
    side: OrderType,
) -> Result<PlannedInvention> {
    let base = match &plan.base {
        Some(base) => resolve_explicit_invention_base(catalog, product, catalog.resolve(base)?)?,
        None => resolve_invention_base(catalog, product)?,
    };
    let stats = compute_invention_stats(
        catalog,
        &ItemRef::ById(base),
        plan.encryption_skill,
        plan.physics_skill_1,
        plan.physics_skill_2,
        plan.decryptor,
    )?;
    let materials = materials_for_base(catalog, base, plan.decryptor)?;
    let cost_per_attempt = materials_cost(catalog, prices, &materials, side)?;

    Ok(PlannedInvention {
        base,
        stats,
        materials,
        cost_per_attempt,
    })
}

/// Selling side of a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitReport {
    pub unit_sell_price: f64,
    pub revenue: f64,
    pub sell_fee: f64,
    pub total_cost: f64,
    pub profit: f64,
    /// Profit as a fraction of total cost.
    pub margin: f64,
    pub job_seconds: Option<u64>,
    pub profit_per_hour: Option<f64>,
}

/// Revenue, fees and profit from selling the output of `breakdown`.
///
/// Selling through sell orders uses the sell price and pays the broker fee;
/// selling into buy orders uses the buy price and pays only tax.
pub fn assess_profit(
    catalog: &impl Catalog,
    prices: &impl PriceOracle,
    breakdown: &CostBreakdown,
    fees: &FeeConfig,
    job_seconds: Option<u64>,
) -> Result<ProfitReport> {
    fees.validate()?;
    let unit_sell_price = unit_price(catalog, prices, breakdown.product, fees.sell_via)?;
    let revenue = unit_sell_price * breakdown.quantity as f64;
    let sell_fee = fees.sell_fee(revenue);
    let profit = revenue - sell_fee - breakdown.total_cost;
    let margin = if breakdown.total_cost > 0.0 {
        profit / breakdown.total_cost
    } else {
        0.0
    };
    let profit_per_hour = job_seconds
        .filter(|seconds| *seconds > 0)
        .map(|seconds| profit / (seconds as f64 / 3600.0));

    Ok(ProfitReport {
        unit_sell_price,
        revenue,
        sell_fee,
        total_cost: breakdown.total_cost,
        profit,
        margin,
        job_seconds,
        profit_per_hour,
    })
}
