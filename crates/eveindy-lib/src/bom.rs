//! Bill-of-materials resolution.
//!
//! [`resolve_components`] expands a wanted quantity into the materials listed
//! on the item's manufacturing blueprint, after run batching and efficiency
//! scaling. [`resolve_base_materials`] keeps expanding every manufacturable
//! component until only raw materials remain.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::efficiency::{scale_by_efficiency, validate_factors, validate_level};
use crate::error::{Error, Result};
use crate::invention::InventionStats;
use crate::item::{Activity, ItemRef, MaterialRequirement, TypeId};

/// Blueprint and bonus settings for one production step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionParameters {
    pub material_efficiency: u8,
    pub time_efficiency: u8,
    pub additional_material_efficiencies: Vec<f64>,
    pub additional_time_efficiencies: Vec<f64>,
    /// Maximum runs a single blueprint copy allows; `None` is unbounded.
    pub max_runs_per_blueprint: Option<NonZeroU64>,
}

impl ProductionParameters {
    pub fn new(material_efficiency: u8, time_efficiency: u8) -> Self {
        Self {
            material_efficiency,
            time_efficiency,
            ..Self::default()
        }
    }

    /// Set the per-copy run limit; zero means unbounded.
    #[must_use]
    pub fn with_max_runs(mut self, max_runs: u64) -> Self {
        self.max_runs_per_blueprint = NonZeroU64::new(max_runs);
        self
    }

    #[must_use]
    pub fn with_material_bonuses(mut self, factors: Vec<f64>) -> Self {
        self.additional_material_efficiencies = factors;
        self
    }

    #[must_use]
    pub fn with_time_bonuses(mut self, factors: Vec<f64>) -> Self {
        self.additional_time_efficiencies = factors;
        self
    }

    /// Blueprint settings of an invented copy.
    ///
    /// Negative invented time efficiency is floored at zero.
    pub fn from_invention(stats: &InventionStats) -> Self {
        Self {
            material_efficiency: clamp_level(stats.material_efficiency),
            time_efficiency: clamp_level(stats.time_efficiency),
            max_runs_per_blueprint: NonZeroU64::new(stats.runs),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_level("material efficiency", self.material_efficiency)?;
        validate_level("time efficiency", self.time_efficiency)?;
        validate_factors("material", &self.additional_material_efficiencies)?;
        validate_factors("time", &self.additional_time_efficiencies)?;
        Ok(())
    }

    fn max_runs(&self) -> Option<u64> {
        self.max_runs_per_blueprint.map(NonZeroU64::get)
    }
}

fn clamp_level(level: i8) -> u8 {
    u8::try_from(level.max(0)).unwrap_or(0)
}

/// Production settings for intermediate components.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentOverrides {
    /// Settings for specific components; anything else builds at zero efficiency.
    PerItem(HashMap<TypeId, ProductionParameters>),
    /// The same settings for every first-level component.
    Uniform(ProductionParameters),
}

impl Default for ComponentOverrides {
    fn default() -> Self {
        ComponentOverrides::PerItem(HashMap::new())
    }
}

impl ComponentOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn uniform(params: ProductionParameters) -> Self {
        ComponentOverrides::Uniform(params)
    }

    pub fn per_item(entries: impl IntoIterator<Item = (TypeId, ProductionParameters)>) -> Self {
        ComponentOverrides::PerItem(entries.into_iter().collect())
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ComponentOverrides::PerItem(entries) => {
                entries.values().try_for_each(ProductionParameters::validate)
            }
            ComponentOverrides::Uniform(params) => params.validate(),
        }
    }

    /// Concrete per-component settings given the first-level component set.
    fn resolve_against(
        &self,
        first_level: &MaterialRequirement,
    ) -> HashMap<TypeId, ProductionParameters> {
        match self {
            ComponentOverrides::PerItem(entries) => entries.clone(),
            ComponentOverrides::Uniform(params) => first_level
                .items()
                .map(|id| (id, params.clone()))
                .collect(),
        }
    }
}

/// First-level components and fully expanded base materials of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub components: MaterialRequirement,
    pub base_materials: MaterialRequirement,
}

/// Number of manufacturing runs needed to produce at least `quantity` units.
pub fn runs_for_quantity(catalog: &impl Catalog, item: &ItemRef, quantity: u64) -> Result<u64> {
    let id = catalog.resolve(item)?;
    runs_needed(catalog, id, quantity)
}

pub(crate) fn runs_needed(catalog: &impl Catalog, item: TypeId, quantity: u64) -> Result<u64> {
    let (_, output) = manufacturing_blueprint(catalog, item)?;
    Ok(quantity.div_ceil(output))
}

/// Manufacturing blueprint of `item` and its per-run output quantity.
pub(crate) fn manufacturing_blueprint(
    catalog: &impl Catalog,
    item: TypeId,
) -> Result<(TypeId, u64)> {
    let not_manufacturable = || Error::NotManufacturable {
        item: catalog.display_name(item),
    };
    let blueprint = catalog
        .blueprint_for(item, Activity::Manufacturing)
        .into_iter()
        .next()
        .ok_or_else(not_manufacturable)?;
    let (_, output) = catalog
        .blueprint_product(blueprint, Activity::Manufacturing)
        .ok_or_else(not_manufacturable)?;
    Ok((blueprint, output.max(1)))
}

/// Materials listed on the blueprint for producing `quantity` units of `item`.
///
/// When the runs needed exceed the per-copy limit, full copies and the
/// remainder are scaled separately and summed, so rounding happens per copy.
pub fn resolve_components(
    catalog: &impl Catalog,
    item: &ItemRef,
    quantity: u64,
    params: &ProductionParameters,
) -> Result<MaterialRequirement> {
    let id = catalog.resolve(item)?;
    components_for(catalog, id, quantity, params)
}

pub(crate) fn components_for(
    catalog: &impl Catalog,
    item: TypeId,
    quantity: u64,
    params: &ProductionParameters,
) -> Result<MaterialRequirement> {
    params.validate()?;
    let (blueprint, output) = manufacturing_blueprint(catalog, item)?;
    if quantity == 0 {
        return Ok(MaterialRequirement::new());
    }

    let runs = quantity.div_ceil(output);
    match params.max_runs() {
        Some(max_runs) if runs > max_runs => {
            let full_batches = runs / max_runs;
            let remainder = runs % max_runs;
            debug!(
                item,
                runs, max_runs, full_batches, remainder, "splitting production across copies"
            );

            let mut total =
                single_batch(catalog, blueprint, max_runs, params)?.scaled(full_batches)?;
            if remainder > 0 {
                total.checked_merge(&single_batch(catalog, blueprint, remainder, params)?)?;
            }
            Ok(total)
        }
        _ => single_batch(catalog, blueprint, runs, params),
    }
}

fn single_batch(
    catalog: &impl Catalog,
    blueprint: TypeId,
    runs: u64,
    params: &ProductionParameters,
) -> Result<MaterialRequirement> {
    let per_run = catalog.blueprint_materials(blueprint, Activity::Manufacturing);
    scale_by_efficiency(
        &per_run.scaled(runs)?,
        runs,
        params.material_efficiency,
        &params.additional_material_efficiencies,
    )
}

#[derive(Debug)]
struct Pending {
    quantity: u64,
    ancestors: BTreeSet<TypeId>,
}

fn push_pending(
    snapshot: &mut BTreeMap<TypeId, Pending>,
    item: TypeId,
    quantity: u64,
    ancestors: &BTreeSet<TypeId>,
) -> Result<()> {
    let entry = snapshot.entry(item).or_insert_with(|| Pending {
        quantity: 0,
        ancestors: BTreeSet::new(),
    });
    entry.quantity = entry
        .quantity
        .checked_add(quantity)
        .ok_or(Error::QuantityOverflow { item })?;
    entry.ancestors.extend(ancestors.iter().copied());
    Ok(())
}

fn push_children(
    catalog: &impl Catalog,
    snapshot: &mut BTreeMap<TypeId, Pending>,
    children: &MaterialRequirement,
    ancestors: &BTreeSet<TypeId>,
) -> Result<()> {
    for (child, quantity) in children.iter() {
        if ancestors.contains(&child) {
            return Err(Error::CycleDetected {
                item: catalog.display_name(child),
            });
        }
        push_pending(snapshot, child, quantity, ancestors)?;
    }
    Ok(())
}

/// Raw materials needed to produce `quantity` units of `item`.
///
/// Every manufacturable component is replaced by its own components until no
/// manufacturable item remains. Components use their override settings when
/// present, otherwise zero efficiency and no run limit.
pub fn resolve_base_materials(
    catalog: &impl Catalog,
    item: &ItemRef,
    quantity: u64,
    params: &ProductionParameters,
    overrides: &ComponentOverrides,
) -> Result<MaterialRequirement> {
    Ok(resolve_build_plan(catalog, item, quantity, params, overrides)?.base_materials)
}

/// Resolve first-level components and base materials in one pass.
pub fn resolve_build_plan(
    catalog: &impl Catalog,
    item: &ItemRef,
    quantity: u64,
    params: &ProductionParameters,
    overrides: &ComponentOverrides,
) -> Result<BuildPlan> {
    let id = catalog.resolve(item)?;
    build_plan_for(catalog, id, quantity, params, overrides)
}

pub(crate) fn build_plan_for(
    catalog: &impl Catalog,
    item: TypeId,
    quantity: u64,
    params: &ProductionParameters,
    overrides: &ComponentOverrides,
) -> Result<BuildPlan> {
    overrides.validate()?;
    let components = components_for(catalog, item, quantity, params)?;
    let overrides = overrides.resolve_against(&components);
    let default_params = ProductionParameters::default();

    let mut snapshot = BTreeMap::new();
    push_children(catalog, &mut snapshot, &components, &BTreeSet::from([item]))?;

    let mut depth = 0usize;
    while snapshot.keys().any(|id| catalog.is_manufacturable(*id)) {
        depth += 1;
        let mut next = BTreeMap::new();
        for (id, pending) in snapshot {
            if !catalog.is_manufacturable(id) {
                push_pending(&mut next, id, pending.quantity, &pending.ancestors)?;
                continue;
            }
            let params = overrides.get(&id).unwrap_or(&default_params);
            let children = components_for(catalog, id, pending.quantity, params)?;
            let mut ancestors = pending.ancestors;
            ancestors.insert(id);
            push_children(catalog, &mut next, &children, &ancestors)?;
        }
        snapshot = next;
    }

    let base_materials: MaterialRequirement = snapshot
        .into_iter()
        .map(|(id, pending)| (id, pending.quantity))
        .collect();
    debug!(
        item,
        quantity,
        depth,
        components = components.len(),
        base_materials = base_materials.len(),
        "resolved build plan"
    );

    Ok(BuildPlan {
        components,
        base_materials,
    })
}
