//! Invention chance, output runs and input materials.
//!
//! Tech-2 blueprints are invented from a tech-1 blueprint and tech-3
//! blueprints from an ancient hull section. The result depends on the source's
//! production category, three science skills and an optional decryptor.

mod tables;

pub use tables::{
    category_modifiers, known_categories, CategoryModifiers, Decryptor, DecryptorModifiers,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::item::{Activity, ItemRef, MaterialRequirement, TypeId};
use crate::market::{check_skill, round2};

/// Material efficiency of a freshly invented blueprint before decryptor effects.
const BASE_INVENTED_ME: i8 = 2;

/// Time efficiency of a freshly invented blueprint before decryptor effects.
const BASE_INVENTED_TE: i8 = 0;

/// Inputs to the invention formula once the source category is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventionParameters {
    pub source_group: String,
    pub encryption_skill: u8,
    pub physics_skill_1: u8,
    pub physics_skill_2: u8,
    #[serde(default)]
    pub decryptor: Decryptor,
}

impl InventionParameters {
    pub fn validate(&self) -> Result<()> {
        check_skill("encryption", self.encryption_skill)?;
        check_skill("first science", self.physics_skill_1)?;
        check_skill("second science", self.physics_skill_2)?;
        Ok(())
    }
}

/// Outcome of an invention attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InventionStats {
    /// Success probability, rounded to three decimals.
    pub chance: f64,
    /// Runs on the invented blueprint copy.
    pub runs: u64,
    pub material_efficiency: i8,
    pub time_efficiency: i8,
}

/// Compute invention statistics from the modifier tables.
pub fn invention_stats(params: &InventionParameters) -> Result<InventionStats> {
    params.validate()?;
    let category = category_modifiers(&params.source_group).ok_or_else(|| {
        Error::UnknownInventionCategory {
            category: params.source_group.clone(),
        }
    })?;
    let decryptor = params.decryptor.modifiers();

    let skill_bonus = 1.0
        + f64::from(params.encryption_skill) / 40.0
        + (f64::from(params.physics_skill_1) + f64::from(params.physics_skill_2)) / 30.0;
    let chance = category.base_chance * skill_bonus * decryptor.chance_multiplier;

    Ok(InventionStats {
        chance: (chance * 1000.0).round() / 1000.0,
        runs: category.base_runs + decryptor.runs,
        material_efficiency: BASE_INVENTED_ME + decryptor.material_efficiency,
        time_efficiency: BASE_INVENTED_TE + decryptor.time_efficiency,
    })
}

/// Production category of an invention source.
///
/// Hull sections are their own category; anything else is mapped to its
/// blueprint's market category.
pub fn invention_category(catalog: &impl Catalog, source: TypeId) -> Result<String> {
    if catalog.is_hull_section(source) {
        return Ok(catalog.display_name(source));
    }
    if !catalog.is_blueprint(source) && !catalog.is_manufacturable(source) {
        return Err(Error::NotInventable {
            item: catalog.display_name(source),
        });
    }
    catalog
        .production_category(source)
        .ok_or_else(|| Error::UnknownInventionCategory {
            category: format!("(no market category for {})", catalog.display_name(source)),
        })
}

/// Invention statistics for inventing from `source_item` (a tech-1 item,
/// tech-1 blueprint or hull section).
pub fn compute_invention_stats(
    catalog: &impl Catalog,
    source_item: &ItemRef,
    encryption_skill: u8,
    physics_skill_1: u8,
    physics_skill_2: u8,
    decryptor: Decryptor,
) -> Result<InventionStats> {
    let source = catalog.resolve(source_item)?;
    let params = InventionParameters {
        source_group: invention_category(catalog, source)?,
        encryption_skill,
        physics_skill_1,
        physics_skill_2,
        decryptor,
    };
    let stats = invention_stats(&params)?;
    debug!(
        source,
        category = %params.source_group,
        decryptor = %decryptor,
        chance = stats.chance,
        runs = stats.runs,
        "computed invention stats"
    );
    Ok(stats)
}

/// Candidate invention bases for an item or its blueprint, ordered by id.
///
/// Empty for items that are not invented.
pub fn invention_bases(catalog: &impl Catalog, item: &ItemRef) -> Result<Vec<TypeId>> {
    let id = catalog.resolve(item)?;
    Ok(catalog.invention_base_for(id))
}

/// The single blueprint or hull section that invention for `target` starts from.
///
/// `target` may be the invented item, its blueprint, the tech-1 item, the
/// tech-1 blueprint or a hull section.
pub fn resolve_invention_base(catalog: &impl Catalog, target: TypeId) -> Result<TypeId> {
    if catalog.is_hull_section(target) {
        return Ok(target);
    }

    let bases = catalog.invention_base_for(target);
    let base = match bases.as_slice() {
        [single] => *single,
        [] if catalog.is_blueprint(target) => target,
        [] => catalog
            .blueprint_for(target, Activity::Manufacturing)
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotInventable {
                item: catalog.display_name(target),
            })?,
        many => {
            return Err(Error::AmbiguousInventionBase {
                item: catalog.display_name(target),
                candidates: many.iter().map(|id| catalog.display_name(*id)).collect(),
            })
        }
    };

    if catalog.blueprint_product(base, Activity::Invention).is_none() {
        return Err(Error::NotInventable {
            item: catalog.display_name(target),
        });
    }
    Ok(base)
}

/// Resolve an explicitly chosen invention `base` and check that it leads to `target`.
///
/// `target` is the invented item or blueprint, or the tech-1 source itself.
/// A base whose invented blueprint does not manufacture `target` is rejected.
pub fn resolve_explicit_invention_base(
    catalog: &impl Catalog,
    target: TypeId,
    base: TypeId,
) -> Result<TypeId> {
    let resolved = resolve_invention_base(catalog, base)?;
    let target_blueprints = if catalog.is_blueprint(target) {
        vec![target]
    } else {
        catalog.blueprint_for(target, Activity::Manufacturing)
    };

    let is_source = resolved == target || target_blueprints.contains(&resolved);
    let invents_target = invented_blueprint(catalog, resolved)
        .is_some_and(|blueprint| target_blueprints.contains(&blueprint));
    if !is_source && !invents_target {
        return Err(Error::InventionBaseMismatch {
            item: catalog.display_name(target),
            base: catalog.display_name(resolved),
        });
    }
    Ok(resolved)
}

/// Datacores, decryptor and hull section consumed by one invention attempt.
pub fn compute_invention_materials(
    catalog: &impl Catalog,
    target: &ItemRef,
    decryptor: Decryptor,
) -> Result<MaterialRequirement> {
    let id = catalog.resolve(target)?;
    let base = resolve_invention_base(catalog, id)?;
    materials_for_base(catalog, base, decryptor)
}

/// Like [`compute_invention_materials`] with the base given explicitly,
/// for targets that can be invented from several bases.
pub fn invention_materials_for_base(
    catalog: &impl Catalog,
    base: &ItemRef,
    decryptor: Decryptor,
) -> Result<MaterialRequirement> {
    let id = catalog.resolve(base)?;
    let base = resolve_invention_base(catalog, id)?;
    materials_for_base(catalog, base, decryptor)
}

pub(crate) fn materials_for_base(
    catalog: &impl Catalog,
    base: TypeId,
    decryptor: Decryptor,
) -> Result<MaterialRequirement> {
    let mut materials = catalog.blueprint_materials(base, Activity::Invention);
    if let Some(name) = decryptor.item_name() {
        let decryptor_id = catalog.resolve(&ItemRef::ByName(name))?;
        materials.add(decryptor_id, 1);
    }
    if catalog.is_hull_section(base) {
        materials.add(base, 1);
    }
    Ok(materials)
}

/// Blueprint produced by a successful invention from `base`.
pub fn invented_blueprint(catalog: &impl Catalog, base: TypeId) -> Option<TypeId> {
    catalog
        .blueprint_product(base, Activity::Invention)
        .map(|(blueprint, _)| blueprint)
}

/// Expected invention cost attributed to one run of the invented blueprint.
pub fn invention_cost_per_run(cost_per_attempt: f64, stats: &InventionStats) -> f64 {
    round2(cost_per_attempt / stats.chance / stats.runs as f64)
}
