//! Read-only item and blueprint catalog.
//!
//! The [`Catalog`] trait is the seam between the computation engine and
//! whatever holds the static industry data. [`StaticCatalog`] is the in-memory
//! implementation used by the SQLite loader in [`db`] and by
//! [`CatalogBuilder`] for hand-assembled catalogs.

pub mod db;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Error, Result};
use crate::item::{Activity, ItemRef, MaterialRequirement, TypeId};

pub use db::{load_catalog, load_catalog_from_connection};

/// Lookups the engine needs from the static industry data.
pub trait Catalog {
    /// Normalize an [`ItemRef`] to the catalog's numeric identifier.
    fn resolve(&self, item: &ItemRef) -> Result<TypeId>;

    /// Display name for a type id.
    fn item_name(&self, id: TypeId) -> Option<&str>;

    /// True when a blueprint produces `item` through Manufacturing.
    fn is_manufacturable(&self, item: TypeId) -> bool;

    /// True when any blueprint activity produces `item`.
    fn has_blueprint_for(&self, item: TypeId) -> bool;

    /// True when `id` is itself a blueprint (or an invention source such as a hull section).
    fn is_blueprint(&self, id: TypeId) -> bool;

    /// Blueprints producing `product` through `activity`, ordered by id.
    fn blueprint_for(&self, product: TypeId, activity: Activity) -> Vec<TypeId>;

    /// Unscaled materials consumed by one run of `activity` on `blueprint`.
    fn blueprint_materials(&self, blueprint: TypeId, activity: Activity) -> MaterialRequirement;

    /// Product and output quantity of one run of `activity` on `blueprint`.
    fn blueprint_product(&self, blueprint: TypeId, activity: Activity) -> Option<(TypeId, u64)>;

    /// Duration in seconds of one run of `activity` on `blueprint`.
    fn blueprint_time(&self, blueprint: TypeId, activity: Activity) -> Option<u64>;

    /// Production category used to look up invention modifiers.
    fn production_category(&self, blueprint_or_item: TypeId) -> Option<String>;

    /// True when `item` is a tech-3 hull section.
    fn is_hull_section(&self, item: TypeId) -> bool;

    /// Blueprints or hull sections from which the blueprint of `item` is invented.
    fn invention_base_for(&self, item: TypeId) -> Vec<TypeId>;

    /// Reference (adjusted) price used to estimate job fees.
    fn adjusted_price(&self, item: TypeId) -> Option<f64>;

    /// Name for display purposes, falling back to the numeric id.
    fn display_name(&self, id: TypeId) -> String {
        self.item_name(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }
}

/// Item row stored in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: TypeId,
    pub name: String,
    pub market_group_id: Option<i64>,
    pub adjusted_price: Option<f64>,
}

/// Market group row; only the parent link and name are used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketGroup {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct BlueprintActivity {
    materials: MaterialRequirement,
    products: Vec<(TypeId, u64)>,
    time: Option<u64>,
}

/// In-memory catalog backed by hash maps.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: HashMap<TypeId, ItemRecord>,
    name_to_id: HashMap<String, TypeId>,
    market_groups: HashMap<i64, MarketGroup>,
    activities: HashMap<(TypeId, Activity), BlueprintActivity>,
    producers: HashMap<(TypeId, Activity), Vec<TypeId>>,
    blueprints: HashSet<TypeId>,
}

impl StaticCatalog {
    /// Number of items in the catalog.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Full item record for `id`.
    pub fn item(&self, id: TypeId) -> Option<&ItemRecord> {
        self.items.get(&id)
    }

    /// Market group record for `id`.
    pub fn market_group(&self, id: i64) -> Option<&MarketGroup> {
        self.market_groups.get(&id)
    }

    /// Up to `limit` item names similar to `name`, best match first.
    pub fn fuzzy_item_matches(&self, name: &str, limit: usize) -> Vec<String> {
        const MIN_SIMILARITY: f64 = 0.8;

        let needle = normalize_name(name);
        let mut scored: Vec<(f64, &str)> = self
            .items
            .values()
            .map(|item| {
                let score = strsim::jaro_winkler(&needle, &normalize_name(&item.name));
                (score, item.name.as_str())
            })
            .filter(|(score, _)| *score >= MIN_SIMILARITY)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    pub(crate) fn insert_item(&mut self, record: ItemRecord) -> bool {
        let key = normalize_name(&record.name);
        if self.items.contains_key(&record.id) {
            return false;
        }
        if let Some(existing) = self.name_to_id.get(&key) {
            debug!(
                name = %record.name,
                existing = *existing,
                duplicate = record.id,
                "duplicate item name; keeping first id for name lookup"
            );
        } else {
            self.name_to_id.insert(key, record.id);
        }
        self.items.insert(record.id, record);
        true
    }

    pub(crate) fn insert_market_group(&mut self, group: MarketGroup) {
        self.market_groups.insert(group.id, group);
    }

    pub(crate) fn set_adjusted_price(&mut self, id: TypeId, price: f64) -> bool {
        match self.items.get_mut(&id) {
            Some(item) => {
                item.adjusted_price = Some(price);
                true
            }
            None => false,
        }
    }

    pub(crate) fn insert_material(
        &mut self,
        blueprint: TypeId,
        activity: Activity,
        material: TypeId,
        quantity: u64,
    ) {
        self.activities
            .entry((blueprint, activity))
            .or_default()
            .materials
            .add(material, quantity);
    }

    pub(crate) fn insert_product(
        &mut self,
        blueprint: TypeId,
        activity: Activity,
        product: TypeId,
        quantity: u64,
    ) {
        self.activities
            .entry((blueprint, activity))
            .or_default()
            .products
            .push((product, quantity));
        let producers = self.producers.entry((product, activity)).or_default();
        if !producers.contains(&blueprint) {
            producers.push(blueprint);
            producers.sort_unstable();
        }
        self.blueprints.insert(blueprint);
    }

    pub(crate) fn insert_time(&mut self, blueprint: TypeId, activity: Activity, seconds: u64) {
        self.activities
            .entry((blueprint, activity))
            .or_default()
            .time = Some(seconds);
    }

    /// Manufacturing blueprint for an item, or the id itself when it is already a blueprint.
    fn as_blueprint(&self, id: TypeId) -> Option<TypeId> {
        if self.blueprints.contains(&id) {
            return Some(id);
        }
        self.blueprint_for(id, Activity::Manufacturing)
            .into_iter()
            .next()
    }

    /// Confirm that every blueprint row references a known item.
    fn validate(&self) -> Result<()> {
        for ((blueprint, activity), entry) in &self.activities {
            if !self.items.contains_key(blueprint) {
                return Err(Error::CatalogDataValidation {
                    message: format!("{activity} data references unknown blueprint {blueprint}"),
                });
            }
            let referenced = entry
                .materials
                .items()
                .chain(entry.products.iter().map(|(id, _)| *id));
            for id in referenced {
                if !self.items.contains_key(&id) {
                    return Err(Error::CatalogDataValidation {
                        message: format!(
                            "{activity} data for blueprint {blueprint} references unknown item {id}"
                        ),
                    });
                }
            }
            if entry.products.iter().any(|(_, quantity)| *quantity == 0) {
                return Err(Error::CatalogDataValidation {
                    message: format!(
                        "{activity} output quantity for blueprint {blueprint} must be positive"
                    ),
                });
            }
        }
        Ok(())
    }
}

impl Catalog for StaticCatalog {
    fn resolve(&self, item: &ItemRef) -> Result<TypeId> {
        match item {
            ItemRef::ById(id) if self.items.contains_key(id) => Ok(*id),
            ItemRef::ById(id) => Err(Error::UnknownItem {
                name: id.to_string(),
                suggestions: Vec::new(),
            }),
            ItemRef::ByName(name) => self
                .name_to_id
                .get(&normalize_name(name))
                .copied()
                .ok_or_else(|| Error::UnknownItem {
                    name: name.clone(),
                    suggestions: self.fuzzy_item_matches(name, 3),
                }),
        }
    }

    fn item_name(&self, id: TypeId) -> Option<&str> {
        self.items.get(&id).map(|item| item.name.as_str())
    }

    fn is_manufacturable(&self, item: TypeId) -> bool {
        self.producers
            .get(&(item, Activity::Manufacturing))
            .is_some_and(|producers| !producers.is_empty())
    }

    fn has_blueprint_for(&self, item: TypeId) -> bool {
        [
            Activity::Manufacturing,
            Activity::Invention,
            Activity::ReverseEngineering,
            Activity::Copying,
        ]
        .into_iter()
        .any(|activity| self.producers.contains_key(&(item, activity)))
    }

    fn is_blueprint(&self, id: TypeId) -> bool {
        self.blueprints.contains(&id)
    }

    fn blueprint_for(&self, product: TypeId, activity: Activity) -> Vec<TypeId> {
        self.producers
            .get(&(product, activity))
            .cloned()
            .unwrap_or_default()
    }

    fn blueprint_materials(&self, blueprint: TypeId, activity: Activity) -> MaterialRequirement {
        self.activities
            .get(&(blueprint, activity))
            .map(|entry| entry.materials.clone())
            .unwrap_or_default()
    }

    fn blueprint_product(&self, blueprint: TypeId, activity: Activity) -> Option<(TypeId, u64)> {
        self.activities
            .get(&(blueprint, activity))
            .and_then(|entry| entry.products.first().copied())
    }

    fn blueprint_time(&self, blueprint: TypeId, activity: Activity) -> Option<u64> {
        self.activities
            .get(&(blueprint, activity))
            .and_then(|entry| entry.time)
    }

    fn production_category(&self, blueprint_or_item: TypeId) -> Option<String> {
        let blueprint = self.as_blueprint(blueprint_or_item)?;
        let group_id = self.items.get(&blueprint)?.market_group_id?;
        let parent_id = self.market_groups.get(&group_id)?.parent_id?;
        let name = &self.market_groups.get(&parent_id)?.name;

        if name.contains("Rigs") {
            Some("Rigs".to_string())
        } else {
            Some(name.clone())
        }
    }

    fn is_hull_section(&self, item: TypeId) -> bool {
        self.item_name(item)
            .is_some_and(|name| name.contains("Hull Section"))
    }

    fn invention_base_for(&self, item: TypeId) -> Vec<TypeId> {
        match self.as_blueprint(item) {
            Some(blueprint) => self.blueprint_for(blueprint, Activity::Invention),
            None => Vec::new(),
        }
    }

    fn adjusted_price(&self, item: TypeId) -> Option<f64> {
        self.items.get(&item).and_then(|record| record.adjusted_price)
    }
}

/// Incrementally assemble a [`StaticCatalog`].
///
/// ```
/// use eveindy_lib::{Activity, Catalog, CatalogBuilder, ItemRef};
///
/// let catalog = CatalogBuilder::new()
///     .item(34, "Tritanium")
///     .item(587, "Rifter")
///     .item(691, "Rifter Blueprint")
///     .product(691, Activity::Manufacturing, 587, 1)
///     .material(691, Activity::Manufacturing, 34, 32_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(catalog.resolve(&ItemRef::from("rifter")).unwrap(), 587);
/// assert!(catalog.is_manufacturable(587));
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: StaticCatalog,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(self, id: TypeId, name: &str) -> Self {
        self.item_record(id, name, None)
    }

    /// Add an item placed in a market group.
    pub fn item_in_group(self, id: TypeId, name: &str, market_group_id: i64) -> Self {
        self.item_record(id, name, Some(market_group_id))
    }

    fn item_record(mut self, id: TypeId, name: &str, market_group_id: Option<i64>) -> Self {
        self.catalog.insert_item(ItemRecord {
            id,
            name: name.trim().to_string(),
            market_group_id,
            adjusted_price: None,
        });
        self
    }

    pub fn market_group(mut self, id: i64, parent_id: Option<i64>, name: &str) -> Self {
        self.catalog.insert_market_group(MarketGroup {
            id,
            parent_id,
            name: name.to_string(),
        });
        self
    }

    /// Set the adjusted reference price of an item added earlier.
    pub fn adjusted_price(mut self, id: TypeId, price: f64) -> Self {
        self.catalog.set_adjusted_price(id, price);
        self
    }

    pub fn material(
        mut self,
        blueprint: TypeId,
        activity: Activity,
        material: TypeId,
        quantity: u64,
    ) -> Self {
        self.catalog
            .insert_material(blueprint, activity, material, quantity);
        self
    }

    pub fn product(
        mut self,
        blueprint: TypeId,
        activity: Activity,
        product: TypeId,
        quantity: u64,
    ) -> Self {
        self.catalog
            .insert_product(blueprint, activity, product, quantity);
        self
    }

    pub fn time(mut self, blueprint: TypeId, activity: Activity, seconds: u64) -> Self {
        self.catalog.insert_time(blueprint, activity, seconds);
        self
    }

    /// Validate cross references and return the catalog.
    pub fn build(self) -> Result<StaticCatalog> {
        self.catalog.validate()?;
        Ok(self.catalog)
    }
}

/// Normalize an item name for case-insensitive lookup.
fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
