//! Item references, blueprint activities, and material requirement sets.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Numeric identifier for an item type.
pub type TypeId = i64;

/// Reference to an item either by type id or by display name.
///
/// Both forms are normalized to a [`TypeId`] through
/// [`Catalog::resolve`](crate::catalog::Catalog::resolve) before any
/// computation takes place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    ById(TypeId),
    ByName(String),
}

impl From<TypeId> for ItemRef {
    fn from(value: TypeId) -> Self {
        ItemRef::ById(value)
    }
}

impl From<&str> for ItemRef {
    fn from(value: &str) -> Self {
        ItemRef::ByName(value.to_string())
    }
}

impl From<String> for ItemRef {
    fn from(value: String) -> Self {
        ItemRef::ByName(value)
    }
}

impl FromStr for ItemRef {
    type Err = std::convert::Infallible;

    /// All-digit input is treated as a type id, anything else as a name.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = trimmed.parse::<TypeId>() {
                return Ok(ItemRef::ById(id));
            }
        }
        Ok(ItemRef::ByName(trimmed.to_string()))
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::ById(id) => write!(f, "{}", id),
            ItemRef::ByName(name) => f.write_str(name),
        }
    }
}

/// Blueprint activities as numbered in the catalog's `activityID` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Manufacturing,
    ResearchTimeEfficiency,
    ResearchMaterialEfficiency,
    Copying,
    ReverseEngineering,
    Invention,
}

impl Activity {
    /// Catalog identifier for this activity.
    pub fn id(self) -> i64 {
        match self {
            Activity::Manufacturing => 1,
            Activity::ResearchTimeEfficiency => 3,
            Activity::ResearchMaterialEfficiency => 4,
            Activity::Copying => 5,
            Activity::ReverseEngineering => 7,
            Activity::Invention => 8,
        }
    }

    /// Map a catalog `activityID` back to an activity.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Activity::Manufacturing),
            3 => Some(Activity::ResearchTimeEfficiency),
            4 => Some(Activity::ResearchMaterialEfficiency),
            5 => Some(Activity::Copying),
            7 => Some(Activity::ReverseEngineering),
            8 => Some(Activity::Invention),
            _ => None,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Activity::Manufacturing => "Manufacturing",
            Activity::ResearchTimeEfficiency => "Researching Time Efficiency",
            Activity::ResearchMaterialEfficiency => "Researching Material Efficiency",
            Activity::Copying => "Copying",
            Activity::ReverseEngineering => "Reverse Engineering",
            Activity::Invention => "Invention",
        };
        f.write_str(value)
    }
}

/// Whole-unit quantities keyed by item type id.
///
/// Merging sums quantities per key and never drops a key present in either
/// operand. Iteration order is by type id so output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialRequirement {
    quantities: BTreeMap<TypeId, u64>,
}

impl MaterialRequirement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `item`, summing with any existing entry.
    ///
    /// Saturates at `u64::MAX`; resolution paths use [`Self::checked_add`].
    pub fn add(&mut self, item: TypeId, quantity: u64) {
        let entry = self.quantities.entry(item).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Add `quantity` units of `item`, failing if the sum leaves the `u64` range.
    pub fn checked_add(&mut self, item: TypeId, quantity: u64) -> Result<()> {
        let entry = self.quantities.entry(item).or_insert(0);
        *entry = entry
            .checked_add(quantity)
            .ok_or(Error::QuantityOverflow { item })?;
        Ok(())
    }

    /// Quantity required for `item`, if present.
    pub fn get(&self, item: TypeId) -> Option<u64> {
        self.quantities.get(&item).copied()
    }

    pub fn contains(&self, item: TypeId) -> bool {
        self.quantities.contains_key(&item)
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_units(&self) -> u64 {
        self.quantities
            .values()
            .fold(0, |total, qty| total.saturating_add(*qty))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, u64)> + '_ {
        self.quantities.iter().map(|(id, qty)| (*id, *qty))
    }

    pub fn items(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.quantities.keys().copied()
    }

    /// Merge `other` into `self` in place.
    pub fn merge(&mut self, other: &MaterialRequirement) {
        for (item, quantity) in other.iter() {
            self.add(item, quantity);
        }
    }

    /// Merge `other` into `self`, failing on the first quantity that overflows.
    pub fn checked_merge(&mut self, other: &MaterialRequirement) -> Result<()> {
        other
            .iter()
            .try_for_each(|(item, quantity)| self.checked_add(item, quantity))
    }

    /// Consume both requirements and return their sum.
    #[must_use]
    pub fn merged(mut self, other: &MaterialRequirement) -> Self {
        self.merge(other);
        self
    }

    /// Multiply every quantity by `factor` (exact integer scaling).
    pub fn scaled(&self, factor: u64) -> Result<Self> {
        let quantities = self
            .quantities
            .iter()
            .map(|(id, qty)| {
                qty.checked_mul(factor)
                    .map(|scaled| (*id, scaled))
                    .ok_or(Error::QuantityOverflow { item: *id })
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { quantities })
    }
}

impl FromIterator<(TypeId, u64)> for MaterialRequirement {
    fn from_iter<I: IntoIterator<Item = (TypeId, u64)>>(iter: I) -> Self {
        let mut requirement = MaterialRequirement::new();
        for (item, quantity) in iter {
            requirement.add(item, quantity);
        }
        requirement
    }
}

impl IntoIterator for MaterialRequirement {
    type Item = (TypeId, u64);
    type IntoIter = btree_map::IntoIter<TypeId, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.quantities.into_iter()
    }
}
