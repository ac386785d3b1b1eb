//! Static invention modifier tables.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Optional invention input that trades chance for extra runs or efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decryptor {
    #[default]
    None,
    Accelerant,
    Attainment,
    Augmentation,
    OptimizedAttainment,
    OptimizedAugmentation,
    Parity,
    Process,
    Symmetry,
}

/// Effects of a decryptor on an invention job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecryptorModifiers {
    pub chance_multiplier: f64,
    pub runs: u64,
    pub material_efficiency: i8,
    pub time_efficiency: i8,
}

impl Decryptor {
    pub const ALL: [Decryptor; 9] = [
        Decryptor::None,
        Decryptor::Accelerant,
        Decryptor::Attainment,
        Decryptor::Augmentation,
        Decryptor::OptimizedAttainment,
        Decryptor::OptimizedAugmentation,
        Decryptor::Parity,
        Decryptor::Process,
        Decryptor::Symmetry,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Decryptor::None => "NONE",
            Decryptor::Accelerant => "Accelerant",
            Decryptor::Attainment => "Attainment",
            Decryptor::Augmentation => "Augmentation",
            Decryptor::OptimizedAttainment => "Optimized Attainment",
            Decryptor::OptimizedAugmentation => "Optimized Augmentation",
            Decryptor::Parity => "Parity",
            Decryptor::Process => "Process",
            Decryptor::Symmetry => "Symmetry",
        }
    }

    /// Catalog name of the decryptor item, `None` when no decryptor is used.
    pub fn item_name(self) -> Option<String> {
        match self {
            Decryptor::None => None,
            other => Some(format!("{} Decryptor", other.name())),
        }
    }

    pub fn modifiers(self) -> DecryptorModifiers {
        let (chance_multiplier, runs, material_efficiency, time_efficiency) = match self {
            Decryptor::Accelerant => (1.2, 1, 2, 10),
            Decryptor::Attainment => (1.8, 4, -1, 4),
            Decryptor::Augmentation => (0.6, 9, -2, 2),
            Decryptor::OptimizedAttainment => (1.9, 3, 1, -2),
            Decryptor::OptimizedAugmentation => (0.9, 7, 2, 0),
            Decryptor::Parity => (1.5, 3, 1, -2),
            Decryptor::Process => (1.1, 0, 3, 6),
            Decryptor::Symmetry => (1.0, 2, 1, 8),
            Decryptor::None => (1.0, 0, 0, 0),
        };
        DecryptorModifiers {
            chance_multiplier,
            runs,
            material_efficiency,
            time_efficiency,
        }
    }
}

impl fmt::Display for Decryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Decryptor {
    type Err = Error;

    /// Accepts the display name with or without a trailing "Decryptor", in any case.
    /// Only "none" selects [`Decryptor::None`]; empty input is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        let key = key.strip_suffix("decryptor").unwrap_or(&key);
        Decryptor::ALL
            .into_iter()
            .find(|decryptor| normalize(decryptor.name()) == key)
            .ok_or_else(|| Error::UnknownDecryptor {
                name: s.trim().to_string(),
            })
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Base chance and base output runs for an invention category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryModifiers {
    pub base_chance: f64,
    pub base_runs: u64,
}

static INVENTION_CATEGORIES: Lazy<HashMap<&'static str, CategoryModifiers>> = Lazy::new(|| {
    [
        ("Small Intact Hull Section", 0.39, 20),
        ("Small Malfunctioning Hull Section", 0.35, 10),
        ("Small Wrecked Hull Section", 0.26, 3),
        ("Intact Hull Section", 0.39, 20),
        ("Malfunctioning Hull Section", 0.35, 10),
        ("Wrecked Hull Section", 0.26, 3),
        ("Modules", 0.34, 10),
        ("Rigs", 0.34, 1),
        ("Ammo", 0.34, 100),
        ("Frigates", 0.30, 1),
        ("Destroyers", 0.30, 1),
        ("Cruisers", 0.26, 1),
        ("Battlecruisers", 0.26, 1),
        ("Battleships", 0.22, 1),
        ("Freighters", 0.18, 1),
    ]
    .into_iter()
    .map(|(name, base_chance, base_runs)| {
        (
            name,
            CategoryModifiers {
                base_chance,
                base_runs,
            },
        )
    })
    .collect()
});

/// Modifiers for a production category, if invention from it is modelled.
pub fn category_modifiers(category: &str) -> Option<CategoryModifiers> {
    INVENTION_CATEGORIES.get(category).copied()
}

/// Names of every modelled invention category.
pub fn known_categories() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = INVENTION_CATEGORIES.keys().copied().collect();
    names.sort_unstable();
    names
}
