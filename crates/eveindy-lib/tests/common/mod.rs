//! Shared fixture catalog and price list for integration tests.
//!
//! The catalog models a small slice of the industry tree: minerals, a tech-1
//! frigate with its invented tech-2 variant, a manufacturable component, a
//! charge produced ten per run, decryptors, and a tech-3 hull invented from
//! two hull sections.

#![allow(dead_code)]

use eveindy_lib::{Activity, CatalogBuilder, PriceList, StaticCatalog, TypeId};

pub const TRITANIUM: TypeId = 34;
pub const PYERITE: TypeId = 35;
pub const MEXALLON: TypeId = 36;
pub const ISOGEN: TypeId = 37;
pub const NOCXIUM: TypeId = 38;

pub const RIFTER: TypeId = 587;
pub const RIFTER_BLUEPRINT: TypeId = 691;
pub const JAGUAR: TypeId = 11400;
pub const JAGUAR_BLUEPRINT: TypeId = 11401;
pub const MICROPROCESSOR: TypeId = 11539;
pub const MICROPROCESSOR_BLUEPRINT: TypeId = 11540;
pub const REPAIR_PASTE: TypeId = 28668;
pub const REPAIR_PASTE_BLUEPRINT: TypeId = 28669;

pub const DATACORE_MECHANICAL: TypeId = 20424;
pub const DATACORE_ELECTRONIC: TypeId = 20418;
pub const ACCELERANT_DECRYPTOR: TypeId = 34201;
pub const PARITY_DECRYPTOR: TypeId = 34204;

pub const TENGU: TypeId = 29984;
pub const TENGU_BLUEPRINT: TypeId = 29985;
pub const INTACT_HULL_SECTION: TypeId = 30752;
pub const MALFUNCTIONING_HULL_SECTION: TypeId = 30753;

/// Build the fixture catalog.
pub fn fixture_catalog() -> StaticCatalog {
    CatalogBuilder::new()
        .market_group(4, None, "Ships")
        .market_group(1361, Some(4), "Frigates")
        .market_group(64, Some(1361), "Minmatar")
        .item(TRITANIUM, "Tritanium")
        .item(PYERITE, "Pyerite")
        .item(MEXALLON, "Mexallon")
        .item(ISOGEN, "Isogen")
        .item(NOCXIUM, "Nocxium")
        .adjusted_price(TRITANIUM, 5.0)
        .adjusted_price(PYERITE, 10.0)
        .adjusted_price(MEXALLON, 50.0)
        .adjusted_price(ISOGEN, 100.0)
        .adjusted_price(NOCXIUM, 500.0)
        // tech-1 frigate
        .item(RIFTER, "Rifter")
        .item_in_group(RIFTER_BLUEPRINT, "Rifter Blueprint", 64)
        .adjusted_price(RIFTER, 9_000.0)
        .product(RIFTER_BLUEPRINT, Activity::Manufacturing, RIFTER, 1)
        .material(RIFTER_BLUEPRINT, Activity::Manufacturing, TRITANIUM, 1_000)
        .material(RIFTER_BLUEPRINT, Activity::Manufacturing, PYERITE, 300)
        .material(RIFTER_BLUEPRINT, Activity::Manufacturing, MEXALLON, 5)
        .time(RIFTER_BLUEPRINT, Activity::Manufacturing, 6_000)
        // invention of the tech-2 frigate
        .item(DATACORE_MECHANICAL, "Datacore - Mechanical Engineering")
        .item(DATACORE_ELECTRONIC, "Datacore - Electronic Engineering")
        .item(ACCELERANT_DECRYPTOR, "Accelerant Decryptor")
        .item(PARITY_DECRYPTOR, "Parity Decryptor")
        .item(JAGUAR, "Jaguar")
        .item(JAGUAR_BLUEPRINT, "Jaguar Blueprint")
        .product(RIFTER_BLUEPRINT, Activity::Invention, JAGUAR_BLUEPRINT, 1)
        .material(RIFTER_BLUEPRINT, Activity::Invention, DATACORE_MECHANICAL, 2)
        .material(RIFTER_BLUEPRINT, Activity::Invention, DATACORE_ELECTRONIC, 2)
        .time(RIFTER_BLUEPRINT, Activity::Invention, 63_900)
        // tech-2 component
        .item(MICROPROCESSOR, "Nanoelectrical Microprocessor")
        .item(MICROPROCESSOR_BLUEPRINT, "Nanoelectrical Microprocessor Blueprint")
        .adjusted_price(MICROPROCESSOR, 1_100.0)
        .product(MICROPROCESSOR_BLUEPRINT, Activity::Manufacturing, MICROPROCESSOR, 1)
        .material(MICROPROCESSOR_BLUEPRINT, Activity::Manufacturing, ISOGEN, 5)
        .material(MICROPROCESSOR_BLUEPRINT, Activity::Manufacturing, NOCXIUM, 1)
        // tech-2 frigate
        .product(JAGUAR_BLUEPRINT, Activity::Manufacturing, JAGUAR, 1)
        .material(JAGUAR_BLUEPRINT, Activity::Manufacturing, RIFTER, 1)
        .material(JAGUAR_BLUEPRINT, Activity::Manufacturing, TRITANIUM, 2_000)
        .material(JAGUAR_BLUEPRINT, Activity::Manufacturing, MICROPROCESSOR, 10)
        .time(JAGUAR_BLUEPRINT, Activity::Manufacturing, 18_000)
        // ten units per run
        .item(REPAIR_PASTE, "Nanite Repair Paste")
        .item(REPAIR_PASTE_BLUEPRINT, "Nanite Repair Paste Blueprint")
        .product(REPAIR_PASTE_BLUEPRINT, Activity::Manufacturing, REPAIR_PASTE, 10)
        .material(REPAIR_PASTE_BLUEPRINT, Activity::Manufacturing, TRITANIUM, 20)
        .material(REPAIR_PASTE_BLUEPRINT, Activity::Manufacturing, MEXALLON, 3)
        // tech-3 hull with two invention bases
        .item(TENGU, "Tengu")
        .item(TENGU_BLUEPRINT, "Tengu Blueprint")
        .item(INTACT_HULL_SECTION, "Intact Hull Section")
        .item(MALFUNCTIONING_HULL_SECTION, "Malfunctioning Hull Section")
        .product(TENGU_BLUEPRINT, Activity::Manufacturing, TENGU, 1)
        .material(TENGU_BLUEPRINT, Activity::Manufacturing, TRITANIUM, 10_000)
        .product(INTACT_HULL_SECTION, Activity::Invention, TENGU_BLUEPRINT, 1)
        .material(INTACT_HULL_SECTION, Activity::Invention, DATACORE_MECHANICAL, 3)
        .product(MALFUNCTIONING_HULL_SECTION, Activity::Invention, TENGU_BLUEPRINT, 1)
        .material(MALFUNCTIONING_HULL_SECTION, Activity::Invention, DATACORE_MECHANICAL, 3)
        .build()
        .expect("fixture catalog is consistent")
}

/// Buy and sell quotes for every priced item in the fixture catalog.
pub fn fixture_prices() -> PriceList {
    PriceList::new()
        .with_price(TRITANIUM, Some(6.0), Some(6.5))
        .with_price(PYERITE, Some(12.0), Some(13.0))
        .with_price(MEXALLON, Some(60.0), Some(65.0))
        .with_price(ISOGEN, Some(120.0), Some(130.0))
        .with_price(NOCXIUM, Some(600.0), Some(650.0))
        .with_price(DATACORE_MECHANICAL, Some(100.0), Some(110.0))
        .with_price(DATACORE_ELECTRONIC, Some(200.0), Some(210.0))
        .with_price(ACCELERANT_DECRYPTOR, Some(1_000.0), Some(1_100.0))
        .with_price(RIFTER, Some(14_000.0), Some(15_000.0))
        .with_price(JAGUAR, Some(45_000.0), Some(50_000.0))
}

/// Assert two amounts agree to within a cent.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}
