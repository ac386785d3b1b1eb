mod common;

use std::collections::HashMap;

use common::*;
use eveindy_lib::{
    resolve_base_materials, resolve_build_plan, resolve_components, runs_for_quantity, Activity,
    Catalog, CatalogBuilder, ComponentOverrides, Error, ItemRef, MaterialRequirement,
    ProductionParameters,
};

fn zero() -> ProductionParameters {
    ProductionParameters::default()
}

#[test]
fn output_quantity_matches_one_run_material_list() {
    let catalog = fixture_catalog();
    let components = resolve_components(&catalog, &ItemRef::from("Rifter"), 1, &zero())
        .expect("rifter resolves");

    assert_eq!(
        components,
        catalog.blueprint_materials(RIFTER_BLUEPRINT, Activity::Manufacturing)
    );
}

#[test]
fn multi_unit_runs_round_up() {
    let catalog = fixture_catalog();
    let paste = ItemRef::from(REPAIR_PASTE);

    assert_eq!(runs_for_quantity(&catalog, &paste, 25).unwrap(), 3);
    let components = resolve_components(&catalog, &paste, 25, &zero()).unwrap();
    assert_eq!(components.get(TRITANIUM), Some(60));
    assert_eq!(components.get(MEXALLON), Some(9));
}

#[test]
fn material_efficiency_never_drops_below_one_per_run() {
    let catalog = fixture_catalog();
    let params = ProductionParameters::new(10, 0);
    let components =
        resolve_components(&catalog, &ItemRef::from(MICROPROCESSOR), 4, &params).unwrap();

    // 4 * 1 * 0.9 = 3.6, clamped to one per run
    assert_eq!(components.get(NOCXIUM), Some(4));
    // 20 * 0.9 = 18
    assert_eq!(components.get(ISOGEN), Some(18));
}

#[test]
fn batching_rounds_each_copy_separately() {
    let catalog = fixture_catalog();
    let rifter = ItemRef::from(RIFTER);
    let limited = ProductionParameters::new(10, 0).with_max_runs(3);
    let unlimited = ProductionParameters::new(10, 0);

    let batched = resolve_components(&catalog, &rifter, 6, &limited).unwrap();
    let single = resolve_components(&catalog, &rifter, 3, &unlimited).unwrap();
    let unbatched = resolve_components(&catalog, &rifter, 6, &unlimited).unwrap();

    assert_eq!(batched, single.clone().merged(&single));
    // 15 * 0.9 = 13.5 rounds to 14 per copy; 30 * 0.9 = 27 in one go
    assert_eq!(batched.get(MEXALLON), Some(28));
    assert_eq!(unbatched.get(MEXALLON), Some(27));
    assert_ne!(batched, unbatched);
}

#[test]
fn batching_adds_a_remainder_copy() {
    let catalog = fixture_catalog();
    let limited = ProductionParameters::new(10, 0).with_max_runs(3);
    let components = resolve_components(&catalog, &ItemRef::from(RIFTER), 7, &limited).unwrap();

    // two full copies of 14 plus one run of ceil(4.5)
    assert_eq!(components.get(MEXALLON), Some(33));
    assert_eq!(components.get(TRITANIUM), Some(6_300));
}

#[test]
fn base_materials_expand_every_manufacturable_component() {
    let catalog = fixture_catalog();
    let base = resolve_base_materials(
        &catalog,
        &ItemRef::from("Jaguar"),
        1,
        &zero(),
        &ComponentOverrides::none(),
    )
    .unwrap();

    let expected: MaterialRequirement = [
        (TRITANIUM, 3_000),
        (PYERITE, 300),
        (MEXALLON, 5),
        (ISOGEN, 50),
        (NOCXIUM, 10),
    ]
    .into_iter()
    .collect();
    assert_eq!(base, expected);
    assert!(base.items().all(|id| !catalog.is_manufacturable(id)));
}

#[test]
fn uniform_overrides_apply_to_first_level_components() {
    let catalog = fixture_catalog();
    let plan = resolve_build_plan(
        &catalog,
        &ItemRef::from(JAGUAR),
        1,
        &zero(),
        &ComponentOverrides::uniform(ProductionParameters::new(10, 0)),
    )
    .unwrap();

    assert_eq!(plan.components.get(RIFTER), Some(1));
    assert_eq!(plan.components.get(MICROPROCESSOR), Some(10));
    assert_eq!(plan.base_materials.get(TRITANIUM), Some(2_900));
    assert_eq!(plan.base_materials.get(PYERITE), Some(270));
    assert_eq!(plan.base_materials.get(MEXALLON), Some(5));
    assert_eq!(plan.base_materials.get(ISOGEN), Some(45));
    assert_eq!(plan.base_materials.get(NOCXIUM), Some(10));
}

#[test]
fn per_item_overrides_leave_other_components_at_zero_efficiency() {
    let catalog = fixture_catalog();
    let overrides = ComponentOverrides::PerItem(HashMap::from([(
        MICROPROCESSOR,
        ProductionParameters::new(10, 0),
    )]));
    let base = resolve_base_materials(&catalog, &ItemRef::from(JAGUAR), 1, &zero(), &overrides)
        .unwrap();

    assert_eq!(base.get(PYERITE), Some(300));
    assert_eq!(base.get(ISOGEN), Some(45));
}

#[test]
fn zero_quantity_is_empty() {
    let catalog = fixture_catalog();
    let components = resolve_components(&catalog, &ItemRef::from(RIFTER), 0, &zero()).unwrap();
    assert!(components.is_empty());
}

#[test]
fn oversized_quantities_fail_instead_of_wrapping() {
    let catalog = fixture_catalog();

    // 1000 Tritanium per run times 2e16 runs does not fit in u64
    let quantity = 20_000_000_000_000_000;
    let err = resolve_components(&catalog, &ItemRef::from(RIFTER), quantity, &zero())
        .expect_err("quantity overflows");
    assert!(matches!(err, Error::QuantityOverflow { item } if item == TRITANIUM));

    // each level fits on its own, the merged Tritanium total does not
    let err = resolve_base_materials(
        &catalog,
        &ItemRef::from(JAGUAR),
        7_000_000_000_000_000,
        &zero(),
        &ComponentOverrides::none(),
    )
    .expect_err("merged quantity overflows");
    assert!(matches!(err, Error::QuantityOverflow { item } if item == TRITANIUM));
}

#[test]
fn raw_materials_are_not_manufacturable() {
    let catalog = fixture_catalog();
    let err = resolve_components(&catalog, &ItemRef::from("Tritanium"), 10, &zero())
        .expect_err("minerals have no blueprint");
    assert!(matches!(err, Error::NotManufacturable { ref item } if item == "Tritanium"));
}

#[test]
fn unknown_item_suggests_close_names() {
    let catalog = fixture_catalog();
    let err = resolve_components(&catalog, &ItemRef::from("Rifer"), 1, &zero())
        .expect_err("typo does not resolve");

    let message = err.to_string();
    assert!(message.contains("unknown item"));
    assert!(message.contains("Did you mean"));
    assert!(message.contains("Rifter"));
}

#[test]
fn indirect_cycles_are_detected() {
    let catalog = CatalogBuilder::new()
        .item(1, "Alpha")
        .item(2, "Alpha Blueprint")
        .item(3, "Beta")
        .item(4, "Beta Blueprint")
        .product(2, Activity::Manufacturing, 1, 1)
        .material(2, Activity::Manufacturing, 3, 2)
        .product(4, Activity::Manufacturing, 3, 1)
        .material(4, Activity::Manufacturing, 1, 1)
        .build()
        .unwrap();

    let err = resolve_base_materials(
        &catalog,
        &ItemRef::from("Alpha"),
        1,
        &zero(),
        &ComponentOverrides::none(),
    )
    .expect_err("alpha and beta require each other");
    assert!(matches!(err, Error::CycleDetected { .. }));
}

#[test]
fn shared_components_are_not_mistaken_for_cycles() {
    // Gamma and Delta both need Epsilon; Epsilon is manufactured from minerals.
    let catalog = CatalogBuilder::new()
        .item(34, "Tritanium")
        .item(10, "Gamma")
        .item(11, "Gamma Blueprint")
        .item(20, "Delta")
        .item(21, "Delta Blueprint")
        .item(30, "Epsilon")
        .item(31, "Epsilon Blueprint")
        .product(11, Activity::Manufacturing, 10, 1)
        .material(11, Activity::Manufacturing, 20, 1)
        .material(11, Activity::Manufacturing, 30, 1)
        .product(21, Activity::Manufacturing, 20, 1)
        .material(21, Activity::Manufacturing, 30, 2)
        .product(31, Activity::Manufacturing, 30, 1)
        .material(31, Activity::Manufacturing, 34, 10)
        .build()
        .unwrap();

    let base = resolve_base_materials(
        &catalog,
        &ItemRef::from(10),
        1,
        &zero(),
        &ComponentOverrides::none(),
    )
    .unwrap();
    assert_eq!(base.get(34), Some(30));
    assert_eq!(base.len(), 1);
}
