//! Material and time efficiency scaling.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::item::{Activity, MaterialRequirement, TypeId};

/// Highest blueprint material or time efficiency level.
pub const MAX_EFFICIENCY_LEVEL: u8 = 10;

/// Material reduction per ME level.
const ME_STEP: f64 = 0.01;

/// Time reduction per TE level.
const TE_STEP: f64 = 0.02;

/// First float at or above which a `u64` cast saturates (2^64).
const U64_LIMIT: f64 = u64::MAX as f64;

/// Tolerance subtracted before rounding up so float noise does not add a unit.
const CEIL_EPSILON: f64 = 1e-9;

/// Check a blueprint efficiency level (ME or TE).
pub fn validate_level(kind: &str, level: u8) -> Result<()> {
    if level > MAX_EFFICIENCY_LEVEL {
        return Err(Error::InvalidEfficiency {
            message: format!("{kind} level {level} must be between 0 and {MAX_EFFICIENCY_LEVEL}"),
        });
    }
    Ok(())
}

/// Check that every additional efficiency fraction lies in `[0, 1)`.
pub fn validate_factors(kind: &str, factors: &[f64]) -> Result<()> {
    if let Some(bad) = factors.iter().find(|f| !(0.0..1.0).contains(*f)) {
        return Err(Error::InvalidEfficiency {
            message: format!("additional {kind} efficiency {bad} must be in [0, 1)"),
        });
    }
    Ok(())
}

/// Combined multiplier of a list of additional efficiency fractions.
fn factor_product(factors: &[f64]) -> f64 {
    factors.iter().map(|f| 1.0 - f).product()
}

/// Apply material efficiency and additional bonuses to a run-scaled requirement.
///
/// `requirement` already holds the quantities for all `runs`. Every positive
/// quantity ends up at least `runs` (one unit per run); zero stays zero.
pub fn scale_by_efficiency(
    requirement: &MaterialRequirement,
    runs: u64,
    material_efficiency: u8,
    additional_factors: &[f64],
) -> Result<MaterialRequirement> {
    validate_level("material efficiency", material_efficiency)?;
    validate_factors("material", additional_factors)?;

    let multiplier =
        (1.0 - f64::from(material_efficiency) * ME_STEP) * factor_product(additional_factors);

    requirement
        .iter()
        .map(|(item, quantity)| {
            scale_quantity(quantity, runs, multiplier)
                .map(|scaled| (item, scaled))
                .ok_or(Error::QuantityOverflow { item })
        })
        .collect()
}

fn scale_quantity(quantity: u64, runs: u64, multiplier: f64) -> Option<u64> {
    if quantity == 0 {
        return Some(0);
    }
    let scaled = quantity as f64 * multiplier;
    if runs > 0 && scaled / (runs as f64) < 1.0 {
        return Some(runs);
    }
    to_whole_units((scaled - CEIL_EPSILON).ceil())
}

/// Convert a non-negative whole float to `u64`, rejecting values the cast would saturate.
fn to_whole_units(value: f64) -> Option<u64> {
    (value < U64_LIMIT).then(|| value.max(0.0) as u64)
}

/// Total job duration in seconds for `runs` runs of `seconds_per_run`.
///
/// Rounded to the nearest second.
pub fn scale_time(
    seconds_per_run: u64,
    runs: u64,
    time_efficiency: u8,
    additional_factors: &[f64],
) -> Result<u64> {
    validate_level("time efficiency", time_efficiency)?;
    validate_factors("time", additional_factors)?;

    let multiplier =
        (1.0 - f64::from(time_efficiency) * TE_STEP) * factor_product(additional_factors);
    to_whole_units((seconds_per_run as f64 * runs as f64 * multiplier).round()).ok_or_else(|| {
        Error::InvalidEfficiency {
            message: format!("job of {runs} runs at {seconds_per_run}s per run is too long"),
        }
    })
}

/// Job duration for `runs` runs of `activity` on the blueprint of `item`.
///
/// `item` may be the product or the blueprint itself.
pub fn compute_job_time(
    catalog: &impl Catalog,
    item: TypeId,
    activity: Activity,
    runs: u64,
    time_efficiency: u8,
    additional_factors: &[f64],
) -> Result<u64> {
    let blueprint = if catalog.is_blueprint(item) {
        item
    } else {
        catalog
            .blueprint_for(item, activity)
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotManufacturable {
                item: catalog.display_name(item),
            })?
    };
    let seconds = catalog
        .blueprint_time(blueprint, activity)
        .ok_or_else(|| Error::CatalogDataValidation {
            message: format!(
                "no {activity} time recorded for {}",
                catalog.display_name(blueprint)
            ),
        })?;
    scale_time(seconds, runs, time_efficiency, additional_factors)
}
