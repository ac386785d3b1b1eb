use std::path::PathBuf;

use thiserror::Error;

use crate::item::TypeId;

/// Convenient result alias for the eveindy library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when an item name or type id does not resolve in the catalog.
    #[error("unknown item: {name}{}", format_suggestions(.suggestions))]
    UnknownItem {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when materials are requested for an item with no manufacturing blueprint.
    #[error("{item} has no manufacturing blueprint")]
    NotManufacturable { item: String },

    /// Raised when an efficiency level, efficiency fraction or skill level is out of range.
    #[error("invalid efficiency: {message}")]
    InvalidEfficiency { message: String },

    /// Raised when a tech-2/tech-3 item can be invented from more than one base.
    #[error(
        "{item} can be invented from multiple bases ({}); specify the base explicitly",
        .candidates.join(", ")
    )]
    AmbiguousInventionBase {
        item: String,
        candidates: Vec<String>,
    },

    /// Raised when an explicitly chosen invention base does not produce the requested item.
    #[error("{base} does not invent {item}")]
    InventionBaseMismatch { item: String, base: String },

    /// Raised when an item has no invention activity and no invention base.
    #[error("{item} cannot be invented")]
    NotInventable { item: String },

    /// Raised when a material quantity no longer fits in 64 bits.
    #[error("quantity of item {item} exceeds the supported range")]
    QuantityOverflow { item: TypeId },

    /// Raised when catalog data makes an item (indirectly) require itself.
    #[error("production cycle detected while expanding {item}")]
    CycleDetected { item: String },

    /// Raised when the price source has no price for a required item.
    #[error("no {side} price available for {item}")]
    MissingPrice { item: String, side: String },

    /// Raised when a decryptor name is not recognised.
    #[error("unknown decryptor: {name}")]
    UnknownDecryptor { name: String },

    /// Raised when an invention source maps to a category with no invention modifiers.
    #[error("no invention modifiers for category {category}")]
    UnknownInventionCategory { category: String },

    /// Raised when catalog data is internally inconsistent.
    #[error("invalid catalog data: {message}")]
    CatalogDataValidation { message: String },

    /// Raised when a price list fails validation.
    #[error("invalid price data: {message}")]
    PriceDataValidation { message: String },

    /// Catalog database could not be located at the resolved path.
    #[error("catalog not found at {path}")]
    CatalogNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the catalog location")]
    ProjectDirsUnavailable,

    /// Raised when attempting to load a schema that is not supported.
    #[error("unsupported catalog schema; expected Items/bpMaterials or invTypes/industryActivityMaterials tables")]
    UnsupportedSchema,

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
