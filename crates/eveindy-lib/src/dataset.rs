use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Default filename of the industry catalog database.
pub const CATALOG_FILENAME: &str = "industry_catalog.db";

/// Environment variable naming the catalog database or its directory.
pub const CATALOG_ENV: &str = "EVEINDY_CATALOG";

/// Environment variable naming a price list CSV.
pub const PRICES_ENV: &str = "EVEINDY_PRICES";

/// Resolve the default catalog location using platform-specific project directories.
pub fn default_catalog_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("com", "eveindy", "eveindy").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(CATALOG_FILENAME))
}

/// Locate the catalog database.
///
/// Resolution order:
/// 1. Explicit `target` path (a directory gets [`CATALOG_FILENAME`] appended).
/// 2. `EVEINDY_CATALOG` environment variable.
/// 3. Platform-specific project data directory.
///
/// The resolved file must exist.
pub fn resolve_catalog_path(target: Option<&Path>) -> Result<PathBuf> {
    resolve_catalog_path_from(target, env::var_os(CATALOG_ENV))
}

fn resolve_catalog_path_from(
    target: Option<&Path>,
    env_value: Option<OsString>,
) -> Result<PathBuf> {
    let (path, source) = match (target, env_value) {
        (Some(explicit), _) => (canonical_catalog_path(explicit), "argument"),
        (None, Some(value)) if !value.is_empty() => {
            (canonical_catalog_path(Path::new(&value)), CATALOG_ENV)
        }
        _ => (default_catalog_path()?, "default"),
    };
    debug!(path = %path.display(), source, "resolved catalog path");

    if !path.is_file() {
        return Err(Error::CatalogNotFound { path });
    }
    Ok(path)
}

/// Price list path from an explicit argument or `EVEINDY_PRICES`.
pub fn resolve_prices_path(target: Option<&Path>) -> Option<PathBuf> {
    target
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(PRICES_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
}

fn canonical_catalog_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.join(CATALOG_FILENAME);
    }
    path.to_path_buf()
}
