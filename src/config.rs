//! Configuration management.
//!
//! IronLog keeps a single per-user database; the presentation layer can
//! override the location explicitly (embedded tests do) or via the
//! `IRONLOG_DB` environment variable.

use std::path::{Path, PathBuf};

/// Get the global IronLog directory location.
///
/// Always `~/.ironlog`, so every frontend on the device shares the same
/// database.
#[must_use]
pub fn global_ironlog_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".ironlog"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `IRONLOG_DB` environment variable
/// 3. Global location: `~/.ironlog/data/ironlog.db`
///
/// # Returns
///
/// Returns the path to the database file, or `None` if no home
/// directory could be determined.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(db_path) = std::env::var("IRONLOG_DB") {
        if !db_path.trim().is_empty() {
            return Some(PathBuf::from(db_path));
        }
    }

    global_ironlog_dir().map(|dir| dir.join("data").join("ironlog.db"))
}
