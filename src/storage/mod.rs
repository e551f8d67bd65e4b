//! SQLite storage layer for IronLog.
//!
//! Two named collections inside one versioned database file:
//! `sessions` (full nested aggregates) and `exercice_templates`.
//! Handles are short-lived — one per repository transaction leg — and
//! every open drives the migration registry before returning.
//!
//! # Submodules
//!
//! - [`migrations`] - Numbered schema upgrade steps and the seed catalog
//! - [`sqlite`] - Connection handling and collection access

pub mod migrations;
pub mod sqlite;

pub use migrations::{SCHEMA_VERSION, SEED_TEMPLATES};
pub use sqlite::Store;
