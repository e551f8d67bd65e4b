//! Schema migration registry.
//!
//! An ordered table of numbered upgrade steps, applied on every open.
//! Already-applied versions (tracked in the `schema_migrations` table)
//! are skipped, so reopening an up-to-date store is a no-op. Adding a
//! new version appends a new step — existing steps are never rewritten.

use chrono::Utc;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::info;

use crate::error::Result;
use crate::model::ExerciceTemplate;

/// Schema version the engine targets. The on-disk version never runs
/// ahead of this and never decreases.
pub const SCHEMA_VERSION: i64 = 2;

/// Initial template catalog, seeded when version 2 is applied.
///
/// Replaceable configuration: forks may swap these names without
/// touching the registry. Changing them after a store has been created
/// has no effect — seeding happens exactly once per store.
pub const SEED_TEMPLATES: [&str; 4] = [
    "Poulie",
    "Développé couché",
    "Tirage poulie haute",
    "Butterfly",
];

/// A single upgrade step from `version - 1` to `version`.
struct Migration {
    version: i64,
    name: &'static str,
    apply: fn(&Transaction<'_>) -> Result<()>,
}

/// All migration steps, in strictly increasing version order.
///
/// Steps are functions rather than SQL text because seeding writes
/// records with engine-generated ids.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_sessions",
        apply: create_sessions,
    },
    Migration {
        version: 2,
        name: "create_exercice_templates",
        apply: create_exercice_templates,
    },
];

fn create_sessions(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        "CREATE TABLE sessions (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL
        )",
    )?;
    Ok(())
}

fn create_exercice_templates(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch(
        "CREATE TABLE exercice_templates (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL
        )",
    )?;

    for name in SEED_TEMPLATES {
        let template = ExerciceTemplate::new(name);
        tx.execute(
            "INSERT INTO exercice_templates (id, data) VALUES (?1, ?2)",
            rusqlite::params![template.id, serde_json::to_string(&template)?],
        )?;
    }

    Ok(())
}

/// Run all pending migrations on the database.
///
/// Pending steps execute in increasing version order, each inside its
/// own immediate transaction that also records the step in
/// `schema_migrations` — a step applies at most once, and a failed step
/// leaves nothing partially applied. Safe to call on every open.
///
/// # Errors
///
/// Returns an error if a step fails to apply; the caller must treat
/// this as fatal to the open operation.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let on_disk: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= on_disk {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        (migration.apply)(&tx)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![migration.version, Utc::now().timestamp_millis()],
        )?;
        tx.commit()?;
    }

    Ok(())
}
