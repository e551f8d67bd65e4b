//! SQLite store implementation.
//!
//! A [`Store`] is one short-lived connection handle: opening it drives
//! any pending migrations, and the repository drops it after one or two
//! transactions. Collection records hold the full serialized aggregate,
//! so a nested mutation is always a whole-record rewrite.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::{Error, Result};
use crate::model::{ExerciceTemplate, Session};
use crate::storage::migrations::run_migrations;

/// A live handle to the versioned store.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the store at the given path, creating it (and running any
    /// pending migrations) as needed.
    ///
    /// Either every pending migration step applies and a ready handle
    /// is returned, or the first failure is returned and no handle
    /// exists — there is no partially-open state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a migration
    /// step fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        run_migrations(&mut conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration step fails.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        run_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// Execute a write inside an immediate transaction.
    ///
    /// Commits on success, rolls back on error; the closure's error is
    /// surfaced unchanged.
    fn mutate<F, R>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction<'_>) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    // ==================
    // Sessions collection
    // ==================

    /// Read every session, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails or a record does not parse.
    pub fn all_sessions(&self) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare("SELECT data FROM sessions ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut sessions = Vec::new();
        for data in rows {
            sessions.push(serde_json::from_str(&data?)?);
        }
        Ok(sessions)
    }

    /// Point lookup of one session. Absent ids are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the record does not parse.
    pub fn session(&self, id: &str) -> Result<Option<Session>> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM sessions WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;

        data.map(|d| serde_json::from_str(&d).map_err(Error::from))
            .transpose()
    }

    /// Insert a new session record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (including an id collision).
    pub fn insert_session(&mut self, session: &Session) -> Result<()> {
        let data = serde_json::to_string(session)?;
        self.mutate(|tx| {
            tx.execute(
                "INSERT INTO sessions (id, data) VALUES (?1, ?2)",
                rusqlite::params![session.id, data],
            )?;
            Ok(())
        })
    }

    /// Rewrite an existing session record with the full new aggregate.
    ///
    /// This is the only write path for nested exercices and series.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] if no record has this id, or
    /// a database error if the write fails.
    pub fn put_session(&mut self, session: &Session) -> Result<()> {
        let data = serde_json::to_string(session)?;
        self.mutate(|tx| {
            let changed = tx.execute(
                "UPDATE sessions SET data = ?2 WHERE id = ?1",
                rusqlite::params![session.id, data],
            )?;
            if changed == 0 {
                return Err(Error::SessionNotFound {
                    id: session.id.clone(),
                });
            }
            Ok(())
        })
    }

    // ==================
    // Template catalog
    // ==================

    /// Read every exercice template, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails or a record does not parse.
    pub fn all_templates(&self) -> Result<Vec<ExerciceTemplate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM exercice_templates ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut templates = Vec::new();
        for data in rows {
            templates.push(serde_json::from_str(&data?)?);
        }
        Ok(templates)
    }

    /// Insert a new template record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn insert_template(&mut self, template: &ExerciceTemplate) -> Result<()> {
        let data = serde_json::to_string(template)?;
        self.mutate(|tx| {
            tx.execute(
                "INSERT INTO exercice_templates (id, data) VALUES (?1, ?2)",
                rusqlite::params![template.id, data],
            )?;
            Ok(())
        })
    }
}
