//! Asynchronous repository over the session and template collections.
//!
//! Every operation opens its own short-lived [`Store`] handle on the
//! Tokio blocking pool, runs one or two transactions against it, and
//! resolves exactly once — success with a value or a single error. No
//! connection is cached between operations, and no operation retries
//! internally.
//!
//! # Consistency caveat
//!
//! `add_exercice` and `add_serie` read the owning session through one
//! handle and write it back through a second, with nothing locked in
//! between. Two concurrent mutations of the same session can interleave
//! in that gap, and the later write silently replaces the earlier one —
//! last-write-wins at session granularity. Acceptable for a single-user
//! local store; callers that need stronger guarantees must serialize
//! their own mutations.

use std::path::PathBuf;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Exercice, ExerciceTemplate, Serie, Session};
use crate::notify::ChangeNotifier;
use crate::storage::Store;

/// The engine's operation surface: CRUD over the nested session
/// aggregate and the template catalog, plus the change streams.
#[derive(Debug)]
pub struct Repository {
    db_path: PathBuf,
    notifier: ChangeNotifier,
}

impl Repository {
    /// Create a repository over the database at `db_path`.
    ///
    /// Nothing is opened here: every operation opens (and migrates, if
    /// pending) its own handle, so open/migration failures surface on
    /// the first operation that hits storage.
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Run a storage closure on the blocking pool against a fresh handle.
    async fn with_store<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Store) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut store = Store::open(&path)?;
            f(&mut store)
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }

    // ==================
    // Sessions
    // ==================

    /// Read every session, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the scan fails.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.with_store(|store| store.all_sessions()).await
    }

    /// Point lookup of one session. An unknown id is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the read fails.
    pub async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let id = id.to_owned();
        self.with_store(move |store| store.session(&id)).await
    }

    /// Create a new session with a fresh id and no exercices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty name, or a
    /// storage error if the write fails.
    pub async fn create_session(&self, name: &str) -> Result<Session> {
        let name = non_empty(name, "session name")?;
        let session = Session::new(&name);
        debug!(session_id = %session.id, "Creating session");

        let record = session.clone();
        self.with_store(move |store| store.insert_session(&record))
            .await?;

        self.publish_sessions().await;
        Ok(session)
    }

    /// Append a new exercice (fresh id, no series) to an existing
    /// session, rewriting the whole aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] if `session_id` does not
    /// exist, [`Error::InvalidArgument`] for an empty name, or a
    /// storage error if a read or write fails.
    pub async fn add_exercice(&self, session_id: &str, name: &str) -> Result<Exercice> {
        let name = non_empty(name, "exercice name")?;

        // Read leg: one handle loads the aggregate.
        let mut session =
            self.get_session(session_id)
                .await?
                .ok_or_else(|| Error::SessionNotFound {
                    id: session_id.to_owned(),
                })?;

        let exercice = Exercice::new(&name);
        session.exercices.push(exercice.clone());
        debug!(session_id = %session.id, exercice_id = %exercice.id, "Adding exercice");

        // Write leg: a second handle rewrites the whole aggregate.
        self.with_store(move |store| store.put_session(&session))
            .await?;

        self.publish_sessions().await;
        Ok(exercice)
    }

    /// Append a new serie to the exercice with this id, wherever it
    /// lives: scans every session's exercices (linear in the total
    /// exercice count), then rewrites the owning session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExerciceNotFound`] if no session contains an
    /// exercice with this id, or a storage error if a read or write
    /// fails.
    pub async fn add_serie(
        &self,
        exercice_id: &str,
        repetition: i64,
        weight: f64,
        rating: f64,
    ) -> Result<Serie> {
        let serie = Serie::new(repetition, weight, rating);

        // Read leg: scan all sessions for the owning aggregate.
        let sessions = self.list_sessions().await?;
        let mut owner = None;
        for mut session in sessions {
            if let Some(exercice) = session.exercice_mut(exercice_id) {
                exercice.series.push(serie.clone());
                owner = Some(session);
                break;
            }
        }
        let owner = owner.ok_or_else(|| Error::ExerciceNotFound {
            id: exercice_id.to_owned(),
        })?;
        debug!(session_id = %owner.id, exercice_id, serie_id = %serie.id, "Adding serie");

        // Write leg: rewrite the owning session through a second handle.
        self.with_store(move |store| store.put_session(&owner))
            .await?;

        self.publish_sessions().await;
        Ok(serie)
    }

    /// Find an exercice by id across every session.
    ///
    /// An unknown id is `Ok(None)` — unlike [`Self::add_serie`], a
    /// read-only miss is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the scan fails.
    pub async fn get_exercice(&self, id: &str) -> Result<Option<Exercice>> {
        let sessions = self.list_sessions().await?;
        Ok(sessions
            .into_iter()
            .flat_map(|s| s.exercices)
            .find(|e| e.id == id))
    }

    // ==================
    // Template catalog
    // ==================

    /// Read every exercice template, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the scan fails.
    pub async fn list_exercice_templates(&self) -> Result<Vec<ExerciceTemplate>> {
        self.with_store(|store| store.all_templates()).await
    }

    /// Add a new template to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty name, or a
    /// storage error if the write fails.
    pub async fn create_exercice_template(&self, name: &str) -> Result<ExerciceTemplate> {
        let name = non_empty(name, "template name")?;
        let template = ExerciceTemplate::new(&name);
        debug!(template_id = %template.id, "Creating exercice template");

        let record = template.clone();
        self.with_store(move |store| store.insert_template(&record))
            .await?;

        self.publish_templates().await;
        Ok(template)
    }

    // ==================
    // Change streams
    // ==================

    /// Subscribe to the sessions change stream.
    ///
    /// No replay: build the initial value with [`Self::list_sessions`].
    #[must_use]
    pub fn subscribe_sessions(&self) -> broadcast::Receiver<Vec<Session>> {
        self.notifier.subscribe_sessions()
    }

    /// Subscribe to the template-catalog change stream.
    ///
    /// No replay: build the initial value with
    /// [`Self::list_exercice_templates`].
    #[must_use]
    pub fn subscribe_exercice_templates(&self) -> broadcast::Receiver<Vec<ExerciceTemplate>> {
        self.notifier.subscribe_exercice_templates()
    }

    /// The notifier itself, for consumers that hold it separately.
    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Re-read the sessions collection and broadcast it.
    ///
    /// A failed re-read after a successful mutation must not fail the
    /// mutation: the notification is logged and dropped.
    async fn publish_sessions(&self) {
        match self.list_sessions().await {
            Ok(sessions) => {
                self.notifier.publish_sessions(sessions);
            }
            Err(e) => {
                warn!(error = %e, "Dropping sessions change notification: re-read failed");
            }
        }
    }

    /// Re-read the template catalog and broadcast it. Same
    /// fire-and-forget contract as [`Self::publish_sessions`].
    async fn publish_templates(&self) {
        match self.list_exercice_templates().await {
            Ok(templates) => {
                self.notifier.publish_exercice_templates(templates);
            }
            Err(e) => {
                warn!(error = %e, "Dropping template change notification: re-read failed");
            }
        }
    }
}

fn non_empty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SEED_TEMPLATES;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(dir.path().join("ironlog.db"));
        (dir, repo)
    }

    #[tokio::test]
    async fn test_create_session_appears_in_list() {
        let (_dir, repo) = setup();

        let session = repo.create_session("Leg Day").await.unwrap();
        assert!(!session.id.is_empty());
        assert!(session.exercices.is_empty());

        let sessions = repo.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0], session);
    }

    #[tokio::test]
    async fn test_create_session_rejects_empty_name() {
        let (_dir, repo) = setup();

        for name in ["", "   "] {
            let err = repo.create_session(name).await.unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
        }
        assert!(repo.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_exercice_appends_exactly_one() {
        let (_dir, repo) = setup();
        let session = repo.create_session("Push").await.unwrap();

        let exercice = repo.add_exercice(&session.id, "Bench").await.unwrap();
        assert!(exercice.series.is_empty());

        let fetched = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.exercices.len(), 1);
        assert_eq!(fetched.exercices[0], exercice);

        repo.add_exercice(&session.id, "Dips").await.unwrap();
        let fetched = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.exercices.len(), 2);
    }

    #[tokio::test]
    async fn test_add_exercice_unknown_session_changes_nothing() {
        let (_dir, repo) = setup();
        repo.create_session("Pull").await.unwrap();
        let before = repo.list_sessions().await.unwrap();

        let err = repo.add_exercice("missing", "Row").await.unwrap_err();
        assert!(matches!(err, Error::SessionNotFound { ref id } if id == "missing"));

        let after = repo.list_sessions().await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_add_serie_reaches_the_right_exercice() {
        let (_dir, repo) = setup();

        // Two sessions; the target exercice lives in the second one.
        let other = repo.create_session("Day A").await.unwrap();
        repo.add_exercice(&other.id, "Curl").await.unwrap();
        let target_session = repo.create_session("Day B").await.unwrap();
        let target = repo
            .add_exercice(&target_session.id, "Squat")
            .await
            .unwrap();

        let untouched_before = repo.get_session(&other.id).await.unwrap().unwrap();

        let serie = repo.add_serie(&target.id, 8, 100.0, 4.0).await.unwrap();
        assert_eq!(serie.repetition, 8);

        let fetched = repo.get_exercice(&target.id).await.unwrap().unwrap();
        assert_eq!(fetched.series, vec![serie]);

        // All other sessions are unchanged.
        let untouched_after = repo.get_session(&other.id).await.unwrap().unwrap();
        assert_eq!(untouched_after, untouched_before);
    }

    #[tokio::test]
    async fn test_add_serie_unknown_exercice_mutates_nothing() {
        let (_dir, repo) = setup();
        let session = repo.create_session("Legs").await.unwrap();
        repo.add_exercice(&session.id, "Squat").await.unwrap();
        let before = repo.list_sessions().await.unwrap();

        let err = repo.add_serie("missing", 5, 60.0, 3.0).await.unwrap_err();
        assert!(matches!(err, Error::ExerciceNotFound { ref id } if id == "missing"));

        let after = repo.list_sessions().await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_get_exercice_absent_is_none_not_error() {
        let (_dir, repo) = setup();
        repo.create_session("Push").await.unwrap();

        let found = repo.get_exercice("missing").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_session_absent_is_none_not_error() {
        let (_dir, repo) = setup();
        let found = repo.get_session("missing").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_templates_seeded_then_growable() {
        let (_dir, repo) = setup();

        let templates = repo.list_exercice_templates().await.unwrap();
        assert_eq!(templates.len(), SEED_TEMPLATES.len());
        for name in SEED_TEMPLATES {
            assert!(templates.iter().any(|t| t.name == name));
        }

        repo.create_exercice_template("Deadlift").await.unwrap();
        let templates = repo.list_exercice_templates().await.unwrap();
        assert_eq!(templates.len(), SEED_TEMPLATES.len() + 1);
    }

    #[tokio::test]
    async fn test_sessions_stream_matches_fresh_read() {
        let (_dir, repo) = setup();
        let mut rx = repo.subscribe_sessions();

        repo.create_session("Leg Day").await.unwrap();

        let published = rx.recv().await.unwrap();
        let fresh = repo.list_sessions().await.unwrap();
        assert_eq!(published, fresh);
    }

    #[tokio::test]
    async fn test_sessions_stream_emits_on_nested_mutations() {
        let (_dir, repo) = setup();
        let session = repo.create_session("Push").await.unwrap();
        let exercice = repo.add_exercice(&session.id, "Bench").await.unwrap();

        let mut rx = repo.subscribe_sessions();
        repo.add_serie(&exercice.id, 10, 80.0, 3.0).await.unwrap();

        let published = rx.recv().await.unwrap();
        assert_eq!(published[0].exercices[0].series.len(), 1);
    }

    #[tokio::test]
    async fn test_templates_stream_matches_fresh_read() {
        let (_dir, repo) = setup();
        let mut rx = repo.subscribe_exercice_templates();

        repo.create_exercice_template("Deadlift").await.unwrap();

        let published = rx.recv().await.unwrap();
        let fresh = repo.list_exercice_templates().await.unwrap();
        assert_eq!(published, fresh);
    }

    #[tokio::test]
    async fn test_failed_mutation_emits_nothing() {
        let (_dir, repo) = setup();
        repo.create_session("Pull").await.unwrap();

        let mut rx = repo.subscribe_sessions();
        repo.add_exercice("missing", "Row").await.unwrap_err();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leg_day_scenario() {
        let (_dir, repo) = setup();

        let session = repo.create_session("Leg Day").await.unwrap();
        let exercice = repo.add_exercice(&session.id, "Squat").await.unwrap();
        repo.add_serie(&exercice.id, 8, 100.0, 4.0).await.unwrap();

        let fetched = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Leg Day");
        assert_eq!(fetched.exercices.len(), 1);

        let squat = &fetched.exercices[0];
        assert_eq!(squat.name, "Squat");
        assert_eq!(squat.series.len(), 1);

        let serie = &squat.series[0];
        assert_eq!(serie.repetition, 8);
        assert!((serie.weight - 100.0).abs() < f64::EPSILON);
        assert!((serie.rating - 4.0).abs() < f64::EPSILON);
    }
}
