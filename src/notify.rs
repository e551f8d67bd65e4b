//! Broadcast change streams, one per collection.
//!
//! After every successful mutation the repository re-reads the affected
//! collection and publishes the full content here, so subscribers never
//! reconstruct derived state themselves. There is no replay: a new
//! subscriber builds its initial value with a plain
//! `list_sessions` / `list_exercice_templates` call and then receives
//! every publication from that point on.

use tokio::sync::broadcast;

use crate::model::{ExerciceTemplate, Session};

/// Default broadcast channel capacity.
///
/// Slow receivers lag (and observe `RecvError::Lagged`) rather than
/// blocking the sender.
const DEFAULT_CAPACITY: usize = 16;

/// Broadcast-based change notifier for the two collections.
///
/// Publishing never awaits and never fails: with no subscribers the
/// value is simply dropped.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sessions_tx: broadcast::Sender<Vec<Session>>,
    templates_tx: broadcast::Sender<Vec<ExerciceTemplate>>,
}

impl ChangeNotifier {
    /// Create a notifier with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a notifier with a custom channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero (a zero-capacity broadcast channel
    /// cannot exist).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sessions_tx, _) = broadcast::channel(capacity);
        let (templates_tx, _) = broadcast::channel(capacity);
        Self {
            sessions_tx,
            templates_tx,
        }
    }

    /// Subscribe to the sessions change stream.
    #[must_use]
    pub fn subscribe_sessions(&self) -> broadcast::Receiver<Vec<Session>> {
        self.sessions_tx.subscribe()
    }

    /// Subscribe to the template-catalog change stream.
    #[must_use]
    pub fn subscribe_exercice_templates(&self) -> broadcast::Receiver<Vec<ExerciceTemplate>> {
        self.templates_tx.subscribe()
    }

    /// Publish the full sessions collection to all subscribers.
    ///
    /// Returns the number of receivers the value reached (0 with no
    /// subscribers).
    pub fn publish_sessions(&self, sessions: Vec<Session>) -> usize {
        self.sessions_tx.send(sessions).unwrap_or(0)
    }

    /// Publish the full template catalog to all subscribers.
    ///
    /// Returns the number of receivers the value reached.
    pub fn publish_exercice_templates(&self, templates: Vec<ExerciceTemplate>) -> usize {
        self.templates_tx.send(templates).unwrap_or(0)
    }

    /// Number of live subscribers on the sessions stream.
    #[must_use]
    pub fn session_subscribers(&self) -> usize {
        self.sessions_tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
