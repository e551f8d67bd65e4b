//! Session aggregate: a training session and everything nested under it.
//!
//! The serialized shape of [`Session`] is the persisted record format —
//! field names here are on-disk names, so renaming a field is a schema
//! change and needs a migration.

use serde::{Deserialize, Serialize};

use crate::model::generate_id;

/// One performed set of an exercice.
///
/// Owned exclusively by its [`Exercice`]; appended through
/// `Repository::add_serie` and never addressable on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serie {
    /// Unique identifier (engine-generated, time-ordered).
    pub id: String,

    /// Repetition count.
    pub repetition: i64,

    /// Weight moved, in whatever unit the user tracks.
    pub weight: f64,

    /// Subjective effort/quality rating.
    pub rating: f64,
}

impl Serie {
    /// Create a new serie with a fresh id.
    #[must_use]
    pub fn new(repetition: i64, weight: f64, rating: f64) -> Self {
        Self {
            id: generate_id(),
            repetition,
            weight,
            rating,
        }
    }
}

/// An exercice performed within a session.
///
/// Exists only as a child of exactly one [`Session`]; never stored as a
/// standalone row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercice {
    /// Unique identifier (engine-generated, time-ordered).
    pub id: String,

    /// Exercice name, typically picked from the template catalog.
    pub name: String,

    /// Performed sets, in insertion order.
    pub series: Vec<Serie>,
}

impl Exercice {
    /// Create a new exercice with a fresh id and no series.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: generate_id(),
            name: name.to_string(),
            series: Vec::new(),
        }
    }
}

/// A training session: the unit of storage and of transactional
/// consistency for everything nested under it.
///
/// Mutating a nested [`Exercice`] or [`Serie`] means loading the whole
/// session, producing a new value, and writing the whole session back —
/// there is no per-field update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier (engine-generated, time-ordered).
    pub id: String,

    /// Session name (e.g. "Leg Day").
    pub name: String,

    /// Exercices performed in this session, in insertion order.
    pub exercices: Vec<Exercice>,
}

impl Session {
    /// Create a new session with a fresh id and no exercices.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: generate_id(),
            name: name.to_string(),
            exercices: Vec::new(),
        }
    }

    /// Find an owned exercice by id.
    #[must_use]
    pub fn exercice(&self, id: &str) -> Option<&Exercice> {
        self.exercices.iter().find(|e| e.id == id)
    }

    /// Find an owned exercice by id, mutably.
    pub fn exercice_mut(&mut self, id: &str) -> Option<&mut Exercice> {
        self.exercices.iter_mut().find(|e| e.id == id)
    }
}
