//! Exercice template catalog entry.
//!
//! Templates are reusable exercice names with an independent lifecycle:
//! they are never attached to a session, and deleting or adding one
//! leaves every session untouched.

use serde::{Deserialize, Serialize};

use crate::model::generate_id;

/// A reusable exercice name in the template catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciceTemplate {
    /// Unique identifier (engine-generated, time-ordered).
    pub id: String,

    /// Template name.
    pub name: String,
}

impl ExerciceTemplate {
    /// Create a new template with a fresh id.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: generate_id(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_template() {
        let template = ExerciceTemplate::new("Butterfly");
        assert!(!template.id.is_empty());
        assert_eq!(template.name, "Butterfly");
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(
            ExerciceTemplate::new("a").id,
            ExerciceTemplate::new("a").id
        );
    }
}
