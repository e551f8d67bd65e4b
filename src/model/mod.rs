//! Data types for the IronLog store.
//!
//! [`Session`] is the aggregate root: it exclusively owns its
//! [`Exercice`]s, which exclusively own their [`Serie`]s. The whole
//! aggregate is one storage record; nested entities are never stored
//! standalone. [`ExerciceTemplate`] lives in its own collection with an
//! independent lifecycle.

pub mod session;
pub mod template;

pub use session::{Exercice, Serie, Session};
pub use template::ExerciceTemplate;

/// Generate a fresh entity id: a time-ordered opaque string.
///
/// UUID v7 embeds a millisecond timestamp in the high bits, so
/// lexicographic id order equals creation order and the collections can
/// list in insertion order without a separate sort key.
pub(crate) fn generate_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
