//! IronLog - local persistence engine for workout tracking
//!
//! A versioned, asynchronous embedded store: training sessions own
//! exercices, exercices own series, and a separate template catalog
//! holds reusable exercice names. The presentation layer talks to
//! [`repository::Repository`] and subscribes to the change streams in
//! [`notify`]; everything else here is plumbing for those two surfaces.
//!
//! # Architecture
//!
//! - [`model`] - Data types (Session, Exercice, Serie, ExerciceTemplate)
//! - [`storage`] - SQLite layer: schema migrations and collection access
//! - [`repository`] - Asynchronous operation surface
//! - [`notify`] - Broadcast change streams, one per collection
//! - [`config`] - Database path resolution
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod repository;
pub mod storage;

pub use error::{Error, Result};
pub use model::{Exercice, ExerciceTemplate, Serie, Session};
pub use notify::ChangeNotifier;
pub use repository::Repository;
