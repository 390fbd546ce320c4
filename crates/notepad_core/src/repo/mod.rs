//! Persistence boundaries for notes and settings.
//!
//! # Responsibility
//! - Map notes to one file each inside the notes directory.
//! - Keep persisted scalar settings behind a key/value contract.
//!
//! # Invariants
//! - Stores never mutate in-memory notes; they serialize borrowed values
//!   and return freshly decoded ones.
//! - Note file paths are a pure function of `(creation_date, id)`.

pub mod note_store;
pub mod settings_repo;
