//! Domain model for notepad tabs.
//!
//! # Responsibility
//! - Define the canonical note record shared by session and storage.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Identity and creation date never change after construction.

pub mod note;
