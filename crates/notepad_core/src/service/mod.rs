//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and settings calls into session-level operations.
//! - Keep presentation layers decoupled from storage details.

pub mod autosave;
pub mod preferences;
pub mod session;
