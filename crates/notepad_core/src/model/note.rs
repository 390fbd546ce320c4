//! Note domain model.
//!
//! # Responsibility
//! - Define the record backing one open tab (title + body text).
//! - Derive the deterministic on-disk file stem from immutable fields.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `creation_date` is fixed at construction.
//! - `file_stem()` depends only on `id` and `creation_date`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier joining in-memory notes and note files.
pub type NoteId = Uuid;

/// Timestamp layout used in note file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Number of id characters appended to the file timestamp.
pub const FILE_ID_PREFIX_LEN: usize = 4;

/// One note as held by the session and persisted by the store.
///
/// Equality is field-wise: two notes are equal only when id, title, text and
/// creation date all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Stable id; the sole join key with the on-disk file.
    pub id: NoteId,
    /// Display title, at most 40 characters once written through the session.
    pub title: String,
    /// Plain-text body, unbounded.
    pub text: String,
    /// Creation instant. Serialized as `creationDate`.
    pub creation_date: DateTime<Utc>,
}

impl Note {
    /// Creates a note with a generated id and the current time.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_identity(Uuid::new_v4(), title, text, Utc::now())
    }

    /// Creates a note with caller-provided identity fields.
    ///
    /// Used by load paths and tests where id and creation date already exist.
    pub fn with_identity(
        id: NoteId,
        title: impl Into<String>,
        text: impl Into<String>,
        creation_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            text: text.into(),
            creation_date,
        }
    }

    /// Returns the file stem `YYYYMMDD_HHMMSS_xxxx` for this note.
    ///
    /// The timestamp is rendered in UTC so the stem does not move when the
    /// host time zone changes between save and delete.
    pub fn file_stem(&self) -> String {
        let id_text = self.id.to_string();
        let prefix: String = id_text.chars().take(FILE_ID_PREFIX_LEN).collect();
        format!(
            "{}_{}",
            self.creation_date.format(FILE_TIMESTAMP_FORMAT),
            prefix
        )
    }
}
