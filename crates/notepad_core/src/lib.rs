//! Core note lifecycle and persistence for the notepad.
//! This crate is the single source of truth for tab and storage invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod text;

pub use config::NotepadPaths;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId};
pub use repo::note_store::{FileNoteStore, NoteStore, StoreError, StoreResult};
pub use repo::settings_repo::{
    RepoError, RepoResult, SettingsRepository, SqliteSettingsRepository,
};
pub use service::autosave::{FlushTimer, FLUSH_INTERVAL_MS};
pub use service::preferences::{Preferences, FONT_SIZE_DEFAULT, FONT_SIZE_MAX, FONT_SIZE_MIN};
pub use service::session::{DeleteState, Session, SessionError, TabSummary};
pub use text::{clamp_title, display_title, normalize_text};

/// Session wired to the file store and SQLite settings.
pub type FileSession = Session<FileNoteStore, SqliteSettingsRepository>;

/// Opens a file-backed session rooted at `paths`. The session is not loaded
/// yet; call `load_if_needed` once the UI appears.
///
/// # Errors
/// - Returns an error when the settings database cannot be opened.
pub fn open_file_session(paths: &NotepadPaths) -> RepoResult<FileSession> {
    let store = FileNoteStore::new(&paths.notes_dir);
    let settings = SqliteSettingsRepository::open(&paths.settings_db)?;
    Ok(Session::new(store, Preferences::new(settings)))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, open_file_session, NotepadPaths};

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn open_file_session_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let paths = NotepadPaths::from_root(dir.path());
        let mut session = open_file_session(&paths).unwrap();
        session.load_if_needed();
        assert!(paths.notes_dir.is_dir());
        assert!(paths.settings_db.is_file());
        assert_eq!(session.notes().len(), 1);
    }
}
