//! Storage location resolution.
//!
//! # Responsibility
//! - Resolve the application data root and the paths derived from it.
//!
//! # Invariants
//! - `NOTEPAD_DATA_DIR` (when non-blank) overrides platform defaults.
//! - The settings database and logs never live inside the notes directory.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "NOTEPAD_DATA_DIR";

const APP_DIR_NAME: &str = "Notepad";
const NOTES_DIR_NAME: &str = "Notes";
const SETTINGS_DB_FILE_NAME: &str = "settings.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Filesystem layout for one notepad installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotepadPaths {
    pub root: PathBuf,
    pub notes_dir: PathBuf,
    pub settings_db: PathBuf,
    pub log_dir: PathBuf,
}

impl NotepadPaths {
    /// Derives every path from `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            notes_dir: root.join(NOTES_DIR_NAME),
            settings_db: root.join(SETTINGS_DB_FILE_NAME),
            log_dir: root.join(LOG_DIR_NAME),
            root,
        }
    }

    /// Resolves from `NOTEPAD_DATA_DIR`, else the platform data directory.
    pub fn resolve() -> Self {
        Self::from_root(resolve_data_root())
    }
}

/// Returns the application data root.
pub fn resolve_data_root() -> PathBuf {
    if let Some(raw) = std::env::var_os(DATA_DIR_ENV) {
        let raw = PathBuf::from(raw);
        if !is_blank(&raw) {
            return raw;
        }
    }
    platform_data_dir().join(APP_DIR_NAME)
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().is_empty() || path.to_str().is_some_and(|value| value.trim().is_empty())
}

fn platform_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata);
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            if !xdg.is_empty() {
                return PathBuf::from(xdg);
            }
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".local").join("share");
        }
    }

    std::env::temp_dir()
}
