//! File-backed note store.
//!
//! # Responsibility
//! - Persist each note as one JSON file in the notes directory.
//! - Enumerate and decode stored notes on startup.
//! - Remove a note's file when the note is deleted.
//!
//! # Invariants
//! - File name is `{YYYYMMDD_HHMMSS}_{id prefix}.json`, derived only from
//!   `creation_date` and `id`, so save and delete always target one path.
//! - `save`/`delete`/`load_all` never fail to the caller; failures are logged
//!   and the in-memory session stays authoritative.
//! - Corrupt or foreign files are skipped during `load_all`, never fatal.
//! - Temporary files left by an interrupted save are removed by `load_all`.
//! - Writes go through a temporary file and a rename, so a crash mid-write
//!   never replaces a good note file with a partial one.

use crate::model::note::Note;
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of note files recognised by `load_all`.
pub const NOTE_FILE_EXTENSION: &str = "json";

const TEMP_FILE_SUFFIX: &str = "tmp";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by fallible store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure (permission, missing directory, disk full).
    Io { path: PathBuf, source: io::Error },
    /// Note could not be encoded.
    Serialize(serde_json::Error),
    /// Stored file could not be decoded into a note.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at `{}`: {source}", path.display()),
            Self::Serialize(err) => write!(f, "failed to encode note: {err}"),
            Self::Parse { path, source } => {
                write!(f, "failed to decode note file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Persistence contract consumed by the session manager.
///
/// Implementations log and swallow failures; callers treat every call as
/// best effort and retry implicitly on the next flush.
pub trait NoteStore {
    /// Serializes and writes one note to its derived path.
    fn save(&self, note: &Note);
    /// Returns every decodable stored note ordered by creation date.
    ///
    /// Notes with equal creation dates are ordered by id, so the order is
    /// total and stable across loads.
    fn load_all(&self) -> Vec<Note>;
    /// Removes the note's file; a missing file is not an error.
    fn delete(&self, note: &Note);
}

/// Note store writing one JSON file per note into a private directory.
#[derive(Debug, Clone)]
pub struct FileNoteStore {
    dir: PathBuf,
}

impl FileNoteStore {
    /// Creates a store rooted at `dir`, creating the directory when absent.
    ///
    /// Directory creation failure is logged; writes retry creation lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let store = Self { dir: dir.into() };
        if let Err(err) = store.ensure_dir() {
            error!(
                "event=store_init module=store status=error dir={} error={}",
                store.dir.display(),
                err
            );
        }
        store
    }

    /// Returns the notes directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the deterministic file path for `note`.
    pub fn note_path(&self, note: &Note) -> PathBuf {
        self.dir
            .join(format!("{}.{NOTE_FILE_EXTENSION}", note.file_stem()))
    }

    /// Writes `note` to its derived path, returning the path on success.
    pub fn try_save(&self, note: &Note) -> StoreResult<PathBuf> {
        let payload = serde_json::to_vec_pretty(note).map_err(StoreError::Serialize)?;
        self.ensure_dir()?;

        let path = self.note_path(note);
        let temp_path = path.with_extension(format!("{NOTE_FILE_EXTENSION}.{TEMP_FILE_SUFFIX}"));
        fs::write(&temp_path, payload).map_err(|err| StoreError::io(&temp_path, err))?;
        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::io(&path, err));
        }

        debug!(
            "event=note_save module=store status=ok path={}",
            path.display()
        );
        Ok(path)
    }

    /// Removes the file for `note`; returns whether a file was removed.
    pub fn try_delete(&self, note: &Note) -> StoreResult<bool> {
        let path = self.note_path(note);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StoreError::io(&path, err)),
        }
    }

    /// Decodes every recognised note file.
    ///
    /// Only directory enumeration failures are returned; undecodable files
    /// are logged and skipped. A missing directory yields an empty list.
    /// Stale temporary files from an interrupted save are removed.
    pub fn try_load_all(&self) -> StoreResult<Vec<Note>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io(&self.dir, err)),
        };

        let mut notes = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    warn!(
                        "event=note_load module=store status=skipped dir={} error={}",
                        self.dir.display(),
                        err
                    );
                    continue;
                }
            };
            if is_temp_file(&path) {
                remove_stale_temp(&path);
                continue;
            }
            if !is_note_file(&path) {
                continue;
            }
            match read_note_file(&path) {
                Ok(note) => notes.push(note),
                Err(err) => warn!(
                    "event=note_load module=store status=skipped path={} error={}",
                    path.display(),
                    err
                ),
            }
        }

        notes.sort_by(|a, b| {
            a.creation_date
                .cmp(&b.creation_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(notes)
    }

    fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|err| StoreError::io(&self.dir, err))
    }
}

impl NoteStore for FileNoteStore {
    fn save(&self, note: &Note) {
        if let Err(err) = self.try_save(note) {
            error!(
                "event=note_save module=store status=error note_id={} error={}",
                note.id, err
            );
        }
    }

    fn load_all(&self) -> Vec<Note> {
        match self.try_load_all() {
            Ok(notes) => notes,
            Err(err) => {
                error!(
                    "event=note_load module=store status=error dir={} error={}",
                    self.dir.display(),
                    err
                );
                Vec::new()
            }
        }
    }

    fn delete(&self, note: &Note) {
        if let Err(err) = self.try_delete(note) {
            error!(
                "event=note_delete module=store status=error note_id={} error={}",
                note.id, err
            );
        }
    }
}

fn is_note_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext == NOTE_FILE_EXTENSION)
}

fn is_temp_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| {
                name.ends_with(&format!(".{NOTE_FILE_EXTENSION}.{TEMP_FILE_SUFFIX}"))
            })
}

fn remove_stale_temp(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(
            "event=note_load module=store status=temp_removed path={}",
            path.display()
        ),
        Err(err) => warn!(
            "event=note_load module=store status=temp_kept path={} error={}",
            path.display(),
            err
        ),
    }
}

fn read_note_file(path: &Path) -> StoreResult<Note> {
    let raw = fs::read(path).map_err(|err| StoreError::io(path, err))?;
    serde_json::from_slice(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
