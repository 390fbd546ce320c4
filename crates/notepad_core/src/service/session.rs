//! Tab/session manager.
//!
//! # Responsibility
//! - Own the ordered in-memory note collection and the selected tab.
//! - Mediate every read and write against the note store.
//! - Drive the two-step delete confirmation state machine.
//!
//! # Invariants
//! - Once loaded, the collection is never empty; deleting the last tab seeds
//!   a fresh default note in the same call.
//! - Once a note exists, a tab is always selected.
//! - Deleting a note removes it from memory and storage together.
//! - Edits only touch memory; persistence happens on `flush_all`, except for
//!   `add_tab` and `reset_active`, which save immediately.
//! - Stored titles never exceed 40 characters.

use crate::model::note::{Note, NoteId};
use crate::repo::note_store::NoteStore;
use crate::repo::settings_repo::SettingsRepository;
use crate::service::preferences::Preferences;
use crate::text::{clamp_title, display_title, normalize_text};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Errors from session commands.
#[derive(Debug)]
pub enum SessionError {
    /// No open tab has this id.
    NoteNotFound(NoteId),
    /// The command needs a selected tab but none is selected.
    NoSelection,
    /// Deleting is refused while only one tab remains.
    LastTabProtected,
    /// `confirm_delete` was called without a pending request.
    NoPendingDelete,
    /// Writing the exported body failed.
    Export { path: PathBuf, source: io::Error },
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::NoSelection => write!(f, "no tab is selected"),
            Self::LastTabProtected => write!(f, "the last remaining tab cannot be deleted"),
            Self::NoPendingDelete => write!(f, "no delete is pending confirmation"),
            Self::Export { path, source } => {
                write!(f, "failed to export to `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Export { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Delete confirmation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteState {
    /// No delete awaits confirmation.
    Idle,
    /// Waiting for the user to confirm deleting this note.
    Pending(NoteId),
}

/// Read model for one tab in the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSummary {
    pub id: NoteId,
    /// Title truncated to 20 characters with `...` when longer.
    pub display_title: String,
    pub is_selected: bool,
}

/// Live working set of open notes for the process lifetime.
pub struct Session<S: NoteStore, R: SettingsRepository> {
    store: S,
    preferences: Preferences<R>,
    notes: Vec<Note>,
    selected: Option<NoteId>,
    delete_state: DeleteState,
    loaded: bool,
}

impl<S: NoteStore, R: SettingsRepository> Session<S, R> {
    /// Creates an unloaded session over injected storage.
    pub fn new(store: S, preferences: Preferences<R>) -> Self {
        Self {
            store,
            preferences,
            notes: Vec::new(),
            selected: None,
            delete_state: DeleteState::Idle,
            loaded: false,
        }
    }

    /// Loads stored notes exactly once per session.
    ///
    /// Seeds and persists a single `Note 1` when storage is empty, then
    /// restores the last selected tab if it still exists, otherwise selects
    /// the first tab. Returns `true` only on the call that performed the load.
    pub fn load_if_needed(&mut self) -> bool {
        if self.loaded {
            return false;
        }
        self.loaded = true;

        let mut notes = self.store.load_all();
        if notes.is_empty() {
            let seed = Note::new(default_title(0), "");
            self.store.save(&seed);
            notes.push(seed);
        }
        self.notes = notes;

        let restored = match self.preferences.last_selected() {
            Ok(id) => id.filter(|id| self.contains(*id)),
            Err(err) => {
                warn!("event=session_load module=session status=degraded error={err}");
                None
            }
        };
        match restored {
            Some(id) => self.selected = Some(id),
            None => {
                let first = self.notes[0].id;
                self.set_selection(first);
            }
        }

        info!(
            "event=session_load module=session status=ok notes={} restored_selection={}",
            self.notes.len(),
            restored.is_some()
        );
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Appends, selects and immediately persists a new `Note {n}` tab.
    pub fn add_tab(&mut self) -> NoteId {
        self.load_if_needed();
        let note = Note::new(default_title(self.notes.len()), "");
        let id = note.id;
        self.store.save(&note);
        self.notes.push(note);
        self.set_selection(id);
        info!(
            "event=tab_add module=session status=ok tabs={}",
            self.notes.len()
        );
        id
    }

    /// Changes the selected tab.
    ///
    /// # Errors
    /// - `NoteNotFound` when `id` is not open.
    pub fn select_tab(&mut self, id: NoteId) -> Result<(), SessionError> {
        if !self.contains(id) {
            return Err(SessionError::NoteNotFound(id));
        }
        if self.selected != Some(id) {
            self.set_selection(id);
        }
        Ok(())
    }

    /// Whether the delete action should be enabled.
    pub fn can_delete(&self) -> bool {
        self.selected.is_some() && self.notes.len() > 1
    }

    /// Starts deleting the selected tab; waits for `confirm_delete`.
    ///
    /// # Errors
    /// - `NoSelection` when nothing is selected.
    /// - `LastTabProtected` when only one tab remains.
    pub fn request_delete(&mut self) -> Result<NoteId, SessionError> {
        let id = self.selected.ok_or(SessionError::NoSelection)?;
        if self.notes.len() <= 1 {
            return Err(SessionError::LastTabProtected);
        }
        self.delete_state = DeleteState::Pending(id);
        Ok(id)
    }

    /// Completes a pending delete and returns the removed id.
    ///
    /// # Errors
    /// - `NoPendingDelete` when no request is outstanding.
    pub fn confirm_delete(&mut self) -> Result<NoteId, SessionError> {
        let DeleteState::Pending(id) = self.delete_state else {
            return Err(SessionError::NoPendingDelete);
        };
        self.delete_state = DeleteState::Idle;
        self.delete_tab(id)?;
        Ok(id)
    }

    /// Drops a pending delete request, if any.
    pub fn cancel_delete(&mut self) {
        self.delete_state = DeleteState::Idle;
    }

    pub fn delete_state(&self) -> DeleteState {
        self.delete_state
    }

    /// Removes `id` from memory and storage without confirmation.
    ///
    /// If the deleted tab was selected, the tab now at the same index (or the
    /// new last tab) is selected. Deleting the only tab replaces it with a
    /// fresh, persisted `Note 1`.
    ///
    /// # Errors
    /// - `NoteNotFound` when `id` is not open.
    pub fn delete_tab(&mut self, id: NoteId) -> Result<(), SessionError> {
        let index = self
            .index_of(id)
            .ok_or(SessionError::NoteNotFound(id))?;
        let removed = self.notes.remove(index);
        self.store.delete(&removed);
        if self.delete_state == DeleteState::Pending(id) {
            self.delete_state = DeleteState::Idle;
        }

        if self.notes.is_empty() {
            let seed = Note::new(default_title(0), "");
            let seed_id = seed.id;
            self.store.save(&seed);
            self.notes.push(seed);
            self.set_selection(seed_id);
        } else if self.selected == Some(id) {
            let next = self.notes[index.min(self.notes.len() - 1)].id;
            self.set_selection(next);
        }

        info!(
            "event=tab_delete module=session status=ok tabs={}",
            self.notes.len()
        );
        Ok(())
    }

    /// Replaces the body of `id` with normalized `text`. Not persisted until
    /// the next flush.
    pub fn edit_text(&mut self, id: NoteId, text: &str) -> Result<(), SessionError> {
        self.note_mut(id)?.text = normalize_text(text);
        Ok(())
    }

    /// Replaces the title of `id`, normalized and truncated to 40 characters.
    /// Not persisted until the next flush.
    pub fn edit_title(&mut self, id: NoteId, title: &str) -> Result<(), SessionError> {
        self.note_mut(id)?.title = clamp_title(title);
        Ok(())
    }

    /// Persists every open note unconditionally; returns the count.
    pub fn flush_all(&self) -> usize {
        for note in &self.notes {
            self.store.save(note);
        }
        debug!(
            "event=session_flush module=session status=ok notes={}",
            self.notes.len()
        );
        self.notes.len()
    }

    /// Clears title and body of the selected note and saves it now.
    ///
    /// # Errors
    /// - `NoSelection` when nothing is selected.
    pub fn reset_active(&mut self) -> Result<NoteId, SessionError> {
        let id = self.selected.ok_or(SessionError::NoSelection)?;
        let note = self.note_mut(id)?;
        note.title.clear();
        note.text.clear();
        let snapshot = note.clone();
        self.store.save(&snapshot);
        info!("event=tab_reset module=session status=ok");
        Ok(id)
    }

    /// Writes the selected note's raw body to `destination`.
    ///
    /// # Errors
    /// - `NoSelection` when nothing is selected.
    /// - `Export` when the write fails; the failure is also logged.
    pub fn export_active(&self, destination: impl AsRef<Path>) -> Result<(), SessionError> {
        let destination = destination.as_ref();
        let note = self.selected_note().ok_or(SessionError::NoSelection)?;
        match std::fs::write(destination, note.text.as_bytes()) {
            Ok(()) => {
                info!(
                    "event=note_export module=session status=ok path={}",
                    destination.display()
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    "event=note_export module=session status=error path={} error={}",
                    destination.display(),
                    source
                );
                Err(SessionError::Export {
                    path: destination.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Open notes in tab order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn selected_id(&self) -> Option<NoteId> {
        self.selected
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selected.and_then(|id| self.note(id))
    }

    /// Tab picker rows in tab order.
    pub fn tabs(&self) -> Vec<TabSummary> {
        self.notes
            .iter()
            .map(|note| TabSummary {
                id: note.id,
                display_title: display_title(&note.title),
                is_selected: self.selected == Some(note.id),
            })
            .collect()
    }

    /// Truncated tab label for `id`.
    pub fn display_title(&self, id: NoteId) -> Option<String> {
        self.note(id).map(|note| display_title(&note.title))
    }

    pub fn preferences(&self) -> &Preferences<R> {
        &self.preferences
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn contains(&self, id: NoteId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    fn note_mut(&mut self, id: NoteId) -> Result<&mut Note, SessionError> {
        self.notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or(SessionError::NoteNotFound(id))
    }

    /// Selects `id`; any pending delete targeted the previous selection and
    /// is dropped.
    fn set_selection(&mut self, id: NoteId) {
        self.selected = Some(id);
        self.delete_state = DeleteState::Idle;
        if let Err(err) = self.preferences.set_last_selected(id) {
            warn!("event=selection_persist module=session status=error error={err}");
        }
    }
}

/// Default title for a tab appended after `existing` tabs.
pub fn default_title(existing: usize) -> String {
    format!("Note {}", existing + 1)
}

#[cfg(test)]
mod tests {
    use super::{default_title, DeleteState, Session, SessionError};
    use crate::model::note::Note;
    use crate::repo::note_store::NoteStore;
    use crate::repo::settings_repo::SqliteSettingsRepository;
    use crate::service::preferences::Preferences;
    use std::cell::RefCell;

    /// In-memory store recording every call.
    #[derive(Default)]
    struct RecordingStore {
        stored: RefCell<Vec<Note>>,
        saves: RefCell<usize>,
    }

    impl NoteStore for RecordingStore {
        fn save(&self, note: &Note) {
            *self.saves.borrow_mut() += 1;
            let mut stored = self.stored.borrow_mut();
            stored.retain(|existing| existing.id != note.id);
            stored.push(note.clone());
        }

        fn load_all(&self) -> Vec<Note> {
            let mut notes = self.stored.borrow().clone();
            notes.sort_by_key(|note| note.creation_date);
            notes
        }

        fn delete(&self, note: &Note) {
            self.stored.borrow_mut().retain(|existing| existing.id != note.id);
        }
    }

    fn session() -> Session<RecordingStore, SqliteSettingsRepository> {
        let prefs = Preferences::new(SqliteSettingsRepository::in_memory().unwrap());
        let mut session = Session::new(RecordingStore::default(), prefs);
        session.load_if_needed();
        session
    }

    #[test]
    fn default_titles_are_one_based() {
        assert_eq!(default_title(0), "Note 1");
        assert_eq!(default_title(2), "Note 3");
    }

    #[test]
    fn load_runs_once() {
        let mut session = session();
        assert!(!session.load_if_needed());
        assert_eq!(session.notes().len(), 1);
        assert_eq!(session.store().stored.borrow().len(), 1);
    }

    #[test]
    fn edits_do_not_save_until_flush() {
        let mut session = session();
        let id = session.selected_id().unwrap();
        let saves_before = *session.store().saves.borrow();

        session.edit_text(id, "typed").unwrap();
        session.edit_title(id, "renamed").unwrap();
        assert_eq!(*session.store().saves.borrow(), saves_before);
        assert_eq!(session.store().stored.borrow()[0].text, "");

        assert_eq!(session.flush_all(), 1);
        assert_eq!(session.store().stored.borrow()[0].text, "typed");
        assert_eq!(session.store().stored.borrow()[0].title, "renamed");
    }

    #[test]
    fn edits_normalize_curly_quotes() {
        let mut session = session();
        let id = session.selected_id().unwrap();
        session.edit_text(id, "it\u{2019}s").unwrap();
        session.edit_title(id, "\u{2018}q\u{2019}").unwrap();
        let note = session.selected_note().unwrap();
        assert_eq!(note.text, "it's");
        assert_eq!(note.title, "'q'");
    }

    #[test]
    fn editing_unknown_note_is_not_found() {
        let mut session = session();
        let missing = Note::new("x", "").id;
        assert!(matches!(
            session.edit_text(missing, "a"),
            Err(SessionError::NoteNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn request_delete_refuses_last_tab() {
        let mut session = session();
        assert!(!session.can_delete());
        assert!(matches!(
            session.request_delete(),
            Err(SessionError::LastTabProtected)
        ));
        assert_eq!(session.delete_state(), DeleteState::Idle);
    }

    #[test]
    fn cancel_keeps_the_tab() {
        let mut session = session();
        session.add_tab();
        let target = session.request_delete().unwrap();
        assert_eq!(session.delete_state(), DeleteState::Pending(target));

        session.cancel_delete();
        assert_eq!(session.delete_state(), DeleteState::Idle);
        assert_eq!(session.notes().len(), 2);
        assert!(matches!(
            session.confirm_delete(),
            Err(SessionError::NoPendingDelete)
        ));
    }

    #[test]
    fn switching_tabs_drops_pending_delete() {
        let mut session = session();
        let first = session.selected_id().unwrap();
        let second = session.add_tab();
        assert_eq!(session.request_delete().unwrap(), second);

        session.select_tab(first).unwrap();
        assert_eq!(session.delete_state(), DeleteState::Idle);
        assert!(matches!(
            session.confirm_delete(),
            Err(SessionError::NoPendingDelete)
        ));
        assert!(session.note(second).is_some());
        assert_eq!(session.selected_id(), Some(first));
    }

    #[test]
    fn adding_a_tab_drops_pending_delete() {
        let mut session = session();
        session.add_tab();
        session.request_delete().unwrap();

        session.add_tab();
        assert_eq!(session.delete_state(), DeleteState::Idle);
        assert_eq!(session.notes().len(), 3);
    }

    #[test]
    fn add_tab_before_load_loads_stored_notes_first() {
        let store = RecordingStore::default();
        let stored = Note::new("kept", "body");
        store.save(&stored);
        let prefs = Preferences::new(SqliteSettingsRepository::in_memory().unwrap());
        let mut session = Session::new(store, prefs);

        let added = session.add_tab();
        assert!(session.is_loaded());
        assert_eq!(session.notes().len(), 2);
        assert_eq!(session.notes()[0].id, stored.id);
        assert_eq!(session.notes()[1].title, "Note 2");
        assert_eq!(session.selected_id(), Some(added));
        assert!(!session.load_if_needed());
    }

    #[test]
    fn deleting_non_selected_tab_keeps_selection() {
        let mut session = session();
        let first = session.selected_id().unwrap();
        let second = session.add_tab();
        session.delete_tab(first).unwrap();
        assert_eq!(session.selected_id(), Some(second));

        let third = session.add_tab();
        session.delete_tab(second).unwrap();
        assert_eq!(session.selected_id(), Some(third));
    }

    #[test]
    fn reset_active_clears_and_saves_immediately() {
        let mut session = session();
        let id = session.selected_id().unwrap();
        session.edit_title(id, "t").unwrap();
        session.edit_text(id, "body").unwrap();

        session.reset_active().unwrap();
        let stored = session.store().stored.borrow()[0].clone();
        assert_eq!(stored.title, "");
        assert_eq!(stored.text, "");
        assert_eq!(session.display_title(id).as_deref(), Some("Untitled"));
    }

    #[test]
    fn tabs_mark_the_selected_one() {
        let mut session = session();
        let added = session.add_tab();
        let tabs = session.tabs();
        assert_eq!(tabs.len(), 2);
        assert!(!tabs[0].is_selected);
        assert!(tabs[1].is_selected);
        assert_eq!(tabs[1].id, added);
        assert_eq!(tabs[1].display_title, "Note 2");
    }
}
