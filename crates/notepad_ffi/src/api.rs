//! FFI use-case API for the notepad presentation layer.
//!
//! # Responsibility
//! - Expose the tab/session contract as sync FRB functions.
//! - Own the single process-wide session instance.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every command returns an envelope; failures carry a message, never a
//!   panic or an unchecked success.
//! - Note ids cross the boundary as UUID strings.

use log::warn;
use notepad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, normalize_text,
    open_file_session, FileSession, NoteId, NotepadPaths,
};
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

static SESSION: Mutex<Option<FileSession>> = Mutex::new(None);

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.trim()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the tab picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem {
    pub note_id: String,
    /// Title truncated to 20 characters with `...` when longer.
    pub display_title: String,
    pub is_selected: bool,
}

/// Full render state for the notepad window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub tabs: Vec<TabItem>,
    pub selected_id: Option<String>,
    pub selected_title: String,
    pub selected_text: String,
    /// Whether the delete action should be enabled.
    pub can_delete: bool,
    /// Whether a delete confirmation dialog should be shown.
    pub delete_pending: bool,
    pub font_size: u32,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Note affected by the action, when there is one.
    pub note_id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, note_id: Option<NoteId>) -> Self {
        Self {
            ok: true,
            note_id: note_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// Font size response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSizeResponse {
    pub ok: bool,
    pub font_size: u32,
    pub message: String,
}

/// Opens the process-wide session rooted at `data_dir`.
///
/// `None` or a blank path uses `NOTEPAD_DATA_DIR` or the platform default.
/// Re-opening replaces the previous session after flushing it.
///
/// # FFI contract
/// - Sync call; opens the settings database and notes directory.
/// - Does not load notes; call `session_load_if_needed` when the UI appears.
#[flutter_rust_bridge::frb(sync)]
pub fn session_open(data_dir: Option<String>) -> ActionResponse {
    let paths = match data_dir.as_deref().map(str::trim) {
        Some(root) if !root.is_empty() => NotepadPaths::from_root(PathBuf::from(root)),
        _ => NotepadPaths::resolve(),
    };
    let session = match open_file_session(&paths) {
        Ok(session) => session,
        Err(err) => return ActionResponse::failure(format!("session_open failed: {err}")),
    };

    let mut guard = match SESSION.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(previous) = guard.take() {
        previous.flush_all();
    }
    *guard = Some(session);
    ActionResponse::success(
        format!("Session opened at {}.", paths.root.display()),
        None,
    )
}

/// Flushes and drops the process-wide session, e.g. when the window closes.
#[flutter_rust_bridge::frb(sync)]
pub fn session_close() -> ActionResponse {
    let mut guard = match SESSION.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    match guard.take() {
        Some(session) => {
            let count = session.flush_all();
            ActionResponse::success(format!("Session closed; flushed {count} note(s)."), None)
        }
        None => ActionResponse::failure("session_close failed: session is not open"),
    }
}

/// Loads stored notes on first call; later calls only return the snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn session_load_if_needed() -> Result<SessionSnapshot, String> {
    with_session(|session| {
        session.load_if_needed();
        Ok(snapshot(session))
    })
}

/// Returns current render state without side effects.
#[flutter_rust_bridge::frb(sync)]
pub fn session_snapshot() -> Result<SessionSnapshot, String> {
    with_session(|session| Ok(snapshot(session)))
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_add_tab() -> ActionResponse {
    run_action("session_add_tab", |session| {
        let id = session.add_tab();
        Ok(ActionResponse::success("Tab created.", Some(id)))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_select_tab(note_id: String) -> ActionResponse {
    run_action("session_select_tab", |session| {
        let id = parse_note_id(&note_id)?;
        session.select_tab(id).map_err(|err| err.to_string())?;
        Ok(ActionResponse::success("Tab selected.", Some(id)))
    })
}

/// Starts deleting the selected tab; the UI must ask for confirmation.
#[flutter_rust_bridge::frb(sync)]
pub fn session_request_delete() -> ActionResponse {
    run_action("session_request_delete", |session| {
        let id = session.request_delete().map_err(|err| err.to_string())?;
        Ok(ActionResponse::success("Delete pending confirmation.", Some(id)))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_confirm_delete() -> ActionResponse {
    run_action("session_confirm_delete", |session| {
        let id = session.confirm_delete().map_err(|err| err.to_string())?;
        Ok(ActionResponse::success("Tab deleted.", Some(id)))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_cancel_delete() -> ActionResponse {
    run_action("session_cancel_delete", |session| {
        session.cancel_delete();
        Ok(ActionResponse::success("Delete cancelled.", None))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_edit_text(note_id: String, text: String) -> ActionResponse {
    run_action("session_edit_text", |session| {
        let id = parse_note_id(&note_id)?;
        session.edit_text(id, &text).map_err(|err| err.to_string())?;
        Ok(ActionResponse::success("Text updated.", Some(id)))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_edit_title(note_id: String, title: String) -> ActionResponse {
    run_action("session_edit_title", |session| {
        let id = parse_note_id(&note_id)?;
        session.edit_title(id, &title).map_err(|err| err.to_string())?;
        Ok(ActionResponse::success("Title updated.", Some(id)))
    })
}

/// Persists every open note. Called by the UI's 5 second timer.
#[flutter_rust_bridge::frb(sync)]
pub fn session_flush_all() -> ActionResponse {
    run_action("session_flush_all", |session| {
        let count = session.flush_all();
        Ok(ActionResponse::success(format!("Flushed {count} note(s)."), None))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_reset_active() -> ActionResponse {
    run_action("session_reset_active", |session| {
        let id = session.reset_active().map_err(|err| err.to_string())?;
        Ok(ActionResponse::success("Note cleared.", Some(id)))
    })
}

/// Writes the selected note's body to `path`.
///
/// # FFI contract
/// - Failure is returned with `ok = false` so the UI can tell the user.
#[flutter_rust_bridge::frb(sync)]
pub fn session_export_active(path: String) -> ActionResponse {
    run_action("session_export_active", |session| {
        let target = PathBuf::from(path.trim());
        session
            .export_active(&target)
            .map_err(|err| err.to_string())?;
        Ok(ActionResponse::success(
            format!("Exported to {}.", target.display()),
            session.selected_id(),
        ))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn font_size_increase() -> FontSizeResponse {
    font_size_action(true)
}

#[flutter_rust_bridge::frb(sync)]
pub fn font_size_decrease() -> FontSizeResponse {
    font_size_action(false)
}

/// Normalizes clipboard content before the UI inserts it.
#[flutter_rust_bridge::frb(sync)]
pub fn normalize_paste(text: String) -> String {
    normalize_text(&text)
}

fn font_size_action(increase: bool) -> FontSizeResponse {
    let result = with_session(|session| {
        let prefs = session.preferences();
        let outcome = if increase {
            prefs.increase_font_size()
        } else {
            prefs.decrease_font_size()
        };
        outcome.map_err(|err| err.to_string())
    });
    match result {
        Ok(font_size) => FontSizeResponse {
            ok: true,
            font_size,
            message: String::new(),
        },
        Err(message) => FontSizeResponse {
            ok: false,
            font_size: notepad_core::FONT_SIZE_DEFAULT,
            message,
        },
    }
}

fn snapshot(session: &FileSession) -> SessionSnapshot {
    let tabs = session
        .tabs()
        .into_iter()
        .map(|tab| TabItem {
            note_id: tab.id.to_string(),
            display_title: tab.display_title,
            is_selected: tab.is_selected,
        })
        .collect();
    let selected = session.selected_note();
    let font_size = session.preferences().font_size().unwrap_or_else(|err| {
        warn!("event=font_size_read module=ffi status=error error={err}");
        notepad_core::FONT_SIZE_DEFAULT
    });
    SessionSnapshot {
        tabs,
        selected_id: session.selected_id().map(|id| id.to_string()),
        selected_title: selected.map(|note| note.title.clone()).unwrap_or_default(),
        selected_text: selected.map(|note| note.text.clone()).unwrap_or_default(),
        can_delete: session.can_delete(),
        delete_pending: matches!(
            session.delete_state(),
            notepad_core::DeleteState::Pending(_)
        ),
        font_size,
    }
}

fn run_action(
    name: &str,
    f: impl FnOnce(&mut FileSession) -> Result<ActionResponse, String>,
) -> ActionResponse {
    match with_session(f) {
        Ok(response) => response,
        Err(err) => ActionResponse::failure(format!("{name} failed: {err}")),
    }
}

fn with_session<T>(f: impl FnOnce(&mut FileSession) -> Result<T, String>) -> Result<T, String> {
    let mut guard = match SESSION.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let session = guard
        .as_mut()
        .ok_or_else(|| "session is not open; call session_open first".to_string())?;
    f(session)
}

fn parse_note_id(value: &str) -> Result<NoteId, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid note id `{value}`"))
}
