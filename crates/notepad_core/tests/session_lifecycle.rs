use notepad_core::{
    open_file_session, FileNoteStore, FileSession, FlushTimer, Note, NoteStore, NotepadPaths,
    SessionError,
};

fn open(root: &std::path::Path) -> FileSession {
    let mut session = open_file_session(&NotepadPaths::from_root(root)).unwrap();
    session.load_if_needed();
    session
}

fn stored_notes(root: &std::path::Path) -> Vec<Note> {
    FileNoteStore::new(NotepadPaths::from_root(root).notes_dir).load_all()
}

fn titles(session: &FileSession) -> Vec<String> {
    session
        .notes()
        .iter()
        .map(|note| note.title.clone())
        .collect()
}

#[test]
fn empty_storage_seeds_one_persisted_default_note() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(dir.path());

    assert_eq!(titles(&session), vec!["Note 1"]);
    assert_eq!(session.selected_id(), Some(session.notes()[0].id));

    let stored = stored_notes(dir.path());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Note 1");
}

#[test]
fn repeated_load_does_not_reseed_or_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    session.add_tab();

    assert!(!session.load_if_needed());
    assert!(!session.load_if_needed());
    assert_eq!(session.notes().len(), 2);
    assert_eq!(stored_notes(dir.path()).len(), 2);
}

#[test]
fn add_tab_numbers_selects_and_persists_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    session.add_tab();
    assert_eq!(titles(&session), vec!["Note 1", "Note 2"]);

    let added = session.add_tab();
    assert_eq!(titles(&session), vec!["Note 1", "Note 2", "Note 3"]);
    assert_eq!(session.selected_id(), Some(added));
    assert!(stored_notes(dir.path())
        .iter()
        .any(|note| note.id == added && note.title == "Note 3"));
}

#[test]
fn long_title_is_stored_as_exactly_forty_chars() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let id = session.selected_id().unwrap();

    session.edit_title(id, &"x".repeat(50)).unwrap();
    session.flush_all();

    let stored = stored_notes(dir.path());
    assert_eq!(stored[0].title.chars().count(), 40);
    assert_eq!(
        session.display_title(id).unwrap(),
        format!("{}...", "x".repeat(20))
    );
}

#[test]
fn deleting_last_tab_leaves_a_fresh_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let only = session.selected_id().unwrap();

    session.delete_tab(only).unwrap();

    assert_eq!(session.notes().len(), 1);
    let replacement = &session.notes()[0];
    assert_ne!(replacement.id, only);
    assert_eq!(replacement.title, "Note 1");
    assert_eq!(session.selected_id(), Some(replacement.id));

    let stored = stored_notes(dir.path());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, replacement.id);
}

#[test]
fn confirmed_delete_selects_tab_at_same_index() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let first = session.selected_id().unwrap();
    let second = session.add_tab();
    let third = session.add_tab();

    session.select_tab(second).unwrap();
    assert!(session.can_delete());
    assert_eq!(session.request_delete().unwrap(), second);
    assert_eq!(session.confirm_delete().unwrap(), second);

    assert_eq!(
        session.notes().iter().map(|n| n.id).collect::<Vec<_>>(),
        vec![first, third]
    );
    assert_eq!(session.selected_id(), Some(third));
    assert!(stored_notes(dir.path()).iter().all(|note| note.id != second));
}

#[test]
fn deleting_last_index_selects_new_last_tab() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let second = session.add_tab();
    let third = session.add_tab();
    assert_eq!(session.selected_id(), Some(third));

    session.request_delete().unwrap();
    session.confirm_delete().unwrap();
    assert_eq!(session.selected_id(), Some(second));
}

#[test]
fn request_delete_with_single_tab_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    assert!(!session.can_delete());
    assert!(matches!(
        session.request_delete(),
        Err(SessionError::LastTabProtected)
    ));
    assert_eq!(session.notes().len(), 1);
}

#[test]
fn selection_and_content_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let picked = {
        let mut session = open(dir.path());
        let first = session.selected_id().unwrap();
        session.add_tab();
        session.add_tab();
        session.select_tab(first).unwrap();
        session.edit_text(first, "remember me").unwrap();
        session.flush_all();
        first
    };

    let session = open(dir.path());
    assert_eq!(session.notes().len(), 3);
    assert_eq!(session.selected_id(), Some(picked));
    assert_eq!(session.selected_note().unwrap().text, "remember me");
    assert_eq!(titles(&session), vec!["Note 1", "Note 2", "Note 3"]);
}

#[test]
fn stale_selection_pointer_falls_back_to_first_tab() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = open(dir.path());
        session.add_tab();
    }
    // Remove the selected note's file behind the session's back.
    let stored = stored_notes(dir.path());
    let store = FileNoteStore::new(NotepadPaths::from_root(dir.path()).notes_dir);
    store.delete(&stored[1]);

    let session = open(dir.path());
    assert_eq!(session.notes().len(), 1);
    assert_eq!(session.selected_id(), Some(stored[0].id));
}

#[test]
fn unflushed_edits_are_not_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let id = session.selected_id().unwrap();
    session.edit_text(id, "draft").unwrap();

    assert_eq!(stored_notes(dir.path())[0].text, "");
}

#[test]
fn flush_timer_persists_edits_once_interval_elapses() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let id = session.selected_id().unwrap();
    let mut timer = FlushTimer::with_default_interval(0);

    session.edit_text(id, "tick tock").unwrap();
    assert_eq!(timer.tick(4_999, &session), None);
    assert_eq!(stored_notes(dir.path())[0].text, "");

    assert_eq!(timer.tick(5_000, &session), Some(1));
    assert_eq!(stored_notes(dir.path())[0].text, "tick tock");
    assert_eq!(timer.tick(5_001, &session), None);
}

#[test]
fn reset_active_persists_without_waiting_for_flush() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let id = session.selected_id().unwrap();
    session.edit_title(id, "keep?").unwrap();
    session.edit_text(id, "content").unwrap();
    session.flush_all();

    session.reset_active().unwrap();
    let stored = stored_notes(dir.path());
    assert_eq!(stored[0].title, "");
    assert_eq!(stored[0].text, "");
    assert_eq!(stored[0].id, id);
}

#[test]
fn export_writes_raw_body_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let id = session.selected_id().unwrap();
    session.edit_title(id, "title is not exported").unwrap();
    session.edit_text(id, "line one\nline two").unwrap();

    let target = dir.path().join("export.txt");
    session.export_active(&target).unwrap();
    assert_eq!(std::fs::read_to_string(target).unwrap(), "line one\nline two");
}

#[test]
fn export_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let session = open(dir.path());
    let target = dir.path().join("missing-dir").join("out.txt");

    let err = session.export_active(&target).unwrap_err();
    assert!(matches!(err, SessionError::Export { ref path, .. } if *path == target));
}
