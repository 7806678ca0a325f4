//! Tests for the authoring session: loading, flushing and failure handling.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use respond_query::{
    FileStore, MemoryStore, NO_SEED, QueryError, Session, SessionError, SharedSession,
    StylesheetStore,
};

const SHEET: &str = "@media only screen and (max-width: 600px) {\n\n\tbody {\n\t\tcolor: red;\n\t}\n\n}\n";

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("respond-session-{}-{name}", std::process::id()))
        .join("css")
        .join("media-queries.css")
}

#[test]
fn test_enter_creates_missing_stylesheet() {
    let (session, report) = Session::enter(MemoryStore::default()).unwrap();
    assert!(report.is_clean());
    assert!(session.manager().is_empty());
    assert_eq!(session.store().contents.as_deref(), Some(""));
    assert_eq!(session.store().writes, 1);
}

#[test]
fn test_enter_loads_existing_stylesheet() {
    let (session, report) = Session::enter(MemoryStore::with_contents(SHEET)).unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(session.manager().get(600).unwrap().rule("body", "color"), Some("red"));
    assert_eq!(session.store().writes, 0);
    assert!(session.manager().current().is_none());
}

#[test]
fn test_add_breakpoint_selects_and_flushes() {
    let (mut session, _) = Session::enter(MemoryStore::default()).unwrap();
    assert_eq!(session.add_breakpoint(600).unwrap().width(), 600);

    assert_eq!(session.manager().current_width(), Some(600));
    assert_eq!(
        session.store().contents.as_deref(),
        Some("@media only screen and (max-width: 600px) {\n\n}\n")
    );
}

#[test]
fn test_edit_rule_flushes_only_real_changes() {
    let (mut session, _) = Session::enter(MemoryStore::default()).unwrap();
    let _ = session.add_breakpoint(600).unwrap();
    let _ = session.edit_rule("body", "color: red;").unwrap();
    assert_eq!(session.store().contents.as_deref(), Some(SHEET));
    let writes = session.store().writes;

    assert!(!session.edit_rule("body", "color red").unwrap());
    assert_eq!(session.store().writes, writes);

    assert!(session.edit_rule("body", "color: red").unwrap());
    assert!(session.edit_rule("  body ", "color:red;;").unwrap());
    assert_eq!(session.store().writes, writes);

    assert!(session.edit_rule("body", "color: blue").unwrap());
    assert_eq!(session.store().writes, writes + 1);
}

#[test]
fn test_edit_rule_rejects_unwritable_selector() {
    let (mut session, _) = Session::enter(MemoryStore::default()).unwrap();
    let _ = session.add_breakpoint(600).unwrap();
    let writes = session.store().writes;

    assert!(!session.edit_rule("a } b", "color: red").unwrap());
    assert_eq!(session.store().writes, writes);
    assert!(session.manager().get(600).unwrap().selectors().next().is_none());
}

#[test]
fn test_edit_rule_without_selection() {
    let (mut session, _) = Session::enter(MemoryStore::with_contents(SHEET)).unwrap();
    assert!(matches!(
        session.edit_rule("body", "color: blue"),
        Err(SessionError::Query(QueryError::NoCurrentQuery))
    ));
}

#[test]
fn test_select_and_remove() {
    let (mut session, _) = Session::enter(MemoryStore::with_contents(SHEET)).unwrap();
    assert!(matches!(
        session.select(300),
        Err(SessionError::Query(QueryError::NotRegistered(300)))
    ));
    let writes = session.store().writes;
    let _ = session.select(600).unwrap();
    assert_eq!(session.store().writes, writes);

    let removed = session.remove_breakpoint(600).unwrap();
    assert_eq!(removed.rule("body", "color"), Some("red"));
    assert_eq!(session.manager().current_width(), None);
    assert_eq!(session.store().contents.as_deref(), Some(""));
}

#[test]
fn test_resolve_and_editor_for_current_breakpoint() {
    let (mut session, _) = Session::enter(MemoryStore::with_contents(SHEET)).unwrap();
    assert_eq!(session.resolve("body", NO_SEED), Err(QueryError::NoCurrentQuery));

    let _ = session.add_breakpoint(300).unwrap();
    let rules = session.resolve("body", NO_SEED).unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].value, "red");

    let editor = session.editor("body", NO_SEED).unwrap();
    assert_eq!(editor.contents, "body {\n\tcolor: red;\n}");
    assert_eq!(editor.highlights[0].width, 600);
}

#[test]
fn test_failed_write_keeps_model_and_sets_dirty() {
    let store = MemoryStore {
        fail_writes: true,
        ..MemoryStore::with_contents("")
    };
    let (mut session, _) = Session::enter(store).unwrap();

    assert!(matches!(
        session.add_breakpoint(600),
        Err(SessionError::Store(_))
    ));
    assert!(session.is_dirty());
    assert!(session.manager().contains(600));
    assert_eq!(session.manager().current_width(), Some(600));

    assert!(matches!(
        session.edit_rule("body", "color: red"),
        Err(SessionError::Store(_))
    ));
    assert_eq!(session.manager().get(600).unwrap().rule("body", "color"), Some("red"));
    assert_eq!(session.store().contents.as_deref(), Some(""));
}

#[test]
fn test_dirty_session_recovers_on_next_mutation() {
    let (mut session, _) = Session::enter(MemoryStore::default()).unwrap();
    let _ = session.add_breakpoint(600).unwrap();

    session.store_mut().fail_writes = true;
    assert!(session.edit_rule("body", "color: red").is_err());
    assert!(session.is_dirty());

    session.store_mut().fail_writes = false;
    assert!(session.edit_rule("body", "margin: 0").unwrap());
    assert!(!session.is_dirty());
    assert_eq!(
        session.store().contents.as_deref(),
        Some("@media only screen and (max-width: 600px) {\n\n\tbody {\n\t\tcolor: red;\n\t\tmargin: 0;\n\t}\n\n}\n")
    );
}

#[test]
fn test_exit_flushes_dirty_session() {
    let (mut session, _) = Session::enter(MemoryStore::default()).unwrap();
    let _ = session.add_breakpoint(600).unwrap();
    session.store_mut().fail_writes = true;
    assert!(session.edit_rule("body", "color: red").is_err());

    session.store_mut().fail_writes = false;
    let store = session.exit().unwrap();
    assert_eq!(store.contents.as_deref(), Some(SHEET));
}

#[test]
fn test_preview_receives_every_flush() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let (session, _) = Session::enter(MemoryStore::default()).unwrap();
    let mut session = session.with_preview(move |css| sink.borrow_mut().push(css.to_string()));

    let _ = session.add_breakpoint(600).unwrap();
    let _ = session.edit_rule("body", "color: red").unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1], SHEET);
}

#[test]
fn test_shared_session_rejects_reentrant_use() {
    let (session, _) = Session::enter(MemoryStore::default()).unwrap();
    let handle: Rc<RefCell<Option<SharedSession<MemoryStore>>>> = Rc::new(RefCell::new(None));
    let inner_results = Rc::new(RefCell::new(Vec::new()));

    let preview_handle = Rc::clone(&handle);
    let preview_results = Rc::clone(&inner_results);
    let shared = SharedSession::new(session.with_preview(move |_| {
        if let Some(shared) = preview_handle.borrow().as_ref() {
            let result = shared.with(|session| session.add_breakpoint(300).map(|_| ()));
            preview_results.borrow_mut().push(result);
        }
    }));
    *handle.borrow_mut() = Some(shared.clone());

    shared
        .with(|session| session.add_breakpoint(600).map(|_| ()))
        .unwrap();

    let results = inner_results.borrow();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(SessionError::Reentrant)));
    let widths = shared
        .read(|session| session.manager().widths().collect::<Vec<_>>())
        .unwrap();
    assert_eq!(widths, vec![600]);

    *handle.borrow_mut() = None;
}

#[test]
fn test_file_store_round_trip() {
    let path = temp_path("file-store");
    let root = path.parent().unwrap().parent().unwrap().to_path_buf();
    let _ = fs::remove_dir_all(&root);

    let mut store = FileStore::new(&path);
    assert!(store.read().unwrap().is_none());

    let (mut session, _) = Session::enter(store).unwrap();
    assert!(path.exists());
    let _ = session.add_breakpoint(600).unwrap();
    let _ = session.edit_rule("body", "color: red").unwrap();
    let mut store = session.exit().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), SHEET);
    assert_eq!(store.read().unwrap().as_deref(), Some(SHEET));
    assert_eq!(store.path(), path.as_path());

    fs::remove_dir_all(&root).unwrap();
}
