mod common;

use common::{logged_endpoints, request_param, LocalTransport};
use mathbank_client::{AppSession, Key};

fn type_text(session: &mut AppSession<LocalTransport>, text: &str) {
    for ch in text.chars() {
        session.edit_modal.keyword_input_mut().handle_key(Key::Char(ch));
    }
}

#[test]
fn compose_buffers_keywords_and_flushes_them_after_create() {
    let transport = LocalTransport::new();
    let log = transport.log_handle();
    let mut session = AppSession::new(transport);
    session.start().unwrap();

    session.begin_compose();
    assert_eq!(
        session.edit_modal.title().as_deref(),
        Some("Compose New Problem")
    );
    session.edit_modal.set_content("Find x.");

    type_text(&mut session, "algebra");
    session.edit_modal.keyword_input_mut().handle_key(Key::Comma);
    type_text(&mut session, "geometry");
    session.edit_modal.keyword_input_mut().handle_key(Key::Enter);

    // Compose mode keeps chips local; nothing went to the server yet.
    log.borrow_mut().clear();
    session.pump_edit_keywords().unwrap();
    assert!(log.borrow().is_empty());

    session.confirm_edit_modal().unwrap();
    assert!(!session.edit_modal.is_shown());

    // One create, then exactly one batched keyword add for the new pid.
    let endpoints = logged_endpoints(&log);
    assert_eq!(endpoints[0], "create");
    assert_eq!(endpoints[1], "keyword");
    let keyword_request = log.borrow()[1].clone();
    assert_eq!(request_param(&keyword_request, "action"), Some("add"));
    assert_eq!(
        request_param(&keyword_request, "keyword"),
        Some("algebra,geometry")
    );
    assert_eq!(request_param(&keyword_request, "pid"), Some("1"));

    let row = session.table().row(1).unwrap();
    assert_eq!(row.content, "Find x.");
    assert_eq!(
        row.keywords,
        vec!["algebra".to_string(), "geometry".to_string()]
    );
}

#[test]
fn compose_without_keywords_skips_the_keyword_request() {
    let transport = LocalTransport::new();
    let log = transport.log_handle();
    let mut session = AppSession::new(transport);
    session.start().unwrap();

    session.begin_compose();
    session.edit_modal.set_content("plain problem");
    log.borrow_mut().clear();
    session.confirm_edit_modal().unwrap();

    let endpoints = logged_endpoints(&log);
    assert!(endpoints.contains(&"create".to_string()));
    assert!(!endpoints.contains(&"keyword".to_string()));
}

#[test]
fn edit_mode_live_syncs_keyword_changes() {
    let transport = LocalTransport::new();
    let log = transport.log_handle();
    let mut session = AppSession::new(transport);
    let pid = session.proxy.create("host").unwrap();
    session.proxy.keyword_add(pid, &["old".to_string()]).unwrap();
    session.start().unwrap();

    assert!(session.begin_edit(pid));
    assert_eq!(
        session.edit_modal.title().as_deref(),
        Some("Editing Problem 1")
    );
    // Seeded chips do not replay as server-bound adds.
    log.borrow_mut().clear();
    session.pump_edit_keywords().unwrap();
    assert!(log.borrow().is_empty());

    type_text(&mut session, "fresh");
    session.edit_modal.keyword_input_mut().handle_key(Key::Enter);
    session.pump_edit_keywords().unwrap();

    let endpoints = logged_endpoints(&log);
    assert_eq!(endpoints.first().map(String::as_str), Some("keyword"));
    let add_request = log.borrow()[0].clone();
    assert_eq!(request_param(&add_request, "action"), Some("add"));
    assert_eq!(request_param(&add_request, "keyword"), Some("fresh"));

    log.borrow_mut().clear();
    session.edit_modal.keyword_input_mut().remove_keyword("old");
    session.pump_edit_keywords().unwrap();

    let remove_request = log.borrow()[0].clone();
    assert_eq!(request_param(&remove_request, "action"), Some("remove"));
    assert_eq!(request_param(&remove_request, "keyword"), Some("old"));

    // The live updates landed server-side.
    let row = session.table().row(pid).unwrap();
    assert_eq!(row.keywords, vec!["fresh".to_string()]);
}

#[test]
fn edit_confirm_updates_content_and_closes() {
    let mut session = AppSession::new(LocalTransport::new());
    let pid = session.proxy.create("before").unwrap();
    session.start().unwrap();

    session.begin_edit(pid);
    session.edit_modal.set_content("after");
    session.confirm_edit_modal().unwrap();

    assert!(!session.edit_modal.is_shown());
    assert_eq!(session.table().row(pid).unwrap().content, "after");
}

#[test]
fn failed_confirm_leaves_the_edit_modal_open() {
    let mut session = AppSession::new(LocalTransport::new());
    let pid = session.proxy.create("doomed").unwrap();
    session.start().unwrap();

    session.begin_edit(pid);
    session.edit_modal.set_content("never lands");

    // The problem vanishes behind the dialog's back; the update must fail
    // and the dialog must keep the user's text.
    session.proxy.trash_move(pid).unwrap();

    let err = session.confirm_edit_modal().unwrap_err();
    assert!(matches!(err, mathbank_client::ClientError::Api(_)));
    assert!(session.edit_modal.is_shown());
    assert_eq!(session.edit_modal.content(), "never lands");
}

#[test]
fn preview_falls_back_to_placeholder_for_empty_content() {
    let mut session = AppSession::new(LocalTransport::new());
    session.begin_compose();

    assert_eq!(
        session.edit_modal.preview(),
        "There is no content to display."
    );

    session.edit_modal.set_content("x^2 + 1");
    assert_eq!(session.edit_modal.preview(), "x^2 + 1");
}

#[test]
fn trash_modal_names_the_problem_and_refreshes_on_confirm() {
    let mut session = AppSession::new(LocalTransport::new());
    let pid = session.proxy.create("trash me").unwrap();
    session.start().unwrap();

    session.request_trash(pid);
    let message = session.trash_modal.message().unwrap();
    assert!(message.contains(&format!("problem {pid}")));
    assert!(message.contains("undo"));

    session.confirm_trash_modal().unwrap();
    assert!(!session.trash_modal.is_shown());
    assert!(session.table().row(pid).is_none());
    assert!(session.trash_buttons_visible());
}

#[test]
fn confirming_a_hidden_trash_modal_is_a_logged_noop() {
    let transport = LocalTransport::new();
    let log = transport.log_handle();
    let mut session = AppSession::new(transport);
    session.start().unwrap();

    log.borrow_mut().clear();
    session.confirm_trash_modal().unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn empty_trash_modal_names_the_count_and_purges_on_confirm() {
    let mut session = AppSession::new(LocalTransport::new());
    let keep = session.proxy.create("keep").unwrap();
    let toss = session.proxy.create("toss").unwrap();
    session.proxy.trash_move(toss).unwrap();
    session.start().unwrap();

    session.start_empty_trash().unwrap();
    let message = session.empty_trash_modal.message().unwrap();
    assert!(message.contains("empty 1 problems"));
    assert!(message.contains("cannot be undone"));

    session.confirm_empty_trash_modal().unwrap();
    assert!(!session.empty_trash_modal.is_shown());
    assert!(!session.trash_buttons_visible());
    assert!(session.table().row(keep).is_some());

    // Nothing left to restore once the trash is purged.
    assert!(session.undo_trash().is_err());
}
