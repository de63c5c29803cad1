use mathbank_client::{Key, KeywordInput};
use std::cell::RefCell;
use std::rc::Rc;

fn type_text(input: &mut KeywordInput, text: &str) {
    for ch in text.chars() {
        input.handle_key(Key::Char(ch));
    }
}

#[test]
fn enter_commits_typed_text_as_a_chip() {
    let mut input = KeywordInput::new("Keywords");

    type_text(&mut input, "algebra");
    assert!(input.is_composing());

    assert!(input.handle_key(Key::Enter));
    assert_eq!(input.keywords(), ["algebra".to_string()]);
    assert!(!input.is_composing());
}

#[test]
fn comma_commits_like_enter() {
    let mut input = KeywordInput::new("Keywords");

    type_text(&mut input, "triangle");
    input.handle_key(Key::Comma);
    assert_eq!(input.keywords(), ["triangle".to_string()]);
}

#[test]
fn typed_comma_character_also_commits() {
    let mut input = KeywordInput::new("Keywords");

    type_text(&mut input, "geometry");
    input.handle_key(Key::Char(','));
    assert_eq!(input.keywords(), ["geometry".to_string()]);
}

#[test]
fn blur_commits_pending_text() {
    let mut input = KeywordInput::new("Keywords");

    type_text(&mut input, "calculus");
    input.blur();
    assert_eq!(input.keywords(), ["calculus".to_string()]);
}

#[test]
fn enter_with_empty_buffer_adds_nothing() {
    let mut input = KeywordInput::new("Keywords");

    assert!(input.handle_key(Key::Enter));
    input.blur();
    assert!(input.keywords().is_empty());
}

#[test]
fn space_is_swallowed_while_idle_but_typed_while_composing() {
    let mut input = KeywordInput::new("Keywords");

    // Leading whitespace never reaches the buffer.
    input.handle_key(Key::Space);
    assert!(!input.is_composing());

    type_text(&mut input, "right");
    input.handle_key(Key::Space);
    type_text(&mut input, "triangle");
    input.handle_key(Key::Enter);

    assert_eq!(input.keywords(), ["right triangle".to_string()]);
}

#[test]
fn backspace_while_idle_removes_the_last_chip() {
    let mut input = KeywordInput::new("Keywords");
    input.add_keyword("first");
    input.add_keyword("second");

    input.handle_key(Key::Backspace);
    assert_eq!(input.keywords(), ["first".to_string()]);
}

#[test]
fn backspace_while_composing_edits_the_buffer_not_the_chips() {
    let mut input = KeywordInput::new("Keywords");
    input.add_keyword("kept");

    type_text(&mut input, "ab");
    input.handle_key(Key::Backspace);
    input.handle_key(Key::Enter);

    assert_eq!(input.keywords(), ["kept".to_string(), "a".to_string()]);
}

#[test]
fn committed_chips_are_normalized_and_deduplicated() {
    let mut input = KeywordInput::new("Keywords");

    assert!(input.add_keyword("  Right   Triangle "));
    assert!(!input.add_keyword("right triangle"));
    assert!(!input.add_keyword("   "));

    assert_eq!(input.keywords(), ["right triangle".to_string()]);
}

#[test]
fn placeholder_shows_only_while_no_chips_are_committed() {
    let mut input = KeywordInput::new("Keyword search");

    assert_eq!(
        input.render().placeholder.as_deref(),
        Some("Keyword search")
    );

    input.add_keyword("algebra");
    assert_eq!(input.render().placeholder, None);

    input.remove_keyword("algebra");
    assert_eq!(
        input.render().placeholder.as_deref(),
        Some("Keyword search")
    );
}

#[test]
fn click_in_control_area_focuses_the_entry_box() {
    let mut input = KeywordInput::new("Keywords");
    assert!(!input.is_focused());

    input.click_area();
    assert!(input.is_focused());

    input.blur();
    assert!(!input.is_focused());
}

#[test]
fn add_and_remove_events_reach_subscribers() {
    let mut input = KeywordInput::new("Keywords");
    let added: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let removed: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    let added_log = Rc::clone(&added);
    input.on_keyword_add(move |keyword| added_log.borrow_mut().push(keyword.to_string()));
    let removed_log = Rc::clone(&removed);
    input.on_keyword_remove(move |keyword| removed_log.borrow_mut().push(keyword.to_string()));

    type_text(&mut input, "algebra");
    input.handle_key(Key::Enter);
    input.add_keyword("geometry");
    input.remove_keyword("algebra");
    input.handle_key(Key::Backspace);

    assert_eq!(
        *added.borrow(),
        vec!["algebra".to_string(), "geometry".to_string()]
    );
    assert_eq!(
        *removed.borrow(),
        vec!["algebra".to_string(), "geometry".to_string()]
    );
}

#[test]
fn cancelled_subscription_stops_receiving_events() {
    let mut input = KeywordInput::new("Keywords");
    let added: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    let added_log = Rc::clone(&added);
    let handle = input.on_keyword_add(move |keyword| {
        added_log.borrow_mut().push(keyword.to_string());
    });

    input.add_keyword("before");
    assert!(input.remove_listener(handle));
    input.add_keyword("after");

    assert_eq!(*added.borrow(), vec!["before".to_string()]);
    assert!(!input.remove_listener(handle));
}

#[test]
fn dispose_detaches_listeners_and_ignores_further_input() {
    let mut input = KeywordInput::new("Keywords");
    let added: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    let added_log = Rc::clone(&added);
    input.on_keyword_add(move |keyword| added_log.borrow_mut().push(keyword.to_string()));

    input.dispose();
    type_text(&mut input, "ghost");
    input.handle_key(Key::Enter);
    input.blur();

    assert!(input.keywords().is_empty());
    assert!(added.borrow().is_empty());
}

#[test]
fn remove_by_index_returns_the_removed_chip() {
    let mut input = KeywordInput::new("Keywords");
    input.add_keyword("a");
    input.add_keyword("b");

    assert_eq!(input.remove_keyword_at(0), Some("a".to_string()));
    assert_eq!(input.remove_keyword_at(7), None);
    assert_eq!(input.keywords(), ["b".to_string()]);
}
