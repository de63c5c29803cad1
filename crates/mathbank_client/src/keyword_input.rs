//! Keyword chip-input control.
//!
//! # Responsibility
//! - Manage one text entry buffer plus an ordered list of committed
//!   keyword chips.
//! - Notify subscribers of keyword add/remove events.
//!
//! # State machine
//! Two states over the entry buffer: idle (empty) and composing
//! (non-empty). Enter, comma or focus loss while composing commit the
//! buffer as a chip. Backspace while idle removes the last chip. Space
//! while idle is swallowed so chips never start with whitespace.

use log::debug;

/// Key events the control reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Comma,
    Backspace,
    Space,
    Char(char),
}

/// Cancellation token for one event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle(u64);

/// Render model for the control: committed chips plus entry-box state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderModel {
    pub chips: Vec<String>,
    pub buffer: String,
    /// Placeholder text for the entry box; present only while no chips are
    /// committed.
    pub placeholder: Option<String>,
}

type Listener = Box<dyn FnMut(&str)>;

/// Chip-list editor over free-text keywords.
pub struct KeywordInput {
    keywords: Vec<String>,
    buffer: String,
    placeholder_text: String,
    add_listeners: Vec<(ListenerHandle, Listener)>,
    remove_listeners: Vec<(ListenerHandle, Listener)>,
    next_listener: u64,
    focused: bool,
    disposed: bool,
}

impl KeywordInput {
    pub fn new(placeholder_text: impl Into<String>) -> Self {
        Self {
            keywords: Vec::new(),
            buffer: String::new(),
            placeholder_text: placeholder_text.into(),
            add_listeners: Vec::new(),
            remove_listeners: Vec::new(),
            next_listener: 0,
            focused: false,
            disposed: false,
        }
    }

    /// Feeds one key event. Returns `true` when the control consumed the
    /// key and default text handling must be suppressed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if self.disposed {
            return false;
        }

        // Typed commas and spaces behave like their dedicated keys.
        let key = match key {
            Key::Char(',') => Key::Comma,
            Key::Char(' ') => Key::Space,
            other => other,
        };

        match key {
            Key::Enter | Key::Comma => {
                if !self.buffer.is_empty() {
                    self.commit_buffer();
                }
                true
            }
            Key::Backspace => {
                if self.buffer.is_empty() {
                    if !self.keywords.is_empty() {
                        let last = self.keywords.len() - 1;
                        self.remove_keyword_at(last);
                    }
                    return true;
                }
                let _ = self.buffer.pop();
                true
            }
            Key::Space => {
                if self.buffer.is_empty() {
                    // Swallow leading whitespace.
                    return true;
                }
                self.buffer.push(' ');
                true
            }
            Key::Char(ch) => {
                self.buffer.push(ch);
                true
            }
        }
    }

    /// Focus left the entry box; any pending text commits as a chip.
    pub fn blur(&mut self) {
        if self.disposed {
            return;
        }
        self.focused = false;
        if !self.buffer.is_empty() {
            self.commit_buffer();
        }
    }

    /// A click anywhere in the control area focuses the entry box.
    pub fn click_area(&mut self) {
        if self.disposed {
            return;
        }
        self.focused = true;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Returns whether the entry buffer holds uncommitted text.
    pub fn is_composing(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Commits a keyword directly, as if typed and confirmed.
    ///
    /// The value is normalized; blank or duplicate values are dropped.
    /// Returns `true` when a chip was added.
    pub fn add_keyword(&mut self, raw: &str) -> bool {
        let Some(keyword) = normalize_chip(raw) else {
            return false;
        };
        if self.keywords.contains(&keyword) {
            debug!("event=chip_duplicate module=keyword_input keyword={keyword}");
            return false;
        }

        self.keywords.push(keyword.clone());
        fire(&mut self.add_listeners, &keyword);
        true
    }

    /// Removes the chip at the given index, firing the remove event.
    pub fn remove_keyword_at(&mut self, index: usize) -> Option<String> {
        if index >= self.keywords.len() {
            return None;
        }
        let keyword = self.keywords.remove(index);
        fire(&mut self.remove_listeners, &keyword);
        Some(keyword)
    }

    /// Removes a chip by value, firing the remove event.
    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        match self.keywords.iter().position(|chip| chip == keyword) {
            Some(index) => self.remove_keyword_at(index).is_some(),
            None => false,
        }
    }

    /// Returns all committed chips in insertion order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Subscribes to keyword add events.
    pub fn on_keyword_add(&mut self, callback: impl FnMut(&str) + 'static) -> ListenerHandle {
        let handle = self.next_handle();
        self.add_listeners.push((handle, Box::new(callback)));
        handle
    }

    /// Subscribes to keyword remove events.
    pub fn on_keyword_remove(&mut self, callback: impl FnMut(&str) + 'static) -> ListenerHandle {
        let handle = self.next_handle();
        self.remove_listeners.push((handle, Box::new(callback)));
        handle
    }

    /// Cancels one subscription. Returns `false` for unknown handles.
    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        let before = self.add_listeners.len() + self.remove_listeners.len();
        self.add_listeners.retain(|(id, _)| *id != handle);
        self.remove_listeners.retain(|(id, _)| *id != handle);
        before != self.add_listeners.len() + self.remove_listeners.len()
    }

    /// Cancels every subscription.
    pub fn remove_all_listeners(&mut self) {
        self.add_listeners.clear();
        self.remove_listeners.clear();
    }

    /// Detaches all subscriptions and stops reacting to input. Required
    /// before an instance is replaced, so stale callbacks cannot leak.
    pub fn dispose(&mut self) {
        self.remove_all_listeners();
        self.buffer.clear();
        self.focused = false;
        self.disposed = true;
    }

    /// Produces the current render model.
    pub fn render(&self) -> RenderModel {
        RenderModel {
            chips: self.keywords.clone(),
            buffer: self.buffer.clone(),
            placeholder: if self.keywords.is_empty() {
                Some(self.placeholder_text.clone())
            } else {
                None
            },
        }
    }

    fn commit_buffer(&mut self) {
        let text = std::mem::take(&mut self.buffer);
        self.add_keyword(&text);
    }

    fn next_handle(&mut self) -> ListenerHandle {
        let handle = ListenerHandle(self.next_listener);
        self.next_listener += 1;
        handle
    }
}

fn fire(listeners: &mut [(ListenerHandle, Listener)], keyword: &str) {
    for (_, callback) in listeners.iter_mut() {
        callback(keyword);
    }
}

/// Normalizes one chip value: trimmed, single-spaced, lowercased.
///
/// Matches the server-side keyword contract, so a live-synced chip always
/// names the association the server actually stores.
fn normalize_chip(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}
