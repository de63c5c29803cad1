//! Modal dialog controllers.
//!
//! # Responsibility
//! - Hold the state of the edit, trash and empty-trash dialogs as explicit
//!   objects instead of page-global variables.
//! - Drive the API proxy from dialog confirmations.
//!
//! # Invariants
//! - A failed confirmation leaves the dialog open with its state intact.
//! - Compose mode buffers keyword chips locally and flushes them in one
//!   batched request after the create call succeeds.
//! - Edit mode live-syncs every keyword change to the server.

use crate::keyword_input::KeywordInput;
use crate::proxy::{ApiProxy, ClientError};
use crate::transport::Transport;
use log::error;
use std::cell::RefCell;
use std::rc::Rc;

const KEYWORD_PLACEHOLDER: &str = "Keywords";
const NO_CONTENT_PLACEHOLDER: &str = "There is no content to display.";

/// Edit dialog mode: composing a new problem or editing an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Compose,
    Edit(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeywordChange {
    Added(String),
    Removed(String),
}

/// Controller for the edit/compose dialog.
pub struct EditModal {
    mode: Option<EditMode>,
    content: String,
    keyword_input: KeywordInput,
    pending: Rc<RefCell<Vec<KeywordChange>>>,
}

impl Default for EditModal {
    fn default() -> Self {
        Self::new()
    }
}

impl EditModal {
    pub fn new() -> Self {
        Self {
            mode: None,
            content: String::new(),
            keyword_input: KeywordInput::new(KEYWORD_PLACEHOLDER),
            pending: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Opens the dialog for an existing problem, seeded with its current
    /// content and keywords. Keyword changes made while open are synced to
    /// the server as they happen.
    pub fn show_edit(&mut self, pid: i64, content: &str, keywords: &[String]) {
        self.reset_input();

        // Seed chips before wiring listeners, so pre-existing keywords do
        // not replay as server-bound add events.
        for keyword in keywords {
            self.keyword_input.add_keyword(keyword);
        }

        let added = Rc::clone(&self.pending);
        self.keyword_input.on_keyword_add(move |keyword| {
            added
                .borrow_mut()
                .push(KeywordChange::Added(keyword.to_string()));
        });
        let removed = Rc::clone(&self.pending);
        self.keyword_input.on_keyword_remove(move |keyword| {
            removed
                .borrow_mut()
                .push(KeywordChange::Removed(keyword.to_string()));
        });

        self.mode = Some(EditMode::Edit(pid));
        self.content = content.to_string();
    }

    /// Opens the dialog in compose mode with empty content and no chips.
    /// Keyword chips are buffered locally until the create call succeeds.
    pub fn show_compose(&mut self) {
        self.reset_input();
        self.mode = Some(EditMode::Compose);
        self.content = String::new();
    }

    pub fn is_shown(&self) -> bool {
        self.mode.is_some()
    }

    pub fn mode(&self) -> Option<EditMode> {
        self.mode
    }

    /// Dialog title, when shown.
    pub fn title(&self) -> Option<String> {
        match self.mode {
            Some(EditMode::Compose) => Some("Compose New Problem".to_string()),
            Some(EditMode::Edit(pid)) => Some(format!("Editing Problem {pid}")),
            None => None,
        }
    }

    /// Replaces the content buffer from the input area.
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Text for the rendered preview pane.
    pub fn preview(&self) -> &str {
        if self.content.is_empty() {
            NO_CONTENT_PLACEHOLDER
        } else {
            &self.content
        }
    }

    /// The embedded keyword control, for feeding key and chip events.
    pub fn keyword_input_mut(&mut self) -> &mut KeywordInput {
        &mut self.keyword_input
    }

    pub fn keyword_input(&self) -> &KeywordInput {
        &self.keyword_input
    }

    /// Pushes buffered keyword changes to the server.
    ///
    /// Only edit mode produces changes; compose mode keeps its chips local
    /// until confirmation. Failures are logged and skipped, the way the
    /// page logs and carries on. Returns whether any change was attempted,
    /// which is the caller's cue to refresh the table.
    pub fn sync_keywords<T: Transport>(&mut self, proxy: &mut ApiProxy<T>) -> bool {
        let Some(EditMode::Edit(pid)) = self.mode else {
            return false;
        };

        let changes: Vec<KeywordChange> = self.pending.borrow_mut().drain(..).collect();
        if changes.is_empty() {
            return false;
        }

        for change in &changes {
            let outcome = match change {
                KeywordChange::Added(keyword) => {
                    proxy.keyword_add(pid, std::slice::from_ref(keyword))
                }
                KeywordChange::Removed(keyword) => proxy.keyword_remove(pid, keyword),
            };
            if let Err(err) = outcome {
                error!("event=keyword_sync module=modal status=error pid={pid} error={err}");
            }
        }

        true
    }

    /// Confirms the dialog.
    ///
    /// Compose mode: create the problem, then flush buffered chips in one
    /// batched keyword request. Edit mode: update the problem content. The
    /// dialog closes only when every request succeeded; on error the state
    /// stays as the user left it. Returns whether the table needs a
    /// refresh.
    pub fn confirm<T: Transport>(
        &mut self,
        proxy: &mut ApiProxy<T>,
    ) -> Result<bool, ClientError> {
        let Some(mode) = self.mode else {
            error!("event=modal_confirm module=modal status=error detail=edit_modal_not_shown");
            return Ok(false);
        };

        // Confirming steals focus from the entry box; pending text commits
        // as a final chip first.
        self.keyword_input.blur();
        self.sync_keywords(proxy);

        match mode {
            EditMode::Compose => {
                let pid = proxy.create(&self.content)?;
                let keywords = self.keyword_input.keywords().to_vec();
                if !keywords.is_empty() {
                    proxy.keyword_add(pid, &keywords)?;
                }
            }
            EditMode::Edit(pid) => {
                proxy.update(pid, &self.content)?;
            }
        }

        self.hide();
        Ok(true)
    }

    /// Closes the dialog without touching the server.
    pub fn cancel(&mut self) {
        self.hide();
    }

    fn hide(&mut self) {
        self.mode = None;
        self.content.clear();
        self.reset_input();
    }

    fn reset_input(&mut self) {
        self.keyword_input.dispose();
        self.keyword_input = KeywordInput::new(KEYWORD_PLACEHOLDER);
        self.pending = Rc::new(RefCell::new(Vec::new()));
    }
}

/// Controller for the move-to-trash confirmation dialog.
#[derive(Debug, Default)]
pub struct TrashModal {
    outstanding: Option<i64>,
}

impl TrashModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, pid: i64) {
        self.outstanding = Some(pid);
    }

    pub fn is_shown(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Confirmation message naming the targeted problem.
    pub fn message(&self) -> Option<String> {
        self.outstanding.map(|pid| {
            format!(
                "Are you sure you want to move problem {pid} to the trash? \
                 You can undo this action later."
            )
        })
    }

    /// Confirms the dialog; closes it only when the trash request
    /// succeeded. Returns whether the table needs a refresh.
    pub fn confirm<T: Transport>(
        &mut self,
        proxy: &mut ApiProxy<T>,
    ) -> Result<bool, ClientError> {
        let Some(pid) = self.outstanding else {
            error!("event=modal_confirm module=modal status=error detail=trash_modal_not_shown");
            return Ok(false);
        };

        proxy.trash_move(pid)?;
        self.outstanding = None;
        Ok(true)
    }

    pub fn cancel(&mut self) {
        self.outstanding = None;
    }
}

/// Controller for the empty-trash confirmation dialog.
#[derive(Debug, Default)]
pub struct EmptyTrashModal {
    pending_count: Option<u32>,
}

impl EmptyTrashModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the dialog, remembering the trashed-problem count to display.
    pub fn show(&mut self, count: u32) {
        self.pending_count = Some(count);
    }

    pub fn is_shown(&self) -> bool {
        self.pending_count.is_some()
    }

    /// Confirmation message naming the number of problems to purge.
    pub fn message(&self) -> Option<String> {
        self.pending_count.map(|count| {
            format!(
                "Are you sure you want to empty {count} problems from the trash? \
                 This cannot be undone."
            )
        })
    }

    /// Confirms the dialog; closes it only when the purge succeeded.
    /// Returns whether the table needs a refresh.
    pub fn confirm<T: Transport>(
        &mut self,
        proxy: &mut ApiProxy<T>,
    ) -> Result<bool, ClientError> {
        if self.pending_count.is_none() {
            error!(
                "event=modal_confirm module=modal status=error detail=empty_trash_modal_not_shown"
            );
            return Ok(false);
        }

        proxy.trash_empty()?;
        self.pending_count = None;
        Ok(true)
    }

    pub fn cancel(&mut self) {
        self.pending_count = None;
    }
}
