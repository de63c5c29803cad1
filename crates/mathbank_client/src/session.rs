//! Application session: the page's view-model.
//!
//! # Responsibility
//! - Own the proxy, the result table, the search control and the modal
//!   controllers, and coordinate them per user action.
//! - Run the refresh flow: trash count, then list or search, then render.
//!
//! # Invariants
//! - A failed action is logged and leaves every view field as it was; no
//!   partial application.
//! - One successful user action drives exactly one table refresh.

use crate::keyword_input::KeywordInput;
use crate::modal::{EditModal, EmptyTrashModal, TrashModal};
use crate::proxy::{ApiProxy, ClientError, MoveDir, ProblemView};
use crate::table::{render_result_table, ResultTable, TableMode};
use crate::transport::Transport;
use log::{error, info};

const DEFAULT_PAGE_SIZE: u32 = 10;
const SEARCH_PLACEHOLDER: &str = "Keyword search";

/// What the result table currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    List { page_num: u32, page_size: u32 },
    Search { keywords: Vec<String> },
}

impl ViewMode {
    fn first_page() -> Self {
        Self::List {
            page_num: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Session state for one open page.
pub struct AppSession<T: Transport> {
    pub proxy: ApiProxy<T>,
    pub search_input: KeywordInput,
    pub edit_modal: EditModal,
    pub trash_modal: TrashModal,
    pub empty_trash_modal: EmptyTrashModal,
    mode: ViewMode,
    table: ResultTable,
    trash_buttons_visible: bool,
}

impl<T: Transport> AppSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            proxy: ApiProxy::new(transport),
            search_input: KeywordInput::new(SEARCH_PLACEHOLDER),
            edit_modal: EditModal::new(),
            trash_modal: TrashModal::new(),
            empty_trash_modal: EmptyTrashModal::new(),
            mode: ViewMode::first_page(),
            table: ResultTable::empty(),
            trash_buttons_visible: false,
        }
    }

    /// Page load: draw the first page of problems.
    pub fn start(&mut self) -> Result<(), ClientError> {
        info!("event=session_start module=session status=ok");
        self.refresh_result_table()
    }

    /// The rendered result table.
    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    /// Whether the undo/empty trash buttons are visible.
    pub fn trash_buttons_visible(&self) -> bool {
        self.trash_buttons_visible
    }

    pub fn view_mode(&self) -> &ViewMode {
        &self.mode
    }

    /// Re-fetches trash count and the current view, then re-renders.
    ///
    /// All requests complete before any view field changes, so a failure
    /// leaves the previous rendering in place.
    pub fn refresh_result_table(&mut self) -> Result<(), ClientError> {
        match self.fetch_view() {
            Ok((trash_count, problems, mode)) => {
                self.trash_buttons_visible = trash_count > 0;
                self.table = render_result_table(&problems, mode);
                Ok(())
            }
            Err(err) => {
                error!("event=table_refresh module=session status=error error={err}");
                Err(err)
            }
        }
    }

    /// Opens the edit dialog in compose mode.
    pub fn begin_compose(&mut self) {
        self.edit_modal.show_compose();
    }

    /// Opens the edit dialog for a rendered problem.
    ///
    /// Returns `false` when the problem is not in the current table.
    pub fn begin_edit(&mut self, pid: i64) -> bool {
        let Some(row) = self.table.row(pid) else {
            error!("event=edit_open module=session status=error detail=row_missing pid={pid}");
            return false;
        };
        let content = row.content.clone();
        let keywords = row.keywords.clone();
        self.edit_modal.show_edit(pid, &content, &keywords);
        true
    }

    /// Confirms the edit dialog and refreshes the table on success.
    pub fn confirm_edit_modal(&mut self) -> Result<(), ClientError> {
        match self.edit_modal.confirm(&mut self.proxy) {
            Ok(true) => self.refresh_result_table(),
            Ok(false) => Ok(()),
            Err(err) => {
                error!("event=edit_confirm module=session status=error error={err}");
                Err(err)
            }
        }
    }

    /// Delivers buffered live keyword changes from the edit dialog and
    /// refreshes the table when anything was sent.
    pub fn pump_edit_keywords(&mut self) -> Result<(), ClientError> {
        if self.edit_modal.sync_keywords(&mut self.proxy) {
            return self.refresh_result_table();
        }
        Ok(())
    }

    /// Opens the trash confirmation dialog for one problem.
    pub fn request_trash(&mut self, pid: i64) {
        self.trash_modal.show(pid);
    }

    /// Confirms the trash dialog and refreshes the table on success.
    pub fn confirm_trash_modal(&mut self) -> Result<(), ClientError> {
        match self.trash_modal.confirm(&mut self.proxy) {
            Ok(true) => self.refresh_result_table(),
            Ok(false) => Ok(()),
            Err(err) => {
                error!("event=trash_confirm module=session status=error error={err}");
                Err(err)
            }
        }
    }

    /// Begins the empty-trash flow: fetch the count, then show the dialog.
    pub fn start_empty_trash(&mut self) -> Result<(), ClientError> {
        match self.proxy.trash_count() {
            Ok(count) => {
                self.empty_trash_modal.show(count);
                Ok(())
            }
            Err(err) => {
                error!("event=empty_trash_open module=session status=error error={err}");
                Err(err)
            }
        }
    }

    /// Confirms the empty-trash dialog and refreshes on success.
    pub fn confirm_empty_trash_modal(&mut self) -> Result<(), ClientError> {
        match self.empty_trash_modal.confirm(&mut self.proxy) {
            Ok(true) => self.refresh_result_table(),
            Ok(false) => Ok(()),
            Err(err) => {
                error!("event=empty_trash_confirm module=session status=error error={err}");
                Err(err)
            }
        }
    }

    /// Restores the most recently trashed problem.
    pub fn undo_trash(&mut self) -> Result<(), ClientError> {
        match self.proxy.trash_undo() {
            Ok(()) => self.refresh_result_table(),
            Err(err) => {
                error!("event=trash_undo module=session status=error error={err}");
                Err(err)
            }
        }
    }

    /// Moves a problem one step and refreshes the table.
    pub fn move_problem(&mut self, pid: i64, dir: MoveDir) -> Result<(), ClientError> {
        match self.proxy.move_problem(pid, dir) {
            Ok(()) => self.refresh_result_table(),
            Err(err) => {
                error!("event=move module=session status=error pid={pid} error={err}");
                Err(err)
            }
        }
    }

    /// Commits the search control and switches the table to search mode.
    /// An empty chip set falls back to the plain list.
    pub fn commit_search(&mut self) -> Result<(), ClientError> {
        self.search_input.blur();
        let keywords = self.search_input.keywords().to_vec();
        let mode = if keywords.is_empty() {
            ViewMode::first_page()
        } else {
            ViewMode::Search { keywords }
        };
        self.switch_mode(mode)
    }

    /// Leaves search mode and shows the first list page.
    pub fn show_all(&mut self) -> Result<(), ClientError> {
        self.switch_mode(ViewMode::first_page())
    }

    /// Jumps to a list page, keeping the current page size.
    pub fn goto_page(&mut self, page_num: u32) -> Result<(), ClientError> {
        let page_size = match self.mode {
            ViewMode::List { page_size, .. } => page_size,
            ViewMode::Search { .. } => DEFAULT_PAGE_SIZE,
        };
        self.switch_mode(ViewMode::List {
            page_num: page_num.max(1),
            page_size,
        })
    }

    fn switch_mode(&mut self, mode: ViewMode) -> Result<(), ClientError> {
        let previous = std::mem::replace(&mut self.mode, mode);
        if let Err(err) = self.refresh_result_table() {
            self.mode = previous;
            return Err(err);
        }
        Ok(())
    }

    fn fetch_view(&mut self) -> Result<(u32, Vec<ProblemView>, TableMode), ClientError> {
        let trash_count = self.proxy.trash_count()?;
        match self.mode.clone() {
            ViewMode::List {
                page_num,
                page_size,
            } => {
                let problems = self.proxy.list(page_num, page_size)?;
                Ok((trash_count, problems, TableMode::List))
            }
            ViewMode::Search { keywords } => {
                let problems = self.proxy.search(&keywords)?;
                Ok((trash_count, problems, TableMode::Search))
            }
        }
    }
}
