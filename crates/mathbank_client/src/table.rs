//! Result table rendering.
//!
//! # Responsibility
//! - Turn a page of problems into a row model the page can draw.
//!
//! # Invariants
//! - Pure function of its inputs; no requests, no shared state.
//! - Search mode carries no move actions, since rank reflects relevance
//!   rather than a reorderable sequence.

use crate::proxy::ProblemView;

/// Display mode the table was rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    List,
    Search,
}

/// Per-row action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    MoveUp,
    MoveDown,
    Edit,
    Trash,
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// One-based display rank: list position or search relevance rank.
    pub rank: usize,
    pub pid: i64,
    /// Decoded content markup, ready for injection into the content cell.
    pub content: String,
    pub keywords: Vec<String>,
    pub actions: Vec<RowAction>,
}

/// The rendered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    pub mode: TableMode,
    pub rows: Vec<TableRow>,
}

impl ResultTable {
    /// An empty list-mode table, the state before the first refresh.
    pub fn empty() -> Self {
        Self {
            mode: TableMode::List,
            rows: Vec::new(),
        }
    }

    /// Finds a rendered row by problem id.
    pub fn row(&self, pid: i64) -> Option<&TableRow> {
        self.rows.iter().find(|row| row.pid == pid)
    }
}

/// Renders one page of problems into the row model.
pub fn render_result_table(problems: &[ProblemView], mode: TableMode) -> ResultTable {
    let rows = problems
        .iter()
        .enumerate()
        .map(|(index, problem)| TableRow {
            rank: index + 1,
            pid: problem.pid,
            content: problem.content.clone(),
            keywords: problem.keywords.clone(),
            actions: row_actions(mode),
        })
        .collect();

    ResultTable { mode, rows }
}

fn row_actions(mode: TableMode) -> Vec<RowAction> {
    match mode {
        TableMode::List => vec![
            RowAction::MoveUp,
            RowAction::MoveDown,
            RowAction::Edit,
            RowAction::Trash,
        ],
        TableMode::Search => vec![RowAction::Edit, RowAction::Trash],
    }
}
