//! Problem repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD, ordering and trash APIs over `problems` storage.
//! - Own keyword-link mutations with atomic semantics.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Active ordinals stay unique at every commit point; swaps go through a
//!   sentinel so the partial unique index never sees two rows on one slot.
//! - New problems append above the global ordinal maximum, trashed rows
//!   included, so a restored problem never collides with a newer one.
//! - The undo slot always refers to the most recently trashed problem or
//!   nothing.

use crate::db::DbError;
use crate::model::problem::{MoveDirection, Problem, ProblemId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

// Epoch-milliseconds clock expression shared by all write paths.
const NOW_MS: &str = "(strftime('%s', 'now') * 1000)";

/// Sentinel parked ordinal used while two rows exchange positions.
const ORDINAL_SWAP_SENTINEL: i64 = -1;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for problem persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ProblemId),
    EmptyUndo,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(pid) => write!(f, "problem not found: {pid}"),
            Self::EmptyUndo => write!(f, "nothing to restore from the trash"),
            Self::InvalidData(message) => write!(f, "invalid persisted problem data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{column}` in table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read model for problem list/detail use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemRecord {
    /// Stable problem id.
    pub pid: ProblemId,
    /// Raw source markup.
    pub content: String,
    /// Position within the active ordering.
    pub ordinal: i64,
    /// Update timestamp in epoch milliseconds.
    pub updated_at: i64,
    /// Attached keywords, normalized to lowercase and sorted by name.
    pub keywords: Vec<String>,
}

/// Query options for problem list use-cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemListQuery {
    /// Maximum rows to return. `None` lets the service contract decide.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for the problem store.
pub trait ProblemRepository {
    /// Inserts a new problem at the end of the active order.
    fn create_problem(&mut self, content: &str) -> RepoResult<ProblemId>;
    /// Replaces the content of an active problem.
    fn update_problem(&self, pid: ProblemId, content: &str) -> RepoResult<()>;
    /// Gets one active problem by id.
    fn get_problem(&self, pid: ProblemId) -> RepoResult<Option<ProblemRecord>>;
    /// Gets one problem row regardless of trash state.
    fn get_problem_any(&self, pid: ProblemId) -> RepoResult<Option<Problem>>;
    /// Lists active problems by ordinal ascending with pagination.
    fn list_problems(&self, query: &ProblemListQuery) -> RepoResult<Vec<ProblemRecord>>;
    /// Swaps an active problem with its neighbor in the given direction.
    /// No-op at either boundary of the list.
    fn move_problem(&mut self, pid: ProblemId, direction: MoveDirection) -> RepoResult<()>;
    /// Moves an active problem to the trash and records it in the undo slot.
    fn trash_problem(&mut self, pid: ProblemId) -> RepoResult<()>;
    /// Restores the most recently trashed problem.
    fn untrash_last(&mut self) -> RepoResult<ProblemId>;
    /// Permanently removes all trashed problems. Returns the removed count.
    fn empty_trash(&mut self) -> RepoResult<u32>;
    /// Counts problems currently in the trash.
    fn trash_count(&self) -> RepoResult<u32>;
    /// Attaches keywords to an active problem. Existing links are kept as-is.
    fn add_keywords(&mut self, pid: ProblemId, keywords: &[String]) -> RepoResult<()>;
    /// Detaches keywords from an active problem. Missing links are ignored.
    fn remove_keywords(&mut self, pid: ProblemId, keywords: &[String]) -> RepoResult<()>;
    /// Returns known keyword names with the given prefix, sorted by name.
    fn list_keywords(&self, prefix: Option<&str>, limit: u32) -> RepoResult<Vec<String>>;
}

/// SQLite-backed problem repository.
pub struct SqliteProblemRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteProblemRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProblemRepository for SqliteProblemRepository<'_> {
    fn create_problem(&mut self, content: &str) -> RepoResult<ProblemId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // The maximum is taken over trashed rows too, so a trashed ordinal
        // slot is never handed out again before the trash is emptied.
        let next_ordinal: i64 = tx.query_row(
            "SELECT COALESCE(MAX(ordinal), 0) + 1 FROM problems;",
            [],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO problems (content, ordinal) VALUES (?1, ?2);",
            params![content, next_ordinal],
        )?;
        let pid = tx.last_insert_rowid();
        tx.commit()?;

        Ok(pid)
    }

    fn update_problem(&self, pid: ProblemId, content: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE problems
                 SET content = ?2, updated_at = {NOW_MS}
                 WHERE pid = ?1 AND trashed = 0;"
            ),
            params![pid, content],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(pid));
        }

        Ok(())
    }

    fn get_problem(&self, pid: ProblemId) -> RepoResult<Option<ProblemRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT pid, content, ordinal, updated_at
             FROM problems
             WHERE pid = ?1 AND trashed = 0;",
        )?;

        let mut rows = stmt.query([pid])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_problem_row(self.conn, row)?));
        }

        Ok(None)
    }

    fn get_problem_any(&self, pid: ProblemId) -> RepoResult<Option<Problem>> {
        let mut stmt = self.conn.prepare(
            "SELECT pid, content, ordinal, trashed, trashed_at
             FROM problems
             WHERE pid = ?1;",
        )?;

        let mut rows = stmt.query([pid])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let trashed = match row.get::<_, i64>("trashed")? {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid trashed value `{other}` in problems.trashed"
                )));
            }
        };

        Ok(Some(Problem {
            pid: row.get("pid")?,
            content: row.get("content")?,
            ordinal: row.get("ordinal")?,
            trashed,
            trashed_at: row.get("trashed_at")?,
        }))
    }

    fn list_problems(&self, query: &ProblemListQuery) -> RepoResult<Vec<ProblemRecord>> {
        let mut sql = String::from(
            "SELECT pid, content, ordinal, updated_at
             FROM problems
             WHERE trashed = 0
             ORDER BY ordinal ASC",
        );

        if query.limit.is_some() {
            sql.push_str(" LIMIT ?1 OFFSET ?2");
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?1");
        }
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match query.limit {
            Some(limit) => stmt.query(params![i64::from(limit), i64::from(query.offset)])?,
            None if query.offset > 0 => stmt.query(params![i64::from(query.offset)])?,
            None => stmt.query([])?,
        };

        let mut problems = Vec::new();
        while let Some(row) = rows.next()? {
            problems.push(parse_problem_row(self.conn, row)?);
        }

        Ok(problems)
    }

    fn move_problem(&mut self, pid: ProblemId, direction: MoveDirection) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(ordinal) = active_ordinal_in_tx(&tx, pid)? else {
            return Err(RepoError::NotFound(pid));
        };

        let neighbor_sql = match direction {
            MoveDirection::Up => {
                "SELECT pid, ordinal FROM problems
                 WHERE trashed = 0 AND ordinal < ?1
                 ORDER BY ordinal DESC LIMIT 1;"
            }
            MoveDirection::Down => {
                "SELECT pid, ordinal FROM problems
                 WHERE trashed = 0 AND ordinal > ?1
                 ORDER BY ordinal ASC LIMIT 1;"
            }
        };

        let neighbor: Option<(ProblemId, i64)> = {
            let mut stmt = tx.prepare(neighbor_sql)?;
            let mut rows = stmt.query([ordinal])?;
            match rows.next()? {
                Some(row) => Some((row.get(0)?, row.get(1)?)),
                None => None,
            }
        };

        // At the top or bottom of the list there is nothing to swap with.
        let Some((neighbor_pid, neighbor_ordinal)) = neighbor else {
            tx.commit()?;
            return Ok(());
        };

        tx.execute(
            "UPDATE problems SET ordinal = ?2 WHERE pid = ?1;",
            params![pid, ORDINAL_SWAP_SENTINEL],
        )?;
        tx.execute(
            "UPDATE problems SET ordinal = ?2 WHERE pid = ?1;",
            params![neighbor_pid, ordinal],
        )?;
        tx.execute(
            "UPDATE problems SET ordinal = ?2 WHERE pid = ?1;",
            params![pid, neighbor_ordinal],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn trash_problem(&mut self, pid: ProblemId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            &format!(
                "UPDATE problems
                 SET trashed = 1,
                     trashed_at = {NOW_MS},
                     updated_at = {NOW_MS}
                 WHERE pid = ?1 AND trashed = 0;"
            ),
            [pid],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(pid));
        }

        tx.execute("UPDATE trash_undo SET pid = ?1 WHERE slot = 1;", [pid])?;
        tx.commit()?;

        Ok(())
    }

    fn untrash_last(&mut self) -> RepoResult<ProblemId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let slot: Option<ProblemId> =
            tx.query_row("SELECT pid FROM trash_undo WHERE slot = 1;", [], |row| {
                row.get(0)
            })?;

        let Some(pid) = slot else {
            return Err(RepoError::EmptyUndo);
        };

        let changed = tx.execute(
            &format!(
                "UPDATE problems
                 SET trashed = 0,
                     trashed_at = NULL,
                     updated_at = {NOW_MS}
                 WHERE pid = ?1 AND trashed = 1;"
            ),
            [pid],
        )?;

        // One-shot undo: the slot is consumed whether or not the row was
        // still restorable.
        tx.execute("UPDATE trash_undo SET pid = NULL WHERE slot = 1;", [])?;

        if changed == 0 {
            tx.commit()?;
            return Err(RepoError::NotFound(pid));
        }

        tx.commit()?;
        Ok(pid)
    }

    fn empty_trash(&mut self) -> RepoResult<u32> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = tx.execute("DELETE FROM problems WHERE trashed = 1;", [])?;
        prune_orphan_keywords_in_tx(&tx)?;
        tx.execute("UPDATE trash_undo SET pid = NULL WHERE slot = 1;", [])?;

        // Renumber the survivors densely from 1. Two passes keep the partial
        // unique index satisfied at every row visited.
        tx.execute("UPDATE problems SET ordinal = -ordinal WHERE trashed = 0;", [])?;
        tx.execute(
            "UPDATE problems
             SET ordinal = (
                 SELECT COUNT(*)
                 FROM problems p2
                 WHERE p2.trashed = 0 AND p2.ordinal >= problems.ordinal
             )
             WHERE trashed = 0;",
            [],
        )?;

        tx.commit()?;
        count_to_u32(removed as i64)
    }

    fn trash_count(&self) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM problems WHERE trashed = 1;",
            [],
            |row| row.get(0),
        )?;
        count_to_u32(count)
    }

    fn add_keywords(&mut self, pid: ProblemId, keywords: &[String]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !active_problem_exists_in_tx(&tx, pid)? {
            return Err(RepoError::NotFound(pid));
        }

        for keyword in keywords {
            tx.execute(
                "INSERT OR IGNORE INTO keywords (name) VALUES (?1);",
                [keyword.as_str()],
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO problem_keywords (problem_pid, keyword_id)
                 SELECT ?1, id
                 FROM keywords
                 WHERE name = ?2 COLLATE NOCASE;",
                params![pid, keyword.as_str()],
            )?;
        }

        touch_problem_in_tx(&tx, pid)?;
        tx.commit()?;
        Ok(())
    }

    fn remove_keywords(&mut self, pid: ProblemId, keywords: &[String]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !active_problem_exists_in_tx(&tx, pid)? {
            return Err(RepoError::NotFound(pid));
        }

        for keyword in keywords {
            tx.execute(
                "DELETE FROM problem_keywords
                 WHERE problem_pid = ?1
                   AND keyword_id IN (
                       SELECT id FROM keywords WHERE name = ?2 COLLATE NOCASE
                   );",
                params![pid, keyword.as_str()],
            )?;
        }
        prune_orphan_keywords_in_tx(&tx)?;

        touch_problem_in_tx(&tx, pid)?;
        tx.commit()?;
        Ok(())
    }

    fn list_keywords(&self, prefix: Option<&str>, limit: u32) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM keywords
             WHERE (?1 IS NULL OR name LIKE ?1 || '%' ESCAPE '\\')
             ORDER BY name COLLATE NOCASE ASC
             LIMIT ?2;",
        )?;

        let escaped = prefix.map(escape_like_prefix);
        let mut rows = stmt.query(params![escaped, i64::from(limit)])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get("name")?;
            names.push(value.to_lowercase());
        }
        Ok(names)
    }
}

fn parse_problem_row(conn: &Connection, row: &Row<'_>) -> RepoResult<ProblemRecord> {
    let pid: ProblemId = row.get("pid")?;
    let keywords = load_keywords_for_problem(conn, pid)?;
    Ok(ProblemRecord {
        pid,
        content: row.get("content")?,
        ordinal: row.get("ordinal")?,
        updated_at: row.get("updated_at")?,
        keywords,
    })
}

fn load_keywords_for_problem(conn: &Connection, pid: ProblemId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT k.name
         FROM problem_keywords pk
         INNER JOIN keywords k ON k.id = pk.keyword_id
         WHERE pk.problem_pid = ?1
         ORDER BY k.name COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([pid])?;
    let mut keywords = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        keywords.push(value.to_lowercase());
    }
    Ok(keywords)
}

fn active_ordinal_in_tx(tx: &Transaction<'_>, pid: ProblemId) -> RepoResult<Option<i64>> {
    let mut stmt = tx.prepare("SELECT ordinal FROM problems WHERE pid = ?1 AND trashed = 0;")?;
    let mut rows = stmt.query([pid])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

fn active_problem_exists_in_tx(tx: &Transaction<'_>, pid: ProblemId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM problems WHERE pid = ?1 AND trashed = 0
        );",
        [pid],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn touch_problem_in_tx(tx: &Transaction<'_>, pid: ProblemId) -> RepoResult<()> {
    tx.execute(
        &format!("UPDATE problems SET updated_at = {NOW_MS} WHERE pid = ?1;"),
        [pid],
    )?;
    Ok(())
}

fn prune_orphan_keywords_in_tx(tx: &Transaction<'_>) -> RepoResult<()> {
    tx.execute(
        "DELETE FROM keywords
         WHERE NOT EXISTS (
             SELECT 1 FROM problem_keywords WHERE keyword_id = keywords.id
         );",
        [],
    )?;
    Ok(())
}

fn escape_like_prefix(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn count_to_u32(value: i64) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("row count {value} out of range")))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected = crate::db::migrations::latest_version();
    let actual: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual != expected {
        return Err(RepoError::UninitializedConnection {
            expected_version: expected,
            actual_version: actual,
        });
    }

    for table in ["problems", "keywords", "problem_keywords", "trash_undo"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in ["pid", "content", "ordinal", "trashed", "trashed_at", "updated_at"] {
        if !table_has_column(conn, "problems", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "problems",
                column,
            });
        }
    }

    for column in ["id", "name"] {
        if !table_has_column(conn, "keywords", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "keywords",
                column,
            });
        }
    }

    for column in ["problem_pid", "keyword_id"] {
        if !table_has_column(conn, "problem_keywords", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "problem_keywords",
                column,
            });
        }
    }

    for column in ["slot", "pid"] {
        if !table_has_column(conn, "trash_undo", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "trash_undo",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &'static str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &'static str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
