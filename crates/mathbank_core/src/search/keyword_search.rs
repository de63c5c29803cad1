//! Ranked keyword search over problems.
//!
//! # Responsibility
//! - Match problems against a set of keywords.
//! - Rank by number of distinct keyword matches, then by list position.
//!
//! # Invariants
//! - Only non-trashed problems are returned.
//! - Result ordering is deterministic: match count descending, ordinal
//!   ascending.

use crate::db::DbError;
use crate::model::problem::ProblemId;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for DB interaction and result decoding.
#[derive(Debug)]
pub enum SearchError {
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Search options for keyword match behavior.
#[derive(Debug, Clone)]
pub struct KeywordQuery {
    /// Keywords to match. Expected pre-normalized (trimmed, lowercased).
    pub keywords: Vec<String>,
    /// Maximum number of hits to return.
    pub limit: u32,
}

impl KeywordQuery {
    /// Creates a query with the default result limit.
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords, limit: 50 }
    }
}

/// Single search hit returned by [`search_by_keywords`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit {
    pub pid: ProblemId,
    pub content: String,
    pub ordinal: i64,
    /// Number of distinct query keywords attached to this problem.
    pub matched: u32,
    /// Full keyword set of the problem, sorted by name.
    pub keywords: Vec<String>,
}

/// Searches active problems by keyword set and returns ranked results.
///
/// Returns an empty list for an empty keyword set or a zero limit.
pub fn search_by_keywords(
    conn: &Connection,
    query: &KeywordQuery,
) -> SearchResult<Vec<KeywordHit>> {
    let terms: Vec<&str> = query
        .keywords
        .iter()
        .map(|keyword| keyword.trim())
        .filter(|keyword| !keyword.is_empty())
        .collect();

    if terms.is_empty() || query.limit == 0 {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; terms.len()].join(", ");
    let sql = format!(
        "SELECT
            p.pid AS pid,
            p.content AS content,
            p.ordinal AS ordinal,
            COUNT(DISTINCT k.id) AS matched
         FROM problems p
         INNER JOIN problem_keywords pk ON pk.problem_pid = p.pid
         INNER JOIN keywords k ON k.id = pk.keyword_id
         WHERE p.trashed = 0
           AND k.name COLLATE NOCASE IN ({placeholders})
         GROUP BY p.pid
         ORDER BY matched DESC, p.ordinal ASC
         LIMIT ?;"
    );

    let mut bind_values: Vec<Value> = terms
        .iter()
        .map(|term| Value::Text((*term).to_string()))
        .collect();
    bind_values.push(Value::Integer(i64::from(query.limit)));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut hits = Vec::new();

    while let Some(row) = rows.next()? {
        hits.push(parse_keyword_hit(conn, row)?);
    }

    Ok(hits)
}

fn parse_keyword_hit(conn: &Connection, row: &Row<'_>) -> SearchResult<KeywordHit> {
    let pid: ProblemId = row.get("pid")?;
    let matched_raw: i64 = row.get("matched")?;
    let matched = u32::try_from(matched_raw)
        .map_err(|_| SearchError::InvalidData(format!("match count {matched_raw} out of range")))?;

    let keywords = load_keywords(conn, pid)?;
    Ok(KeywordHit {
        pid,
        content: row.get("content")?,
        ordinal: row.get("ordinal")?,
        matched,
        keywords,
    })
}

fn load_keywords(conn: &Connection, pid: ProblemId) -> SearchResult<Vec<String>> {
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
