//! Problem use-case service.
//!
//! # Responsibility
//! - Provide problem-level create/update/order/trash/keyword APIs.
//! - Normalize keyword values and pagination inputs.
//!
//! # Invariants
//! - Keyword names are trimmed, lowercased and whitespace-collapsed before
//!   they reach persistence.
//! - Page size defaults to 10 and clamps to 50.
//! - Mutations that return a record re-read it from storage.

use crate::model::problem::{MoveDirection, ProblemId};
use crate::repo::problem_repo::{
    ProblemListQuery, ProblemRecord, ProblemRepository, RepoError, RepoResult,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PAGE_SIZE_DEFAULT: u32 = 10;
const PAGE_SIZE_MAX: u32 = 50;
const SUGGEST_LIMIT: u32 = 10;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Service error for problem use-cases.
#[derive(Debug)]
pub enum ProblemServiceError {
    /// Keyword input contains blank values.
    InvalidKeyword(String),
    /// Target problem does not exist or is in the trash.
    ProblemNotFound(ProblemId),
    /// Undo requested with nothing to restore.
    EmptyUndo,
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ProblemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKeyword(value) => write!(f, "invalid keyword: `{value}`"),
            Self::ProblemNotFound(pid) => write!(f, "problem not found: {pid}"),
            Self::EmptyUndo => write!(f, "nothing to restore from the trash"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent problem state: {details}"),
        }
    }
}

impl Error for ProblemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProblemServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(pid) => Self::ProblemNotFound(pid),
            RepoError::EmptyUndo => Self::EmptyUndo,
            other => Self::Repo(other),
        }
    }
}

/// List result envelope used by service callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemsPage {
    /// Page items sorted by ordinal ascending.
    pub items: Vec<ProblemRecord>,
    /// One-based page number the query used.
    pub page_num: u32,
    /// Effective normalized page size used by the query.
    pub applied_page_size: u32,
}

/// Problem service facade over repository implementations.
pub struct ProblemService<R: ProblemRepository> {
    repo: R,
}

impl<R: ProblemRepository> ProblemService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one problem at the end of the active order.
    pub fn create_problem(
        &mut self,
        content: impl Into<String>,
    ) -> Result<ProblemRecord, ProblemServiceError> {
        let content = content.into();
        let pid = self.repo.create_problem(content.as_str())?;
        self.repo
            .get_problem(pid)?
            .ok_or(ProblemServiceError::InconsistentState(
                "created problem not found in read-back",
            ))
    }

    /// Replaces problem content fully.
    pub fn update_problem(
        &mut self,
        pid: ProblemId,
        content: impl Into<String>,
    ) -> Result<ProblemRecord, ProblemServiceError> {
        let content = content.into();
        self.repo.update_problem(pid, content.as_str())?;
        self.repo
            .get_problem(pid)?
            .ok_or(ProblemServiceError::InconsistentState(
                "updated problem not found in read-back",
            ))
    }

    /// Gets one problem by stable id.
    pub fn get_problem(&self, pid: ProblemId) -> RepoResult<Option<ProblemRecord>> {
        self.repo.get_problem(pid)
    }

    /// Lists one page of active problems.
    ///
    /// `page_num` is one-based; zero is treated as the first page.
    pub fn list_problems(
        &self,
        page_num: u32,
        page_size: Option<u32>,
    ) -> Result<ProblemsPage, ProblemServiceError> {
        let page_num = page_num.max(1);
        let applied_page_size = normalize_page_size(page_size);
        let query = ProblemListQuery {
            limit: Some(applied_page_size),
            offset: (page_num - 1).saturating_mul(applied_page_size),
        };
        let items = self.repo.list_problems(&query)?;
        Ok(ProblemsPage {
            items,
            page_num,
            applied_page_size,
        })
    }

    /// Swaps a problem with its neighbor in the given direction.
    pub fn move_problem(
        &mut self,
        pid: ProblemId,
        direction: MoveDirection,
    ) -> Result<(), ProblemServiceError> {
        self.repo.move_problem(pid, direction)?;
        Ok(())
    }

    /// Moves a problem to the trash.
    pub fn trash_problem(&mut self, pid: ProblemId) -> Result<(), ProblemServiceError> {
        self.repo.trash_problem(pid)?;
        Ok(())
    }

    /// Restores the most recently trashed problem and returns its id.
    pub fn untrash_last(&mut self) -> Result<ProblemId, ProblemServiceError> {
        Ok(self.repo.untrash_last()?)
    }

    /// Permanently removes all trashed problems. Returns the removed count.
    pub fn empty_trash(&mut self) -> Result<u32, ProblemServiceError> {
        Ok(self.repo.empty_trash()?)
    }

    /// Counts problems currently in the trash.
    pub fn trash_count(&self) -> Result<u32, ProblemServiceError> {
        Ok(self.repo.trash_count()?)
    }

    /// Attaches keywords to a problem. Adding an existing keyword is a no-op.
    pub fn add_keywords(
        &mut self,
        pid: ProblemId,
        keywords: Vec<String>,
    ) -> Result<ProblemRecord, ProblemServiceError> {
        let normalized = validate_and_normalize(keywords)?;
        self.repo.add_keywords(pid, &normalized)?;
        self.repo
            .get_problem(pid)?
            .ok_or(ProblemServiceError::InconsistentState(
                "problem missing after keyword attach",
            ))
    }

    /// Detaches keywords from a problem. Removing an absent keyword is a
    /// no-op.
    pub fn remove_keywords(
        &mut self,
        pid: ProblemId,
        keywords: Vec<String>,
    ) -> Result<ProblemRecord, ProblemServiceError> {
        let normalized = validate_and_normalize(keywords)?;
        self.repo.remove_keywords(pid, &normalized)?;
        self.repo
            .get_problem(pid)?
            .ok_or(ProblemServiceError::InconsistentState(
                "problem missing after keyword detach",
            ))
    }

    /// Suggests known keywords with the given prefix.
    pub fn suggest_keywords(&self, prefix: &str) -> Result<Vec<String>, ProblemServiceError> {
        let normalized = normalize_keyword(prefix);
        Ok(self
            .repo
            .list_keywords(normalized.as_deref(), SUGGEST_LIMIT)?)
    }
}

fn validate_and_normalize(keywords: Vec<String>) -> Result<Vec<String>, ProblemServiceError> {
    for keyword in &keywords {
        if keyword.trim().is_empty() {
            return Err(ProblemServiceError::InvalidKeyword(keyword.clone()));
        }
    }
    Ok(normalize_keywords(&keywords))
}

/// Normalizes one keyword value according to the store contract.
///
/// Returns `None` for blank input.
pub fn normalize_keyword(keyword: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(keyword.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}

/// Normalizes and deduplicates keyword values.
pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for keyword in keywords {
        if let Some(value) = normalize_keyword(keyword) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}

/// Normalizes page size according to the list contract.
pub fn normalize_page_size(page_size: Option<u32>) -> u32 {
    match page_size {
        Some(0) => PAGE_SIZE_DEFAULT,
        Some(value) if value > PAGE_SIZE_MAX => PAGE_SIZE_MAX,
        Some(value) => value,
        None => PAGE_SIZE_DEFAULT,
    }
}

/// Splits a comma-joined keyword parameter into raw values.
///
/// Blank segments are dropped; normalization is left to the caller.
pub fn split_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
