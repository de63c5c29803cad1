//! Request parameter parsing and the endpoint error taxonomy.
//!
//! # Responsibility
//! - Give handlers a uniform way to read and validate request parameters.
//! - Define the error kinds every endpoint reports through the envelope.
//!
//! # Invariants
//! - A `Validation` error is raised before any store mutation happens.
//! - `pid` values must be well-formed positive integers.

use mathbank_core::{ProblemId, ProblemServiceError, RepoError, SearchError};
use mathbank_core::db::DbError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Endpoint-level error taxonomy.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing parameter. No mutation occurred.
    Validation(String),
    /// Referenced problem absent, or trashed where an active one is needed.
    NotFound(ProblemId),
    /// Undo requested with nothing to restore.
    EmptyUndo,
    /// Connection or transaction failure.
    Storage(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::NotFound(pid) => write!(f, "problem not found: {pid}"),
            Self::EmptyUndo => write!(f, "nothing to restore from the trash"),
            Self::Storage(message) => write!(f, "storage error: {message}"),
        }
    }
}

impl Error for ApiError {}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(pid) => Self::NotFound(pid),
            RepoError::EmptyUndo => Self::EmptyUndo,
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<ProblemServiceError> for ApiError {
    fn from(value: ProblemServiceError) -> Self {
        match value {
            ProblemServiceError::ProblemNotFound(pid) => Self::NotFound(pid),
            ProblemServiceError::EmptyUndo => Self::EmptyUndo,
            ProblemServiceError::InvalidKeyword(keyword) => {
                Self::Validation(format!("invalid keyword: `{keyword}`"))
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(value: SearchError) -> Self {
        Self::Storage(value.to_string())
    }
}

/// Request parameters keyed by name, as delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one parameter, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Reads an optional parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Reads a required parameter. Missing parameters are a validation
    /// error; present-but-empty values are returned as-is.
    pub fn require(&self, name: &'static str) -> Result<&str, ApiError> {
        self.get(name)
            .ok_or_else(|| ApiError::Validation(format!("missing parameter `{name}`")))
    }

    /// Reads a required problem id: a well-formed positive integer.
    pub fn require_pid(&self, name: &'static str) -> Result<ProblemId, ApiError> {
        let raw = self.require(name)?;
        let parsed: ProblemId = raw.trim().parse().map_err(|_| {
            ApiError::Validation(format!("parameter `{name}` must be an integer, got `{raw}`"))
        })?;
        if parsed <= 0 {
            return Err(ApiError::Validation(format!(
                "parameter `{name}` must be positive, got `{raw}`"
            )));
        }
        Ok(parsed)
    }

    /// Reads a required positive integer parameter that fits in `u32`.
    pub fn require_u32(&self, name: &'static str) -> Result<u32, ApiError> {
        let raw = self.require(name)?;
        let parsed: u32 = raw.trim().parse().map_err(|_| {
            ApiError::Validation(format!(
                "parameter `{name}` must be a positive integer, got `{raw}`"
            ))
        })?;
        if parsed == 0 {
            return Err(ApiError::Validation(format!(
                "parameter `{name}` must be positive, got `{raw}`"
            )));
        }
        Ok(parsed)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}
