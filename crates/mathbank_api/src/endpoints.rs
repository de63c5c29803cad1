//! Endpoint handlers over the problem store.
//!
//! # Responsibility
//! - Implement one handler per endpoint: create, update, list, search,
//!   move, trash, keyword.
//! - Open a fresh connection per request and run exactly one store
//!   operation against it.
//!
//! # Invariants
//! - Parameters are fully validated before the store is touched.
//! - Handlers never panic; every failure maps to an `ApiError`.

use crate::params::{ApiError, Params};
use crate::wire::{hit_payload, problem_payload};
use log::info;
use mathbank_core::db::open_db;
use mathbank_core::{
    normalize_keywords, search_by_keywords, split_keyword_list, KeywordQuery, MoveDirection,
    ProblemService, SqliteProblemRepository,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DEFAULT_DB_FILE_NAME: &str = "mathbank.sqlite3";
static ENV_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Endpoint surface bound to one database location.
///
/// The struct itself holds no connection; every request opens its own, the
/// way the original one-script-per-endpoint backend did.
pub struct Api {
    db_path: PathBuf,
}

impl Api {
    /// Creates an endpoint surface for the given database file.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Creates an endpoint surface from the process environment.
    ///
    /// Honors `MATHBANK_DB_PATH`; falls back to a file in the system temp
    /// directory. The resolution is cached for the process lifetime.
    pub fn from_env() -> Self {
        let db_path = ENV_DB_PATH
            .get_or_init(|| {
                if let Ok(raw) = std::env::var("MATHBANK_DB_PATH") {
                    let trimmed = raw.trim();
                    if !trimmed.is_empty() {
                        return PathBuf::from(trimmed);
                    }
                }
                std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
            })
            .clone();
        Self { db_path }
    }

    /// Returns the database location served by this surface.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub(crate) fn create(&self, params: &Params) -> Result<Value, ApiError> {
        let content = params.require("content")?;

        let mut conn = open_db(&self.db_path)?;
        let repo = SqliteProblemRepository::try_new(&mut conn)?;
        let mut service = ProblemService::new(repo);
        let record = service.create_problem(content)?;

        Ok(json!({ "pid": record.pid }))
    }

    pub(crate) fn update(&self, params: &Params) -> Result<Value, ApiError> {
        let pid = params.require_pid("pid")?;
        let content = params.require("content")?;

        let mut conn = open_db(&self.db_path)?;
        let repo = SqliteProblemRepository::try_new(&mut conn)?;
        let mut service = ProblemService::new(repo);
        service.update_problem(pid, content)?;

        Ok(json!({}))
    }

    pub(crate) fn list(&self, params: &Params) -> Result<Value, ApiError> {
        let page_num = params.require_u32("page_num")?;
        let page_size = params.require_u32("page_size")?;

        let mut conn = open_db(&self.db_path)?;
        let repo = SqliteProblemRepository::try_new(&mut conn)?;
        let service = ProblemService::new(repo);
        let page = service.list_problems(page_num, Some(page_size))?;

        let problems: Vec<Value> = page.items.iter().map(problem_payload).collect();
        Ok(json!({ "problems": problems }))
    }

    pub(crate) fn search(&self, params: &Params) -> Result<Value, ApiError> {
        let raw = params.require("keywords")?;
        let keywords = normalize_keywords(&split_keyword_list(raw));

        let conn = open_db(&self.db_path)?;
        let hits = search_by_keywords(&conn, &KeywordQuery::new(keywords))?;

        let problems: Vec<Value> = hits.iter().map(hit_payload).collect();
        Ok(json!({ "problems": problems }))
    }

    pub(crate) fn move_problem(&self, params: &Params) -> Result<Value, ApiError> {
        let pid = params.require_pid("pid")?;
        let direction = match params.require("dir")? {
            "up" => MoveDirection::Up,
            "down" => MoveDirection::Down,
            other => {
                return Err(ApiError::Validation(format!(
                    "parameter `dir` must be `up` or `down`, got `{other}`"
                )))
            }
        };

        let mut conn = open_db(&self.db_path)?;
        let repo = SqliteProblemRepository::try_new(&mut conn)?;
        let mut service = ProblemService::new(repo);
        service.move_problem(pid, direction)?;

        Ok(json!({}))
    }

    pub(crate) fn trash(&self, params: &Params) -> Result<Value, ApiError> {
        let action = params.require("action")?.to_string();

        match action.as_str() {
            "move" => {
                let pid = params.require_pid("pid")?;
                let mut conn = open_db(&self.db_path)?;
                let repo = SqliteProblemRepository::try_new(&mut conn)?;
                let mut service = ProblemService::new(repo);
                service.trash_problem(pid)?;
                Ok(json!({}))
            }
            "undo" => {
                let mut conn = open_db(&self.db_path)?;
                let repo = SqliteProblemRepository::try_new(&mut conn)?;
                let mut service = ProblemService::new(repo);
                let pid = service.untrash_last()?;
                info!("event=trash_undo module=api status=ok pid={pid}");
                Ok(json!({}))
            }
            "empty" => {
                let mut conn = open_db(&self.db_path)?;
                let repo = SqliteProblemRepository::try_new(&mut conn)?;
                let mut service = ProblemService::new(repo);
                let count = service.empty_trash()?;
                Ok(json!({ "count": count }))
            }
            "count" => {
                let mut conn = open_db(&self.db_path)?;
                let repo = SqliteProblemRepository::try_new(&mut conn)?;
                let service = ProblemService::new(repo);
                let count = service.trash_count()?;
                Ok(json!({ "count": count }))
            }
            other => Err(ApiError::Validation(format!(
                "parameter `action` must be one of move|undo|empty|count, got `{other}`"
            ))),
        }
    }

    pub(crate) fn keyword(&self, params: &Params) -> Result<Value, ApiError> {
        let action = params.require("action")?.to_string();

        match action.as_str() {
            "add" | "remove" => {
                let pid = params.require_pid("pid")?;
                // The client batches compose-mode keywords into one request,
                // so the parameter may carry a comma-joined list.
                let keywords = split_keyword_list(params.require("keyword")?);
                if keywords.is_empty() {
                    return Err(ApiError::Validation(
                        "parameter `keyword` must not be blank".to_string(),
                    ));
                }

                let mut conn = open_db(&self.db_path)?;
                let repo = SqliteProblemRepository::try_new(&mut conn)?;
                let mut service = ProblemService::new(repo);
                if action == "add" {
                    service.add_keywords(pid, keywords)?;
                } else {
                    service.remove_keywords(pid, keywords)?;
                }
                Ok(json!({}))
            }
            "suggest" => {
                let prefix = params.require("keyword")?;
                let mut conn = open_db(&self.db_path)?;
                let repo = SqliteProblemRepository::try_new(&mut conn)?;
                let service = ProblemService::new(repo);
                let keywords = service.suggest_keywords(prefix)?;
                Ok(json!({ "keywords": keywords }))
            }
            other => Err(ApiError::Validation(format!(
                "parameter `action` must be one of add|remove|suggest, got `{other}`"
            ))),
        }
    }
}
