//! Typed API proxy over the request transport.
//!
//! # Responsibility
//! - Issue one request per API operation and normalize the response
//!   envelope into `Result` form.
//! - Decode Base64 problem content before it reaches any view code.
//!
//! # Invariants
//! - Idempotent queries retry once on transient failure; mutations never
//!   retry.
//! - A server-reported failure surfaces the server's error text verbatim.

use crate::transport::{ApiRequest, Transport, TransportError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::warn;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

const STORAGE_ERROR_PREFIX: &str = "storage error";

/// Client-side failure for one API operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The server answered with a failure envelope.
    Api(String),
    /// The transport timed out.
    Timeout,
    /// The transport failed to deliver the request.
    Transport(String),
    /// The response was not a well-formed envelope or payload.
    Malformed(String),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(message) => write!(f, "api error: {message}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Malformed(message) => write!(f, "malformed response: {message}"),
        }
    }
}

impl Error for ClientError {}

/// Reorder direction for [`ApiProxy::move_problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDir {
    Up,
    Down,
}

impl MoveDir {
    fn as_param(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// One problem as the client sees it: content already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemView {
    pub pid: i64,
    pub content: String,
    pub keywords: Vec<String>,
}

/// Typed proxy issuing one request per API operation.
pub struct ApiProxy<T: Transport> {
    transport: T,
}

impl<T: Transport> ApiProxy<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Creates a problem and returns its assigned id.
    pub fn create(&mut self, content: &str) -> Result<i64, ClientError> {
        let result = self.call(
            ApiRequest::post("create", vec![("content".into(), content.into())]),
            false,
        )?;
        result["pid"]
            .as_i64()
            .ok_or_else(|| ClientError::Malformed("create result lacks `pid`".to_string()))
    }

    /// Replaces the content of an existing problem.
    pub fn update(&mut self, pid: i64, content: &str) -> Result<(), ClientError> {
        self.call(
            ApiRequest::post(
                "update",
                vec![
                    ("pid".into(), pid.to_string()),
                    ("content".into(), content.into()),
                ],
            ),
            false,
        )?;
        Ok(())
    }

    /// Fetches one page of problems in list order.
    pub fn list(&mut self, page_num: u32, page_size: u32) -> Result<Vec<ProblemView>, ClientError> {
        let result = self.call(
            ApiRequest::get(
                "list",
                vec![
                    ("page_num".into(), page_num.to_string()),
                    ("page_size".into(), page_size.to_string()),
                ],
            ),
            true,
        )?;
        parse_problems(&result)
    }

    /// Fetches problems ranked by keyword relevance.
    pub fn search(&mut self, keywords: &[String]) -> Result<Vec<ProblemView>, ClientError> {
        let result = self.call(
            ApiRequest::get("search", vec![("keywords".into(), keywords.join(","))]),
            true,
        )?;
        parse_problems(&result)
    }

    /// Swaps a problem with its neighbor in the given direction.
    pub fn move_problem(&mut self, pid: i64, dir: MoveDir) -> Result<(), ClientError> {
        self.call(
            ApiRequest::get(
                "move",
                vec![
                    ("pid".into(), pid.to_string()),
                    ("dir".into(), dir.as_param().to_string()),
                ],
            ),
            false,
        )?;
        Ok(())
    }

    /// Moves a problem to the trash.
    pub fn trash_move(&mut self, pid: i64) -> Result<(), ClientError> {
        self.call(
            ApiRequest::get(
                "trash",
                vec![
                    ("action".into(), "move".to_string()),
                    ("pid".into(), pid.to_string()),
                ],
            ),
            false,
        )?;
        Ok(())
    }

    /// Restores the most recently trashed problem.
    pub fn trash_undo(&mut self) -> Result<(), ClientError> {
        self.call(
            ApiRequest::get("trash", vec![("action".into(), "undo".to_string())]),
            false,
        )?;
        Ok(())
    }

    /// Permanently removes all trashed problems. Returns the removed count.
    pub fn trash_empty(&mut self) -> Result<u32, ClientError> {
        let result = self.call(
            ApiRequest::get("trash", vec![("action".into(), "empty".to_string())]),
            false,
        )?;
        parse_count(&result)
    }

    /// Counts problems currently in the trash.
    pub fn trash_count(&mut self) -> Result<u32, ClientError> {
        let result = self.call(
            ApiRequest::get("trash", vec![("action".into(), "count".to_string())]),
            true,
        )?;
        parse_count(&result)
    }

    /// Attaches keywords to a problem, batched into one request.
    pub fn keyword_add(&mut self, pid: i64, keywords: &[String]) -> Result<(), ClientError> {
        self.call(
            ApiRequest::get(
                "keyword",
                vec![
                    ("action".into(), "add".to_string()),
                    ("keyword".into(), keywords.join(",")),
                    ("pid".into(), pid.to_string()),
                ],
            ),
            false,
        )?;
        Ok(())
    }

    /// Detaches one keyword from a problem.
    pub fn keyword_remove(&mut self, pid: i64, keyword: &str) -> Result<(), ClientError> {
        self.call(
            ApiRequest::get(
                "keyword",
                vec![
                    ("action".into(), "remove".to_string()),
                    ("keyword".into(), keyword.to_string()),
                    ("pid".into(), pid.to_string()),
                ],
            ),
            false,
        )?;
        Ok(())
    }

    /// Suggests known keywords with the given prefix.
    pub fn keyword_suggest(&mut self, prefix: &str) -> Result<Vec<String>, ClientError> {
        let result = self.call(
            ApiRequest::get(
                "keyword",
                vec![
                    ("action".into(), "suggest".to_string()),
                    ("keyword".into(), prefix.to_string()),
                    ("pid".into(), "0".to_string()),
                ],
            ),
            true,
        )?;

        let names = result["keywords"]
            .as_array()
            .ok_or_else(|| ClientError::Malformed("suggest result lacks `keywords`".to_string()))?;
        names
            .iter()
            .map(|name| {
                name.as_str().map(str::to_string).ok_or_else(|| {
                    ClientError::Malformed("suggest keyword is not a string".to_string())
                })
            })
            .collect()
    }

    fn call(&mut self, request: ApiRequest, idempotent: bool) -> Result<Value, ClientError> {
        match self.call_once(&request) {
            Err(err) if idempotent && is_transient(&err) => {
                warn!(
                    "event=api_retry module=proxy endpoint={} error={}",
                    request.endpoint, err
                );
                self.call_once(&request)
            }
            outcome => outcome,
        }
    }

    fn call_once(&mut self, request: &ApiRequest) -> Result<Value, ClientError> {
        let raw = self.transport.send(request).map_err(|err| match err {
            TransportError::Timeout => ClientError::Timeout,
            TransportError::Failed(message) => ClientError::Transport(message),
        })?;

        let envelope: Value = serde_json::from_str(&raw)
            .map_err(|err| ClientError::Malformed(format!("invalid envelope JSON: {err}")))?;

        match envelope["success"].as_bool() {
            Some(true) => Ok(envelope
                .get("result")
                .cloned()
                .unwrap_or(Value::Object(Default::default()))),
            Some(false) => {
                let message = envelope["error"].as_str().unwrap_or("unknown error");
                Err(ClientError::Api(message.to_string()))
            }
            None => Err(ClientError::Malformed(
                "envelope lacks `success` flag".to_string(),
            )),
        }
    }
}

/// Transient failures worth one retry on an idempotent query: delivery
/// problems and server-side storage trouble, but never semantic errors.
fn is_transient(err: &ClientError) -> bool {
    match err {
        ClientError::Timeout | ClientError::Transport(_) => true,
        ClientError::Api(message) => message.starts_with(STORAGE_ERROR_PREFIX),
        ClientError::Malformed(_) => false,
    }
}

fn parse_count(result: &Value) -> Result<u32, ClientError> {
    result["count"]
        .as_u64()
        .map(|count| count as u32)
        .ok_or_else(|| ClientError::Malformed("result lacks `count`".to_string()))
}

fn parse_problems(result: &Value) -> Result<Vec<ProblemView>, ClientError> {
    let problems = result["problems"]
        .as_array()
        .ok_or_else(|| ClientError::Malformed("result lacks `problems`".to_string()))?;

    problems.iter().map(parse_problem).collect()
}

fn parse_problem(value: &Value) -> Result<ProblemView, ClientError> {
    let pid = value["pid"]
        .as_i64()
        .ok_or_else(|| ClientError::Malformed("problem lacks `pid`".to_string()))?;

    let encoded = value["content"]
        .as_str()
        .ok_or_else(|| ClientError::Malformed("problem lacks `content`".to_string()))?;
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|err| ClientError::Malformed(format!("invalid Base64 content: {err}")))?;
    let content = String::from_utf8(decoded)
        .map_err(|_| ClientError::Malformed("content is not valid UTF-8".to_string()))?;

    let keywords = match value["keywords"].as_array() {
        Some(names) => names
            .iter()
            .map(|name| {
                name.as_str().map(str::to_string).ok_or_else(|| {
                    ClientError::Malformed("problem keyword is not a string".to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(ProblemView {
        pid,
        content,
        keywords,
    })
}
