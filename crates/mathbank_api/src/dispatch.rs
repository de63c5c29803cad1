//! Request dispatcher for the endpoint surface.
//!
//! # Responsibility
//! - Route a request to its handler by endpoint name.
//! - Enforce the method contract per endpoint.
//! - Wrap every outcome in the JSON envelope and log the request.
//!
//! # Invariants
//! - `handle` never panics and always returns a well-formed envelope.

use crate::endpoints::Api;
use crate::envelope::Envelope;
use crate::params::{ApiError, Params};
use log::{error, info};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Request method, mirroring the HTTP verbs of the original endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// One endpoint request as delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub endpoint: String,
    pub params: Params,
}

impl Request {
    pub fn new(method: Method, endpoint: impl Into<String>, params: Params) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params,
        }
    }
}

impl Api {
    /// Handles one request and returns the serialized response envelope.
    pub fn handle(&self, request: &Request) -> String {
        let started_at = Instant::now();

        let envelope = match self.route(request) {
            Ok(result) => {
                info!(
                    "event=api_request module=api status=ok endpoint={} method={} duration_ms={}",
                    request.endpoint,
                    request.method,
                    started_at.elapsed().as_millis()
                );
                Envelope::success(result)
            }
            Err(err) => {
                error!(
                    "event=api_request module=api status=error endpoint={} method={} duration_ms={} error={}",
                    request.endpoint,
                    request.method,
                    started_at.elapsed().as_millis(),
                    err
                );
                Envelope::failure(err.to_string())
            }
        };

        envelope.to_json()
    }

    fn route(&self, request: &Request) -> Result<Value, ApiError> {
        let expected_method = match request.endpoint.as_str() {
            "create" | "update" => Method::Post,
            "list" | "search" | "move" | "trash" | "keyword" => Method::Get,
            other => {
                return Err(ApiError::Validation(format!("unknown endpoint `{other}`")));
            }
        };

        if request.method != expected_method {
            return Err(ApiError::Validation(format!(
                "endpoint `{}` requires {} requests",
                request.endpoint, expected_method
            )));
        }

        match request.endpoint.as_str() {
            "create" => self.create(&request.params),
            "update" => self.update(&request.params),
            "list" => self.list(&request.params),
            "search" => self.search(&request.params),
            "move" => self.move_problem(&request.params),
            "trash" => self.trash(&request.params),
            "keyword" => self.keyword(&request.params),
            // Unreachable by construction; the method table above is the
            // authoritative endpoint list.
            other => Err(ApiError::Validation(format!("unknown endpoint `{other}`"))),
        }
    }
}
