//! Request transport seam between the proxy and the endpoint surface.
//!
//! # Responsibility
//! - Define the request shape the proxy emits, one per API operation.
//! - Keep the delivery mechanism behind a trait so the stack can run
//!   in-process or over a socket front-end without proxy changes.
//!
//! # Invariants
//! - A timeout is reported as its own error kind, distinct from other
//!   delivery failures.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Request method, mirroring the HTTP verb of each endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One endpoint request: method, endpoint name and form/query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: &'static str,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn get(endpoint: &'static str, params: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Get,
            endpoint,
            params,
        }
    }

    pub fn post(endpoint: &'static str, params: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            endpoint,
            params,
        }
    }
}

/// Delivery failure reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete in time.
    Timeout,
    /// Any other delivery failure.
    Failed(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Failed(message) => write!(f, "request failed: {message}"),
        }
    }
}

impl Error for TransportError {}

/// Delivers one request and returns the raw response envelope text.
pub trait Transport {
    fn send(&mut self, request: &ApiRequest) -> Result<String, TransportError>;
}
