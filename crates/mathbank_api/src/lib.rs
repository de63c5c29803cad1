//! Endpoint layer for the MathBank problem manager.
//!
//! # Responsibility
//! - Expose the problem store as stateless request handlers behind a
//!   dispatcher, one handler per endpoint.
//! - Emit the uniform `{success, result|error}` JSON envelope.
//!
//! # Invariants
//! - Every request opens its own database connection and performs exactly
//!   one store operation.
//! - Validation failures are reported before any connection is opened for
//!   writing; they never mutate the store.
//! - Problem content travels Base64-encoded in list/search payloads.

mod dispatch;
mod endpoints;
mod envelope;
mod params;
mod wire;

pub use dispatch::{Method, Request};
pub use endpoints::Api;
pub use envelope::Envelope;
pub use params::{ApiError, Params};
pub use wire::encode_content;
