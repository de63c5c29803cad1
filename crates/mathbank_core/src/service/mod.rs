//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep endpoint/UI layers decoupled from storage details.

pub mod problem_service;
