//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the problem store.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Ordering mutations run inside a single immediate transaction.
//! - Repository APIs return semantic errors (`NotFound`, `EmptyUndo`) in
//!   addition to DB transport errors.

pub mod problem_repo;
