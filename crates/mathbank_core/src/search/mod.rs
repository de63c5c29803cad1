//! Keyword search entry points.
//!
//! # Responsibility
//! - Expose ranked keyword queries over the problem store.
//! - Keep search result shaping inside core.

pub mod keyword_search;
