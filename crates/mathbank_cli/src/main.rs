//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mathbank_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("mathbank_core version={}", mathbank_core::core_version());
    println!(
        "mathbank_core schema_version={}",
        mathbank_core::db::migrations::latest_version()
    );
}
