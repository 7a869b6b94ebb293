//! Provenance Scan: collector-network authenticity analysis.
//!
//! This is the root crate that provides benchmark access to the
//! internal modules. For actual functionality, use the individual
//! crates directly:
//!
//! - `provenance-core`: shared types, configuration, provider traits,
//!   database models
//! - `network-analyzer`: the analysis engine and CLI runner

// Re-export for benchmarks
pub use network_analyzer as analyzer;
pub use provenance_core as core;
