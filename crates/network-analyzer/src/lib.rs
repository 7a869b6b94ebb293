//! Network Analyzer
//!
//! Distinguishes organic collecting activity from manipulated activity
//! in a creator's collector network: wallet behavioral profiling,
//! sybil-cluster detection, circular-trading detection, dead-end
//! wallet identification, wash-trade classification, timeline-pattern
//! classification, and weighted score aggregation into a suspicion
//! verdict.

pub mod analyzer;
pub mod dead_end;
pub mod findings;
pub mod profiler;
pub mod rings;
pub mod scoring;
pub mod service;
pub mod sybil;
pub mod timeline;
pub mod wash_trade;

pub use analyzer::{AnalysisRun, NetworkAnalyzer, NetworkSnapshot};
pub use profiler::WalletProfiler;
pub use rings::RingDetector;
pub use scoring::ScoreWeights;
pub use service::AnalysisService;
pub use sybil::SybilDetector;
pub use timeline::TimelineReport;
pub use wash_trade::WashTradeReport;
