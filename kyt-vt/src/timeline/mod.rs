//! Timeline derivation
//!
//! Everything here is a pure function over a submission row and its audit
//! history. Stage boundaries, progress, bottleneck verdicts, and fleet
//! statistics are computed on read, never stored.

pub mod analyzer;
pub mod builder;
pub mod stats;

pub use analyzer::{analyze, Timeline};
pub use builder::{Stage, StageName, StageStatus};
pub use stats::{compute_stats, AggregateStats};
