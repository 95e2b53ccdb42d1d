//! Batch reconciliation: duplicates, divergences, gaps and the final report.

pub mod aggregator;
pub mod divergence;
pub mod duplicates;
mod engine;
pub mod gaps;
pub mod progress;

pub use aggregator::Aggregator;
pub use divergence::{amounts_match, detect_divergence};
pub use duplicates::DuplicateTracker;
pub use engine::{DocumentOutcome, ReconcileEngine};
pub use gaps::{compress_ranges, find_gaps};
pub use progress::{NoProgress, ProgressReporter, ProgressSink};
