//! Conforma conformance analytics -- aggregation over per-trace alignments.
//!
//! Every analytic is a pure function from (model, log, alignment results)
//! to a serializable result struct; nothing here is stateful or cached, and
//! nothing here suspends or blocks. Each module covers one analytic; the
//! `report` module orchestrates any selection of them into an aggregated
//! [`ConformanceReport`](report::ConformanceReport).
//!
//! Per-record attribute problems (an event without a role, a trace without
//! an amount, an unparseable amount value) are resolved by skipping the
//! record, never by failing the batch. The only fatal error at this layer
//! is a trace/result count mismatch, which signals a provider bug upstream.

pub mod bins;
pub mod dimensions;
pub mod fitness;
pub mod outcomes;
pub mod report;
pub mod sequences;

use std::fmt;

pub use bins::{bin_index, conformance_bins, ConformanceBin, BIN_COUNT};
pub use dimensions::{
    amount_correlation, conformance_by_resource, conformance_by_role, AmountConformance,
    CategoryConformance,
};
pub use fitness::{fitness_per_trace, TraceConformance};
pub use outcomes::{desired_outcomes, outcome_distribution, OutcomeBin, OutcomeDistribution};
pub use report::{run_full_report, run_report, ConformanceReport, ANALYSES};
pub use sequences::{trace_sequences, unique_sequences_per_bin, SequenceBin, TraceSequence};

/// Error type for analytics operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    /// The alignment result list does not line up 1:1 with the log's traces.
    ResultCountMismatch { traces: usize, results: usize },
    /// An unrecognized analysis selector was requested.
    UnknownAnalysis { name: String },
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeError::ResultCountMismatch { traces, results } => write!(
                f,
                "alignment results do not match the log: {} trace(s), {} result(s)",
                traces, results
            ),
            AnalyzeError::UnknownAnalysis { name } => {
                write!(f, "unknown analysis: '{}'", name)
            }
        }
    }
}

impl std::error::Error for AnalyzeError {}

/// Guard the index join key: `results[i]` must correspond to `traces[i]`.
pub(crate) fn check_counts(traces: usize, results: usize) -> Result<(), AnalyzeError> {
    if traces != results {
        return Err(AnalyzeError::ResultCountMismatch { traces, results });
    }
    Ok(())
}

/// Round to 4 decimal places for fitness display.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Round to 2 decimal places for percentage display.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
