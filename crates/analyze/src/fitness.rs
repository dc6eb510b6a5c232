//! Per-trace fitness projection.
//!
//! Projects each alignment result to a bounded fitness scalar, labeled with
//! a 1-based human-readable ordinal for the dashboard's per-trace chart.

use conforma_align::AlignmentResult;
use serde::Serialize;

use crate::round4;

/// Fitness of a single trace, labeled for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TraceConformance {
    /// Human-readable ordinal, "Trace 1" for the first trace in the log.
    pub trace: String,
    /// Fitness in [0, 1], rounded to 4 decimal places.
    pub conformance: f64,
}

/// Project alignment results to labeled fitness values, in log order.
///
/// A result without a fitness value contributes 0.
pub fn fitness_per_trace(results: &[AlignmentResult]) -> Vec<TraceConformance> {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| TraceConformance {
            trace: format!("Trace {}", i + 1),
            conformance: round4(result.fitness()),
        })
        .collect()
}
