//! Distinct activity sequences per fitness bin.
//!
//! Each trace's ordered activity-name sequence (unnamed events dropped) is
//! filed under the trace's fitness bin; within a bin, identical sequences
//! collapse to one entry regardless of timing or attribute differences.
//! No truncation is applied, so a large heterogeneous log produces a large
//! catalog.

use std::collections::BTreeSet;

use conforma_align::AlignmentResult;
use conforma_model::EventLog;
use serde::Serialize;

use crate::bins::{bin_index, BIN_COUNT};
use crate::{check_counts, AnalyzeError};

/// The deduplicated sequences of one fitness bin.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SequenceBin {
    pub bin: usize,
    #[serde(rename = "uniqueSequences")]
    pub unique_sequences: usize,
    pub sequences: Vec<Vec<String>>,
}

/// A single trace's activity sequence, labeled for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TraceSequence {
    pub trace: String,
    pub sequence: Vec<String>,
}

/// Deduplicate activity sequences within each fitness bin.
pub fn unique_sequences_per_bin(
    log: &EventLog,
    results: &[AlignmentResult],
) -> Result<Vec<SequenceBin>, AnalyzeError> {
    check_counts(log.traces.len(), results.len())?;

    let mut bins: Vec<BTreeSet<Vec<String>>> = vec![BTreeSet::new(); BIN_COUNT];
    for (trace, result) in log.traces.iter().zip(results) {
        let index = bin_index(result.fitness());
        bins[index].insert(trace.activity_sequence());
    }

    Ok(bins
        .into_iter()
        .enumerate()
        .map(|(bin, sequences)| SequenceBin {
            bin,
            unique_sequences: sequences.len(),
            sequences: sequences.into_iter().collect(),
        })
        .collect())
}

/// The ordered activity sequence of every trace, in log order.
pub fn trace_sequences(log: &EventLog) -> Vec<TraceSequence> {
    log.traces
        .iter()
        .enumerate()
        .map(|(i, trace)| TraceSequence {
            trace: format!("Trace {}", i + 1),
            sequence: trace.activity_sequence(),
        })
        .collect()
}
