//! Fitness histogram over 10 fixed-width bins.
//!
//! Bin `i` covers `[i/10, (i+1)/10)`; bin 9 additionally absorbs fitness
//! exactly 1.0 via the min-clamp in [`bin_index`], so no input can land
//! outside `[0, 9]`.

use serde::Serialize;

use crate::fitness::TraceConformance;
use crate::round4;

/// Number of fixed-width fitness bins.
pub const BIN_COUNT: usize = 10;

/// The bin a fitness value falls into: `min(floor(f * 10), 9)`.
pub fn bin_index(fitness: f64) -> usize {
    let f = fitness.clamp(0.0, 1.0);
    ((f * BIN_COUNT as f64).floor() as usize).min(BIN_COUNT - 1)
}

/// One histogram bucket.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConformanceBin {
    /// Mean fitness of the bin's traces; 0 for an empty bin.
    #[serde(rename = "averageConformance")]
    pub average_conformance: f64,
    #[serde(rename = "traceCount")]
    pub trace_count: usize,
}

/// Partition fitness values into the 10 bins and average each.
///
/// Two passes: accumulate sum and count, then divide where the count is
/// positive. Empty bins report average 0, never a division by zero.
pub fn conformance_bins(fitness_data: &[TraceConformance]) -> Vec<ConformanceBin> {
    let mut sums = [0.0_f64; BIN_COUNT];
    let mut counts = [0_usize; BIN_COUNT];

    for item in fitness_data {
        let index = bin_index(item.conformance);
        sums[index] += item.conformance;
        counts[index] += 1;
    }

    (0..BIN_COUNT)
        .map(|i| ConformanceBin {
            average_conformance: if counts[i] > 0 {
                round4(sums[i] / counts[i] as f64)
            } else {
                0.0
            },
            trace_count: counts[i],
        })
        .collect()
}
