//! Per-trace alignment result.

use serde::{Deserialize, Serialize};

/// The outcome of aligning one trace against the model.
///
/// Produced 1:1 and order-preserving with the log's traces; `results[i]`
/// corresponds to `traces[i]` and the two lists must never be re-sorted
/// independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlignmentResult {
    /// Fitness in [0, 1]; 1.0 = perfect replay. `None` when an engine
    /// omits the score -- consumers treat that as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness: Option<f64>,
    /// Total cost of the optimal alignment.
    #[serde(default)]
    pub cost: u64,
}

impl AlignmentResult {
    /// The fitness value this result contributes to aggregation:
    /// defaulted to 0 when absent, clamped to [0, 1] otherwise.
    pub fn fitness(&self) -> f64 {
        self.fitness.unwrap_or(0.0).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fitness_defaults_to_zero() {
        let result = AlignmentResult {
            fitness: None,
            cost: 3,
        };
        assert_eq!(result.fitness(), 0.0);
    }

    #[test]
    fn test_out_of_range_fitness_is_clamped() {
        let high = AlignmentResult {
            fitness: Some(1.2),
            cost: 0,
        };
        let low = AlignmentResult {
            fitness: Some(-0.1),
            cost: 9,
        };
        assert_eq!(high.fitness(), 1.0);
        assert_eq!(low.fitness(), 0.0);
    }
}
