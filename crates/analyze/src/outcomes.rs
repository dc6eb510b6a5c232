//! Outcome correctness per fitness bin.
//!
//! Step 1 derives the desired-outcome set from the model: the display names
//! of tasks that immediately precede a non-error terminal event. Step 2
//! judges each trace by its last activity and reports, per fitness bin, the
//! percentage of traces that ended in a desired activity.

use std::collections::BTreeSet;

use conforma_align::AlignmentResult;
use conforma_model::{EventLog, ProcessModel};
use serde::Serialize;

use crate::bins::{bin_index, BIN_COUNT};
use crate::{check_counts, round2, AnalyzeError};

/// One fitness bin enriched with outcome correctness.
///
/// The internal correct-ending counter is never exposed; the bin is built
/// once from the final numbers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutcomeBin {
    /// Fitness range `[lo, hi)` covered by this bin.
    pub range: [f64; 2],
    #[serde(rename = "traceCount")]
    pub trace_count: usize,
    /// Percentage of the bin's traces ending in a desired activity,
    /// rounded to 2 decimal places; 0.0 for an empty bin.
    #[serde(rename = "percentageEndingCorrectly")]
    pub percentage_ending_correctly: f64,
}

/// The desired-outcome set alongside the enriched bins.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutcomeDistribution {
    #[serde(rename = "desiredOutcomes")]
    pub desired_outcomes: Vec<String>,
    pub bins: Vec<OutcomeBin>,
}

/// Derive the set of task names that precede a non-error terminal event.
///
/// Error-typed terminals contribute nothing. A terminal without an incoming
/// flow, or whose incoming flow starts at something other than a task, is
/// silently skipped. Duplicate names across terminals collapse.
pub fn desired_outcomes(model: &ProcessModel) -> BTreeSet<String> {
    let mut outcomes = BTreeSet::new();
    for end in &model.end_events {
        if end.error {
            continue;
        }
        for flow in model.incoming_flows(&end.id) {
            if let Some(task) = model.task_by_id(&flow.source) {
                outcomes.insert(task.name.clone());
            }
        }
    }
    outcomes
}

/// Per-bin ratio of traces ending in a desired activity.
///
/// Traces with no events, or whose last event carries no activity name,
/// are skipped entirely -- they appear in neither the bin's trace count
/// nor its percentage.
pub fn outcome_distribution(
    model: &ProcessModel,
    log: &EventLog,
    results: &[AlignmentResult],
) -> Result<OutcomeDistribution, AnalyzeError> {
    check_counts(log.traces.len(), results.len())?;

    let desired = desired_outcomes(model);

    let mut trace_counts = [0_usize; BIN_COUNT];
    let mut correct_counts = [0_usize; BIN_COUNT];

    for (trace, result) in log.traces.iter().zip(results) {
        let last_activity = match trace.last_activity() {
            Some(activity) => activity,
            None => continue,
        };
        let index = bin_index(result.fitness());
        trace_counts[index] += 1;
        if desired.contains(last_activity) {
            correct_counts[index] += 1;
        }
    }

    let bins = (0..BIN_COUNT)
        .map(|i| OutcomeBin {
            range: [i as f64 / 10.0, (i + 1) as f64 / 10.0],
            trace_count: trace_counts[i],
            percentage_ending_correctly: if trace_counts[i] > 0 {
                round2(correct_counts[i] as f64 / trace_counts[i] as f64 * 100.0)
            } else {
                0.0
            },
        })
        .collect();

    Ok(OutcomeDistribution {
        desired_outcomes: desired.into_iter().collect(),
        bins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use conforma_model::{EndEvent, Event, SequenceFlow, Task, Trace};

    fn approval_model() -> ProcessModel {
        // Approve -> end (success), Reject -> end_error (error-typed)
        ProcessModel {
            id: "approval".to_string(),
            tasks: vec![
                Task {
                    id: "t_approve".to_string(),
                    name: "Approve".to_string(),
                },
                Task {
                    id: "t_reject".to_string(),
                    name: "Reject".to_string(),
                },
            ],
            end_events: vec![
                EndEvent {
                    id: "end_ok".to_string(),
                    error: false,
                },
                EndEvent {
                    id: "end_err".to_string(),
                    error: true,
                },
            ],
            flows: vec![
                SequenceFlow {
                    id: "f1".to_string(),
                    source: "t_approve".to_string(),
                    target: "end_ok".to_string(),
                },
                SequenceFlow {
                    id: "f2".to_string(),
                    source: "t_reject".to_string(),
                    target: "end_err".to_string(),
                },
            ],
        }
    }

    fn trace_ending_in(activity: &str) -> Trace {
        Trace {
            attributes: Default::default(),
            events: vec![Event {
                activity: Some(activity.to_string()),
                ..Default::default()
            }],
        }
    }

    fn result(fitness: f64) -> AlignmentResult {
        AlignmentResult {
            fitness: Some(fitness),
            cost: 0,
        }
    }

    #[test]
    fn test_desired_outcomes_skip_error_terminals() {
        let outcomes = desired_outcomes(&approval_model());
        let names: Vec<&str> = outcomes.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Approve"]);
    }

    #[test]
    fn test_terminal_without_incoming_edge_is_skipped() {
        let mut model = approval_model();
        model.end_events.push(EndEvent {
            id: "end_orphan".to_string(),
            error: false,
        });
        assert_eq!(desired_outcomes(&model).len(), 1);
    }

    #[test]
    fn test_terminal_fed_by_non_task_is_skipped() {
        let mut model = approval_model();
        model.end_events.push(EndEvent {
            id: "end_gw".to_string(),
            error: false,
        });
        model.flows.push(SequenceFlow {
            id: "f3".to_string(),
            source: "gateway_1".to_string(),
            target: "end_gw".to_string(),
        });
        assert_eq!(desired_outcomes(&model).len(), 1);
    }

    #[test]
    fn test_per_bin_percentages() {
        // Two traces ending correctly in bin 9, one ending wrong in bin 2.
        let log = EventLog {
            traces: vec![
                trace_ending_in("Approve"),
                trace_ending_in("Approve"),
                trace_ending_in("Reject"),
            ],
        };
        let results = vec![result(0.92), result(0.97), result(0.2)];

        let distribution = outcome_distribution(&approval_model(), &log, &results).unwrap();
        assert_eq!(distribution.desired_outcomes, vec!["Approve"]);

        let bins = &distribution.bins;
        assert_eq!(bins[9].trace_count, 2);
        assert_eq!(bins[9].percentage_ending_correctly, 100.0);
        assert_eq!(bins[2].trace_count, 1);
        assert_eq!(bins[2].percentage_ending_correctly, 0.0);
        for (i, bin) in bins.iter().enumerate() {
            if i != 2 && i != 9 {
                assert_eq!(bin.trace_count, 0);
                assert_eq!(bin.percentage_ending_correctly, 0.0);
            }
        }
    }

    #[test]
    fn test_bin_ranges() {
        let distribution =
            outcome_distribution(&approval_model(), &EventLog::default(), &[]).unwrap();
        assert_eq!(distribution.bins[0].range, [0.0, 0.1]);
        assert_eq!(distribution.bins[9].range, [0.9, 1.0]);
    }

    #[test]
    fn test_empty_trace_is_excluded() {
        let log = EventLog {
            traces: vec![Trace::default(), trace_ending_in("Approve")],
        };
        let results = vec![result(0.5), result(0.95)];

        let distribution = outcome_distribution(&approval_model(), &log, &results).unwrap();
        let total: usize = distribution.bins.iter().map(|b| b.trace_count).sum();
        assert_eq!(total, 1);
        assert_eq!(distribution.bins[5].trace_count, 0);
    }

    #[test]
    fn test_unnamed_last_event_is_excluded() {
        let log = EventLog {
            traces: vec![Trace {
                attributes: Default::default(),
                events: vec![Event {
                    activity: None,
                    role: Some("Clerk".to_string()),
                    ..Default::default()
                }],
            }],
        };
        let results = vec![result(0.95)];

        let distribution = outcome_distribution(&approval_model(), &log, &results).unwrap();
        assert_eq!(distribution.bins[9].trace_count, 0);
    }

    #[test]
    fn test_count_mismatch_is_fatal() {
        let log = EventLog {
            traces: vec![trace_ending_in("Approve")],
        };
        let err = outcome_distribution(&approval_model(), &log, &[]).unwrap_err();
        assert!(matches!(err, AnalyzeError::ResultCountMismatch { .. }));
    }
}
