//! Alignment engines.
//!
//! [`AlignmentEngine`] is the collaborator contract: (net, initial marking,
//! final marking, log) -> ordered list of per-trace results. The default
//! implementation, [`MarkingSearchEngine`], runs a uniform-cost search over
//! the synchronous product of net markings and trace positions.
//!
//! Move costs: a synchronous move (enabled transition whose label matches
//! the next trace activity) is free; a log-only move costs 1; a model-only
//! move costs 1 for labeled transitions and 0 for silent ones. Fitness is
//! `1 - cost / worst`, where `worst` is the cost of the alignment that
//! discards the whole trace and replays the cheapest model path.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use conforma_model::{EventLog, Marking, Net};

use crate::result::AlignmentResult;

/// All errors an alignment engine can return.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// A referenced artifact could not be loaded.
    #[error(transparent)]
    Artifact(#[from] conforma_model::ArtifactError),

    /// The net admits no path from the initial to the final marking, so no
    /// trace can be aligned against it.
    #[error("the final marking is unreachable from the initial marking")]
    FinalMarkingUnreachable,

    /// The search expanded more states than the configured budget allows.
    #[error("alignment search exceeded the state budget of {budget} states")]
    SearchBudgetExceeded { budget: usize },
}

/// Computes cost-optimal alignments for a whole log.
///
/// Implementations must return exactly one result per trace, in log order.
pub trait AlignmentEngine {
    fn align(
        &self,
        net: &Net,
        initial: &Marking,
        final_marking: &Marking,
        log: &EventLog,
    ) -> Result<Vec<AlignmentResult>, AlignError>;
}

/// Default engine: uniform-cost (Dijkstra) search over (marking, position)
/// states.
///
/// The nets produced by `ProcessModel::to_net` keep a constant token count,
/// so the reachable state space is small; `max_states` bounds the search
/// anyway so a pathological input fails the request instead of hanging it.
pub struct MarkingSearchEngine {
    max_states: usize,
}

/// Default per-trace state budget.
const DEFAULT_MAX_STATES: usize = 100_000;

impl MarkingSearchEngine {
    pub fn new(max_states: usize) -> Self {
        Self { max_states }
    }
}

impl Default for MarkingSearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STATES)
    }
}

impl AlignmentEngine for MarkingSearchEngine {
    fn align(
        &self,
        net: &Net,
        initial: &Marking,
        final_marking: &Marking,
        log: &EventLog,
    ) -> Result<Vec<AlignmentResult>, AlignError> {
        // Cost of replaying the cheapest model path with an empty trace.
        // Computed once; it is both the feasibility check and the
        // normalization baseline for every trace.
        let model_only_cost = match cheapest_alignment(net, initial, final_marking, &[], self.max_states) {
            Ok(cost) => cost,
            Err(SearchFailure::Unreachable) => return Err(AlignError::FinalMarkingUnreachable),
            Err(SearchFailure::BudgetExceeded) => {
                return Err(AlignError::SearchBudgetExceeded {
                    budget: self.max_states,
                })
            }
        };

        let mut results = Vec::with_capacity(log.traces.len());
        for trace in &log.traces {
            let activities = trace.activity_sequence();
            let cost = match cheapest_alignment(net, initial, final_marking, &activities, self.max_states)
            {
                Ok(cost) => cost,
                Err(SearchFailure::Unreachable) => return Err(AlignError::FinalMarkingUnreachable),
                Err(SearchFailure::BudgetExceeded) => {
                    return Err(AlignError::SearchBudgetExceeded {
                        budget: self.max_states,
                    })
                }
            };

            let worst = activities.len() as u64 + model_only_cost;
            let fitness = if worst == 0 {
                1.0
            } else {
                1.0 - cost as f64 / worst as f64
            };
            results.push(AlignmentResult {
                fitness: Some(fitness.clamp(0.0, 1.0)),
                cost,
            });
        }
        Ok(results)
    }
}

enum SearchFailure {
    Unreachable,
    BudgetExceeded,
}

/// Uniform-cost search for the cheapest alignment of `activities` against
/// the net. States are (marking, position-in-trace) pairs; the goal is the
/// final marking with the whole trace consumed.
fn cheapest_alignment(
    net: &Net,
    initial: &Marking,
    final_marking: &Marking,
    activities: &[String],
    max_states: usize,
) -> Result<u64, SearchFailure> {
    type State = (Marking, usize);

    fn push(
        state: State,
        cost: u64,
        best: &mut HashMap<State, u64>,
        states: &mut Vec<State>,
        heap: &mut BinaryHeap<(Reverse<u64>, usize)>,
    ) {
        let known = best.get(&state).copied();
        if known.map_or(true, |k| cost < k) {
            best.insert(state.clone(), cost);
            states.push(state);
            heap.push((Reverse(cost), states.len() - 1));
        }
    }

    let mut best: HashMap<State, u64> = HashMap::new();
    let mut heap: BinaryHeap<(Reverse<u64>, usize)> = BinaryHeap::new();
    let mut states: Vec<State> = Vec::new();

    let start: State = (initial.clone(), 0);
    best.insert(start.clone(), 0);
    states.push(start);
    heap.push((Reverse(0), 0));

    let mut expanded = 0usize;

    while let Some((Reverse(cost), idx)) = heap.pop() {
        let (marking, pos) = states[idx].clone();

        // Stale heap entry: a cheaper route to this state was found after
        // this entry was pushed.
        if best.get(&(marking.clone(), pos)).copied() != Some(cost) {
            continue;
        }

        if marking == *final_marking && pos == activities.len() {
            return Ok(cost);
        }

        expanded += 1;
        if expanded > max_states {
            return Err(SearchFailure::BudgetExceeded);
        }

        // Log-only move: skip the next trace activity.
        if pos < activities.len() {
            push(
                (marking.clone(), pos + 1),
                cost + 1,
                &mut best,
                &mut states,
                &mut heap,
            );
        }

        for t in 0..net.transitions.len() {
            if !net.is_enabled(&marking, t) {
                continue;
            }
            let fired = net.fire(&marking, t);
            let label = net.transitions[t].label.as_deref();

            // Model-only move: silent transitions are free.
            let move_cost = if label.is_some() { 1 } else { 0 };
            push(
                (fired.clone(), pos),
                cost + move_cost,
                &mut best,
                &mut states,
                &mut heap,
            );

            // Synchronous move: label matches the next trace activity.
            if pos < activities.len() && label == Some(activities[pos].as_str()) {
                push((fired, pos + 1), cost, &mut best, &mut states, &mut heap);
            }
        }
    }

    Err(SearchFailure::Unreachable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conforma_model::{EndEvent, Event, EventLog, ProcessModel, SequenceFlow, Task, Trace};

    fn linear_model() -> ProcessModel {
        // start -> Submit -> Approve -> end
        ProcessModel {
            id: "linear".to_string(),
            tasks: vec![
                Task {
                    id: "t_submit".to_string(),
                    name: "Submit".to_string(),
                },
                Task {
                    id: "t_approve".to_string(),
                    name: "Approve".to_string(),
                },
            ],
            end_events: vec![EndEvent {
                id: "end".to_string(),
                error: false,
            }],
            flows: vec![
                SequenceFlow {
                    id: "f1".to_string(),
                    source: "start".to_string(),
                    target: "t_submit".to_string(),
                },
                SequenceFlow {
                    id: "f2".to_string(),
                    source: "t_submit".to_string(),
                    target: "t_approve".to_string(),
                },
                SequenceFlow {
                    id: "f3".to_string(),
                    source: "t_approve".to_string(),
                    target: "end".to_string(),
                },
            ],
        }
    }

    fn trace_of(activities: &[&str]) -> Trace {
        Trace {
            attributes: Default::default(),
            events: activities
                .iter()
                .map(|a| Event {
                    activity: Some(a.to_string()),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn align_one(model: &ProcessModel, trace: Trace) -> AlignmentResult {
        let (net, initial, final_marking) = model.to_net();
        let log = EventLog {
            traces: vec![trace],
        };
        let engine = MarkingSearchEngine::default();
        engine
            .align(&net, &initial, &final_marking, &log)
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_perfect_trace_has_fitness_one() {
        let result = align_one(&linear_model(), trace_of(&["Submit", "Approve"]));
        assert_eq!(result.cost, 0);
        assert_eq!(result.fitness(), 1.0);
    }

    #[test]
    fn test_missing_activity_costs_one_model_move() {
        // Trace skips Approve: one labeled model move. worst = 1 + 2.
        let result = align_one(&linear_model(), trace_of(&["Submit"]));
        assert_eq!(result.cost, 1);
        let expected = 1.0 - 1.0 / 3.0;
        assert!((result.fitness() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_alien_activity_costs_one_log_move() {
        let result = align_one(&linear_model(), trace_of(&["Submit", "Archive", "Approve"]));
        assert_eq!(result.cost, 1);
        let expected = 1.0 - 1.0 / 5.0;
        assert!((result.fitness() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_trace_replays_model_only() {
        // Both labeled tasks must be inserted: cost 2, worst 2 -> fitness 0.
        let result = align_one(&linear_model(), trace_of(&[]));
        assert_eq!(result.cost, 2);
        assert_eq!(result.fitness(), 0.0);
    }

    #[test]
    fn test_empty_log_yields_no_results() {
        let (net, initial, final_marking) = linear_model().to_net();
        let engine = MarkingSearchEngine::default();
        let results = engine
            .align(&net, &initial, &final_marking, &EventLog::default())
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_results_preserve_log_order() {
        let (net, initial, final_marking) = linear_model().to_net();
        let log = EventLog {
            traces: vec![
                trace_of(&["Submit", "Approve"]),
                trace_of(&[]),
                trace_of(&["Submit"]),
            ],
        };
        let engine = MarkingSearchEngine::default();
        let results = engine.align(&net, &initial, &final_marking, &log).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].fitness(), 1.0);
        assert_eq!(results[1].fitness(), 0.0);
        assert!(results[2].fitness() > 0.0 && results[2].fitness() < 1.0);
    }

    #[test]
    fn test_disconnected_model_is_unreachable() {
        let model = ProcessModel {
            id: "disconnected".to_string(),
            tasks: vec![],
            end_events: vec![],
            flows: vec![],
        };
        let (net, initial, final_marking) = model.to_net();
        let engine = MarkingSearchEngine::default();
        let err = engine
            .align(&net, &initial, &final_marking, &EventLog::default())
            .unwrap_err();
        assert!(matches!(err, AlignError::FinalMarkingUnreachable));
    }

    #[test]
    fn test_unnamed_events_do_not_count_against_fitness() {
        let mut trace = trace_of(&["Submit", "Approve"]);
        trace.events.insert(
            1,
            Event {
                activity: None,
                role: Some("Clerk".to_string()),
                ..Default::default()
            },
        );
        let result = align_one(&linear_model(), trace);
        assert_eq!(result.cost, 0);
        assert_eq!(result.fitness(), 1.0);
    }

    #[test]
    fn test_tiny_state_budget_fails_loudly() {
        let engine = MarkingSearchEngine::new(1);
        let (net, initial, final_marking) = linear_model().to_net();
        let log = EventLog {
            traces: vec![trace_of(&["Submit"])],
        };
        let err = engine.align(&net, &initial, &final_marking, &log).unwrap_err();
        assert!(matches!(err, AlignError::SearchBudgetExceeded { .. }));
    }
}
