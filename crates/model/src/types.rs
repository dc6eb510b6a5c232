//! Typed structs for the two artifact documents.
//!
//! These types cover exactly the fields the analytics layer consumes. Extra
//! fields in an artifact document are ignored on deserialization so newer
//! producers can add metadata without breaking older readers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Process model ───────────────────────────────────────────────────

/// A named unit of work in the process model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
}

/// A terminal event of the process model.
///
/// `error` marks failure-typed terminals; only non-error terminals
/// contribute to the desired-outcome set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndEvent {
    pub id: String,
    #[serde(default)]
    pub error: bool,
}

/// A directed control-flow edge between two model nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceFlow {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// The reference process model (as-designed).
///
/// Nodes that appear only in `flows` (start events, gateways) carry no
/// declaration of their own; they become silent transitions in the net.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessModel {
    pub id: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub end_events: Vec<EndEvent>,
    #[serde(default)]
    pub flows: Vec<SequenceFlow>,
}

impl ProcessModel {
    /// Look up a task by node id.
    pub fn task_by_id(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// All control-flow edges whose target is the given node.
    pub fn incoming_flows<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a SequenceFlow> {
        self.flows.iter().filter(move |f| f.target == node)
    }
}

// ── Event log ───────────────────────────────────────────────────────

/// A single recorded event within a trace.
///
/// `activity` is required for any sequence or outcome analysis; events
/// without one are skipped by those aggregators, never rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

/// One complete recorded execution of a process instance.
///
/// Identity is the trace's 0-based position in the log; that index is the
/// sole join key to alignment results and must never be re-sorted
/// independently of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Trace {
    /// Trace-level attributes, e.g. a monetary amount. Values are kept as
    /// raw JSON because producers disagree on string vs number encoding.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Trace {
    /// The activity name of the trace's last event, if any.
    pub fn last_activity(&self) -> Option<&str> {
        self.events.last().and_then(|e| e.activity.as_deref())
    }

    /// The ordered activity-name sequence; unnamed events are dropped.
    pub fn activity_sequence(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| e.activity.clone())
            .collect()
    }
}

/// The observed event log (as-executed): an ordered list of traces.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventLog {
    #[serde(default)]
    pub traces: Vec<Trace>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_lookup() {
        let model = ProcessModel {
            id: "m".to_string(),
            tasks: vec![Task {
                id: "t1".to_string(),
                name: "Approve".to_string(),
            }],
            end_events: vec![],
            flows: vec![],
        };
        assert_eq!(model.task_by_id("t1").unwrap().name, "Approve");
        assert!(model.task_by_id("t2").is_none());
    }

    #[test]
    fn test_incoming_flows() {
        let model = ProcessModel {
            id: "m".to_string(),
            tasks: vec![],
            end_events: vec![],
            flows: vec![
                SequenceFlow {
                    id: "f1".to_string(),
                    source: "a".to_string(),
                    target: "b".to_string(),
                },
                SequenceFlow {
                    id: "f2".to_string(),
                    source: "c".to_string(),
                    target: "b".to_string(),
                },
            ],
        };
        let incoming: Vec<&str> = model.incoming_flows("b").map(|f| f.id.as_str()).collect();
        assert_eq!(incoming, vec!["f1", "f2"]);
        assert_eq!(model.incoming_flows("a").count(), 0);
    }

    #[test]
    fn test_last_activity_skips_nothing() {
        let trace = Trace {
            attributes: BTreeMap::new(),
            events: vec![
                Event {
                    activity: Some("Submit".to_string()),
                    ..Default::default()
                },
                Event {
                    activity: None,
                    ..Default::default()
                },
            ],
        };
        // The last event has no name; last_activity reflects that, it does
        // not search backwards.
        assert_eq!(trace.last_activity(), None);
    }

    #[test]
    fn test_activity_sequence_drops_unnamed() {
        let trace = Trace {
            attributes: BTreeMap::new(),
            events: vec![
                Event {
                    activity: Some("Submit".to_string()),
                    ..Default::default()
                },
                Event {
                    activity: None,
                    role: Some("Clerk".to_string()),
                    ..Default::default()
                },
                Event {
                    activity: Some("Approve".to_string()),
                    ..Default::default()
                },
            ],
        };
        assert_eq!(trace.activity_sequence(), vec!["Submit", "Approve"]);
    }
}
