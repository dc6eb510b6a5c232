//! Conversion of a process model into a verification-ready net.
//!
//! The net is the executable graph representation consumed by the alignment
//! engine: one place per sequence flow plus a dedicated source and sink
//! place, and one or more transitions per model node. Tasks become labeled
//! transitions (label = task display name); start events, end events, and
//! any node declared only by the flows that touch it become silent
//! transitions.
//!
//! Routing is exclusive: a node with several incoming or outgoing flows is
//! expanded into one transition variant per (incoming, outgoing) pair, so
//! each firing consumes exactly one token and produces exactly one token.
//! The artifact format carries no gateway typing, so exclusive routing is
//! the only interpretation available from the data.

use std::collections::BTreeSet;

use crate::types::ProcessModel;

/// A transition of the net. `label` is `None` for silent transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetTransition {
    pub id: String,
    pub label: Option<String>,
    /// Input place indices into `Net::places`.
    pub inputs: Vec<usize>,
    /// Output place indices into `Net::places`.
    pub outputs: Vec<usize>,
}

/// A place/transition net derived from a process model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Net {
    pub places: Vec<String>,
    pub transitions: Vec<NetTransition>,
}

/// A token distribution over the places of a [`Net`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marking(Vec<u32>);

impl Marking {
    /// The empty marking over `place_count` places.
    pub fn empty(place_count: usize) -> Self {
        Marking(vec![0; place_count])
    }

    /// Builder: add one token at `place`.
    pub fn with_token(mut self, place: usize) -> Self {
        self.0[place] += 1;
        self
    }

    /// Token count at `place`.
    pub fn tokens(&self, place: usize) -> u32 {
        self.0[place]
    }
}

impl Net {
    /// Whether transition `t` is enabled under `marking`.
    pub fn is_enabled(&self, marking: &Marking, t: usize) -> bool {
        self.transitions[t]
            .inputs
            .iter()
            .all(|&p| marking.tokens(p) > 0)
    }

    /// Fire transition `t`, producing the successor marking.
    ///
    /// Callers must check [`Net::is_enabled`] first; firing a disabled
    /// transition would underflow a token count.
    pub fn fire(&self, marking: &Marking, t: usize) -> Marking {
        let mut tokens = marking.0.clone();
        for &p in &self.transitions[t].inputs {
            tokens[p] -= 1;
        }
        for &p in &self.transitions[t].outputs {
            tokens[p] += 1;
        }
        Marking(tokens)
    }
}

impl ProcessModel {
    /// Convert the model to a net with its initial and final marking.
    pub fn to_net(&self) -> (Net, Marking, Marking) {
        // Every node id mentioned anywhere in the model, in deterministic order.
        let mut nodes: BTreeSet<&str> = BTreeSet::new();
        for task in &self.tasks {
            nodes.insert(&task.id);
        }
        for end in &self.end_events {
            nodes.insert(&end.id);
        }
        for flow in &self.flows {
            nodes.insert(&flow.source);
            nodes.insert(&flow.target);
        }

        let mut places: Vec<String> = self.flows.iter().map(|f| f.id.clone()).collect();
        let source_place = places.len();
        places.push("__source".to_string());
        let sink_place = places.len();
        places.push("__sink".to_string());

        let mut transitions = Vec::new();
        for node in nodes {
            let ins: Vec<usize> = self
                .flows
                .iter()
                .enumerate()
                .filter(|(_, f)| f.target == node)
                .map(|(i, _)| i)
                .collect();
            let outs: Vec<usize> = self
                .flows
                .iter()
                .enumerate()
                .filter(|(_, f)| f.source == node)
                .map(|(i, _)| i)
                .collect();

            // Nodes with no incoming flow consume the source token; nodes
            // with no outgoing flow produce the sink token.
            let in_opts = if ins.is_empty() { vec![source_place] } else { ins };
            let out_opts = if outs.is_empty() { vec![sink_place] } else { outs };

            let label = self.task_by_id(node).map(|t| t.name.clone());
            let single = in_opts.len() == 1 && out_opts.len() == 1;

            let mut variant = 0;
            for &input in &in_opts {
                for &output in &out_opts {
                    let id = if single {
                        node.to_string()
                    } else {
                        format!("{}#{}", node, variant)
                    };
                    transitions.push(NetTransition {
                        id,
                        label: label.clone(),
                        inputs: vec![input],
                        outputs: vec![output],
                    });
                    variant += 1;
                }
            }
        }

        let place_count = places.len();
        let net = Net { places, transitions };
        let initial = Marking::empty(place_count).with_token(source_place);
        let final_marking = Marking::empty(place_count).with_token(sink_place);
        (net, initial, final_marking)
    }
}
