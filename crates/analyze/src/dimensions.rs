//! Conformance broken down by trace/event attributes.
//!
//! Categorical grouping (role, resource) attributes a trace's fitness once
//! to every DISTINCT value it touches: a trace with three events under the
//! same role contributes one sample to that role, not three. Numeric
//! correlation (requested amount) pairs each trace's fitness with a
//! trace-level amount attribute, skipping traces that carry none.

use std::collections::{BTreeMap, BTreeSet};

use conforma_align::AlignmentResult;
use conforma_model::{Event, EventLog};
use serde::Serialize;

use crate::{check_counts, round4, AnalyzeError};

/// Trace-level attribute keys accepted for the monetary amount, in
/// fallback order.
const AMOUNT_KEYS: [&str; 2] = ["RequestedAmount", "Amount"];

/// Mean fitness and sample count for one category value.
///
/// Role and resource aggregation share this shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryConformance {
    pub value: String,
    #[serde(rename = "averageConformance")]
    pub average_conformance: f64,
    #[serde(rename = "traceCount")]
    pub trace_count: usize,
}

/// One (fitness, amount) sample for the correlation scatter plot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AmountConformance {
    pub conformance: f64,
    pub requested_amount: f64,
}

/// Mean fitness per organizational role.
pub fn conformance_by_role(
    log: &EventLog,
    results: &[AlignmentResult],
) -> Result<Vec<CategoryConformance>, AnalyzeError> {
    conformance_by_category(log, results, |event| event.role.as_deref())
}

/// Mean fitness per resource.
pub fn conformance_by_resource(
    log: &EventLog,
    results: &[AlignmentResult],
) -> Result<Vec<CategoryConformance>, AnalyzeError> {
    conformance_by_category(log, results, |event| event.resource.as_deref())
}

/// Shared categorical aggregation. `select` projects the attribute under
/// analysis out of an event; events where it is absent are skipped.
fn conformance_by_category<F>(
    log: &EventLog,
    results: &[AlignmentResult],
    select: F,
) -> Result<Vec<CategoryConformance>, AnalyzeError>
where
    F: Fn(&Event) -> Option<&str>,
{
    check_counts(log.traces.len(), results.len())?;

    // value -> (fitness sum, sample count); BTreeMap keeps output stable.
    let mut grouped: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for (trace, result) in log.traces.iter().zip(results) {
        let distinct: BTreeSet<&str> = trace.events.iter().filter_map(&select).collect();
        for value in distinct {
            let entry = grouped.entry(value.to_string()).or_insert((0.0, 0));
            entry.0 += result.fitness();
            entry.1 += 1;
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(value, (sum, count))| CategoryConformance {
            value,
            average_conformance: round4(sum / count as f64),
            trace_count: count,
        })
        .collect())
}

/// Fitness vs requested amount, one entry per trace carrying a usable
/// amount.
///
/// The primary key is tried first; the secondary only when the primary is
/// absent. A trace whose value is missing or not numeric is excluded from
/// the result -- a malformed record never aborts the batch.
pub fn amount_correlation(
    log: &EventLog,
    results: &[AlignmentResult],
) -> Result<Vec<AmountConformance>, AnalyzeError> {
    check_counts(log.traces.len(), results.len())?;

    let mut samples = Vec::new();
    for (trace, result) in log.traces.iter().zip(results) {
        let value = AMOUNT_KEYS
            .iter()
            .find_map(|key| trace.attributes.get(*key));
        let amount = match value.and_then(parse_amount) {
            Some(amount) => amount,
            None => continue,
        };
        samples.push(AmountConformance {
            conformance: round4(result.fitness()),
            requested_amount: amount,
        });
    }
    Ok(samples)
}

/// Accept a JSON number, or a string that parses as a finite number.
fn parse_amount(value: &serde_json::Value) -> Option<f64> {
    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    amount.is_finite().then_some(amount)
}
