//! ConformanceReport -- aggregated output across the analytics suite.
//!
//! The report collects the result of each requested analytic into one
//! serializable structure. Analytics that were not requested stay `None`
//! and are omitted from the JSON.

use conforma_align::AlignmentResult;
use conforma_model::{EventLog, ProcessModel};
use serde::Serialize;

use crate::bins::{conformance_bins, ConformanceBin};
use crate::dimensions::{
    amount_correlation, conformance_by_resource, conformance_by_role, AmountConformance,
    CategoryConformance,
};
use crate::fitness::{fitness_per_trace, TraceConformance};
use crate::outcomes::{outcome_distribution, OutcomeDistribution};
use crate::sequences::{unique_sequences_per_bin, SequenceBin};
use crate::{check_counts, AnalyzeError};

/// Valid analysis selectors, in execution order.
pub const ANALYSES: [&str; 7] = [
    "fitness",
    "bins",
    "outcomes",
    "roles",
    "resources",
    "amounts",
    "sequences",
];

/// Aggregated conformance report over one (model, log, alignment) triple.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConformanceReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitness: Option<Vec<TraceConformance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<Vec<ConformanceBin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<OutcomeDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<CategoryConformance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<CategoryConformance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amounts: Option<Vec<AmountConformance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequences: Option<Vec<SequenceBin>>,
    pub analyses_run: Vec<String>,
}

impl ConformanceReport {
    fn empty() -> Self {
        ConformanceReport {
            fitness: None,
            bins: None,
            outcomes: None,
            roles: None,
            resources: None,
            amounts: None,
            sequences: None,
            analyses_run: Vec::new(),
        }
    }
}

/// Run every analytic.
pub fn run_full_report(
    model: &ProcessModel,
    log: &EventLog,
    results: &[AlignmentResult],
) -> Result<ConformanceReport, AnalyzeError> {
    let selected: Vec<&str> = ANALYSES.to_vec();
    run_report(model, log, results, &selected)
}

/// Run the requested analytics and aggregate their results.
///
/// `selected` entries must come from [`ANALYSES`]; an unknown selector is
/// rejected up front so a typo does not silently produce a thinner report.
pub fn run_report(
    model: &ProcessModel,
    log: &EventLog,
    results: &[AlignmentResult],
    selected: &[&str],
) -> Result<ConformanceReport, AnalyzeError> {
    check_counts(log.traces.len(), results.len())?;
    for name in selected {
        if !ANALYSES.contains(name) {
            return Err(AnalyzeError::UnknownAnalysis {
                name: name.to_string(),
            });
        }
    }

    let mut report = ConformanceReport::empty();

    // The histogram consumes the fitness projection, so compute it when
    // either analytic was requested.
    let fitness_data = if selected.contains(&"fitness") || selected.contains(&"bins") {
        Some(fitness_per_trace(results))
    } else {
        None
    };

    if selected.contains(&"bins") {
        report.bins = fitness_data.as_deref().map(conformance_bins);
        report.analyses_run.push("bins".to_string());
    }
    if selected.contains(&"fitness") {
        report.fitness = fitness_data;
        report.analyses_run.push("fitness".to_string());
    }
    if selected.contains(&"outcomes") {
        report.outcomes = Some(outcome_distribution(model, log, results)?);
        report.analyses_run.push("outcomes".to_string());
    }
    if selected.contains(&"roles") {
        report.roles = Some(conformance_by_role(log, results)?);
        report.analyses_run.push("roles".to_string());
    }
    if selected.contains(&"resources") {
        report.resources = Some(conformance_by_resource(log, results)?);
        report.analyses_run.push("resources".to_string());
    }
    if selected.contains(&"amounts") {
        report.amounts = Some(amount_correlation(log, results)?);
        report.analyses_run.push("amounts".to_string());
    }
    if selected.contains(&"sequences") {
        report.sequences = Some(unique_sequences_per_bin(log, results)?);
        report.analyses_run.push("sequences".to_string());
    }

    report.analyses_run.sort();
    Ok(report)
}
