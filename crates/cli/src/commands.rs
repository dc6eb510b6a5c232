//! `conforma align` and `conforma analyze` command implementations.

use std::path::Path;
use std::process;

use conforma_align::{load_and_align, MarkingSearchEngine};
use conforma_analyze::{fitness_per_trace, run_report, ANALYSES};

use crate::report_error;

/// Align the log against the model and print per-trace fitness as JSON.
pub(crate) fn cmd_align(model: &Path, log: &Path, quiet: bool) {
    let engine = MarkingSearchEngine::default();
    let aligned = match load_and_align(model, log, &engine) {
        Ok(aligned) => aligned,
        Err(e) => {
            report_error(&e.to_string(), quiet);
            process::exit(1);
        }
    };

    let fitness = fitness_per_trace(&aligned.results);
    match serde_json::to_string_pretty(&fitness) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            report_error(&format!("failed to serialize output: {}", e), quiet);
            process::exit(1);
        }
    }
}

/// Run the selected analytics and print the aggregated report as JSON.
pub(crate) fn cmd_analyze(model: &Path, log: &Path, analysis: Option<&str>, quiet: bool) {
    let selected: Vec<&str> = match analysis {
        Some(list) => {
            let selected: Vec<&str> = list.split(',').map(str::trim).collect();
            for name in &selected {
                if !ANALYSES.contains(name) {
                    report_error(
                        &format!("invalid analysis '{}'. Valid: {}", name, ANALYSES.join(", ")),
                        quiet,
                    );
                    process::exit(1);
                }
            }
            selected
        }
        None => ANALYSES.to_vec(),
    };

    let engine = MarkingSearchEngine::default();
    let aligned = match load_and_align(model, log, &engine) {
        Ok(aligned) => aligned,
        Err(e) => {
            report_error(&e.to_string(), quiet);
            process::exit(1);
        }
    };

    let report = match run_report(&aligned.model, &aligned.log, &aligned.results, &selected) {
        Ok(report) => report,
        Err(e) => {
            report_error(&format!("analysis error: {}", e), quiet);
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            report_error(&format!("failed to serialize output: {}", e), quiet);
            process::exit(1);
        }
    }
}
