//! Alignment provider: artifact references in, ordered results out.
//!
//! The provider validates that both referenced artifacts exist, loads them,
//! converts the model to its net, and delegates the search to an
//! [`AlignmentEngine`](crate::engine::AlignmentEngine). Its only contracts
//! are input-existence validation and order preservation: `results[i]`
//! belongs to `log.traces[i]`.

use std::path::Path;

use conforma_model::{read_log, read_model, EventLog, ProcessModel};

use crate::engine::{AlignError, AlignmentEngine};
use crate::result::AlignmentResult;

/// The loaded artifact pair together with its alignment.
///
/// Server handlers need all three to run an analytic; bundling them keeps
/// the (trace index -> result index) join key intact.
#[derive(Debug, Clone)]
pub struct AlignedArtifacts {
    pub model: ProcessModel,
    pub log: EventLog,
    pub results: Vec<AlignmentResult>,
}

/// Align the referenced log against the referenced model.
///
/// Returns one result per trace, in log order. Fails with a `NotFound`-kind
/// error when either path is absent and a `Parse`-kind error when either
/// document is malformed.
pub fn align_artifacts(
    model_path: &Path,
    log_path: &Path,
    engine: &dyn AlignmentEngine,
) -> Result<Vec<AlignmentResult>, AlignError> {
    Ok(load_and_align(model_path, log_path, engine)?.results)
}

/// Like [`align_artifacts`], but also hands back the parsed artifacts.
pub fn load_and_align(
    model_path: &Path,
    log_path: &Path,
    engine: &dyn AlignmentEngine,
) -> Result<AlignedArtifacts, AlignError> {
    let model = read_model(model_path)?;
    let log = read_log(log_path)?;

    let (net, initial, final_marking) = model.to_net();
    let results = engine.align(&net, &initial, &final_marking, &log)?;

    Ok(AlignedArtifacts {
        model,
        log,
        results,
    })
}
