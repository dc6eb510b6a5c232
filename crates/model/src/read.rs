//! Artifact readers: file path -> typed struct.
//!
//! The main entry points are [`read_model`] and [`read_log`]. Both check
//! path existence before touching the filesystem so that a missing artifact
//! surfaces as `NotFound`, not as an opaque I/O error. The `*_from_value`
//! variants deserialize an already-parsed JSON document (used by the upload
//! handler, which receives artifacts in the request body).

use std::path::Path;

use crate::error::ArtifactError;
use crate::types::{EventLog, ProcessModel};

/// Expected `kind` discriminator of a process model document.
const MODEL_KIND: &str = "ProcessModel";

/// Expected `kind` discriminator of an event log document.
const LOG_KIND: &str = "EventLog";

/// Read and deserialize a process model document.
pub fn read_model(path: &Path) -> Result<ProcessModel, ArtifactError> {
    let value = read_json(path)?;
    model_from_value(&value, &path.display().to_string())
}

/// Read and deserialize an event log document.
pub fn read_log(path: &Path) -> Result<EventLog, ArtifactError> {
    let value = read_json(path)?;
    log_from_value(&value, &path.display().to_string())
}

/// Deserialize a process model from a JSON value.
///
/// `origin` names the document in error messages (a file path, or the
/// upload field that carried it).
pub fn model_from_value(
    value: &serde_json::Value,
    origin: &str,
) -> Result<ProcessModel, ArtifactError> {
    check_kind(value, MODEL_KIND, origin)?;
    serde_json::from_value(value.clone()).map_err(|e| ArtifactError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

/// Deserialize an event log from a JSON value.
pub fn log_from_value(value: &serde_json::Value, origin: &str) -> Result<EventLog, ArtifactError> {
    check_kind(value, LOG_KIND, origin)?;
    serde_json::from_value(value.clone()).map_err(|e| ArtifactError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

fn read_json(path: &Path) -> Result<serde_json::Value, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| ArtifactError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ArtifactError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Reject a document whose `kind` discriminator names the other artifact.
///
/// A document without a `kind` field is accepted; the discriminator exists
/// to catch swapped model/log uploads early with a readable message.
fn check_kind(
    value: &serde_json::Value,
    expected: &str,
    origin: &str,
) -> Result<(), ArtifactError> {
    match value.get("kind").and_then(|k| k.as_str()) {
        Some(kind) if kind != expected => Err(ArtifactError::Parse {
            path: origin.to_string(),
            message: format!("expected kind '{}', found '{}'", expected, kind),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_read_model_missing_path_is_not_found() {
        let err = read_model(Path::new("/no/such/model.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound { .. }));
    }

    #[test]
    fn test_read_model_malformed_json_is_parse_error() {
        let file = write_temp("{ not json");
        let err = read_model(file.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn test_read_model_round_trip() {
        let file = write_temp(
            r#"{
                "kind": "ProcessModel",
                "id": "loan",
                "tasks": [{"id": "t1", "name": "Approve"}],
                "end_events": [{"id": "e1", "error": false}],
                "flows": [{"id": "f1", "source": "t1", "target": "e1"}]
            }"#,
        );
        let model = read_model(file.path()).unwrap();
        assert_eq!(model.id, "loan");
        assert_eq!(model.tasks.len(), 1);
        assert_eq!(model.end_events.len(), 1);
        assert_eq!(model.flows.len(), 1);
    }

    #[test]
    fn test_read_log_round_trip() {
        let file = write_temp(
            r#"{
                "kind": "EventLog",
                "traces": [
                    {
                        "attributes": {"RequestedAmount": "150.5"},
                        "events": [
                            {"activity": "Submit", "role": "Clerk", "resource": "sara"}
                        ]
                    },
                    {"events": []}
                ]
            }"#,
        );
        let log = read_log(file.path()).unwrap();
        assert_eq!(log.traces.len(), 2);
        assert_eq!(log.traces[0].events[0].activity.as_deref(), Some("Submit"));
        assert!(log.traces[1].events.is_empty());
    }

    #[test]
    fn test_swapped_kind_is_rejected() {
        let file = write_temp(r#"{"kind": "EventLog", "traces": []}"#);
        let err = read_model(file.path()).unwrap_err();
        match err {
            ArtifactError::Parse { message, .. } => {
                assert!(message.contains("expected kind 'ProcessModel'"));
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_kind_is_accepted() {
        let value = serde_json::json!({"id": "m", "tasks": [], "end_events": [], "flows": []});
        assert!(model_from_value(&value, "inline").is_ok());
    }
}
