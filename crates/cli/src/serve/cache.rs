//! Fingerprint-keyed, single-flight alignment cache.
//!
//! Every analytic endpoint needs the same expensive alignment over the same
//! (model, log) pair. The cache keys on a SHA-256 content fingerprint of
//! both documents and guarantees at most one in-flight computation per
//! fingerprint: concurrent requesters for the same key await the in-flight
//! result rather than recomputing. A new upload installs a new fingerprint
//! and clears stale entries -- only the most recent pair is ever
//! requestable again.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use conforma_align::{load_and_align, AlignError, AlignedArtifacts, MarkingSearchEngine};
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, OnceCell};

/// Hex SHA-256 over the raw bytes of both artifact documents.
pub(crate) fn pair_fingerprint(model_bytes: &[u8], log_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model_bytes);
    hasher.update([0u8]);
    hasher.update(log_bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

type Cell = Arc<OnceCell<Arc<AlignedArtifacts>>>;

pub(crate) struct AlignmentCache {
    entries: Mutex<HashMap<String, Cell>>,
}

impl AlignmentCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The alignment for the given pair, computed at most once per
    /// fingerprint.
    ///
    /// The entries lock is held only long enough to hand out the per-key
    /// cell; the computation itself runs outside it, on the blocking pool
    /// (the engine is synchronous). A failed computation leaves the cell
    /// empty, so the next request retries instead of serving a stale error.
    pub(crate) async fn get_or_compute(
        &self,
        fingerprint: &str,
        model_path: PathBuf,
        log_path: PathBuf,
    ) -> Result<Arc<AlignedArtifacts>, AlignError> {
        let cell: Cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(fingerprint.to_string()).or_default().clone()
        };

        let aligned = cell
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || {
                    let engine = MarkingSearchEngine::default();
                    load_and_align(&model_path, &log_path, &engine).map(Arc::new)
                })
                .await
                .expect("alignment task panicked")
            })
            .await?;

        Ok(aligned.clone())
    }

    /// Drop every entry. Called when a new pair is uploaded.
    pub(crate) async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
