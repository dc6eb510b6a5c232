//! Conforma alignment layer.
//!
//! Computes, for each trace of an event log, the cost-optimal alignment
//! against the process model's net and a fitness score in [0, 1]. The
//! engine is behind the [`AlignmentEngine`] trait so the analytics layer
//! can treat alignment as an opaque, synchronous collaborator; the
//! default implementation is a uniform-cost search over the synchronous
//! product of net markings and trace positions.

pub mod engine;
pub mod provider;
pub mod result;

pub use engine::{AlignError, AlignmentEngine, MarkingSearchEngine};
pub use provider::{align_artifacts, load_and_align, AlignedArtifacts};
pub use result::AlignmentResult;
