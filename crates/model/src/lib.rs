//! Conforma artifact layer -- typed process models and event logs.
//!
//! A process model (as-designed) and an event log (as-executed) are the two
//! inputs to every conformance analytic. Both are read from interchange JSON
//! documents into typed structs. The model is additionally convertible to a
//! verification-ready net (places, transitions, markings) consumed by the
//! alignment engine.

pub mod error;
pub mod net;
pub mod read;
pub mod types;

pub use error::ArtifactError;
pub use net::{Marking, Net, NetTransition};
pub use read::{log_from_value, model_from_value, read_log, read_model};
pub use types::{EndEvent, Event, EventLog, ProcessModel, SequenceFlow, Task, Trace};
