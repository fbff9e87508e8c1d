//! Error types for the reconciliation engine.
//!
//! Recoverable conditions surface as `Result`s and abort the pass with no
//! hardware effect. Genuine programming-error invariants (reference count
//! underflow, removing a referenced object, a duplicate processed entry) are
//! not represented here; they panic at the violation site.

use sonic_sai_model::{ModelError, ObjectType, Vid};
use thiserror::Error;

/// Errors raised while building or mutating a view.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Duplicate object key in dump: {0}")]
    DuplicateKey(String),

    #[error("Malformed composite key: {0}")]
    MalformedKey(String),

    #[error("Object {key} references unknown handle {vid}")]
    DanglingReference { key: String, vid: Vid },

    #[error("Handle {vid} has no hardware id mapping")]
    MissingHardwareId { vid: Vid },
}

/// Errors from the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store {0} not found")]
    MissingStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from the hardware driver collaborator.
#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("Hardware operation failed on {key}: {status}")]
    OperationFailed { key: String, status: String },
}

/// Top-level reconciliation pass errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Hardware failure, pass aborted mid-execution: {0}")]
    Hardware(#[from] HardwareError),

    #[error("{object_type} {key} was not matched by the exact-handle pre-pass")]
    UnmatchedAnchor {
        object_type: &'static str,
        key: String,
    },

    #[error("Expected at most one {0} object per view, found {1}")]
    MultipleSwitches(ObjectType, usize),

    #[error("Matched object {key} cannot be updated in place")]
    MatchedUpdateFailed { key: String },

    #[error("No current-view translation for desired handle {vid}")]
    HandleTranslation { vid: Vid },

    #[error("Consistency check failed: {0}")]
    ConsistencyCheck(String),
}
