//! Error types for policy reconciliation

use thiserror::Error;

/// Reconciliation result type
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors surfaced by a reconciliation invocation
///
/// Every variant is fatal to the invocation and is propagated to the invoking
/// lifecycle manager, which owns retries. A missing policy document is not an
/// error and never reaches this type.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Lifecycle event lacks a required resource property
    #[error("Missing or empty resource property: {0}")]
    MissingProperty(&'static str),

    /// Existing policy document could not be parsed
    #[error("Malformed policy document on {resource_id}: {source}")]
    MalformedPolicy {
        resource_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Merged document could not be serialized
    #[error("Failed to serialize policy document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Policy store fetch or persist failed
    #[error("Policy store error: {0}")]
    Store(#[from] StoreError),

    /// Invocation exceeded the configured time bound
    #[error("Reconciliation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Errors from a [`PolicyStore`](crate::store::PolicyStore) backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend rejected the request
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// I/O error talking to the backend
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource identifier cannot be used with this backend
    #[error("Invalid resource identifier: {0}")]
    InvalidResourceId(String),
}
