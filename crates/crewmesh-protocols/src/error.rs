//! Coordination error taxonomy.
//!
//! Every failing operation maps to one of four kinds. Resource-claim
//! contention is deliberately *not* an error: it comes back as a successful
//! `claimed: false` result carrying the conflicting holders.

use thiserror::Error;

/// Errors returned by the coordination dispatch surface.
#[derive(Debug, Error)]
pub enum CoordError {
    /// Malformed or missing required parameter. Rejected before any state
    /// mutation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced instance, task, or entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate creation (e.g. an entity name that already exists).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unrecognized method name.
    #[error("unknown method: {0}")]
    UnknownMethod(String),
}

impl CoordError {
    /// Short machine-readable kind tag, used in wire error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            CoordError::Validation(_) => "validation",
            CoordError::NotFound(_) => "not_found",
            CoordError::Conflict(_) => "conflict",
            CoordError::UnknownMethod(_) => "unknown_method",
        }
    }
}
