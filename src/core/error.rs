//! Domain error taxonomy for component operations.
//!
//! Every variant here is recoverable at per-component granularity: batch
//! commands report the failure and move on to the next component. Only
//! process-level misconfiguration (bad config file, unwritable project
//! root) aborts a run, and that travels as `anyhow::Error` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrowError {
    /// No source file or snippet could be resolved for the component.
    #[error("component not found: {0}")]
    NotFound(String),

    /// The target document already carries this component.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// A located source file never closes the braces it opens.
    #[error("malformed source for {name}: {reason}")]
    MalformedSource { name: String, reason: String },

    /// A component argument that fails name validation.
    #[error("invalid component argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
