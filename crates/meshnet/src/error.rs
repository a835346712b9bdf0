//! Error types for topology reconciliation.

use std::io;

/// Result type for meshnet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, reconciling or applying a topology.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed topology description. Raised before any backend call.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// I/O error while reading a description or spawning a command.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A single backend call reported failure.
    #[error("{operation}: {message}")]
    Backend {
        /// The backend operation, usually the command line that was run.
        operation: String,
        /// What the backend reported.
        message: String,
    },

    /// Backend failure with the plan step that issued it.
    #[error("{step}: {operation}: {message}")]
    BackendOperationFailed {
        /// The plan step being executed, e.g. `create link b <-> a`.
        step: String,
        /// The backend operation that failed.
        operation: String,
        /// What the backend reported.
        message: String,
    },

    /// The process lacks the privileges the backend needs.
    #[error("privilege required: {0}")]
    PrivilegeRequired(String),
}

impl Error {
    /// Create a backend error.
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a topology validation error.
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology(message.into())
    }

    /// Add plan step context to this error.
    ///
    /// Wraps backend errors with the step that issued them. Other errors are
    /// returned unchanged.
    pub fn with_context(self, step: impl Into<String>) -> Self {
        match self {
            Self::Backend { operation, message } => Self::BackendOperationFailed {
                step: step.into(),
                operation,
                message,
            },
            other => other,
        }
    }

    /// Check if this error was raised while parsing a description.
    pub fn is_invalid_topology(&self) -> bool {
        matches!(self, Self::InvalidTopology(_))
    }

    /// Check if this is a privilege error.
    pub fn is_privilege_error(&self) -> bool {
        matches!(self, Self::PrivilegeRequired(_))
    }

    /// Check if the emulated network may have been left half-configured.
    ///
    /// True for failures raised by the backend once execution has started;
    /// parse and privilege errors happen before any state is touched.
    pub fn leaves_inconsistent_state(&self) -> bool {
        matches!(
            self,
            Self::Backend { .. } | Self::BackendOperationFailed { .. }
        )
    }
}
