//! Cloud resource error types

use thiserror::Error;

/// Errors surfaced across the resource lifecycle boundary
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{resource} not found during {operation}")]
    ResourceNotFound {
        operation: &'static str,
        resource: String,
    },

    #[error(
        "unexpected format for resource id ({id}), expected {parent_label}{separator}{child_label}"
    )]
    MalformedResourceId {
        id: String,
        separator: char,
        parent_label: &'static str,
        child_label: &'static str,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("{operation} failed for {resource}: {message}")]
    Api {
        operation: &'static str,
        resource: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// True when the error is the normalized not-found kind. The engine
    /// uses this during read to drop a vanished resource from tracked
    /// state instead of failing the operation.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::ResourceNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
