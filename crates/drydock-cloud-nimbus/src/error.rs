//! Nimbus provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NimbusError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Nimbus API error {code}: {message}")]
    Api { code: i32, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NimbusError {
    /// True when the error is the normalized not-found kind. An explicit
    /// API not-found and an empty success payload both collapse into
    /// this; callers cannot distinguish the two.
    pub fn is_not_found(&self) -> bool {
        matches!(self, NimbusError::NotFound { .. })
    }

    pub(crate) fn not_found(resource: impl Into<String>) -> Self {
        NimbusError::NotFound {
            resource: resource.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NimbusError>;
