//! Declarative resource boundary
//!
//! Types and the lifecycle contract the declarative engine drives.
//! Provider crates implement [`ManagedResource`] per resource kind; the
//! engine itself (planning, tracked-state persistence) lives outside
//! this workspace.

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declarative configuration for a managed resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource kind (e.g. "branch", "bucket-replication")
    pub kind: String,

    /// Provider name
    pub provider: String,

    /// Resource-specific declarative tree
    pub config: serde_json::Value,
}

impl ResourceConfig {
    pub fn new(
        kind: impl Into<String>,
        provider: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            kind: kind.into(),
            provider: provider.into(),
            config,
        }
    }

    /// Narrow the declarative tree into a typed model.
    ///
    /// Shape violations are rejected here, at the boundary, rather than
    /// on first field access inside an operation.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.config.clone())
            .map_err(|e| CloudError::InvalidConfig(format!("{} config: {}", self.kind, e)))
    }
}

/// State of a managed resource as of its most recent read.
///
/// The `id` string is the only field persisted across operations; every
/// other attribute is recomputed from a fresh read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// External key for the resource
    pub id: String,

    /// Resource kind
    pub kind: String,

    /// Attributes from the latest read
    pub attributes: HashMap<String, serde_json::Value>,

    /// When the attributes were read
    pub read_at: DateTime<Utc>,
}

impl ResourceRecord {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            attributes: HashMap::new(),
            read_at: Utc::now(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Lifecycle contract for one managed resource kind.
///
/// Every operation performs at most a handful of sequential control-plane
/// calls and returns; there is no retry, caching, or shared state between
/// calls. Concurrency coordination is the calling engine's concern.
#[async_trait]
pub trait ManagedResource: Send + Sync {
    /// Resource kind this implementation manages
    fn kind(&self) -> &str;

    /// Create the remote resource from declarative configuration and
    /// return its initial record.
    async fn create(&self, config: &ResourceConfig) -> Result<ResourceRecord>;

    /// Refresh the record from the remote resource.
    ///
    /// Returns `Ok(None)` when the remote resource no longer exists; the
    /// engine then drops the record from tracked state instead of
    /// failing the operation.
    async fn read(&self, record: &ResourceRecord) -> Result<Option<ResourceRecord>>;

    /// Reconfigure the remote resource and return the refreshed record.
    async fn update(
        &self,
        record: &ResourceRecord,
        config: &ResourceConfig,
    ) -> Result<ResourceRecord>;

    /// Delete the remote resource.
    async fn delete(&self, record: &ResourceRecord) -> Result<()>;

    /// Adopt an existing remote resource by its external id.
    async fn import(&self, id: &str) -> Result<ResourceRecord>;
}
