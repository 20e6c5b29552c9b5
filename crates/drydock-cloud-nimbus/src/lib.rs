//! Nimbus provider for Drydock
//!
//! Maps declarative resource configuration onto the Nimbus control-plane
//! API: the app deployment platform (apps, branches, backend
//! environments, webhooks) and object-storage replication settings.
//!
//! Every exported operation issues single-shot requests with no retry,
//! backoff, or caching; this layer is deliberately thin and the API's
//! own semantics are the contract.

pub mod apps;
pub mod client;
pub mod error;
pub mod provider;
pub mod replication;

// Re-exports
pub use client::{NimbusClient, NimbusConfig};
pub use error::{NimbusError, Result};
pub use provider::{
    BackendEnvironmentResource, BranchResource, BucketReplicationResource, WebhookResource,
};
pub use replication::ReplicationConfiguration;
