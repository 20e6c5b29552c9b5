//! Drydock Cloud Resource Layer
//!
//! This crate provides the provider-neutral boundary between a declarative
//! configuration engine and cloud control-plane APIs: error taxonomy,
//! composite resource identifiers, and the resource lifecycle contract
//! that provider crates implement.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │          Declarative engine (external)           │
//! │     create / read / update / delete / import     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               drydock-cloud                      │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        Resource lifecycle contract        │   │
//! │  │  trait ManagedResource { ... }            │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  ID codec    │  │  Error model │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │    nimbus     │
//!           │   provider    │
//!           └───────────────┘
//! ```

pub mod error;
pub mod id;
pub mod resource;

// Re-exports
pub use error::{CloudError, Result};
pub use id::{CompositeIdCodec, RESOURCE_ID_SEPARATOR};
pub use resource::{ManagedResource, ResourceConfig, ResourceRecord};
