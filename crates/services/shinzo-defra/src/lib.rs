//! Plumbing around the embedded peer-to-peer document store.
//!
//! The store itself is an external collaborator reached through [`DefraNode`]. This crate
//! marshals GraphQL requests and responses, applies schemas, subscribes views, bootstraps
//! peers, and ships [`memory::MemoryNode`] for tests and local experiments.

pub mod bootstrap;
pub mod error;
pub mod logging;
pub mod memory;
pub mod node;
pub mod peers;
pub mod query;
pub mod schema;
pub mod view;

pub use bootstrap::start_node;
pub use error::DefraError;
pub use logging::init_logging;
pub use memory::MemoryNode;
pub use node::{DefraNode, GqlError, GqlResult};
pub use peers::{bootstrap_into_peers, connect_to_peers, peers_into_bootstrap};
pub use query::{post_mutation, query_array, query_single, wrap_query_if_needed};
pub use schema::{
    find_file, FileSchemaApplier, NoopSchemaApplier, ProvidedSchemaApplier, SchemaApplier,
};
pub use view::View;
