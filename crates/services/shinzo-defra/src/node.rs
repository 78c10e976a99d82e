use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shinzo_types::PeerInfo;

use crate::error::DefraError;

/// A single GraphQL error as reported by the store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GqlError {
    pub message: String,
}

/// Raw outcome of executing a GraphQL request.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GqlResult {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GqlError>,
}

impl GqlResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![GqlError {
                message: message.into(),
            }],
        }
    }

    /// Turn the response into its data payload, failing on any reported error.
    pub fn into_data(self) -> Result<Value, DefraError> {
        if !self.errors.is_empty() {
            return Err(DefraError::Graphql(
                self.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        self.data.ok_or(DefraError::MissingData)
    }
}

/// Interface to a running embedded document store node.
///
/// Every SDK operation goes through this trait. Implementations must be safe to share across
/// tasks; the SDK holds no locks of its own around calls.
#[async_trait]
pub trait DefraNode: Send + Sync {
    /// Execute a GraphQL request (query, mutation or subscription).
    async fn exec_request(&self, request: &str) -> GqlResult;

    /// Add the types in an SDL document as collections. Returns the created collection names.
    async fn add_schema(&self, sdl: &str) -> Result<Vec<String>, DefraError>;

    /// Subscribe to P2P replication of the named collections.
    async fn add_p2p_collections(&self, collections: &[String]) -> Result<(), DefraError>;

    /// Dial a remote peer.
    async fn connect(&self, peer: &PeerInfo) -> Result<(), DefraError>;

    /// This node's own addressing information.
    fn peer_info(&self) -> PeerInfo;
}

#[async_trait]
impl<N: DefraNode + ?Sized> DefraNode for Arc<N> {
    async fn exec_request(&self, request: &str) -> GqlResult {
        (**self).exec_request(request).await
    }

    async fn add_schema(&self, sdl: &str) -> Result<Vec<String>, DefraError> {
        (**self).add_schema(sdl).await
    }

    async fn add_p2p_collections(&self, collections: &[String]) -> Result<(), DefraError> {
        (**self).add_p2p_collections(collections).await
    }

    async fn connect(&self, peer: &PeerInfo) -> Result<(), DefraError> {
        (**self).connect(peer).await
    }

    fn peer_info(&self) -> PeerInfo {
        (**self).peer_info()
    }
}
