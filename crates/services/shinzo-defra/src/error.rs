use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the document store.
#[derive(Error, Debug)]
pub enum DefraError {
    #[error("query parameter is empty")]
    EmptyQuery,

    #[error("graphql errors: {}", .0.join("; "))]
    Graphql(Vec<String>),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("response contained no data")]
    MissingData,

    #[error("query returned no results")]
    EmptyResult,

    #[error("unexpected data format: {0}")]
    UnexpectedData(String),

    #[error("failed to unmarshal result: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("query must be a mutation, given: {0}")]
    NotAMutation(String),

    #[error("collection already exists: {0}")]
    CollectionExists(String),

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("could not find file in any path searched: {0:?}")]
    FileNotFound(Vec<PathBuf>),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("peer at index {index} is invalid and will be skipped: {reason}")]
    InvalidPeer { index: usize, reason: String },

    #[error("error connecting to peer {index} ({peer}): {reason}")]
    PeerConnection {
        index: usize,
        peer: String,
        reason: String,
    },

    #[error("peer {0} is unreachable")]
    PeerUnreachable(String),

    #[error("failed to connect to any peers: {}", .0.join("; "))]
    NoPeersReachable(Vec<String>),

    #[error("failed to apply schema: {0}")]
    ApplySchema(#[source] Box<DefraError>),

    #[error("error subscribing to collections {collections:?}: {source}")]
    Subscribe {
        collections: Vec<String>,
        #[source]
        source: Box<DefraError>,
    },
}

impl DefraError {
    /// Whether this error reports a schema that was already applied.
    pub fn is_collection_exists(&self) -> bool {
        match self {
            DefraError::CollectionExists(_) => true,
            DefraError::ApplySchema(inner) => inner.is_collection_exists(),
            DefraError::Graphql(messages) => messages
                .iter()
                .any(|m| m.contains("collection already exists")),
            _ => false,
        }
    }
}
