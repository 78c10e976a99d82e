use serde::{Deserialize, Serialize};

/// Addressing information for a remote node.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PeerInfo {
    /// Peer id, e.g. `12D3KooW...`
    pub id: String,
    /// Multiaddresses the peer listens on, without the `/p2p/<id>` suffix
    pub addresses: Vec<String>,
}
