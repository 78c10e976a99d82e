use shinzo_types::PeerInfo;
use tracing::error;

use crate::error::DefraError;
use crate::node::DefraNode;

const P2P_SEPARATOR: &str = "/p2p/";

/// Split `<multiaddr>/p2p/<peer id>` strings into [`PeerInfo`]s. Malformed entries are
/// skipped and reported individually.
pub fn bootstrap_into_peers(bootstrap_peers: &[String]) -> (Vec<PeerInfo>, Vec<DefraError>) {
    let mut peers = Vec::new();
    let mut errors = Vec::new();

    for (index, peer) in bootstrap_peers.iter().enumerate() {
        let parts: Vec<&str> = peer.split(P2P_SEPARATOR).collect();
        match parts.as_slice() {
            [address, id] => peers.push(PeerInfo {
                id: id.to_string(),
                addresses: vec![address.to_string()],
            }),
            _ => errors.push(DefraError::InvalidPeer {
                index,
                reason: format!("expected <address>/p2p/<id>, given {peer}"),
            }),
        }
    }

    (peers, errors)
}

/// Inverse of [`bootstrap_into_peers`], using each peer's first address.
pub fn peers_into_bootstrap(peers: &[PeerInfo]) -> (Vec<String>, Vec<DefraError>) {
    let mut bootstrap = Vec::new();
    let mut errors = Vec::new();

    for (index, peer) in peers.iter().enumerate() {
        if peer.id.is_empty() {
            errors.push(DefraError::InvalidPeer {
                index,
                reason: "empty ID".to_string(),
            });
            continue;
        }
        let Some(address) = peer.addresses.first() else {
            errors.push(DefraError::InvalidPeer {
                index,
                reason: "no addresses".to_string(),
            });
            continue;
        };
        bootstrap.push(format!("{address}{P2P_SEPARATOR}{}", peer.id));
    }

    (bootstrap, errors)
}

/// Connect to every peer in order, collecting one error per failed connection.
pub async fn connect_to_peers(node: &dyn DefraNode, peers: &[PeerInfo]) -> Vec<DefraError> {
    let mut errors = Vec::new();
    for (index, peer) in peers.iter().enumerate() {
        if let Err(e) = node.connect(peer).await {
            error!(index, peer = %peer.id, error = %e, "failed to connect to peer");
            errors.push(DefraError::PeerConnection {
                index,
                peer: peer.id.clone(),
                reason: e.to_string(),
            });
        }
    }
    errors
}
