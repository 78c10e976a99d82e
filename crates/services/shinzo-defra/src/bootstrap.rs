use shinzo_config::{Config, DEFAULT_LISTEN_ADDRESS};
use tracing::{error, info, warn};

use crate::error::DefraError;
use crate::logging::init_logging;
use crate::node::DefraNode;
use crate::peers::{bootstrap_into_peers, connect_to_peers};
use crate::schema::SchemaApplier;

/// Addresses peers may always bootstrap from, on top of the configured ones.
const REQUIRED_PEERS: &[&str] = &[];

/// Bring a node online: initialize logging, connect to bootstrap peers, apply the schema and
/// subscribe to `collections_of_interest`.
///
/// Connecting fails only when every attempted peer is unreachable. A schema that was already
/// applied is logged and tolerated.
pub async fn start_node(
    node: &dyn DefraNode,
    cfg: &Config,
    schema_applier: &dyn SchemaApplier,
    collections_of_interest: &[String],
) -> Result<(), DefraError> {
    init_logging(cfg.logger.development);

    let listen_addr = match cfg.defradb.p2p.listen_addr.as_str() {
        "" => DEFAULT_LISTEN_ADDRESS,
        addr => addr,
    };
    let mut bootstrap_peers = cfg.defradb.p2p.bootstrap_peers.clone();
    bootstrap_peers.extend(REQUIRED_PEERS.iter().map(|p| p.to_string()));

    info!(
        peer_id = %node.peer_info().id,
        listen_addr,
        store = %cfg.defradb.store.path.display(),
        "starting node"
    );

    let (peers, translation_errors) = bootstrap_into_peers(&bootstrap_peers);
    for e in &translation_errors {
        error!(error = %e, "error translating bootstrap peer");
    }

    let connection_errors = connect_to_peers(node, &peers).await;
    if !connection_errors.is_empty() {
        if connection_errors.len() == peers.len() {
            return Err(DefraError::NoPeersReachable(
                connection_errors.iter().map(ToString::to_string).collect(),
            ));
        }
        warn!(
            failed = connection_errors.len(),
            attempted = peers.len(),
            "could not connect to some peers"
        );
    }

    if let Err(e) = schema_applier.apply_schema(node).await {
        if !e.is_collection_exists() {
            return Err(DefraError::ApplySchema(Box::new(e)));
        }
        warn!(error = %e, "schema already applied, proceeding");
    }

    if !collections_of_interest.is_empty() {
        node.add_p2p_collections(collections_of_interest)
            .await
            .map_err(|e| DefraError::Subscribe {
                collections: collections_of_interest.to_vec(),
                source: Box::new(e),
            })?;
    }

    info!(collections = ?collections_of_interest, "node started");
    Ok(())
}
