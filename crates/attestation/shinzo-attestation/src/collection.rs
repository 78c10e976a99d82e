use regex::Regex;
use shinzo_defra::{DefraNode, ProvidedSchemaApplier, SchemaApplier};
use tracing::{info, warn};

use crate::error::AttestationError;
use crate::records::{PerViewCollections, RecordScope};

/// Names of the types defined in an SDL document.
pub fn extract_schema_types(sdl: &str) -> Result<Vec<String>, AttestationError> {
    let type_definition = Regex::new(r"type\s+(\w+)\s*@?[^{]*\{")?;
    let types: Vec<String> = type_definition
        .captures_iter(sdl)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
        .collect();

    if types.is_empty() {
        return Err(AttestationError::NoSchemaTypes);
    }
    Ok(types)
}

/// Per-view scope treating every type of `primitive_sdl` as a primitive.
pub fn primitive_scope(primitive_sdl: &str) -> Result<PerViewCollections, AttestationError> {
    extract_schema_types(primitive_sdl).map(PerViewCollections::with_primitive_types)
}

/// SDL of the collection holding `view`'s attestation records.
pub fn attestation_record_sdl(scope: &dyn RecordScope, view: &str) -> String {
    scope.collection_sdl(view)
}

/// Create the attestation record collection for `view` and subscribe to it over P2P.
///
/// A shared collection is created once; later views reuse it.
pub async fn add_attestation_record_collection<N>(
    node: &N,
    scope: &dyn RecordScope,
    view: &str,
) -> Result<(), AttestationError>
where
    N: DefraNode,
{
    let collection = scope.collection_name(view);
    let setup_error = |source| AttestationError::CollectionSetup {
        collection: collection.clone(),
        source,
    };

    let applier = ProvidedSchemaApplier::new(attestation_record_sdl(scope, view));
    match applier.apply_schema(node).await {
        Ok(()) => info!(%collection, view, "created attestation record collection"),
        Err(e) if scope.is_shared() && e.is_collection_exists() => {
            warn!(%collection, view, "attestation record collection already exists")
        }
        Err(e) => return Err(setup_error(e)),
    }

    node.add_p2p_collections(std::slice::from_ref(&collection))
        .await
        .map_err(setup_error)
}
