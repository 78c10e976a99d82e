//! In-memory document store implementing [`DefraNode`] over a GraphQL subset.
//!
//! Supported requests:
//! - `Collection(filter: {...}, limit: N, offset: N) { fields }` with `_eq`, `_ne`, `_in`,
//!   `_nin`, `_and` and `_or` filters
//! - `create_Collection(input: {...}) { fields }`
//!
//! Documents are returned in insertion order.

mod gql;
mod sdl;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use shinzo_config::DEFAULT_LISTEN_ADDRESS;
use shinzo_types::{PeerInfo, DOC_ID_FIELD};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::DefraError;
use crate::node::{DefraNode, GqlResult};
use gql::{parse_request, Field, OperationKind};

const TYPENAME_FIELD: &str = "__typename";
const CREATE_PREFIX: &str = "create_";

#[derive(Debug, Default)]
struct Collection {
    fields: Vec<String>,
    documents: Vec<Map<String, Value>>,
}

impl Collection {
    fn has_field(&self, field: &str) -> bool {
        field == DOC_ID_FIELD || self.fields.iter().any(|f| f == field)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<String, Collection>,
    p2p_collections: BTreeSet<String>,
    connected_peers: Vec<PeerInfo>,
    unreachable_peers: HashSet<String>,
    requests: Vec<String>,
}

/// An in-memory node for tests and local experiments.
#[derive(Debug, Clone)]
pub struct MemoryNode {
    state: Arc<RwLock<MemoryState>>,
    peer: PeerInfo,
}

impl Default for MemoryNode {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNode {
    /// Create an empty node with a random peer id
    pub fn new() -> Self {
        Self::with_peer_info(PeerInfo {
            id: format!("12D3KooW{}", uuid::Uuid::new_v4().simple()),
            addresses: vec![DEFAULT_LISTEN_ADDRESS.to_string()],
        })
    }

    pub fn with_peer_info(peer: PeerInfo) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            peer,
        }
    }

    /// Insert a document directly, bypassing GraphQL. Returns the assigned `_docID`.
    pub async fn insert(&self, collection: &str, document: Value) -> Result<String, DefraError> {
        let Value::Object(input) = document else {
            return Err(DefraError::UnexpectedData(
                "documents must be JSON objects".to_string(),
            ));
        };
        let mut state = self.state.write().await;
        create_document(&mut state, collection, input)
            .map(|doc| doc_id_of(&doc).to_string())
            .map_err(|message| match state.collections.contains_key(collection) {
                true => DefraError::InvalidSchema(message),
                false => DefraError::UnknownCollection(collection.to_string()),
            })
    }

    /// Every request passed to [`DefraNode::exec_request`], oldest first.
    pub async fn requests(&self) -> Vec<String> {
        self.state.read().await.requests.clone()
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, |c| c.documents.len())
    }

    pub async fn has_collection(&self, collection: &str) -> bool {
        self.state.read().await.collections.contains_key(collection)
    }

    pub async fn p2p_collections(&self) -> Vec<String> {
        self.state.read().await.p2p_collections.iter().cloned().collect()
    }

    pub async fn connected_peers(&self) -> Vec<PeerInfo> {
        self.state.read().await.connected_peers.clone()
    }

    /// Make subsequent `connect` calls to `peer_id` fail.
    pub async fn mark_unreachable(&self, peer_id: &str) {
        self.state
            .write()
            .await
            .unreachable_peers
            .insert(peer_id.to_string());
    }
}

fn doc_id_of(document: &Map<String, Value>) -> &str {
    document
        .get(DOC_ID_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn create_document(
    state: &mut MemoryState,
    collection_name: &str,
    input: Map<String, Value>,
) -> Result<Map<String, Value>, String> {
    let collection = state
        .collections
        .get_mut(collection_name)
        .ok_or_else(|| format!("unknown collection {}", collection_name))?;

    if let Some(unknown) = input.keys().find(|k| !collection.fields.contains(k)) {
        return Err(format!(
            "unknown field {} on collection {}",
            unknown, collection_name
        ));
    }

    let mut document = input;
    document.insert(
        DOC_ID_FIELD.to_string(),
        Value::String(format!("bae-{}", uuid::Uuid::new_v4())),
    );
    collection.documents.push(document.clone());
    Ok(document)
}

fn project(
    collection_name: &str,
    collection: &Collection,
    document: &Map<String, Value>,
    selection: &[Field],
) -> Result<Value, String> {
    if selection.is_empty() {
        return Err(format!(
            "field {} must have a selection of subfields",
            collection_name
        ));
    }

    let mut row = Map::new();
    for field in selection {
        let value = match field.name.as_str() {
            TYPENAME_FIELD => Value::String(collection_name.to_string()),
            name if collection.has_field(name) => document.get(name).cloned().unwrap_or(Value::Null),
            name => {
                return Err(format!(
                    "Cannot query field \"{}\" on type \"{}\"",
                    name, collection_name
                ))
            }
        };
        row.insert(field.response_key().to_string(), value);
    }
    Ok(Value::Object(row))
}

fn matches_filter(document: &Map<String, Value>, filter: &Value) -> Result<bool, String> {
    let conditions = filter
        .as_object()
        .ok_or_else(|| "filter must be an object".to_string())?;

    for (key, condition) in conditions {
        let matched = match key.as_str() {
            "_and" => all_filters(document, condition)?,
            "_or" => any_filter(document, condition)?,
            field => matches_condition(document.get(field).unwrap_or(&Value::Null), condition)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn all_filters(document: &Map<String, Value>, filters: &Value) -> Result<bool, String> {
    for filter in filters.as_array().ok_or("_and expects a list")? {
        if !matches_filter(document, filter)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_filter(document: &Map<String, Value>, filters: &Value) -> Result<bool, String> {
    for filter in filters.as_array().ok_or("_or expects a list")? {
        if matches_filter(document, filter)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn matches_condition(value: &Value, condition: &Value) -> Result<bool, String> {
    let operators = condition
        .as_object()
        .ok_or_else(|| "field conditions must be objects".to_string())?;

    for (operator, operand) in operators {
        let matched = match operator.as_str() {
            "_eq" => value == operand,
            "_ne" => value != operand,
            "_in" => operand
                .as_array()
                .ok_or("_in expects a list")?
                .contains(value),
            "_nin" => !operand
                .as_array()
                .ok_or("_nin expects a list")?
                .contains(value),
            other => return Err(format!("unsupported filter operator {}", other)),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn non_negative(arguments: &Map<String, Value>, name: &str) -> Result<Option<usize>, String> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| format!("{} must be a non-negative integer", name)),
    }
}

fn run_query(state: &MemoryState, field: &Field) -> Result<Value, String> {
    let collection = state.collections.get(&field.name).ok_or_else(|| {
        format!("Cannot query field \"{}\" on type \"Query\"", field.name)
    })?;

    if let Some(unknown) = field
        .arguments
        .keys()
        .find(|k| !matches!(k.as_str(), "filter" | "limit" | "offset"))
    {
        return Err(format!("Unknown argument \"{}\" on field \"{}\"", unknown, field.name));
    }

    let limit = non_negative(&field.arguments, "limit")?;
    let offset = non_negative(&field.arguments, "offset")?.unwrap_or(0);

    let mut rows = Vec::new();
    let mut skipped = 0;
    for document in &collection.documents {
        if limit.is_some_and(|limit| rows.len() >= limit) {
            break;
        }
        if let Some(filter) = field.arguments.get("filter") {
            if !matches_filter(document, filter)? {
                continue;
            }
        }
        if skipped < offset {
            skipped += 1;
            continue;
        }
        rows.push(project(&field.name, collection, document, &field.selection)?);
    }
    Ok(Value::Array(rows))
}

fn run_mutation(state: &mut MemoryState, field: &Field) -> Result<Value, String> {
    let collection_name = field
        .name
        .strip_prefix(CREATE_PREFIX)
        .ok_or_else(|| format!("unsupported mutation {}", field.name))?;

    let input = match field.arguments.get("input") {
        Some(Value::Object(input)) => input.clone(),
        _ => return Err(format!("{} requires an input object", field.name)),
    };

    let document = create_document(state, collection_name, input)?;
    let collection = &state.collections[collection_name];
    let row = project(collection_name, collection, &document, &field.selection)?;
    Ok(Value::Array(vec![row]))
}

fn execute(state: &mut MemoryState, request: &str) -> Result<Value, String> {
    let operation = parse_request(request)?;
    let mut data = Map::new();

    for field in &operation.fields {
        let value = match (operation.kind, field.name.as_str()) {
            (_, TYPENAME_FIELD) => Value::String("Query".to_string()),
            (OperationKind::Mutation, _) => run_mutation(state, field)?,
            (OperationKind::Query | OperationKind::Subscription, _) => run_query(state, field)?,
        };
        data.insert(field.response_key().to_string(), value);
    }

    Ok(Value::Object(data))
}

#[async_trait]
impl DefraNode for MemoryNode {
    async fn exec_request(&self, request: &str) -> GqlResult {
        let mut state = self.state.write().await;
        state.requests.push(request.to_string());
        match execute(&mut state, request) {
            Ok(data) => GqlResult::ok(data),
            Err(message) => {
                debug!(%message, "memory node rejected request");
                GqlResult::error(message)
            }
        }
    }

    async fn add_schema(&self, sdl: &str) -> Result<Vec<String>, DefraError> {
        let schemas = sdl::parse_sdl(sdl).map_err(DefraError::InvalidSchema)?;
        let mut state = self.state.write().await;

        if let Some(existing) = schemas
            .iter()
            .find(|s| state.collections.contains_key(&s.name))
        {
            return Err(DefraError::CollectionExists(existing.name.clone()));
        }

        let mut created = Vec::with_capacity(schemas.len());
        for schema in schemas {
            created.push(schema.name.clone());
            state.collections.insert(
                schema.name,
                Collection {
                    fields: schema.fields,
                    documents: Vec::new(),
                },
            );
        }
        Ok(created)
    }

    async fn add_p2p_collections(&self, collections: &[String]) -> Result<(), DefraError> {
        let mut state = self.state.write().await;
        if let Some(unknown) = collections
            .iter()
            .find(|c| !state.collections.contains_key(c.as_str()))
        {
            return Err(DefraError::UnknownCollection(unknown.clone()));
        }
        state.p2p_collections.extend(collections.iter().cloned());
        Ok(())
    }

    async fn connect(&self, peer: &PeerInfo) -> Result<(), DefraError> {
        let mut state = self.state.write().await;
        if state.unreachable_peers.contains(&peer.id) {
            return Err(DefraError::PeerUnreachable(peer.id.clone()));
        }
        if !state.connected_peers.contains(peer) {
            state.connected_peers.push(peer.clone());
        }
        Ok(())
    }

    fn peer_info(&self) -> PeerInfo {
        self.peer.clone()
    }
}
