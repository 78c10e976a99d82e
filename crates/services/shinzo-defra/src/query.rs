use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DefraError;
use crate::node::DefraNode;

/// Upper bound on a single request round trip.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(120);

const OPERATION_KEYWORDS: [&str; 3] = ["query", "mutation", "subscription"];

/// Whether `query` already opens with an operation keyword (case-insensitive).
fn starts_with_operation_keyword(query: &str) -> bool {
    let lower = query.to_ascii_lowercase();
    OPERATION_KEYWORDS.iter().any(|keyword| match lower.strip_prefix(keyword) {
        Some(rest) => rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == '{'),
        None => false,
    })
}

/// Prefix a bare selection with `query` so the store accepts it.
///
/// `{ User { name } }` and `User { name }` both become `query { User { name } }`; requests that
/// already begin with `query`, `mutation` or `subscription` are returned unchanged.
pub fn wrap_query_if_needed(query: &str) -> String {
    let trimmed = query.trim();
    if starts_with_operation_keyword(trimmed) {
        return query.to_string();
    }

    if trimmed.len() >= 2 && trimmed.starts_with('{') && trimmed.ends_with('}') {
        let inner = trimmed[1..trimmed.len() - 1].trim();
        return format!("query {{ {} }}", inner);
    }

    format!("query {{ {} }}", trimmed)
}

async fn execute<N>(node: &N, request: &str) -> Result<Value, DefraError>
where
    N: DefraNode + ?Sized,
{
    if request.trim().is_empty() {
        return Err(DefraError::EmptyQuery);
    }

    let result = tokio::time::timeout(QUERY_TIMEOUT, node.exec_request(request))
        .await
        .map_err(|_| DefraError::Timeout(QUERY_TIMEOUT))?;
    result.into_data()
}

fn prepare(query: &str) -> Result<String, DefraError> {
    if query.trim().is_empty() {
        return Err(DefraError::EmptyQuery);
    }
    Ok(wrap_query_if_needed(query))
}

/// The first array-valued entry of a response data map.
fn first_array(data: &Value) -> Option<&Vec<Value>> {
    data.as_object()?.values().find_map(Value::as_array)
}

/// Execute `query` and unmarshal the returned rows into `T`.
pub async fn query_array<T, N>(node: &N, query: &str) -> Result<Vec<T>, DefraError>
where
    T: DeserializeOwned,
    N: DefraNode + ?Sized,
{
    let data = execute(node, &prepare(query)?).await?;
    match first_array(&data) {
        Some(rows) => rows
            .iter()
            .map(|row| T::deserialize(row).map_err(DefraError::from))
            .collect(),
        None => Ok(serde_json::from_value(data)?),
    }
}

/// Execute `query` and unmarshal only its first row into `T`.
pub async fn query_single<T, N>(node: &N, query: &str) -> Result<T, DefraError>
where
    T: DeserializeOwned,
    N: DefraNode + ?Sized,
{
    let data = execute(node, &prepare(query)?).await?;
    let first = first_array(&data)
        .and_then(|rows| rows.first())
        .ok_or(DefraError::EmptyResult)?;
    Ok(T::deserialize(first)?)
}

/// Execute a mutation and unmarshal the first affected document into `T`.
pub async fn post_mutation<T, N>(node: &N, mutation: &str) -> Result<T, DefraError>
where
    T: DeserializeOwned,
    N: DefraNode + ?Sized,
{
    if !mutation.contains("mutation") {
        return Err(DefraError::NotAMutation(mutation.to_string()));
    }

    let data = execute(node, mutation).await?;
    if !data.is_object() {
        return Err(DefraError::UnexpectedData(format!("{}", data)));
    }
    let first = first_array(&data)
        .and_then(|rows| rows.first())
        .ok_or_else(|| DefraError::UnexpectedData("no array data found in mutation result".to_string()))?;
    Ok(T::deserialize(first)?)
}
