//! Finding one document that meets an attestation threshold.
//!
//! A query that declares its own `limit:` is run once and only its window is considered. A
//! query without one is run with a growing limit: 10, 100, 1000 and so on, until a qualifying
//! document shows up or a page comes back short, meaning the whole collection has been seen.
//! The attempts are not otherwise capped.

use serde::de::DeserializeOwned;
use shinzo_defra::{query_array, wrap_query_if_needed, DefraNode};
use shinzo_types::Document;
use tracing::debug;

use crate::error::{AttestationError, DOCUMENTS_QUERY_CONTEXT};
use crate::filter::filter_by_minimum_attestations;
use crate::query_text::{extract_limit_value, has_limit_parameter, with_limit};
use crate::records::RecordScope;

/// Limit of the first adaptive attempt.
pub const INITIAL_LIMIT: u64 = 10;

/// Factor the limit grows by between adaptive attempts.
pub const LIMIT_GROWTH: u64 = 10;

async fn run_query<T, N>(node: &N, query: &str) -> Result<Vec<T>, AttestationError>
where
    T: DeserializeOwned,
    N: DefraNode + ?Sized,
{
    query_array(node, query)
        .await
        .map_err(|source| AttestationError::QueryExecution {
            context: DOCUMENTS_QUERY_CONTEXT,
            source,
        })
}

/// Return the first document of `query` attested by at least `minimum_threshold` distinct
/// CIDs.
pub async fn find_first_meeting_threshold<T, N>(
    node: &N,
    scope: &dyn RecordScope,
    query: &str,
    minimum_threshold: u32,
) -> Result<T, AttestationError>
where
    T: DeserializeOwned + Document,
    N: DefraNode + ?Sized,
{
    let query = wrap_query_if_needed(query);

    if has_limit_parameter(&query) {
        let declared = extract_limit_value(&query);
        let rows: Vec<T> = run_query(node, &query).await?;
        debug!(limit = ?declared, rows = rows.len(), "searching declared query window");
        return filter_by_minimum_attestations(node, scope, rows, minimum_threshold, &query)
            .await?
            .into_iter()
            .next()
            .ok_or(AttestationError::NoQualifyingResultWithinLimit {
                threshold: minimum_threshold,
                limit: declared,
            });
    }

    let mut limit = INITIAL_LIMIT;
    loop {
        let limited = with_limit(&query, limit).map_err(|source| {
            AttestationError::ViewNameExtraction {
                query: query.clone(),
                source,
            }
        })?;

        let rows: Vec<T> = run_query(node, &limited).await?;
        let returned = rows.len() as u64;
        debug!(limit, rows = returned, "searching for attested document");

        let filtered =
            filter_by_minimum_attestations(node, scope, rows, minimum_threshold, &limited).await?;
        if let Some(found) = filtered.into_iter().next() {
            return Ok(found);
        }

        if returned < limit {
            return Err(AttestationError::NoQualifyingResultInCollection {
                threshold: minimum_threshold,
            });
        }
        limit = limit.saturating_mul(LIMIT_GROWTH);
    }
}
