use std::collections::HashSet;

use shinzo_defra::DefraNode;
use shinzo_types::Document;
use tracing::debug;

use crate::counting::count_unique_attestations;
use crate::error::AttestationError;
use crate::query_text::extract_collection_name_from_query;
use crate::records::{fetch_attestation_records, RecordScope};

/// Keep the documents attested by at least `minimum_threshold` distinct CIDs.
///
/// `query_used` is the query that produced `documents`; its root field names the view whose
/// attestation records are consulted. A threshold of 0 returns the input untouched without
/// looking at the query. Retained documents keep their input order.
pub async fn filter_by_minimum_attestations<D, N>(
    node: &N,
    scope: &dyn RecordScope,
    documents: Vec<D>,
    minimum_threshold: u32,
    query_used: &str,
) -> Result<Vec<D>, AttestationError>
where
    D: Document,
    N: DefraNode + ?Sized,
{
    if minimum_threshold == 0 {
        return Ok(documents);
    }

    let doc_ids = documents
        .iter()
        .enumerate()
        .map(|(index, doc)| {
            doc.doc_id()
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .ok_or(AttestationError::MissingIdentifierField { index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let view = extract_collection_name_from_query(query_used).map_err(|source| {
        AttestationError::ViewNameExtraction {
            query: query_used.to_string(),
            source,
        }
    })?;

    let mut seen = HashSet::new();
    let unique_ids: Vec<&str> = doc_ids
        .iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect();

    let records = fetch_attestation_records(node, scope, &view, &unique_ids).await?;
    let counts = count_unique_attestations(&records);
    let threshold = minimum_threshold as usize;

    let filtered: Vec<D> = documents
        .into_iter()
        .zip(&doc_ids)
        .filter(|(_, id)| counts.get(id.as_str()).is_some_and(|&count| count >= threshold))
        .map(|(doc, _)| doc)
        .collect();

    debug!(
        view = %view,
        threshold = minimum_threshold,
        candidates = doc_ids.len(),
        retained = filtered.len(),
        "filtered documents by attestation count"
    );
    Ok(filtered)
}
