use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;
use shinzo_defra::{query_array, DefraNode};
use shinzo_types::AttestationRecord;
use tracing::debug;

use crate::error::{AttestationError, RECORDS_QUERY_CONTEXT};

/// Every attestation record field.
pub const RECORD_FIELDS: &[&str] = &["attested_doc", "source_doc", "CIDs"];

/// Fields of the condensed records kept for primitive types, which have no source document.
pub const CONDENSED_RECORD_FIELDS: &[&str] = &["attested_doc", "CIDs"];

/// Where the attestation records for a view live.
pub trait RecordScope: Send + Sync + fmt::Debug {
    /// Collection holding the records for `view`.
    fn collection_name(&self, view: &str) -> String;

    /// Extra filter clause narrowing the collection down to `view`'s records.
    fn scope_filter(&self, _view: &str) -> Option<String> {
        None
    }

    /// Fields selected when fetching records for `view`.
    fn record_fields(&self, _view: &str) -> &'static [&'static str] {
        RECORD_FIELDS
    }

    /// SDL creating the collection for `view`.
    fn collection_sdl(&self, view: &str) -> String;

    /// Whether one collection serves every view.
    fn is_shared(&self) -> bool {
        false
    }
}

/// One `AttestationRecord_<View>` collection per view, so subscribers only sync the records
/// of views they follow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerViewCollections {
    primitive_types: BTreeSet<String>,
}

impl PerViewCollections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `types` as primitives whose records use the condensed shape.
    pub fn with_primitive_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            primitive_types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_primitive(&self, view: &str) -> bool {
        self.primitive_types.contains(view)
    }
}

impl RecordScope for PerViewCollections {
    fn collection_name(&self, view: &str) -> String {
        format!("AttestationRecord_{}", view)
    }

    fn record_fields(&self, view: &str) -> &'static [&'static str] {
        if self.is_primitive(view) {
            CONDENSED_RECORD_FIELDS
        } else {
            RECORD_FIELDS
        }
    }

    fn collection_sdl(&self, view: &str) -> String {
        let fields: String = self
            .record_fields(view)
            .iter()
            .map(|field| format!("    {}: {}\n", field, field_type(field)))
            .collect();
        format!("type {} {{\n{}}}", self.collection_name(view), fields)
    }
}

/// A single collection for all views, with each record tagged by the view it attests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedCollection {
    pub collection: String,
    pub doc_type_field: String,
}

impl Default for SharedCollection {
    fn default() -> Self {
        Self::new("AttestationRecord")
    }
}

impl SharedCollection {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            doc_type_field: "doc_type".to_string(),
        }
    }

    pub fn with_doc_type_field(mut self, field: impl Into<String>) -> Self {
        self.doc_type_field = field.into();
        self
    }
}

impl RecordScope for SharedCollection {
    fn collection_name(&self, _view: &str) -> String {
        self.collection.clone()
    }

    fn scope_filter(&self, view: &str) -> Option<String> {
        Some(format!("{}: {{_eq: {}}}", self.doc_type_field, quote(view)))
    }

    fn collection_sdl(&self, _view: &str) -> String {
        format!(
            "type {} {{\n    attested_doc: String\n    source_doc: String\n    CIDs: [String]\n    {}: String\n}}",
            self.collection, self.doc_type_field
        )
    }

    fn is_shared(&self) -> bool {
        true
    }
}

fn field_type(field: &str) -> &'static str {
    match field {
        "CIDs" => "[String]",
        _ => "String",
    }
}

/// GraphQL string literal for `value`.
fn quote(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Query selecting the records attesting any of `doc_ids`. `None` when there is nothing to
/// look up, since an empty `_in` list is not a meaningful filter.
pub fn build_attestation_query<S: AsRef<str>>(
    scope: &dyn RecordScope,
    view: &str,
    doc_ids: &[S],
) -> Option<String> {
    if doc_ids.is_empty() {
        return None;
    }

    let ids = doc_ids
        .iter()
        .map(|id| quote(id.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut filter = format!("attested_doc: {{_in: [{}]}}", ids);
    if let Some(clause) = scope.scope_filter(view) {
        filter.push_str(", ");
        filter.push_str(&clause);
    }

    Some(format!(
        "query {{\n    {}(filter: {{{}}}) {{\n        {}\n    }}\n}}",
        scope.collection_name(view),
        filter,
        scope.record_fields(view).join("\n        ")
    ))
}

/// Fetch the attestation records of `view` whose attested document is one of `doc_ids`.
pub async fn fetch_attestation_records<N, S>(
    node: &N,
    scope: &dyn RecordScope,
    view: &str,
    doc_ids: &[S],
) -> Result<Vec<AttestationRecord>, AttestationError>
where
    N: DefraNode + ?Sized,
    S: AsRef<str>,
{
    let Some(query) = build_attestation_query(scope, view, doc_ids) else {
        debug!(view, "no documents to fetch attestation records for");
        return Ok(Vec::new());
    };

    let records: Vec<AttestationRecord> = query_array(node, &query)
        .await
        .map_err(|source| AttestationError::QueryExecution {
            context: RECORDS_QUERY_CONTEXT,
            source,
        })?;
    debug!(
        view,
        documents = doc_ids.len(),
        records = records.len(),
        "fetched attestation records"
    );
    Ok(records)
}
