use shinzo_defra::DefraError;
use thiserror::Error;

/// Malformed query text handed to the extraction helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryTextError {
    #[error("query string is empty")]
    EmptyQuery,

    #[error("no opening brace found in query")]
    NoOpeningBrace,

    #[error("could not extract collection name from query")]
    NoIdentifierFound,
}

#[derive(Error, Debug)]
pub enum AttestationError {
    #[error("error extracting view name from query {query}: {source}")]
    ViewNameExtraction {
        query: String,
        #[source]
        source: QueryTextError,
    },

    #[error("document at index {index} has no _docID")]
    MissingIdentifierField { index: usize },

    #[error("{context}: {source}")]
    QueryExecution {
        context: &'static str,
        #[source]
        source: DefraError,
    },

    #[error(
        "no results found that meet the minimum attestation threshold of {threshold} within the query's declared limit{}",
        .limit.map(|l| format!(" of {l}")).unwrap_or_default()
    )]
    NoQualifyingResultWithinLimit { threshold: u32, limit: Option<u64> },

    #[error(
        "no results found that meet the minimum attestation threshold of {threshold} after querying entire collection"
    )]
    NoQualifyingResultInCollection { threshold: u32 },

    #[error("attestation record collection setup failed for {collection}: {source}")]
    CollectionSetup {
        collection: String,
        #[source]
        source: DefraError,
    },

    #[error("no type definitions found in schema")]
    NoSchemaTypes,

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl AttestationError {
    /// Whether the error reports that no document met the threshold.
    pub fn is_no_qualifying_result(&self) -> bool {
        matches!(
            self,
            AttestationError::NoQualifyingResultWithinLimit { .. }
                | AttestationError::NoQualifyingResultInCollection { .. }
        )
    }
}

pub(crate) const RECORDS_QUERY_CONTEXT: &str = "error querying attestation records";
pub(crate) const DOCUMENTS_QUERY_CONTEXT: &str = "error querying documents";
