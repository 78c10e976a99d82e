//! Attestation-threshold filtering for query results.
//!
//! Documents synced from the network are attested by indexers through attestation records.
//! Each record lists the content identifiers (CIDs) one source produced for a document, and a
//! document's attestation count is the number of distinct CIDs across all of its records.
//! This crate filters query results by a minimum count and searches for a single qualifying
//! document, growing the query window when the caller did not fix one.

pub mod client;
pub mod collection;
pub mod counting;
pub mod error;
pub mod filter;
pub mod query_text;
pub mod records;
pub mod search;


pub use client::AttestationClient;
pub use collection::{
    add_attestation_record_collection, attestation_record_sdl, extract_schema_types,
    primitive_scope,
};
pub use counting::{count_unique_attestations, count_unique_signers};
pub use error::{AttestationError, QueryTextError};
pub use filter::filter_by_minimum_attestations;
pub use query_text::{
    extract_collection_name_from_query, extract_limit_value, has_limit_parameter, with_limit,
};
pub use records::{
    build_attestation_query, fetch_attestation_records, PerViewCollections, RecordScope,
    SharedCollection,
};
pub use search::{find_first_meeting_threshold, INITIAL_LIMIT, LIMIT_GROWTH};
