use serde::{Deserialize, Deserializer, Serialize};

/// Evidence submitted by one source that it observed a specific document.
///
/// `cids` holds the content identifiers that source contributed. The same writer may resubmit
/// identical CIDs across several records, so consumers count the union, not the records.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AttestationRecord {
    /// Id of the document being attested.
    #[serde(rename = "attested_doc", default, deserialize_with = "null_as_default")]
    pub attested_doc_id: String,

    /// Id of the source document the attestation was derived from.
    /// Condensed record collections for primitive types do not store it.
    #[serde(rename = "source_doc", default, deserialize_with = "null_as_default")]
    pub source_doc_id: String,

    /// Content identifiers contributed by this record.
    #[serde(rename = "CIDs", default, deserialize_with = "null_as_default")]
    pub cids: Vec<String>,
}

impl AttestationRecord {
    /// Create a record attesting `attested_doc_id` with the given CIDs
    pub fn new(
        attested_doc_id: impl Into<String>,
        source_doc_id: impl Into<String>,
        cids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            attested_doc_id: attested_doc_id.into(),
            source_doc_id: source_doc_id.into(),
            cids: cids.into_iter().map(Into::into).collect(),
        }
    }
}

// The store emits `null` for unset fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
