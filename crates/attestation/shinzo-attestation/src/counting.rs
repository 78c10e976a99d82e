use std::collections::{HashMap, HashSet};

use shinzo_types::{AttestationRecord, Version};

/// Number of distinct CIDs attesting each document.
///
/// Documents without records are absent from the map and count as zero.
pub fn count_unique_attestations<'a, I>(records: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = &'a AttestationRecord>,
{
    let mut cids_by_doc: HashMap<&str, HashSet<&str>> = HashMap::new();
    for record in records {
        cids_by_doc
            .entry(record.attested_doc_id.as_str())
            .or_default()
            .extend(record.cids.iter().map(String::as_str));
    }

    cids_by_doc
        .into_iter()
        .map(|(doc, cids)| (doc.to_string(), cids.len()))
        .collect()
}

/// Number of distinct signer identities across a document's versions. Identities are taken
/// as reported by the store, without verifying the signatures.
pub fn count_unique_signers(versions: &[Version]) -> usize {
    versions
        .iter()
        .map(|v| v.signature.identity.as_str())
        .filter(|identity| !identity.is_empty())
        .collect::<HashSet<_>>()
        .len()
}
