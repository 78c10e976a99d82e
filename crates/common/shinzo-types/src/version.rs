use serde::{Deserialize, Serialize};

/// One entry of a document's `_version` history as reported by the store.
///
/// A document written by several nodes carries one entry per writer, each signed by that
/// writer's identity.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Version {
    pub cid: String,
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub signature: Signature,
}

/// Signature attached to a version entry. The store has already verified it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub value: String,
}
