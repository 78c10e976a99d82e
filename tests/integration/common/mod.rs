#![allow(dead_code)]

use anyhow::Result;
use serde::Deserialize;
use shinzo_attestation::AttestationClient;
use shinzo_config::Config;
use shinzo_defra::{post_mutation, start_node, MemoryNode, ProvidedSchemaApplier};
use shinzo_types::{AttestationRecord, Document};

pub const USER_SCHEMA: &str = r#"
    type User {
        name: String
    }
    type AttestationRecord_User {
        attested_doc: String
        source_doc: String
        CIDs: [String]
    }
"#;

pub const USERS_QUERY: &str = "query { User { _docID name } }";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TestDocument {
    #[serde(rename = "_docID")]
    pub doc_id: String,
    pub name: String,
}

impl Document for TestDocument {
    fn doc_id(&self) -> Option<&str> {
        Some(self.doc_id.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    #[serde(rename = "_docID")]
    doc_id: String,
}

/// Start a node with the user schema and subscribe to its collections.
pub async fn setup_node(cfg: &Config) -> Result<MemoryNode> {
    let node = MemoryNode::new();
    start_node(
        &node,
        cfg,
        &ProvidedSchemaApplier::new(USER_SCHEMA),
        &["User".to_string(), "AttestationRecord_User".to_string()],
    )
    .await?;
    Ok(node)
}

pub async fn setup_client(cfg: &Config) -> Result<AttestationClient<MemoryNode>> {
    Ok(AttestationClient::from_config(setup_node(cfg).await?, cfg))
}

pub async fn create_test_document(node: &MemoryNode, name: &str) -> Result<String> {
    let created: Created = post_mutation(
        node,
        &format!(
            "mutation {{ create_User(input: {{name: {}}}) {{ _docID }} }}",
            serde_json::to_string(name)?
        ),
    )
    .await?;
    Ok(created.doc_id)
}

pub async fn create_attestation_record(
    node: &MemoryNode,
    attested_doc: &str,
    source_doc: &str,
    cids: &[&str],
) -> Result<()> {
    let _: AttestationRecord = post_mutation(
        node,
        &format!(
            "mutation {{
                create_AttestationRecord_User(input: {{
                    attested_doc: {}
                    source_doc: {}
                    CIDs: {}
                }}) {{
                    attested_doc
                }}
            }}",
            serde_json::to_string(attested_doc)?,
            serde_json::to_string(source_doc)?,
            serde_json::to_string(cids)?
        ),
    )
    .await?;
    Ok(())
}

pub fn config_with_threshold(threshold: &str) -> Config {
    let mut cfg = Config::default();
    cfg.shinzo.minimum_attestations = threshold.to_string();
    cfg
}
