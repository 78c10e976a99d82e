mod common;

use std::io::Write;

use anyhow::Result;
use common::*;
use shinzo_attestation::{
    add_attestation_record_collection, primitive_scope, AttestationClient, PerViewCollections,
};
use shinzo_config::load_config;
use shinzo_defra::{
    peers_into_bootstrap, start_node, DefraError, DefraNode, FileSchemaApplier, MemoryNode,
    NoopSchemaApplier, View,
};
use shinzo_types::PeerInfo;
use tempfile::{NamedTempFile, TempDir};

const PRIMITIVE_SCHEMA: &str = r#"
type Block {
    hash: String
    number: Int
}
type Log {
    address: String
    data: String
}
"#;

#[tokio::test]
async fn test_bootstrap_from_config_file() -> Result<()> {
    let dir = TempDir::new()?;
    let schema_path = dir.path().join("schema.graphql");
    std::fs::write(&schema_path, PRIMITIVE_SCHEMA)?;

    let peer = MemoryNode::new();
    let (bootstrap, errors) = peers_into_bootstrap(&[peer.peer_info()]);
    assert!(errors.is_empty());

    let mut config_file = NamedTempFile::new()?;
    write!(
        config_file,
        "[defradb.p2p]\nbootstrap_peers = {:?}\nlisten_addr = \"\"\n\n[shinzo]\nminimum_attestations = \"2\"\n",
        bootstrap
    )?;
    let cfg = load_config(config_file.path())?;

    let node = MemoryNode::new();
    start_node(
        &node,
        &cfg,
        &FileSchemaApplier::new(&schema_path),
        &["Block".to_string()],
    )
    .await?;
    assert_eq!(node.connected_peers().await, vec![peer.peer_info()]);
    assert_eq!(node.p2p_collections().await, vec!["Block"]);

    let scope = primitive_scope(PRIMITIVE_SCHEMA)?;
    add_attestation_record_collection(&node, &scope, "Block").await?;
    assert!(node.has_collection("AttestationRecord_Block").await);

    let attested = node.insert("Block", serde_json::json!({ "hash": "0xabc", "number": 1 })).await?;
    node.insert("Block", serde_json::json!({ "hash": "0xdef", "number": 2 })).await?;
    node.insert(
        "AttestationRecord_Block",
        serde_json::json!({ "attested_doc": attested, "CIDs": ["c1", "c2"] }),
    )
    .await?;

    let client = AttestationClient::from_config(node, &cfg).with_scope(scope);
    let blocks: Vec<serde_json::Value> = client
        .query_array_with_configured_attestation_filter("Block { _docID hash }")
        .await?;
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["hash"], "0xabc");
    Ok(())
}

#[tokio::test]
async fn test_view_with_attestation_records() -> Result<()> {
    let node = setup_node(&config_with_threshold("1")).await?;
    let view = View {
        query: "Log {address topics data transactionHash blockNumber}".to_string(),
        sdl: "type FilteredAndDecodedLogs {transactionHash: String}".to_string(),
        lenses: Vec::new(),
        name: "FilteredAndDecodedLogs".to_string(),
    };
    view.subscribe_to(&node).await?;

    let scope = PerViewCollections::new();
    add_attestation_record_collection(&node, &scope, &view.name).await?;
    assert_eq!(
        node.p2p_collections().await,
        vec![
            "AttestationRecord_FilteredAndDecodedLogs",
            "AttestationRecord_User",
            "FilteredAndDecodedLogs",
            "User"
        ]
    );

    let log = node
        .insert("FilteredAndDecodedLogs", serde_json::json!({ "transactionHash": "0x1" }))
        .await?;
    node.insert(
        "AttestationRecord_FilteredAndDecodedLogs",
        serde_json::json!({ "attested_doc": log, "source_doc": "bae-src", "CIDs": ["c1"] }),
    )
    .await?;

    let client = AttestationClient::new(node).with_minimum_attestations(1);
    let found: serde_json::Value = client
        .query_single_with_configured_attestation_filter(
            "{ FilteredAndDecodedLogs { _docID transactionHash } }",
        )
        .await?;
    assert_eq!(found["_docID"], log.as_str());
    Ok(())
}

#[tokio::test]
async fn test_bootstrap_fails_when_all_peers_unreachable() -> Result<()> {
    let node = MemoryNode::new();
    node.mark_unreachable("12D3KooWdown").await;

    let mut cfg = config_with_threshold("0");
    cfg.defradb.p2p.bootstrap_peers = peers_into_bootstrap(&[PeerInfo {
        id: "12D3KooWdown".to_string(),
        addresses: vec!["/ip4/10.1.1.1/tcp/9171".to_string()],
    }])
    .0;

    let err = start_node(&node, &cfg, &NoopSchemaApplier, &[]).await.unwrap_err();
    assert!(matches!(err, DefraError::NoPeersReachable(_)));
    Ok(())
}
