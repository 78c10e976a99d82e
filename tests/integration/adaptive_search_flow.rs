mod common;

use anyhow::Result;
use common::*;
use shinzo_attestation::AttestationError;
use shinzo_config::Config;
use shinzo_defra::MemoryNode;

async fn populate_low(node: &MemoryNode, count: usize, prefix: &str) -> Result<()> {
    for i in 0..count {
        let doc = create_test_document(node, &format!("{prefix} {i}")).await?;
        let cid = format!("cid-{prefix}-{i}");
        create_attestation_record(node, &doc, &format!("source-{i}"), &[cid.as_str()]).await?;
    }
    Ok(())
}

async fn add_high(node: &MemoryNode) -> Result<String> {
    let doc = create_test_document(node, "High Attestation Document").await?;
    create_attestation_record(
        node,
        &doc,
        "source-high",
        &["cid-high-1", "cid-high-2", "cid-high-3", "cid-high-4", "cid-high-5"],
    )
    .await?;
    Ok(doc)
}

#[tokio::test]
async fn test_finds_high_attestation_document_after_expanding() -> Result<()> {
    let client = setup_client(&Config::default()).await?;
    populate_low(client.node(), 150, "Low Attestation Doc").await?;
    let high = add_high(client.node()).await?;

    let found: TestDocument = client.query_single_with_attestation_filter(USERS_QUERY, 2).await?;
    assert_eq!(found.doc_id, high);
    assert_eq!(found.name, "High Attestation Document");

    let requests = client.node().requests().await;
    assert!(requests.iter().any(|r| r.contains("User(limit: 1000)")));
    Ok(())
}

#[tokio::test]
async fn test_insertion_order_does_not_matter() -> Result<()> {
    for low_before in [0, 75, 150] {
        let client = setup_client(&Config::default()).await?;
        populate_low(client.node(), low_before, "before").await?;
        let high = add_high(client.node()).await?;
        populate_low(client.node(), 150 - low_before, "after").await?;

        let found: TestDocument =
            client.query_single_with_attestation_filter(USERS_QUERY, 2).await?;
        assert_eq!(found.doc_id, high, "high document inserted after {} others", low_before);
    }
    Ok(())
}

#[tokio::test]
async fn test_exhausting_collection_reports_entire_collection() -> Result<()> {
    let client = setup_client(&Config::default()).await?;
    populate_low(client.node(), 200, "Low Doc").await?;

    let err = client
        .query_single_with_attestation_filter::<TestDocument>(USERS_QUERY, 2)
        .await
        .unwrap_err();
    assert!(matches!(err, AttestationError::NoQualifyingResultInCollection { threshold: 2 }));
    let message = err.to_string();
    assert!(message.contains("no results found that meet the minimum attestation threshold"));
    assert!(message.contains("after querying entire collection"));
    Ok(())
}

#[tokio::test]
async fn test_declared_limit_is_a_hard_cap() -> Result<()> {
    let client = setup_client(&Config::default()).await?;
    populate_low(client.node(), 150, "Low Attestation Doc").await?;
    add_high(client.node()).await?;
    let before = client.node().requests().await.len();

    let err = client
        .query_single_with_attestation_filter::<TestDocument>(
            "query { User(limit: 10) { _docID name } }",
            2,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AttestationError::NoQualifyingResultWithinLimit { threshold: 2, limit: Some(10) }
    ));
    let message = err.to_string();
    assert!(message.contains("no results found that meet the minimum attestation threshold"));
    assert!(!message.contains("entire collection"));

    // one query for the window, one for its attestation records
    let issued: Vec<String> = client.node().requests().await.split_off(before);
    assert_eq!(issued.len(), 2);
    assert!(issued.iter().all(|r| !r.contains("limit: 100")));
    Ok(())
}

#[tokio::test]
async fn test_declared_limit_returns_match_inside_window() -> Result<()> {
    let client = setup_client(&Config::default()).await?;
    let node = client.node();
    let doc1 = create_test_document(node, "Document 1").await?;
    let doc2 = create_test_document(node, "Document 2").await?;
    create_attestation_record(node, &doc1, "source-1", &["cid-1", "cid-2", "cid-3"]).await?;
    create_attestation_record(node, &doc2, "source-2", &["cid-4"]).await?;

    let found: TestDocument = client
        .query_single_with_attestation_filter("query { User(limit: 10) { _docID name } }", 2)
        .await?;
    assert_eq!(found.doc_id, doc1);
    Ok(())
}

#[tokio::test]
async fn test_changing_threshold_changes_result() -> Result<()> {
    let client = setup_client(&Config::default()).await?;
    let node = client.node();
    let doc1 = create_test_document(node, "Document 1").await?;
    create_attestation_record(node, &doc1, "source-1", &["cid-1", "cid-2"]).await?;
    let doc2 = create_test_document(node, "Document 2").await?;
    create_attestation_record(node, &doc2, "source-2", &["cid-3"]).await?;
    let doc3 = create_test_document(node, "Document 3").await?;
    create_attestation_record(node, &doc3, "source-3", &["cid-4", "cid-5", "cid-6", "cid-7", "cid-8"])
        .await?;

    let found: TestDocument = client.query_single_with_attestation_filter(USERS_QUERY, 2).await?;
    assert!(found.doc_id == doc1 || found.doc_id == doc3);

    let found: TestDocument = client.query_single_with_attestation_filter(USERS_QUERY, 3).await?;
    assert_eq!(found.doc_id, doc3);
    Ok(())
}
