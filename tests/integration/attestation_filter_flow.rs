mod common;

use anyhow::Result;
use common::*;
use shinzo_attestation::{filter_by_minimum_attestations, AttestationError, PerViewCollections};
use shinzo_config::Config;
use shinzo_defra::query_array;
use std::collections::HashSet;

fn ids(docs: &[TestDocument]) -> HashSet<String> {
    docs.iter().map(|d| d.doc_id.clone()).collect()
}

#[tokio::test]
async fn test_threshold_scenario() -> Result<()> {
    let client = setup_client(&Config::default()).await?;
    let node = client.node();

    let doc1 = create_test_document(node, "doc-1").await?;
    let doc2 = create_test_document(node, "doc-2").await?;
    let doc3 = create_test_document(node, "doc-3").await?;
    create_attestation_record(node, &doc1, "source-1", &["c1", "c2", "c3"]).await?;
    create_attestation_record(node, &doc2, "source-2", &["c4", "c5"]).await?;
    create_attestation_record(node, &doc2, "source-3", &["c4", "c6"]).await?;
    create_attestation_record(node, &doc3, "source-4", &["c7"]).await?;

    let expected: HashSet<String> = [doc1.clone(), doc2.clone()].into_iter().collect();

    let at_two: Vec<TestDocument> = client.query_array_with_attestation_filter(USERS_QUERY, 2).await?;
    assert_eq!(ids(&at_two), expected);

    let at_three: Vec<TestDocument> =
        client.query_array_with_attestation_filter(USERS_QUERY, 3).await?;
    assert_eq!(ids(&at_three), expected);

    let at_four: Vec<TestDocument> =
        client.query_array_with_attestation_filter(USERS_QUERY, 4).await?;
    assert!(at_four.is_empty());

    let at_zero: Vec<TestDocument> =
        client.query_array_with_attestation_filter(USERS_QUERY, 0).await?;
    assert_eq!(ids(&at_zero).len(), 3);
    assert!(ids(&at_zero).contains(&doc3));

    Ok(())
}

#[tokio::test]
async fn test_document_without_records() -> Result<()> {
    let client = setup_client(&Config::default()).await?;
    let lonely = create_test_document(client.node(), "lonely").await?;

    for threshold in [1, 2, 50] {
        let kept: Vec<TestDocument> =
            client.query_array_with_attestation_filter(USERS_QUERY, threshold).await?;
        assert!(kept.is_empty(), "threshold {} kept an unattested document", threshold);
    }

    let kept: Vec<TestDocument> = client.query_array_with_attestation_filter(USERS_QUERY, 0).await?;
    assert_eq!(kept[0].doc_id, lonely);
    Ok(())
}

#[tokio::test]
async fn test_zero_threshold_ignores_malformed_query() -> Result<()> {
    let node = setup_node(&Config::default()).await?;
    create_test_document(&node, "anything").await?;
    let docs: Vec<TestDocument> = query_array(&node, USERS_QUERY).await?;
    let before = node.requests().await.len();

    let scope = PerViewCollections::new();
    let kept = filter_by_minimum_attestations(&node, &scope, docs.clone(), 0, "").await?;
    assert_eq!(kept, docs);
    assert_eq!(node.requests().await.len(), before);

    let err = filter_by_minimum_attestations(&node, &scope, docs, 1, "").await.unwrap_err();
    assert!(matches!(err, AttestationError::ViewNameExtraction { .. }));
    assert!(err.to_string().contains("extracting view name"));
    Ok(())
}

#[tokio::test]
async fn test_empty_input_issues_no_attestation_query() -> Result<()> {
    let node = setup_node(&Config::default()).await?;
    let before = node.requests().await.len();

    let kept = filter_by_minimum_attestations(
        &node,
        &PerViewCollections::new(),
        Vec::<TestDocument>::new(),
        3,
        USERS_QUERY,
    )
    .await?;
    assert!(kept.is_empty());
    assert_eq!(node.requests().await.len(), before);
    Ok(())
}

#[tokio::test]
async fn test_configured_threshold_from_config() -> Result<()> {
    let client = setup_client(&config_with_threshold(" 2 ")).await?;
    let node = client.node();
    let doc1 = create_test_document(node, "Document 1").await?;
    let doc2 = create_test_document(node, "Document 2").await?;
    create_attestation_record(node, &doc1, "source-1", &["cid-1", "cid-2"]).await?;
    create_attestation_record(node, &doc2, "source-2", &["cid-3"]).await?;

    let kept: Vec<TestDocument> =
        client.query_array_with_configured_attestation_filter(USERS_QUERY).await?;
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].doc_id, doc1);

    let single: TestDocument =
        client.query_single_with_configured_attestation_filter(USERS_QUERY).await?;
    assert_eq!(single.doc_id, doc1);
    Ok(())
}

#[tokio::test]
async fn test_invalid_configured_threshold_disables_filtering() -> Result<()> {
    for threshold in ["", "abc", "-3"] {
        let client = setup_client(&config_with_threshold(threshold)).await?;
        assert_eq!(client.minimum_attestations(), 0);
        create_test_document(client.node(), "unattested").await?;

        let kept: Vec<TestDocument> =
            client.query_array_with_configured_attestation_filter(USERS_QUERY).await?;
        assert_eq!(kept.len(), 1);
    }
    Ok(())
}

#[tokio::test]
async fn test_duplicate_cids_across_sources_count_once() -> Result<()> {
    let client = setup_client(&Config::default()).await?;
    let node = client.node();
    let doc = create_test_document(node, "echoed").await?;
    for source in ["s1", "s2", "s3"] {
        create_attestation_record(node, &doc, source, &["same-cid"]).await?;
    }

    let kept: Vec<TestDocument> = client.query_array_with_attestation_filter(USERS_QUERY, 2).await?;
    assert!(kept.is_empty());
    let kept: Vec<TestDocument> = client.query_array_with_attestation_filter(USERS_QUERY, 1).await?;
    assert_eq!(kept.len(), 1);
    Ok(())
}
