use std::sync::Arc;

use serde::de::DeserializeOwned;
use shinzo_config::Config;
use shinzo_defra::{query_array, wrap_query_if_needed, DefraNode};
use shinzo_types::Document;

use crate::error::{AttestationError, DOCUMENTS_QUERY_CONTEXT};
use crate::filter::filter_by_minimum_attestations;
use crate::records::{PerViewCollections, RecordScope};
use crate::search::find_first_meeting_threshold;

/// Attestation-aware queries against one node.
///
/// The client carries the record scope and the configured minimum threshold so call sites
/// only pass queries. It holds no state between calls.
#[derive(Debug, Clone)]
pub struct AttestationClient<N> {
    node: N,
    scope: Arc<dyn RecordScope>,
    minimum_attestations: u32,
}

impl<N: DefraNode> AttestationClient<N> {
    /// A client using per-view record collections and no configured threshold.
    pub fn new(node: N) -> Self {
        Self {
            node,
            scope: Arc::new(PerViewCollections::new()),
            minimum_attestations: 0,
        }
    }

    /// A client whose configured threshold comes from `cfg.shinzo.minimum_attestations`.
    pub fn from_config(node: N, cfg: &Config) -> Self {
        Self::new(node).with_minimum_attestations(cfg.minimum_attestations())
    }

    pub fn with_scope(mut self, scope: impl RecordScope + 'static) -> Self {
        self.scope = Arc::new(scope);
        self
    }

    pub fn with_minimum_attestations(mut self, minimum_attestations: u32) -> Self {
        self.minimum_attestations = minimum_attestations;
        self
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn scope(&self) -> &dyn RecordScope {
        self.scope.as_ref()
    }

    pub fn minimum_attestations(&self) -> u32 {
        self.minimum_attestations
    }

    /// Run `query` and keep the rows attested by at least `minimum_threshold` distinct CIDs.
    pub async fn query_array_with_attestation_filter<T>(
        &self,
        query: &str,
        minimum_threshold: u32,
    ) -> Result<Vec<T>, AttestationError>
    where
        T: DeserializeOwned + Document,
    {
        let query = wrap_query_if_needed(query);
        let rows: Vec<T> = query_array(&self.node, &query).await.map_err(|source| {
            AttestationError::QueryExecution {
                context: DOCUMENTS_QUERY_CONTEXT,
                source,
            }
        })?;
        filter_by_minimum_attestations(&self.node, self.scope(), rows, minimum_threshold, &query)
            .await
    }

    pub async fn query_array_with_configured_attestation_filter<T>(
        &self,
        query: &str,
    ) -> Result<Vec<T>, AttestationError>
    where
        T: DeserializeOwned + Document,
    {
        self.query_array_with_attestation_filter(query, self.minimum_attestations)
            .await
    }

    /// See [`find_first_meeting_threshold`].
    pub async fn query_single_with_attestation_filter<T>(
        &self,
        query: &str,
        minimum_threshold: u32,
    ) -> Result<T, AttestationError>
    where
        T: DeserializeOwned + Document,
    {
        find_first_meeting_threshold(&self.node, self.scope(), query, minimum_threshold).await
    }

    pub async fn query_single_with_configured_attestation_filter<T>(
        &self,
        query: &str,
    ) -> Result<T, AttestationError>
    where
        T: DeserializeOwned + Document,
    {
        self.query_single_with_attestation_filter(query, self.minimum_attestations)
            .await
    }
}
