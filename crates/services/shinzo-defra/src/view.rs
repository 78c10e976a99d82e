use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DefraError;
use crate::node::DefraNode;
use crate::schema::{ProvidedSchemaApplier, SchemaApplier};

/// A named view: the query it materializes, the SDL of its output collection and the lens
/// transforms applied on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub query: String,
    pub sdl: String,
    #[serde(rename = "transform.lenses", default)]
    pub lenses: Vec<String>,
    #[serde(default)]
    pub name: String,
}

impl View {
    /// Apply the view's SDL and subscribe to its collection over P2P.
    pub async fn subscribe_to(&self, node: &dyn DefraNode) -> Result<(), DefraError> {
        debug!(view = %self.name, "subscribing to view");
        ProvidedSchemaApplier::new(self.sdl.as_str())
            .apply_schema(node)
            .await
            .map_err(|e| DefraError::ApplySchema(Box::new(e)))?;

        let collections = vec![self.name.clone()];
        node.add_p2p_collections(&collections)
            .await
            .map_err(|e| DefraError::Subscribe {
                collections,
                source: Box::new(e),
            })
    }
}
