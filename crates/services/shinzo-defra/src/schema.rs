use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::DefraError;
use crate::node::DefraNode;

/// Default location of an application's schema file, relative to the project root.
pub const DEFAULT_SCHEMA_PATH: &str = "schema/schema.graphql";

/// Applies a schema to a node during bootstrap.
#[async_trait]
pub trait SchemaApplier: Send + Sync {
    async fn apply_schema(&self, node: &dyn DefraNode) -> Result<(), DefraError>;
}

/// Applies an SDL string held in memory.
#[derive(Debug, Clone)]
pub struct ProvidedSchemaApplier {
    sdl: String,
}

impl ProvidedSchemaApplier {
    pub fn new(sdl: impl Into<String>) -> Self {
        Self { sdl: sdl.into() }
    }
}

#[async_trait]
impl SchemaApplier for ProvidedSchemaApplier {
    async fn apply_schema(&self, node: &dyn DefraNode) -> Result<(), DefraError> {
        debug!("applying provided schema");
        node.add_schema(&self.sdl).await.map(|_| ())
    }
}

/// Reads the schema from a file located with [`find_file`].
#[derive(Debug, Clone)]
pub struct FileSchemaApplier {
    path: PathBuf,
}

impl Default for FileSchemaApplier {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_PATH)
    }
}

impl FileSchemaApplier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SchemaApplier for FileSchemaApplier {
    async fn apply_schema(&self, node: &dyn DefraNode) -> Result<(), DefraError> {
        let path = find_file(&self.path)?;
        debug!(path = %path.display(), "applying schema from file");
        let sdl = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| DefraError::Io { path, source })?;
        node.add_schema(&sdl).await.map(|_| ())
    }
}

/// Accepts everything without touching the node.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSchemaApplier;

#[async_trait]
impl SchemaApplier for NoopSchemaApplier {
    async fn apply_schema(&self, _node: &dyn DefraNode) -> Result<(), DefraError> {
        Ok(())
    }
}

/// Locate `expected` from the project root, a `bin/` directory or a nested crate directory.
pub fn find_file(expected: impl AsRef<Path>) -> Result<PathBuf, DefraError> {
    let expected = expected.as_ref();
    let candidates = vec![
        expected.to_path_buf(),
        Path::new("..").join(expected),
        Path::new("../..").join(expected),
    ];

    candidates
        .iter()
        .find(|p| p.exists())
        .cloned()
        .ok_or(DefraError::FileNotFound(candidates))
}
