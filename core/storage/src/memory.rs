//! In-memory storage provider for testing.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::provider::{validate_file_name, StorageProvider};
use labelkit_common::{Error, Result};

/// In-memory storage provider.
///
/// Clones share the same files, so a handle kept by a test observes what the
/// project service wrote through a registry-resolved clone. All data is lost
/// when the last handle is dropped.
#[derive(Clone, Default)]
pub struct MemoryProvider {
    files: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryProvider {
    /// Create a new empty memory provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all stored files, keyed by name.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.files.read().await.clone()
    }
}

#[async_trait]
impl StorageProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn read_text(&self, file_name: &str) -> Result<String> {
        validate_file_name(file_name)?;
        self.files
            .read()
            .await
            .get(file_name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("File not found: {}", file_name)))
    }

    async fn write_text(&self, file_name: &str, content: &str) -> Result<()> {
        validate_file_name(file_name)?;
        self.files
            .write()
            .await
            .insert(file_name.to_string(), content.to_string());
        Ok(())
    }

    async fn delete_file(&self, file_name: &str) -> Result<()> {
        validate_file_name(file_name)?;
        self.files.write().await.remove(file_name);
        Ok(())
    }

    async fn list_files(&self, extension: Option<&str>) -> Result<Vec<String>> {
        let files = self.files.read().await;
        Ok(files
            .keys()
            .filter(|name| extension.map_or(true, |ext| name.ends_with(ext)))
            .cloned()
            .collect())
    }

    async fn exists(&self, file_name: &str) -> Result<bool> {
        validate_file_name(file_name)?;
        Ok(self.files.read().await.contains_key(file_name))
    }
}
