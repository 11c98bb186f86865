//! Local filesystem storage provider.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::provider::{validate_file_name, StorageProvider};
use labelkit_common::{Error, Result};

/// Local filesystem storage provider.
///
/// Stores files directly inside a root folder.
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    /// Create a new local provider with the given root directory.
    ///
    /// Touches nothing on disk; a missing root is created by the first write.
    ///
    /// # Errors
    /// - Root exists but is not a directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if root.exists() && !root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        Ok(Self { root })
    }

    /// Root folder of this provider.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn to_fs_path(&self, file_name: &str) -> Result<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.root.join(file_name))
    }
}

#[async_trait]
impl StorageProvider for LocalProvider {
    fn name(&self) -> &str {
        "localFileSystemProxy"
    }

    async fn read_text(&self, file_name: &str) -> Result<String> {
        let fs_path = self.to_fs_path(file_name)?;

        match fs::read_to_string(&fs_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(format!("File not found: {}", file_name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_text(&self, file_name: &str, content: &str) -> Result<()> {
        let fs_path = self.to_fs_path(file_name)?;

        fs::create_dir_all(&self.root).await?;
        fs::write(&fs_path, content.as_bytes()).await?;
        debug!(path = %fs_path.display(), size = content.len(), "File written");
        Ok(())
    }

    async fn delete_file(&self, file_name: &str) -> Result<()> {
        let fs_path = self.to_fs_path(file_name)?;

        match fs::remove_file(&fs_path).await {
            Ok(()) => {
                debug!(path = %fs_path.display(), "File deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_files(&self, extension: Option<&str>) -> Result<Vec<String>> {
        let mut results = Vec::new();
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(results),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if extension.map_or(true, |ext| name.ends_with(ext)) {
                results.push(name);
            }
        }

        results.sort();
        Ok(results)
    }

    async fn exists(&self, file_name: &str) -> Result<bool> {
        let fs_path = self.to_fs_path(file_name)?;
        Ok(fs::try_exists(&fs_path).await?)
    }
}
