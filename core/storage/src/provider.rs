//! Storage provider trait definition.

use async_trait::async_trait;

use labelkit_common::{Error, Result};

/// Storage provider trait for different backends.
///
/// A provider addresses a single container (a folder, a blob container, ...)
/// holding flat, named text files. Implementations handle their own
/// authentication and rate limiting.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Get the provider name (e.g., "memory", "localFileSystemProxy").
    fn name(&self) -> &str;

    /// Read a text file.
    ///
    /// # Errors
    /// - `NotFound` if the file does not exist
    /// - Back-end I/O errors
    async fn read_text(&self, file_name: &str) -> Result<String>;

    /// Create or replace a text file.
    ///
    /// # Postconditions
    /// - A subsequent `read_text` returns `content`
    async fn write_text(&self, file_name: &str, content: &str) -> Result<()>;

    /// Delete a file.
    ///
    /// Deleting a file that does not exist succeeds.
    async fn delete_file(&self, file_name: &str) -> Result<()>;

    /// List file names, optionally restricted to those ending in `extension`.
    async fn list_files(&self, extension: Option<&str>) -> Result<Vec<String>>;

    /// Check if a file exists.
    async fn exists(&self, file_name: &str) -> Result<bool>;
}

/// Validate a flat file name.
///
/// # Errors
/// - Empty name, `.`/`..`, or a name containing path separators
pub fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return Err(Error::InvalidInput(format!(
            "Invalid file name: '{}'",
            file_name
        )));
    }
    if file_name.contains('/') || file_name.contains('\\') {
        return Err(Error::InvalidInput(format!(
            "File name cannot contain separators: '{}'",
            file_name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("Project.vott").is_ok());
        assert!(validate_file_name("asset-1-asset.json").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("../escape.json").is_err());
        assert!(validate_file_name("dir\\file").is_err());
    }
}
