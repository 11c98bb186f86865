//! Identifier types used throughout labelkit.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a new ProjectId from a string.
    ///
    /// # Errors
    /// - Returns error if id is empty
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidInput(
                "ProjectId cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Generate a random project id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an asset within a project.
///
/// Asset ids double as storage keys for per-asset metadata, so they may not
/// contain path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Create a new AssetId from a string.
    ///
    /// # Errors
    /// - Returns error if id is empty or contains a path separator
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidInput(
                "AssetId cannot be empty".to_string(),
            ));
        }
        if id.contains('/') || id.contains('\\') {
            return Err(crate::Error::InvalidInput(
                "AssetId cannot contain separators".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_id_creation() {
        let id = ProjectId::new("project-1").unwrap();
        assert_eq!(id.as_str(), "project-1");
    }

    #[test]
    fn test_project_id_empty_fails() {
        assert!(ProjectId::new("").is_err());
    }

    #[test]
    fn test_generated_project_ids_differ() {
        assert_ne!(ProjectId::generate(), ProjectId::generate());
    }

    #[test]
    fn test_asset_id_rejects_separators() {
        assert!(AssetId::new("a/b").is_err());
        assert!(AssetId::new("a\\b").is_err());
        assert!(AssetId::new("").is_err());
        assert_eq!(AssetId::new("asset-1").unwrap().to_string(), "asset-1");
    }

    #[test]
    fn test_asset_id_serializes_as_string() {
        let id = AssetId::new("asset-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"asset-1\"");
    }
}
