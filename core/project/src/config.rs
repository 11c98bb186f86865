//! Project service configuration and file naming constants.

use serde::{Deserialize, Serialize};

use labelkit_common::{Error, Result};

/// Extension appended to a project's name to form its file name.
pub const PROJECT_FILE_EXTENSION: &str = ".vott";

/// Suffix appended to an asset id to form its metadata file name.
pub const ASSET_METADATA_FILE_EXTENSION: &str = "-asset.json";

/// Suffix appended to a project's name by the JSON export provider.
pub const EXPORT_FILE_SUFFIX: &str = "-export.json";

/// Version stamped on new projects and asset metadata records.
pub const PROJECT_VERSION: &str = "2.1.0";

/// Tunables of the project service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Upper bound on per-asset cascades running at once.
    pub max_concurrent_cascades: usize,
    /// Extension of project files.
    pub project_file_extension: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_cascades: 8,
            project_file_extension: PROJECT_FILE_EXTENSION.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Check the configuration for values the service cannot work with.
    ///
    /// # Errors
    /// - Zero cascade concurrency
    /// - Empty extension, or one containing path separators
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_cascades == 0 {
            return Err(Error::InvalidInput(
                "maxConcurrentCascades must be at least 1".to_string(),
            ));
        }
        let ext = &self.project_file_extension;
        if ext.is_empty() || ext.contains('/') || ext.contains('\\') {
            return Err(Error::InvalidInput(format!(
                "Invalid project file extension: '{}'",
                ext
            )));
        }
        Ok(())
    }

    /// File name of a project within its target storage.
    pub fn project_file_name(&self, project_name: &str) -> String {
        format!("{}{}", project_name, self.project_file_extension)
    }

    /// Deserialize configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.project_file_name("My Project"), "My Project.vott");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ServiceConfig::from_json(r#"{"maxConcurrentCascades": 2}"#).unwrap();

        assert_eq!(config.max_concurrent_cascades, 2);
        assert_eq!(config.project_file_extension, PROJECT_FILE_EXTENSION);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ServiceConfig::from_json(r#"{"maxConcurrentCascades": 0}"#).is_err());
        assert!(ServiceConfig::from_json(r#"{"projectFileExtension": "/x"}"#).is_err());
        assert!(ServiceConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ServiceConfig {
            max_concurrent_cascades: 3,
            project_file_extension: ".proj".to_string(),
        };
        let restored = ServiceConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(restored, config);
    }
}
