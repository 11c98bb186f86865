//! Export provider abstraction and registry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use labelkit_common::{Error, ExportFormat, Project, Result};
use labelkit_storage::StorageProviderRegistry;

/// Outcome of an export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    /// Files written to the target storage.
    pub files: Vec<String>,
    /// Number of assets included.
    pub asset_count: usize,
    pub completed_at: DateTime<Utc>,
}

/// Export provider trait for different output formats.
#[async_trait]
pub trait ExportProvider: Send + Sync {
    /// Get the provider name (e.g., "vottJson").
    fn name(&self) -> &str;

    /// Produce the export artifacts of the project.
    async fn export(&self) -> Result<ExportResult>;

    /// Persist provider settings for the declared export format.
    ///
    /// Returns the provider options to record on the project.
    async fn save(&self, export_format: &ExportFormat) -> Result<Value>;
}

/// Factory function type creating an export provider for a project.
pub type ExportProviderFactory =
    Box<dyn Fn(&Project, &Value) -> Result<Arc<dyn ExportProvider>> + Send + Sync>;

/// Registry for export provider factories.
pub struct ExportProviderRegistry {
    factories: HashMap<String, ExportProviderFactory>,
}

impl ExportProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a provider factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: ExportProviderFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::AlreadyExists(format!(
                "Export provider '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a provider for a project by type and options.
    ///
    /// # Errors
    /// - `ProviderResolution` if the type is not registered
    /// - Whatever the factory fails with for invalid options
    pub fn resolve(
        &self,
        provider_type: &str,
        project: &Project,
        options: &Value,
    ) -> Result<Arc<dyn ExportProvider>> {
        let factory = self.factories.get(provider_type).ok_or_else(|| {
            Error::ProviderResolution(format!(
                "Export provider '{}' is not registered",
                provider_type
            ))
        })?;
        factory(project, options)
    }

    /// Get list of registered provider names.
    pub fn providers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check if a provider is registered.
    pub fn has_provider(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ExportProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in export providers.
///
/// Providers write their artifacts to the project's target storage, resolved
/// through `storage`.
pub fn create_default_export_registry(storage: Arc<StorageProviderRegistry>) -> ExportProviderRegistry {
    let mut registry = ExportProviderRegistry::new();
    registry.factories.insert(
        crate::json_export::JSON_EXPORT_PROVIDER_TYPE.to_string(),
        crate::json_export::factory(storage),
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelkit_common::Connection;
    use serde_json::json;

    struct NullExporter;

    #[async_trait]
    impl ExportProvider for NullExporter {
        fn name(&self) -> &str {
            "null"
        }

        async fn export(&self) -> Result<ExportResult> {
            Ok(ExportResult {
                files: Vec::new(),
                asset_count: 0,
                completed_at: Utc::now(),
            })
        }

        async fn save(&self, export_format: &ExportFormat) -> Result<Value> {
            Ok(export_format.provider_options.plain()?.clone())
        }
    }

    fn null_factory() -> ExportProviderFactory {
        Box::new(|_: &Project, _: &Value| -> Result<Arc<dyn ExportProvider>> {
            Ok(Arc::new(NullExporter))
        })
    }

    fn project() -> Project {
        Project {
            id: None,
            name: "Export".to_string(),
            version: String::new(),
            description: None,
            security_token: "t".to_string(),
            source_connection: Connection::new("s", "memory", json!({})),
            target_connection: Connection::new("t", "memory", json!({})),
            export_format: None,
            tags: Vec::new(),
            assets: Default::default(),
            last_visited_asset_id: None,
            auto_save: false,
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ExportProviderRegistry::new();
        registry.register("null", null_factory()).unwrap();

        let provider = registry.resolve("null", &project(), &Value::Null).unwrap();
        assert_eq!(provider.name(), "null");
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ExportProviderRegistry::new();
        registry.register("null", null_factory()).unwrap();

        assert!(matches!(
            registry.register("null", null_factory()),
            Err(Error::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_resolve_unknown_fails() {
        let registry = ExportProviderRegistry::new();
        let result = registry.resolve("pascalVOC", &project(), &Value::Null);

        assert!(matches!(result, Err(Error::ProviderResolution(_))));
    }

    #[test]
    fn test_default_registry_has_json() {
        let storage = Arc::new(labelkit_storage::create_default_registry());
        let registry = create_default_export_registry(storage);

        assert!(registry.has_provider(crate::json_export::JSON_EXPORT_PROVIDER_TYPE));
        assert_eq!(registry.providers().len(), 1);
    }
}
