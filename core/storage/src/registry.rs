//! Provider registry for dynamic provider resolution.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::provider::StorageProvider;
use labelkit_common::{Error, Result};

/// Provider type of the in-memory provider.
pub const MEMORY_PROVIDER_TYPE: &str = "memory";

/// Provider type of the local filesystem provider.
pub const LOCAL_PROVIDER_TYPE: &str = "localFileSystemProxy";

/// Factory function type for creating providers from connection options.
pub type StorageProviderFactory =
    Box<dyn Fn(&Value) -> Result<Arc<dyn StorageProvider>> + Send + Sync>;

/// Registry for storage provider factories.
///
/// Resolves a connection's declared provider type and options into a
/// provider instance. Resolution has no side effects beyond constructing the
/// provider.
pub struct StorageProviderRegistry {
    factories: HashMap<String, StorageProviderFactory>,
}

impl StorageProviderRegistry {
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
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: StorageProviderFactory,
    ) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::AlreadyExists(format!(
                "Storage provider '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a provider by type and options.
    ///
    /// # Errors
    /// - `ProviderResolution` if the type is not registered
    /// - Whatever the factory fails with for invalid options
    pub fn resolve(&self, provider_type: &str, options: &Value) -> Result<Arc<dyn StorageProvider>> {
        let factory = self.factories.get(provider_type).ok_or_else(|| {
            Error::ProviderResolution(format!(
                "Storage provider '{}' is not registered",
                provider_type
            ))
        })?;
        factory(options)
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

impl Default for StorageProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn create_memory_provider(_options: &Value) -> Result<Arc<dyn StorageProvider>> {
    Ok(Arc::new(crate::memory::MemoryProvider::new()))
}

fn create_local_provider(options: &Value) -> Result<Arc<dyn StorageProvider>> {
    let folder = options
        .get("folderPath")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            Error::ProviderResolution(
                "Local provider requires a 'folderPath' option".to_string(),
            )
        })?;
    let provider = crate::local::LocalProvider::new(folder).map_err(|e| {
        Error::ProviderResolution(format!("Invalid local folder '{}': {}", folder, e))
    })?;
    Ok(Arc::new(provider))
}

/// Create a registry with the built-in providers.
///
/// The `memory` factory hands out a fresh, empty provider on every call; to
/// share one in-memory container register a factory cloning a
/// [`MemoryProvider`](crate::MemoryProvider) handle instead.
pub fn create_default_registry() -> StorageProviderRegistry {
    let mut factories: HashMap<String, StorageProviderFactory> = HashMap::new();

    factories.insert(MEMORY_PROVIDER_TYPE.to_string(), Box::new(create_memory_provider));
    factories.insert(LOCAL_PROVIDER_TYPE.to_string(), Box::new(create_local_provider));

    StorageProviderRegistry { factories }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProvider;
    use serde_json::json;
    use tempfile::TempDir;

    fn memory_factory() -> StorageProviderFactory {
        Box::new(|_: &Value| -> Result<Arc<dyn StorageProvider>> {
            Ok(Arc::new(MemoryProvider::new()))
        })
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = StorageProviderRegistry::new();

        registry.register("test", memory_factory()).unwrap();

        let provider = registry.resolve("test", &Value::Null).unwrap();
        assert_eq!(provider.name(), "memory");
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = StorageProviderRegistry::new();

        registry.register("test", memory_factory()).unwrap();

        let result = registry.register("test", memory_factory());
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
    }

    #[test]
    fn test_resolve_unknown_fails() {
        let registry = StorageProviderRegistry::new();
        let result = registry.resolve("unknown", &Value::Null);
        assert!(matches!(result, Err(Error::ProviderResolution(_))));
    }

    #[test]
    fn test_default_registry_local() {
        let temp = TempDir::new().unwrap();
        let registry = create_default_registry();

        let provider = registry
            .resolve(LOCAL_PROVIDER_TYPE, &json!({"folderPath": temp.path()}))
            .unwrap();
        assert_eq!(provider.name(), LOCAL_PROVIDER_TYPE);

        let result = registry.resolve(LOCAL_PROVIDER_TYPE, &json!({}));
        assert!(matches!(result, Err(Error::ProviderResolution(_))));
    }

    #[test]
    fn test_resolve_local_has_no_side_effects() {
        let temp = TempDir::new().unwrap();
        let registry = create_default_registry();

        let missing = temp.path().join("not-yet");
        registry
            .resolve(LOCAL_PROVIDER_TYPE, &json!({"folderPath": missing}))
            .unwrap();
        assert!(!missing.exists());

        let file = temp.path().join("project.vott");
        std::fs::write(&file, "{}").unwrap();
        let result = registry.resolve(LOCAL_PROVIDER_TYPE, &json!({"folderPath": file}));
        assert!(matches!(result, Err(Error::ProviderResolution(_))));
    }

    #[test]
    fn test_providers_list() {
        let registry = create_default_registry();
        let providers = registry.providers();

        assert!(providers.contains(&MEMORY_PROVIDER_TYPE.to_string()));
        assert!(registry.has_provider(LOCAL_PROVIDER_TYPE));
        assert!(!registry.has_provider("azureBlobStorage"));
    }
}
