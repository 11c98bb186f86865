//! Per-asset metadata persistence.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::{ASSET_METADATA_FILE_EXTENSION, PROJECT_VERSION};
use labelkit_common::{Asset, AssetId, AssetMetadata, AssetState, Error, Result};
use labelkit_storage::StorageProvider;

/// Reads and writes the annotation record of single assets of a project.
#[async_trait]
pub trait AssetMetadataStore: Send + Sync {
    /// Fetch the metadata of an asset.
    ///
    /// An asset without a persisted record yields an empty record.
    async fn get_asset_metadata(&self, asset: &Asset) -> Result<AssetMetadata>;

    /// Persist the metadata of an asset, returning the stored record.
    async fn save(&self, metadata: &AssetMetadata) -> Result<AssetMetadata>;
}

/// Storage file name of an asset's metadata record.
pub fn asset_metadata_file_name(asset_id: &AssetId) -> String {
    format!("{}{}", asset_id, ASSET_METADATA_FILE_EXTENSION)
}

/// Asset metadata store backed by the project's target storage.
pub struct StorageAssetService {
    storage: Arc<dyn StorageProvider>,
}

impl StorageAssetService {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl AssetMetadataStore for StorageAssetService {
    async fn get_asset_metadata(&self, asset: &Asset) -> Result<AssetMetadata> {
        let file_name = asset_metadata_file_name(&asset.id);

        match self.storage.read_text(&file_name).await {
            Ok(json) => serde_json::from_str(&json).map_err(|e| {
                Error::Serialization(format!("Invalid asset metadata '{}': {}", file_name, e))
            }),
            Err(Error::NotFound(_)) => Ok(AssetMetadata::new(asset.clone(), PROJECT_VERSION)),
            Err(e) => Err(e),
        }
    }

    /// Tagged assets are written; any other state removes the record, since
    /// the project file already carries the asset itself.
    async fn save(&self, metadata: &AssetMetadata) -> Result<AssetMetadata> {
        let file_name = asset_metadata_file_name(&metadata.asset.id);

        if metadata.asset.state == AssetState::Tagged {
            let json = serde_json::to_string_pretty(metadata)?;
            self.storage.write_text(&file_name, &json).await?;
            debug!(asset = %metadata.asset.id, regions = metadata.regions.len(), "Asset metadata written");
        } else {
            self.storage.delete_file(&file_name).await?;
            debug!(asset = %metadata.asset.id, "Asset metadata removed");
        }

        Ok(metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelkit_common::Region;
    use labelkit_storage::MemoryProvider;

    fn asset(id: &str) -> Asset {
        Asset::new(AssetId::new(id).unwrap(), format!("{}.jpg", id), format!("file:{}.jpg", id))
    }

    #[test]
    fn test_file_name() {
        let id = AssetId::new("abc").unwrap();
        assert_eq!(asset_metadata_file_name(&id), "abc-asset.json");
    }

    #[tokio::test]
    async fn test_missing_metadata_is_empty() {
        let service = StorageAssetService::new(Arc::new(MemoryProvider::new()));

        let metadata = service.get_asset_metadata(&asset("a1")).await.unwrap();

        assert_eq!(metadata.asset, asset("a1"));
        assert!(metadata.regions.is_empty());
        assert_eq!(metadata.version, PROJECT_VERSION);
    }

    #[tokio::test]
    async fn test_tagged_metadata_roundtrip() {
        let storage = MemoryProvider::new();
        let service = StorageAssetService::new(Arc::new(storage.clone()));

        let mut metadata = AssetMetadata::new(asset("a1"), PROJECT_VERSION);
        metadata.regions.push(Region::new("r1", ["cat"]));
        metadata.refresh_state();
        service.save(&metadata).await.unwrap();

        assert!(storage.exists("a1-asset.json").await.unwrap());
        let loaded = service.get_asset_metadata(&asset("a1")).await.unwrap();
        assert_eq!(loaded, metadata);
    }

    #[tokio::test]
    async fn test_untagged_save_removes_file() {
        let storage = MemoryProvider::new();
        storage.write_text("a1-asset.json", "{}").await.unwrap();
        let service = StorageAssetService::new(Arc::new(storage.clone()));

        let mut metadata = AssetMetadata::new(asset("a1"), PROJECT_VERSION);
        metadata.asset.state = AssetState::Visited;
        service.save(&metadata).await.unwrap();

        assert!(!storage.exists("a1-asset.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_metadata_fails() {
        let storage = MemoryProvider::new();
        storage.write_text("a1-asset.json", "{ nope").await.unwrap();
        let service = StorageAssetService::new(Arc::new(storage));

        let result = service.get_asset_metadata(&asset("a1")).await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
