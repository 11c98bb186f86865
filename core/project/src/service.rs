//! Project service: persistence, duplicate detection and tag cascades.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::asset::{asset_metadata_file_name, AssetMetadataStore, StorageAssetService};
use crate::cascade::TagChange;
use crate::config::ServiceConfig;
use crate::export::{ExportProvider, ExportProviderRegistry, ExportResult};
use crate::secure::{decrypt_project, encrypt_project};
use labelkit_common::{Asset, AssetId, Connection, Error, Project, ProviderOptions, Result};
use labelkit_crypto::{seal, SecurityToken, TokenStore};
use labelkit_storage::{StorageProvider, StorageProviderRegistry};

/// Factory producing the asset metadata store of a project.
pub type AssetStoreFactory =
    Box<dyn Fn(&Project) -> Result<Arc<dyn AssetMetadataStore>> + Send + Sync>;

/// Project service.
///
/// Holds only provider registries and configuration; every call resolves the
/// providers it needs from the project it is given.
pub struct ProjectService {
    storage: Arc<StorageProviderRegistry>,
    exports: Arc<ExportProviderRegistry>,
    asset_stores: Option<AssetStoreFactory>,
    config: ServiceConfig,
}

impl ProjectService {
    /// Create a service over the given registries with default configuration.
    pub fn new(storage: Arc<StorageProviderRegistry>, exports: Arc<ExportProviderRegistry>) -> Self {
        Self {
            storage,
            exports,
            asset_stores: None,
            config: ServiceConfig::default(),
        }
    }

    /// Create a service with the built-in storage and export providers.
    pub fn with_default_providers() -> Self {
        let storage = Arc::new(labelkit_storage::create_default_registry());
        let exports = Arc::new(crate::export::create_default_export_registry(storage.clone()));
        Self::new(storage, exports)
    }

    /// Replace the configuration.
    ///
    /// # Errors
    /// - Configuration fails validation
    pub fn with_config(mut self, config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Use a custom asset metadata store instead of the target storage.
    pub fn with_asset_store_factory(mut self, factory: AssetStoreFactory) -> Self {
        self.asset_stores = Some(factory);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn resolve_storage(&self, connection: &Connection) -> Result<Arc<dyn StorageProvider>> {
        self.storage
            .resolve(&connection.provider_type, connection.provider_options.plain()?)
    }

    fn resolve_exporter(&self, project: &Project) -> Result<Option<Arc<dyn ExportProvider>>> {
        match &project.export_format {
            Some(format) => Ok(Some(self.exports.resolve(
                &format.provider_type,
                project,
                format.provider_options.plain()?,
            )?)),
            None => Ok(None),
        }
    }

    fn asset_store(&self, project: &Project) -> Result<Arc<dyn AssetMetadataStore>> {
        match &self.asset_stores {
            Some(factory) => factory(project),
            None => {
                let storage = self.resolve_storage(&project.target_connection)?;
                Ok(Arc::new(StorageAssetService::new(storage)))
            }
        }
    }

    /// Save a project to its target storage.
    ///
    /// # Preconditions
    /// - All provider options of `project` are decrypted
    ///
    /// # Postconditions
    /// - `<name><extension>` in the target storage holds the project with
    ///   every provider option encrypted by `token`
    /// - The export provider, if any, has persisted its settings, and the
    ///   options it returned are recorded in both the file and the returned
    ///   encrypted record
    ///
    /// # Errors
    /// - Provider resolution failure, before anything is written
    /// - Storage write failure, as returned by the provider
    /// - Export save failure, as returned by the provider
    pub async fn save(&self, project: &Project, token: &SecurityToken) -> Result<Project> {
        let storage = self.resolve_storage(&project.target_connection)?;
        let exporter = self.resolve_exporter(project)?;

        if project.security_token != token.name {
            warn!(
                project = %project.name,
                expected = %project.security_token,
                token = %token.name,
                "Saving project with a security token it does not reference"
            );
        }

        let mut saved = encrypt_project(project, token)?;
        let file_name = self.config.project_file_name(&project.name);
        let content = serde_json::to_string_pretty(&saved)?;

        debug!(project = %project.name, file = %file_name, "Writing project file");
        storage.write_text(&file_name, &content).await?;

        if let (Some(exporter), Some(format)) = (exporter, project.export_format.as_ref()) {
            let options = exporter.save(format).await?;
            if let Some(saved_format) = saved.export_format.as_mut() {
                saved_format.provider_options = seal(&ProviderOptions::Plain(options), &token.key)?;
            }
            storage
                .write_text(&file_name, &serde_json::to_string_pretty(&saved)?)
                .await?;
            debug!(project = %project.name, exporter = exporter.name(), "Export settings recorded");
        }

        info!(project = %project.name, file = %file_name, "Project saved");
        Ok(saved)
    }

    /// Decrypt a project loaded in its encrypted form.
    ///
    /// # Errors
    /// - `Decryption` if the token does not match or the data is corrupted
    pub async fn load(&self, project: &Project, token: &SecurityToken) -> Result<Project> {
        let loaded = decrypt_project(project, token)?;
        debug!(project = %project.name, "Project decrypted");
        Ok(loaded)
    }

    /// Read a project file from storage and decrypt it.
    ///
    /// The token is looked up in `tokens` by the name recorded in the file.
    ///
    /// # Errors
    /// - Storage resolution or read failure
    /// - Unknown security token
    /// - `Decryption` failure
    pub async fn open(&self, connection: &Connection, project_name: &str, tokens: &TokenStore) -> Result<Project> {
        let storage = self.resolve_storage(connection)?;
        let file_name = self.config.project_file_name(project_name);

        let content = storage.read_text(&file_name).await?;
        let stored: Project = serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("Invalid project file '{}': {}", file_name, e)))?;
        let token = tokens.get(&stored.security_token)?;

        self.load(&stored, token).await
    }

    /// Delete a project file and the metadata files of all its assets.
    ///
    /// Issues one delete per asset plus one for the project file, all on the
    /// provider resolved for the target connection.
    ///
    /// # Errors
    /// - Provider resolution failure, before any delete
    /// - The first delete failure
    pub async fn delete(&self, project: &Project) -> Result<()> {
        let storage = self.resolve_storage(&project.target_connection)?;

        let mut file_names = vec![self.config.project_file_name(&project.name)];
        file_names.extend(
            project
                .assets
                .values()
                .map(|asset| asset_metadata_file_name(&asset.id)),
        );

        futures::future::try_join_all(file_names.iter().map(|name| storage.delete_file(name))).await?;

        info!(project = %project.name, files = file_names.len(), "Project deleted");
        Ok(())
    }

    /// Whether another project in `projects` already uses this project's name.
    ///
    /// Entries sharing the project's id are the project itself and never
    /// count; a project without id is compared by name against every entry.
    pub fn is_duplicate(&self, project: &Project, projects: &[Project]) -> bool {
        projects.iter().any(|other| {
            other.name == project.name && (project.id.is_none() || other.id != project.id)
        })
    }

    /// Run the project's export provider.
    ///
    /// # Errors
    /// - `InvalidInput` if the project has no export format
    /// - Provider resolution or export failure
    pub async fn export(&self, project: &Project) -> Result<ExportResult> {
        let exporter = self.resolve_exporter(project)?.ok_or_else(|| {
            Error::InvalidInput(format!("Project '{}' has no export format", project.name))
        })?;
        exporter.export().await
    }

    /// Remove a tag from every region of every asset of the project.
    ///
    /// Regions left without tags are removed. Only assets that referenced the
    /// tag are saved. Returns the ids of the rewritten assets.
    ///
    /// # Errors
    /// - `Cascade` wrapping the first per-asset fetch or save failure
    pub async fn delete_tag(&self, project: &Project, tag: &str) -> Result<Vec<AssetId>> {
        self.cascade(project, TagChange::Delete(tag)).await
    }

    /// Rename a tag in every region of every asset of the project.
    ///
    /// Only assets that referenced the old name are saved. Returns the ids of
    /// the rewritten assets.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty new name
    /// - `Cascade` wrapping the first per-asset fetch or save failure
    pub async fn update_tag(&self, project: &Project, old: &str, new: &str) -> Result<Vec<AssetId>> {
        if new.is_empty() {
            return Err(Error::InvalidInput("Tag name cannot be empty".to_string()));
        }
        if old == new {
            return Ok(Vec::new());
        }
        self.cascade(project, TagChange::Rename { from: old, to: new }).await
    }

    async fn cascade(&self, project: &Project, change: TagChange<'_>) -> Result<Vec<AssetId>> {
        let store = self.asset_store(project)?;
        let store = store.as_ref();

        debug!(project = %project.name, change = ?change, assets = project.assets.len(), "Starting tag cascade");

        // Asset ids are unique map keys, so no two tasks touch the same record.
        let mut updated: Vec<AssetId> = stream::iter(project.assets.values())
            .map(|asset| cascade_asset(store, asset, change))
            .buffer_unordered(self.config.max_concurrent_cascades)
            .try_filter_map(|id| async move { Ok(id) })
            .try_collect()
            .await?;
        updated.sort();

        info!(project = %project.name, change = ?change, updated = updated.len(), "Tag cascade complete");
        Ok(updated)
    }
}

async fn cascade_asset(
    store: &dyn AssetMetadataStore,
    asset: &Asset,
    change: TagChange<'_>,
) -> Result<Option<AssetId>> {
    let mut metadata = store
        .get_asset_metadata(asset)
        .await
        .map_err(|e| Error::cascade(asset.id.as_str(), e))?;

    if !change.apply(&mut metadata) {
        return Ok(None);
    }

    store
        .save(&metadata)
        .await
        .map_err(|e| Error::cascade(asset.id.as_str(), e))?;

    debug!(asset = %asset.id, regions = metadata.regions.len(), "Asset metadata updated");
    Ok(Some(asset.id.clone()))
}
