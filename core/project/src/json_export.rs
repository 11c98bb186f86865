//! JSON export provider.
//!
//! Writes the project's tag definitions together with the metadata of the
//! selected assets into a single `<name>-export.json` file in the target
//! storage.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::asset::{AssetMetadataStore, StorageAssetService};
use crate::config::EXPORT_FILE_SUFFIX;
use crate::export::{ExportProvider, ExportProviderFactory, ExportResult};
use labelkit_common::{AssetState, Error, ExportFormat, Project, Result};
use labelkit_storage::{StorageProvider, StorageProviderRegistry};

/// Provider type of the JSON export provider.
pub const JSON_EXPORT_PROVIDER_TYPE: &str = "vottJson";

/// Which assets an export includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportAssetState {
    All,
    #[default]
    Visited,
    Tagged,
}

impl ExportAssetState {
    pub fn includes(&self, state: AssetState) -> bool {
        match self {
            ExportAssetState::All => true,
            ExportAssetState::Visited => state != AssetState::NotVisited,
            ExportAssetState::Tagged => state == AssetState::Tagged,
        }
    }
}

/// Settings of the JSON export provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonExportOptions {
    pub asset_state: ExportAssetState,
}

impl JsonExportOptions {
    /// Parse options; `null` means defaults.
    pub fn from_value(options: &Value) -> Result<Self> {
        if options.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(options.clone())
            .map_err(|e| Error::InvalidInput(format!("Invalid {} options: {}", JSON_EXPORT_PROVIDER_TYPE, e)))
    }
}

/// Export provider producing a single JSON document.
pub struct JsonExportProvider {
    project: Project,
    options: JsonExportOptions,
    storage: Arc<dyn StorageProvider>,
}

impl JsonExportProvider {
    /// Create a provider for a project with decrypted connections.
    pub fn new(project: &Project, options: &Value, storage: Arc<dyn StorageProvider>) -> Result<Self> {
        let options = JsonExportOptions::from_value(options)
            .map_err(|e| Error::ProviderResolution(e.to_string()))?;
        Ok(Self {
            project: project.clone(),
            options,
            storage,
        })
    }

    /// Name of the file written by [`ExportProvider::export`].
    pub fn export_file_name(&self) -> String {
        format!("{}{}", self.project.name, EXPORT_FILE_SUFFIX)
    }
}

#[async_trait]
impl ExportProvider for JsonExportProvider {
    fn name(&self) -> &str {
        JSON_EXPORT_PROVIDER_TYPE
    }

    async fn export(&self) -> Result<ExportResult> {
        let assets = StorageAssetService::new(self.storage.clone());
        let mut exported = Map::new();

        for asset in self
            .project
            .assets
            .values()
            .filter(|a| self.options.asset_state.includes(a.state))
        {
            let metadata = assets.get_asset_metadata(asset).await?;
            exported.insert(asset.id.to_string(), serde_json::to_value(&metadata)?);
        }

        let asset_count = exported.len();
        let completed_at = Utc::now();
        let document = json!({
            "name": self.project.name,
            "version": self.project.version,
            "tags": self.project.tags,
            "exportedAt": completed_at.to_rfc3339(),
            "assets": exported,
        });

        let file_name = self.export_file_name();
        let content = serde_json::to_string_pretty(&document)?;
        self.storage
            .write_text(&file_name, &content)
            .await
            .map_err(|e| match e {
                Error::Storage(msg) => Error::Export(msg),
                other => other,
            })?;

        info!(file = %file_name, assets = asset_count, "Project exported");
        Ok(ExportResult {
            files: vec![file_name],
            asset_count,
            completed_at,
        })
    }

    async fn save(&self, export_format: &ExportFormat) -> Result<Value> {
        let options = JsonExportOptions::from_value(export_format.provider_options.plain()?)?;
        Ok(serde_json::to_value(options)?)
    }
}

pub(crate) fn factory(storage: Arc<StorageProviderRegistry>) -> ExportProviderFactory {
    Box::new(
        move |project: &Project, options: &Value| -> Result<Arc<dyn ExportProvider>> {
            let target = &project.target_connection;
            let provider = storage.resolve(&target.provider_type, target.provider_options.plain()?)?;
            Ok(Arc::new(JsonExportProvider::new(project, options, provider)?))
        },
    )
}
