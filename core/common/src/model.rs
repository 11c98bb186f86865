//! Project data model.
//!
//! These types mirror the persisted project file: field names are camelCase on
//! the wire and provider options switch between plain configuration (in
//! memory) and an encrypted container (at rest).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::{AssetId, ProjectId};
use crate::{Error, Result};

/// Encrypted container replacing provider options at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptedOptions {
    /// Base64 ciphertext of the JSON-serialized options.
    pub encrypted: String,
}

/// Provider configuration, either plain or encrypted.
///
/// An object holding exactly one string field named `encrypted` is read as an
/// encrypted container; anything else is plain configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderOptions {
    Encrypted(EncryptedOptions),
    Plain(Value),
}

impl ProviderOptions {
    /// Wrap a ciphertext string.
    pub fn encrypted(ciphertext: impl Into<String>) -> Self {
        ProviderOptions::Encrypted(EncryptedOptions {
            encrypted: ciphertext.into(),
        })
    }

    /// Whether these options are an encrypted container.
    pub fn is_encrypted(&self) -> bool {
        matches!(self, ProviderOptions::Encrypted(_))
    }

    /// Borrow the plain configuration.
    ///
    /// # Errors
    /// - Options are still encrypted
    pub fn plain(&self) -> Result<&Value> {
        match self {
            ProviderOptions::Plain(value) => Ok(value),
            ProviderOptions::Encrypted(_) => Err(Error::InvalidInput(
                "Provider options are encrypted".to_string(),
            )),
        }
    }
}

impl Default for ProviderOptions {
    fn default() -> Self {
        ProviderOptions::Plain(Value::Object(Default::default()))
    }
}

impl From<Value> for ProviderOptions {
    fn from(value: Value) -> Self {
        ProviderOptions::Plain(value)
    }
}

/// A named storage back-end configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Registry key of the storage provider (e.g. "localFileSystemProxy").
    pub provider_type: String,
    pub provider_options: ProviderOptions,
}

impl Connection {
    /// Create a connection with plain options and a random id.
    pub fn new(name: impl Into<String>, provider_type: impl Into<String>, options: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            provider_type: provider_type.into(),
            provider_options: ProviderOptions::Plain(options),
        }
    }
}

/// Export configuration of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFormat {
    /// Registry key of the export provider (e.g. "vottJson").
    pub provider_type: String,
    pub provider_options: ProviderOptions,
}

/// A tag definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Kind of asset content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetType {
    #[default]
    Unknown,
    Image,
    Video,
    VideoFrame,
    TfRecord,
}

/// Labeling progress of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetState {
    #[default]
    NotVisited,
    Visited,
    Tagged,
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A unit of content to be labeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub asset_type: AssetType,
    #[serde(default)]
    pub state: AssetState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl Asset {
    pub fn new(id: AssetId, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
            asset_type: AssetType::Image,
            state: AssetState::NotVisited,
            size: None,
        }
    }
}

/// Shape of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegionType {
    Square,
    #[default]
    Rectangle,
    Polygon,
    Polyline,
    Point,
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// A labeled area within an asset.
///
/// `tags` behaves as an ordered set: it never holds the same name twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    #[serde(rename = "type", default)]
    pub region_type: RegionType,
    #[serde(default, deserialize_with = "deserialize_tag_set")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl Region {
    /// Create a rectangle region carrying the given tags.
    pub fn new<I, S>(id: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut region = Self {
            id: id.into(),
            region_type: RegionType::Rectangle,
            tags: Vec::new(),
            points: Vec::new(),
            bounding_box: None,
        };
        for tag in tags {
            region.add_tag(tag);
        }
        region
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag unless already present. Returns whether the set changed.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has_tag(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Remove a tag. Returns whether the set changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Replace every `old` by `new` in place, keeping the set free of
    /// duplicates.
    ///
    /// Returns whether the set changed.
    pub fn rename_tag(&mut self, old: &str, new: &str) -> bool {
        if old == new || !self.has_tag(old) {
            return false;
        }
        let renamed = std::mem::take(&mut self.tags)
            .into_iter()
            .map(|tag| if tag == old { new.to_string() } else { tag });
        self.tags = dedup_tags(renamed);
        true
    }
}

fn dedup_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut set: Vec<String> = Vec::new();
    for tag in tags {
        if !set.contains(&tag) {
            set.push(tag);
        }
    }
    set
}

fn deserialize_tag_set<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(dedup_tags(Vec::<String>::deserialize(deserializer)?))
}

/// Assets are keyed by their own id; a record whose key disagrees is rejected.
fn deserialize_assets<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<AssetId, Asset>, D::Error>
where
    D: Deserializer<'de>,
{
    let assets = BTreeMap::<AssetId, Asset>::deserialize(deserializer)?;
    if let Some((key, asset)) = assets.iter().find(|(key, asset)| **key != asset.id) {
        return Err(serde::de::Error::custom(format!(
            "asset keyed '{}' has id '{}'",
            key, asset.id
        )));
    }
    Ok(assets)
}

/// Per-asset annotation record, persisted separately from the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub asset: Asset,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub version: String,
}

impl AssetMetadata {
    /// Empty record for an asset that has no persisted metadata yet.
    pub fn new(asset: Asset, version: impl Into<String>) -> Self {
        Self {
            asset,
            regions: Vec::new(),
            version: version.into(),
        }
    }

    /// Recompute the asset state from the regions.
    ///
    /// A tagged asset without regions falls back to visited; an asset with
    /// regions is tagged.
    pub fn refresh_state(&mut self) {
        if self.regions.is_empty() {
            if self.asset.state == AssetState::Tagged {
                self.asset.state = AssetState::Visited;
            }
        } else {
            self.asset.state = AssetState::Tagged;
        }
    }
}

/// A persisted labeling workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProjectId>,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the security token protecting the provider options.
    pub security_token: String,
    pub source_connection: Connection,
    pub target_connection: Connection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_format: Option<ExportFormat>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "deserialize_assets")]
    pub assets: BTreeMap<AssetId, Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visited_asset_id: Option<AssetId>,
    #[serde(default)]
    pub auto_save: bool,
}

impl Project {
    /// Look up a tag definition by name.
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Remove a tag definition. Returns whether it existed.
    pub fn remove_tag(&mut self, name: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t.name != name);
        self.tags.len() != before
    }

    /// Rename a tag definition, keeping its position and color.
    ///
    /// If `new` is already defined the old definition is dropped instead.
    /// Returns whether the list changed.
    pub fn rename_tag(&mut self, old: &str, new: &str) -> bool {
        if old == new || self.tag(old).is_none() {
            return false;
        }
        if self.tag(new).is_some() {
            return self.remove_tag(old);
        }
        if let Some(tag) = self.tags.iter_mut().find(|t| t.name == old) {
            tag.name = new.to_string();
        }
        true
    }

    /// Insert an asset keyed by its id.
    pub fn add_asset(&mut self, asset: Asset) {
        self.assets.insert(asset.id.clone(), asset);
    }
}
