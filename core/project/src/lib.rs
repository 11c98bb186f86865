//! Project engine for labelkit.
//!
//! This module provides:
//! - Project persistence with encrypted provider options
//! - Storage and export provider dispatch by declared provider type
//! - Duplicate project detection
//! - Tag rename/delete cascades across every asset of a project
//!
//! # Architecture
//! The project service sits between callers and the pluggable storage and
//! export back-ends. It owns no long-lived state: providers are resolved per
//! call and projects are received by reference.

pub mod asset;
pub mod cascade;
pub mod config;
pub mod export;
pub mod json_export;
pub mod secure;
pub mod service;

pub use asset::{asset_metadata_file_name, AssetMetadataStore, StorageAssetService};
pub use cascade::TagChange;
pub use config::{
    ServiceConfig, ASSET_METADATA_FILE_EXTENSION, EXPORT_FILE_SUFFIX, PROJECT_FILE_EXTENSION,
    PROJECT_VERSION,
};
pub use export::{
    create_default_export_registry, ExportProvider, ExportProviderFactory, ExportProviderRegistry,
    ExportResult,
};
pub use json_export::{ExportAssetState, JsonExportOptions, JsonExportProvider, JSON_EXPORT_PROVIDER_TYPE};
pub use secure::{decrypt_project, encrypt_project};
pub use service::{AssetStoreFactory, ProjectService};
