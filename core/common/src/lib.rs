//! Common utilities and types shared across labelkit crates.
//!
//! This crate provides the workspace error type, identifier newtypes and the
//! project data model that the storage, crypto and project crates exchange.

pub mod error;
pub mod model;
pub mod types;

pub use error::{Error, Result};
pub use model::{
    Asset, AssetMetadata, AssetState, AssetType, BoundingBox, Connection, EncryptedOptions,
    ExportFormat, Point, Project, ProviderOptions, Region, RegionType, Size, Tag,
};
pub use types::{AssetId, ProjectId};
