//! Storage provider abstraction for labelkit.
//!
//! This module provides a trait-based interface for the back-ends a project
//! connection can point at (local filesystem, in-memory, ...) and a provider
//! registry resolving a connection's declared provider type.
//!
//! # Design Principles
//! - Provider isolation: no provider-specific logic in the project service
//! - Async operations: all I/O operations are async
//! - Flat namespace: a connection addresses one container of named files
//! - Unified error semantics: consistent error types across providers

pub mod local;
pub mod memory;
pub mod provider;
pub mod registry;

pub use local::LocalProvider;
pub use memory::MemoryProvider;
pub use provider::{validate_file_name, StorageProvider};
pub use registry::{
    create_default_registry, StorageProviderFactory, StorageProviderRegistry, LOCAL_PROVIDER_TYPE,
    MEMORY_PROVIDER_TYPE,
};
