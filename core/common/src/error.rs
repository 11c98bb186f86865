//! Common error types for labelkit.

use thiserror::Error;

/// Top-level error type for labelkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No provider could be constructed for the requested type or options.
    #[error("Provider resolution error: {0}")]
    ProviderResolution(String),

    /// Storage back-end operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export back-end operation failed.
    #[error("Export error: {0}")]
    Export(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Ciphertext could not be decrypted with the supplied key.
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// A per-asset step of a tag cascade failed.
    #[error("Tag cascade failed for asset '{asset_id}': {source}")]
    Cascade {
        /// Asset whose fetch or save failed.
        asset_id: String,
        /// The original failure.
        #[source]
        source: Box<Error>,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

impl Error {
    /// Wrap a per-asset failure into a cascade error.
    pub fn cascade(asset_id: impl Into<String>, source: Error) -> Self {
        Error::Cascade {
            asset_id: asset_id.into(),
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
