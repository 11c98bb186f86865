//! Encryption of a project's sensitive connection settings.

use labelkit_common::{Project, Result};
use labelkit_crypto::{seal, unseal, SecurityToken};

/// Produce a copy of the project with every provider option encrypted.
///
/// Source connection, target connection and export format are sealed
/// independently; the input project is left untouched.
pub fn encrypt_project(project: &Project, token: &SecurityToken) -> Result<Project> {
    let mut encrypted = project.clone();

    encrypted.source_connection.provider_options =
        seal(&project.source_connection.provider_options, &token.key)?;
    encrypted.target_connection.provider_options =
        seal(&project.target_connection.provider_options, &token.key)?;
    if let Some(format) = encrypted.export_format.as_mut() {
        format.provider_options = seal(&format.provider_options, &token.key)?;
    }

    Ok(encrypted)
}

/// Produce a copy of the project with every provider option decrypted.
///
/// # Errors
/// - `Decryption` if any field was sealed with another key or is corrupted
pub fn decrypt_project(project: &Project, token: &SecurityToken) -> Result<Project> {
    let mut decrypted = project.clone();

    decrypted.source_connection.provider_options =
        unseal(&project.source_connection.provider_options, &token.key)?;
    decrypted.target_connection.provider_options =
        unseal(&project.target_connection.provider_options, &token.key)?;
    if let Some(format) = decrypted.export_format.as_mut() {
        format.provider_options = unseal(&format.provider_options, &token.key)?;
    }

    Ok(decrypted)
}
