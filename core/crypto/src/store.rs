//! Security token store.

use serde::{Deserialize, Serialize};

use crate::keys::SecurityToken;
use labelkit_common::{Error, Result};

/// Named security tokens available to the application.
///
/// Persisted as a JSON array of `{ "name", "key" }` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenStore {
    tokens: Vec<SecurityToken>,
}

impl TokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a token by name.
    ///
    /// # Errors
    /// - No token with that name
    pub fn get(&self, name: &str) -> Result<&SecurityToken> {
        self.tokens
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::NotFound(format!("Security token '{}' not found", name)))
    }

    /// Add a token.
    ///
    /// # Errors
    /// - A token with the same name exists
    pub fn insert(&mut self, token: SecurityToken) -> Result<()> {
        if self.tokens.iter().any(|t| t.name == token.name) {
            return Err(Error::AlreadyExists(format!(
                "Security token '{}' already exists",
                token.name
            )));
        }
        self.tokens.push(token);
        Ok(())
    }

    /// Remove a token by name, returning it.
    pub fn remove(&mut self, name: &str) -> Option<SecurityToken> {
        let index = self.tokens.iter().position(|t| t.name == name)?;
        Some(self.tokens.remove(index))
    }

    /// Names of all stored tokens.
    pub fn names(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Deserialize a store from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Serialize the store to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}
