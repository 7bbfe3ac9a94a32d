use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must not start with '/'")]
    LeadingSlash,
    #[error("asset key must not contain '\\\\'")]
    Backslash,
    #[error("asset key must not contain '..'")]
    ParentTraversal,
    #[error("asset key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(AssetKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(AssetKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(AssetKeyError::ParentTraversal);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(AssetKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

/// Answers "is resource X loaded?". Loading itself happens elsewhere.
pub trait AssetStatus {
    fn is_loaded(&self, key: &str) -> bool;

    fn all_loaded(&self, keys: &[&str]) -> bool {
        keys.iter().all(|key| self.is_loaded(key))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    loaded: BTreeSet<String>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(true)` the first time a key is marked.
    pub fn mark_loaded(&mut self, key: &str) -> Result<bool, AssetKeyError> {
        validate_asset_key(key)?;
        let inserted = self.loaded.insert(key.to_string());
        if inserted {
            debug!(asset = key, "asset_loaded");
        }
        Ok(inserted)
    }

    pub fn missing<'a>(&self, keys: &[&'a str]) -> Vec<&'a str> {
        keys.iter()
            .copied()
            .filter(|key| !self.loaded.contains(*key))
            .collect()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

impl AssetStatus for AssetRegistry {
    fn is_loaded(&self, key: &str) -> bool {
        self.loaded.contains(key)
    }
}
