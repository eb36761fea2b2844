//! Broadcast message pool.

use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

/// Errors that can occur while loading the pool.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Failed to read message pool: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse message pool: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Message pool has no categories")]
    NoCategories,

    #[error("Message pool category {0:?} has no messages")]
    EmptyCategory(String),
}

/// A named list of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub messages: Vec<String>,
}

/// Immutable category → messages mapping, loaded once at startup.
#[derive(Debug, Clone)]
pub struct MessagePool {
    categories: Vec<Category>,
}

impl MessagePool {
    /// Loads the pool from a JSON object of `category: [messages]`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PoolError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, PoolError> {
        let map: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)?;
        Self::new(map)
    }

    /// Build a pool, rejecting empty pools and empty categories.
    pub fn new(map: BTreeMap<String, Vec<String>>) -> Result<Self, PoolError> {
        if map.is_empty() {
            return Err(PoolError::NoCategories);
        }
        if let Some((name, _)) = map.iter().find(|(_, msgs)| msgs.is_empty()) {
            return Err(PoolError::EmptyCategory(name.clone()));
        }

        let categories = map
            .into_iter()
            .map(|(name, messages)| Category { name, messages })
            .collect();
        Ok(Self { categories })
    }

    /// Pick a category uniformly, then a message uniformly within it.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(&str, &str)> {
        let category = self.categories.choose(rng)?;
        let message = category.messages.choose(rng)?;
        Some((category.name.as_str(), message.as_str()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Total number of messages across all categories.
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.messages.len()).sum()
    }
}
