//! Recipient store backed by a JSON file.
//!
//! Keeps the set of group chats and private users the bot has heard from.
//! Every mutation rewrites the whole file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write recipients file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize recipients: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which set an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientKind {
    Group,
    User,
}

/// On-disk layout: `{"groups": [...], "users": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipients {
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub users: BTreeSet<String>,
}

impl Recipients {
    /// Loads recipients from a JSON file, returns empty sets if missing or malformed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let Ok(raw) = std::fs::read_to_string(path) else {
            debug!("No recipients file at {}, starting empty", path.display());
            return Self::default();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Ignoring malformed recipients file {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Saves recipients to a JSON file, replacing any previous content.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        // Write next to the target and rename so readers never see a partial file.
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json)
            .and_then(|()| std::fs::rename(&tmp, path))
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Shared recipient store.
///
/// A single mutex guards both the sets and the file, so concurrent writers
/// never interleave and the file always reflects the latest in-memory state.
#[derive(Debug)]
pub struct RecipientStore {
    path: PathBuf,
    inner: Mutex<Recipients>,
}

impl RecipientStore {
    /// Load the store from `path` (empty if the file is missing or malformed).
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let inner = Recipients::load(&path);
        Self {
            path,
            inner: Mutex::new(inner),
        }
    }

    /// Add an identifier to the set matching `kind`, then persist.
    ///
    /// The in-memory sets are updated even when the write fails.
    pub fn register(&self, id: &str, kind: RecipientKind) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let set = match kind {
            RecipientKind::Group => &mut inner.groups,
            RecipientKind::User => &mut inner.users,
        };
        if set.insert(id.to_string()) {
            debug!("Registered new {:?} recipient {}", kind, id);
        }
        inner.save(&self.path)
    }

    /// Remove an identifier from the user set only, then persist.
    ///
    /// Returns whether the identifier was present.
    pub fn evict(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        let removed = inner.users.remove(id);
        inner.save(&self.path)?;
        Ok(removed)
    }

    /// Union of groups and users.
    pub fn all_targets(&self) -> Vec<String> {
        let inner = self.inner.lock();
        inner.groups.union(&inner.users).cloned().collect()
    }

    /// Write the current state to disk.
    pub fn persist(&self) -> Result<(), StoreError> {
        self.inner.lock().save(&self.path)
    }

    /// Copy of the current sets.
    pub fn snapshot(&self) -> Recipients {
        self.inner.lock().clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
