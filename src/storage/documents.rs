//! JSON documents on top of a key-value backend.
//!
//! Progress data is a local cache with no canonical source to reconcile
//! against, so faults are logged and absorbed here: unreadable documents
//! load as `None`, failed writes are dropped.

use crossbeam::channel::{unbounded, Receiver, Sender};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Mutex;

use super::kv::{KeyValueStore, StorageError};

/// Which progress document a key holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Profile,
    Events,
    Badges,
    Quests,
}

/// Storage keys for the four progress documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKeys {
    pub profile: String,
    pub events: String,
    pub badges: String,
    pub quests: String,
}

impl DocumentKeys {
    /// Keys under `namespace`, e.g. `onx.gamification.profile`.
    pub fn new(namespace: &str) -> Self {
        let namespace = namespace.trim_end_matches('.');
        Self {
            profile: format!("{}.profile", namespace),
            events: format!("{}.events", namespace),
            badges: format!("{}.badges", namespace),
            quests: format!("{}.quests", namespace),
        }
    }

    /// Key of a document kind.
    pub fn key(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Profile => &self.profile,
            DocumentKind::Events => &self.events,
            DocumentKind::Badges => &self.badges,
            DocumentKind::Quests => &self.quests,
        }
    }
}

impl Default for DocumentKeys {
    fn default() -> Self {
        Self::new("onx.gamification")
    }
}

/// Notice sent to subscribers after a document was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
    pub document: DocumentKind,
}

/// Typed JSON document access with change notification.
pub struct DocumentStore {
    backend: Box<dyn KeyValueStore>,
    keys: DocumentKeys,
    subscribers: Mutex<Vec<Sender<StorageChange>>>,
}

impl DocumentStore {
    /// Wrap a backend.
    pub fn new(backend: Box<dyn KeyValueStore>, keys: DocumentKeys) -> Self {
        Self {
            backend,
            keys,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Raw stored JSON of a document.
    pub fn raw(&self, kind: DocumentKind) -> Result<Option<String>, StorageError> {
        self.backend.get(self.keys.key(kind))
    }

    /// Load and parse a document. Missing, unreadable or malformed data is `None`.
    pub fn load<T: DeserializeOwned>(&self, kind: DocumentKind) -> Option<T> {
        let key = self.keys.key(kind);
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding malformed {} document: {}", key, e);
                None
            }
        }
    }

    /// Serialize and store a document, then notify subscribers.
    ///
    /// Returns whether the write went through.
    pub fn save<T: Serialize + ?Sized>(&self, kind: DocumentKind, value: &T) -> bool {
        let key = self.keys.key(kind);
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize {}: {}", key, e);
                return false;
            }
        };

        if let Err(e) = self.backend.set(key, &json) {
            tracing::warn!("Failed to write {}: {}", key, e);
            return false;
        }

        tracing::debug!("Wrote {} ({} bytes)", key, json.len());
        self.notify(StorageChange {
            key: key.to_string(),
            document: kind,
        });
        true
    }

    /// Receive a [`StorageChange`] for every successful write.
    pub fn subscribe(&self) -> Receiver<StorageChange> {
        let (tx, rx) = unbounded();
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(tx),
            Err(poisoned) => poisoned.into_inner().push(tx),
        }
        rx
    }

    fn notify(&self, change: StorageChange) {
        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Dropped receivers are pruned
        subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}
