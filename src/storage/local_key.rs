//! Keyed in-process document store.
//!
//! Used when no data directory can be resolved, and by tests that need to
//! observe saves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::file_storage::{DocumentStore, Result, StorageError};
use super::models::Document;

/// Key the document is stored under
pub const DOCUMENT_KEY: &str = "sidenote.document";

#[derive(Default)]
pub struct LocalKeyStorage {
    items: Mutex<HashMap<String, String>>,
    saves: AtomicUsize,
}

impl LocalKeyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON currently stored under `key`
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: String) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        items.insert(key.to_string(), value);
        Ok(())
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The most recently saved document
    pub fn last_saved(&self) -> Option<Document> {
        let json = self.get_item(DOCUMENT_KEY)?;
        serde_json::from_str(&json).ok()
    }
}

impl DocumentStore for LocalKeyStorage {
    fn load(&self) -> Option<Document> {
        let json = self.get_item(DOCUMENT_KEY)?;
        match serde_json::from_str(&json) {
            Ok(document) => Some(document),
            Err(e) => {
                log::warn!("Stored document under {} is malformed: {}", DOCUMENT_KEY, e);
                None
            }
        }
    }

    fn save(&self, document: &Document) -> Result<()> {
        let json = serde_json::to_string(document)?;
        self.set_item(DOCUMENT_KEY, json)?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Category, Page};

    #[test]
    fn test_empty_store_loads_none() {
        assert!(LocalKeyStorage::new().load().is_none());
    }

    #[test]
    fn test_round_trip_and_counts() {
        let storage = LocalKeyStorage::new();
        let mut category = Category::new("Default".to_string());
        category.pages.push(Page::new(category.id, "Welcome".to_string()));
        let doc = Document::new(vec![category]);

        storage.save(&doc).unwrap();
        storage.save(&doc).unwrap();

        assert_eq!(storage.load().unwrap(), doc);
        assert_eq!(storage.save_count(), 2);
        assert_eq!(storage.last_saved().unwrap(), doc);
    }

    #[test]
    fn test_malformed_item_loads_none() {
        let storage = LocalKeyStorage::new();
        storage.set_item(DOCUMENT_KEY, "[{\"name\": 1}]".to_string()).unwrap();
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_only_latest_document_is_kept() {
        let storage = LocalKeyStorage::new();
        let first = Document::new(vec![Category::new("First".to_string())]);
        let second = Document::new(vec![Category::new("Second".to_string())]);

        storage.save(&first).unwrap();
        storage.save(&second).unwrap();

        assert_eq!(storage.save_count(), 2);
        assert_eq!(storage.last_saved().unwrap(), second);
        assert_eq!(storage.items.lock().unwrap().len(), 1);
    }
}
