//! In-memory block store

use sqlblock_core::{BlockError, ConnectorSettings, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::document::{validate_name, BlockDocument};
use crate::BlockStore;

/// Keeps serialized block documents in memory
///
/// Documents go through the same YAML encoding as [`crate::FileBlockStore`],
/// so a load never hands back live state shared with the saved settings.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    documents: RwLock<BTreeMap<String, String>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockStore for MemoryBlockStore {
    fn save(&self, name: &str, settings: &ConnectorSettings, overwrite: bool) -> Result<()> {
        validate_name(name)?;
        let content = BlockDocument::new(name, settings.clone()).to_yaml()?;

        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        if !overwrite && documents.contains_key(name) {
            return Err(BlockError::AlreadyExists(name.to_string()));
        }
        documents.insert(name.to_string(), content);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<ConnectorSettings> {
        validate_name(name)?;
        let content = {
            let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
            documents
                .get(name)
                .cloned()
                .ok_or_else(|| BlockError::NotFound(name.to_string()))?
        };
        Ok(BlockDocument::from_yaml(name, &content)?.data)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        Ok(documents.contains_key(name))
    }

    fn list(&self) -> Result<Vec<String>> {
        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        Ok(documents.keys().cloned().collect())
    }

    fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        documents
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| BlockError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlblock_core::ConnectionConfig;

    fn settings(url: &str) -> ConnectorSettings {
        ConnectorSettings::new(ConnectionConfig::url(url).unwrap())
    }

    #[test]
    fn test_memory_store_semantics() {
        let store = MemoryBlockStore::new();
        let first = settings("postgresql://localhost/a");
        store.save("main", &first, false).unwrap();

        let err = store
            .save("main", &settings("postgresql://localhost/b"), false)
            .unwrap_err();
        assert!(matches!(err, BlockError::AlreadyExists(_)));
        assert_eq!(store.load("main").unwrap(), first);

        assert!(matches!(
            store.load("other").unwrap_err(),
            BlockError::NotFound(_)
        ));

        store.save("aux", &first, false).unwrap();
        assert_eq!(store.list().unwrap(), vec!["aux", "main"]);
        store.delete("aux").unwrap();
        assert!(!store.exists("aux").unwrap());
    }
}
