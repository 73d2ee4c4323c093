//! Directory-backed block store

use sqlblock_core::{BlockError, ConnectorSettings, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::document::{validate_name, BlockDocument};
use crate::BlockStore;

const EXTENSION: &str = "yaml";

/// Stores each block as `<root>/<name>.yaml`
#[derive(Debug, Clone)]
pub struct FileBlockStore {
    root: PathBuf,
}

impl FileBlockStore {
    /// Create a store rooted at `root`; the directory is created on first save
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, EXTENSION))
    }
}

impl BlockStore for FileBlockStore {
    fn save(&self, name: &str, settings: &ConnectorSettings, overwrite: bool) -> Result<()> {
        validate_name(name)?;
        let path = self.path_for(name);

        if !overwrite && path.exists() {
            return Err(BlockError::AlreadyExists(name.to_string()));
        }

        let content = BlockDocument::new(name, settings.clone()).to_yaml()?;
        fs::create_dir_all(&self.root)?;

        // Write then rename so readers never see a partial document
        let tmp = self.root.join(format!(".{}.{}.tmp", name, EXTENSION));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;

        debug!("Saved block '{}' to {}", name, path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<ConnectorSettings> {
        validate_name(name)?;
        let path = self.path_for(name);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BlockError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Loaded block '{}' from {}", name, path.display());
        Ok(BlockDocument::from_yaml(name, &content)?.data)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        Ok(self.path_for(name).is_file())
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => {
                debug!("Deleted block '{}'", name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlockError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlblock_core::{ConnectionComponents, ConnectionConfig, EngineOptions};
    use sqlblock_types::Driver;

    fn settings() -> ConnectorSettings {
        ConnectorSettings::new(
            ConnectionComponents::new(Driver::Mysql)
                .with_username("app")
                .with_password("secret")
                .with_host("db")
                .with_port(3306)
                .with_database("shop")
                .with_query_param("charset", "utf8mb4"),
        )
        .with_engine_options(EngineOptions::default().with_echo(true))
        .with_fetch_size(25)
    }

    #[test]
    fn test_save_then_load_reproduces_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlockStore::new(dir.path().join("blocks"));

        store.save("shop", &settings(), false).unwrap();
        assert!(store.exists("shop").unwrap());
        assert_eq!(store.load("shop").unwrap(), settings());
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlockStore::new(dir.path());
        store.save("shop", &settings(), false).unwrap();

        let replacement = ConnectorSettings::new(ConnectionConfig::url("sqlite://").unwrap());
        let err = store.save("shop", &replacement, false).unwrap_err();
        assert!(matches!(err, BlockError::AlreadyExists(_)));
        assert_eq!(store.load("shop").unwrap(), settings());

        store.save("shop", &replacement, true).unwrap();
        assert_eq!(store.load("shop").unwrap(), replacement);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlockStore::new(dir.path());
        assert!(matches!(
            store.load("nope").unwrap_err(),
            BlockError::NotFound(_)
        ));
        assert!(!store.exists("nope").unwrap());
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlockStore::new(dir.path().join("missing-yet"));
        assert!(store.list().unwrap().is_empty());

        store.save("zeta", &settings(), false).unwrap();
        store.save("alpha", &settings(), false).unwrap();
        fs::write(store.root().join("notes.txt"), "ignored").unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);

        store.delete("zeta").unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha"]);
        assert!(matches!(
            store.delete("zeta").unwrap_err(),
            BlockError::NotFound(_)
        ));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlockStore::new(dir.path());
        assert!(store
            .save("../escape", &settings(), false)
            .unwrap_err()
            .is_configuration());
    }
}
