//! Block persistence for sqlblock
//!
//! A block is a named, saved [`ConnectorSettings`] document. This crate
//! stores blocks as YAML, either on disk or in memory, and substitutes
//! `{{ env.VAR }}` placeholders when a block is loaded so that secrets can
//! stay in the environment.

pub mod document;
pub mod env;
pub mod file;
pub mod memory;

pub use document::{validate_name, BlockDocument, BLOCK_TYPE};
pub use env::EnvSubstitutor;
pub use file::FileBlockStore;
pub use memory::MemoryBlockStore;

use sqlblock_core::{ConnectorSettings, Result};

/// Save/load collaborator for connector blocks
pub trait BlockStore: Send + Sync {
    /// Persist settings under `name`; fails with `AlreadyExists` if the name
    /// is taken and `overwrite` is false
    fn save(&self, name: &str, settings: &ConnectorSettings, overwrite: bool) -> Result<()>;

    /// Reconstruct settings saved under `name`; fails with `NotFound`
    fn load(&self, name: &str) -> Result<ConnectorSettings>;

    fn exists(&self, name: &str) -> Result<bool>;

    /// Names of all saved blocks, sorted
    fn list(&self) -> Result<Vec<String>>;

    fn delete(&self, name: &str) -> Result<()>;
}
