//! Source → destination id mapping storage.
//!
//! The pipeline only talks to the [`MappingStore`] trait. Two
//! implementations ship with relaypost:
//!
//! - [`MemoryMappingStore`]: process-local, lost on restart
//! - [`FileMappingStore`]: JSON Lines log replayed on open

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileMappingStore;
pub use memory::MemoryMappingStore;

/// Durable association from a source message `ts` to a destination id.
///
/// `save` is an upsert: saving an existing key replaces its value.
/// `find` returns `None` for keys that were never saved.
#[async_trait]
pub trait MappingStore: Send + Sync {
    async fn find(&self, source_id: &str) -> StoreResult<Option<String>>;

    async fn save(&self, source_id: &str, destination_id: &str) -> StoreResult<()>;
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt mapping log {path} at line {line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode mapping record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn file_io(path: &Path, source: std::io::Error) -> Self {
        StoreError::FileIo {
            path: path.to_path_buf(),
            source,
        }
    }
}
