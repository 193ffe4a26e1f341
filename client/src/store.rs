//! File-backed local record store.
//!
//! One JSON file per collection under the data directory. A write replaces
//! the whole collection: the new content goes to a temp file first and is
//! renamed over the target, so a failed write never corrupts the previous
//! value. There is no cross-collection transactionality.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Collection keys keep their legacy names from the original client.
pub const BLOCKS: &str = "dadosQuarteiroes";
pub const PROPERTIES: &str = "dadosImoveis";
pub const VISITS: &str = "visitas";

/// Local read/write failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot create data directory '{path}': {source}")]
    DataDir {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot read collection '{collection}': {source}")]
    Read {
        collection: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot write collection '{collection}': {source}")]
    Write {
        collection: String,
        #[source]
        source: io::Error,
    },

    #[error("corrupt collection '{collection}': {source}")]
    Corrupt {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize collection '{collection}': {source}")]
    Serialize {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The persistent key-value store holding the serialized collections.
pub struct FileStore {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::DataDir {
            path: root.display().to_string(),
            source,
        })?;

        Ok(Self {
            root,
            locks: DashMap::new(),
        })
    }

    /// The lock bracketing read-modify-write cycles on one collection.
    ///
    /// Callers hold it across their read, mutation and write so that a
    /// concurrent writer cannot interleave and lose updates. Plain reads
    /// of a point-in-time copy do not need it.
    pub fn guard(&self, collection: &str) -> Arc<Mutex<()>> {
        let entry = self.locks.entry(collection.to_string()).or_default();
        Arc::clone(&entry)
    }

    /// Read a collection. A collection never written yet is an empty list.
    pub async fn read<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, StorageError> {
        let path = self.path(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    collection: collection.to_string(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
            collection: collection.to_string(),
            source,
        })
    }

    /// Replace a collection atomically: temp file, then rename.
    pub async fn write<T: Serialize>(
        &self,
        collection: &str,
        items: &[T],
    ) -> Result<(), StorageError> {
        let json = serde_json::to_vec(items).map_err(|source| StorageError::Serialize {
            collection: collection.to_string(),
            source,
        })?;

        let tmp = self.root.join(format!("{collection}.json.tmp"));
        let path = self.path(collection);

        let write_err = |source| StorageError::Write {
            collection: collection.to_string(),
            source,
        };
        tokio::fs::write(&tmp, &json).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(write_err)?;
        Ok(())
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }
}
