//! Offline snapshot loader.

use crate::error::Result;
use crate::remote::RemoteApi;
use crate::store::{self, FileStore};
use campo_engine::{FieldSnapshot, SnapshotRefresh, SnapshotSource};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Pulls the agent's assigned workload from the remote service, or serves
/// the stored copy when the service is unreachable.
pub struct SnapshotLoader<R> {
    remote: R,
    store: Arc<FileStore>,
}

impl<R: RemoteApi> SnapshotLoader<R> {
    pub fn new(remote: R, store: Arc<FileStore>) -> Self {
        Self { remote, store }
    }

    /// Refresh the local snapshot for `agent_id`.
    ///
    /// A successful fetch replaces both stored collections wholesale.
    /// Refresh before an edit session begins, never after offline edits
    /// were made without synchronizing first: pending offline edits
    /// embedded in these collections are overwritten along with everything
    /// else.
    ///
    /// On fetch failure the stored collections are returned unchanged and
    /// the result is flagged [`SnapshotSource::LocalFallback`]; an
    /// unreadable collection degrades to an empty list. This operation
    /// never fails on network problems, only on storage write errors.
    pub async fn refresh(&self, agent_id: &str) -> Result<SnapshotRefresh> {
        let fetched = tokio::try_join!(
            self.remote.fetch_blocks(agent_id),
            self.remote.fetch_properties(agent_id),
        );

        match fetched {
            Ok((blocks, properties)) => {
                {
                    let guard = self.store.guard(store::BLOCKS);
                    let _lock = guard.lock().await;
                    self.store.write(store::BLOCKS, &blocks).await?;
                }
                {
                    let guard = self.store.guard(store::PROPERTIES);
                    let _lock = guard.lock().await;
                    self.store.write(store::PROPERTIES, &properties).await?;
                }

                tracing::info!(
                    blocks = blocks.len(),
                    properties = properties.len(),
                    "snapshot refreshed from remote"
                );

                Ok(SnapshotRefresh {
                    snapshot: FieldSnapshot::new(blocks, properties),
                    source: SnapshotSource::Remote,
                })
            }
            Err(err) => {
                tracing::warn!(%err, "remote unreachable, serving stored snapshot");

                let blocks = self.read_or_empty(store::BLOCKS).await;
                let properties = self.read_or_empty(store::PROPERTIES).await;

                Ok(SnapshotRefresh {
                    snapshot: FieldSnapshot::new(blocks, properties),
                    source: SnapshotSource::LocalFallback,
                })
            }
        }
    }

    async fn read_or_empty<T: DeserializeOwned>(&self, collection: &str) -> Vec<T> {
        match self.store.read(collection).await {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(%err, collection, "unreadable collection, serving empty list");
                Vec::new()
            }
        }
    }
}
