//! Reconciliation engine: pushes pending local records to the remote
//! service and absorbs the per-item outcomes.

use crate::error::Result;
use crate::remote::{BlockFinalizeRequest, PropertyUpload, RemoteApi, VisitUpload};
use crate::store::{self, FileStore};
use campo_engine::{
    absorb_property_outcomes, absorb_visit_outcomes, Block, BlockId, PendingWork, Property, Visit,
    VisitId,
};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Aggregate outcome of one synchronization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub visits_synced: usize,
    pub visits_failed: usize,
    pub properties_synced: usize,
    pub properties_failed: usize,
}

impl SyncReport {
    /// True when every pushed item was confirmed.
    pub fn is_clean(&self) -> bool {
        self.visits_failed == 0 && self.properties_failed == 0
    }

    /// Total number of items the pass attempted.
    pub fn processed(&self) -> usize {
        self.visits_synced + self.visits_failed + self.properties_synced + self.properties_failed
    }
}

/// Outcome of a bulk block finalization. The service reports only a count;
/// `updated < requested` signals a partial application without naming the
/// blocks that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFinalization {
    pub requested: usize,
    pub updated: usize,
}

impl BlockFinalization {
    pub fn is_complete(&self) -> bool {
        self.updated == self.requested
    }
}

/// Pushes pending records and keeps the store consistent with the per-item
/// results. One pass runs at a time; concurrent callers queue.
pub struct Reconciler<R> {
    remote: R,
    store: Arc<FileStore>,
    sync_lock: Mutex<()>,
}

impl<R: RemoteApi> Reconciler<R> {
    pub fn new(remote: R, store: Arc<FileStore>) -> Self {
        Self {
            remote,
            store,
            sync_lock: Mutex::new(()),
        }
    }

    /// Push every pending visit and offline-edited property.
    ///
    /// Items are pushed concurrently and independently: a failed item is
    /// left pending for the next pass, never retried within the run, and
    /// never blocks the rest of the batch. Each collection is persisted
    /// exactly once at the end, merged against a fresh read so records
    /// captured while the pass was in flight survive. A crash mid-run
    /// loses only this run's acknowledgements; the affected items stay
    /// pending and are safe to resend.
    pub async fn synchronize(&self) -> Result<SyncReport> {
        let _run = self.sync_lock.lock().await;

        let visits: Vec<Visit> = self.store.read(store::VISITS).await?;
        let properties: Vec<Property> = self.store.read(store::PROPERTIES).await?;

        let pending_visits: Vec<Visit> = visits.into_iter().filter(|v| v.is_pending()).collect();
        let edited: Vec<Property> = properties
            .into_iter()
            .filter(|p| p.edited_offline)
            .collect();

        let remote = &self.remote;
        let push_visits = join_all(pending_visits.iter().map(|visit| async move {
            match remote.create_visit(&VisitUpload::from(visit)).await {
                Ok(()) => Some(visit.id.clone()),
                Err(err) => {
                    tracing::warn!(visit = %visit.id, %err, "visit upload failed, left pending");
                    None
                }
            }
        }));
        let push_properties = join_all(edited.iter().map(|property| async move {
            match remote
                .update_property(&property.id, &PropertyUpload::from(property))
                .await
            {
                Ok(()) => Some(property.clone()),
                Err(err) => {
                    tracing::warn!(property = %property.id, %err, "property update failed, left pending");
                    None
                }
            }
        }));

        // the two batches are independent; a visit failure never blocks
        // property sync
        let (visit_acks, property_acks) = tokio::join!(push_visits, push_properties);

        let synced_ids: Vec<VisitId> = visit_acks.into_iter().flatten().collect();
        let confirmed: Vec<Property> = property_acks.into_iter().flatten().collect();

        {
            let guard = self.store.guard(store::VISITS);
            let _lock = guard.lock().await;
            let mut stored: Vec<Visit> = self.store.read(store::VISITS).await?;
            absorb_visit_outcomes(&mut stored, &synced_ids);
            self.store.write(store::VISITS, &stored).await?;
        }
        {
            let guard = self.store.guard(store::PROPERTIES);
            let _lock = guard.lock().await;
            let mut stored: Vec<Property> = self.store.read(store::PROPERTIES).await?;
            absorb_property_outcomes(&mut stored, &confirmed);
            self.store.write(store::PROPERTIES, &stored).await?;
        }

        let report = SyncReport {
            visits_synced: synced_ids.len(),
            visits_failed: pending_visits.len() - synced_ids.len(),
            properties_synced: confirmed.len(),
            properties_failed: edited.len() - confirmed.len(),
        };
        tracing::info!(
            visits_synced = report.visits_synced,
            visits_failed = report.visits_failed,
            properties_synced = report.properties_synced,
            properties_failed = report.properties_failed,
            "synchronization pass finished"
        );
        Ok(report)
    }

    /// Derive the pending-sync set from the stored collections.
    pub async fn pending_work(&self) -> Result<PendingWork> {
        let visits: Vec<Visit> = self.store.read(store::VISITS).await?;
        let properties: Vec<Property> = self.store.read(store::PROPERTIES).await?;
        Ok(PendingWork::scan(&visits, &properties))
    }

    /// Mark the selected blocks as finalized on the remote service.
    ///
    /// When the service confirms the full count, the cached blocks are
    /// flagged locally to keep the UI consistent. A short count is
    /// reported as-is: the contract gives no per-block outcome, so the
    /// local flags stay untouched for the caller to retry.
    pub async fn finalize_blocks(
        &self,
        block_ids: &[BlockId],
        agent_id: &str,
    ) -> Result<BlockFinalization> {
        if block_ids.is_empty() {
            return Ok(BlockFinalization {
                requested: 0,
                updated: 0,
            });
        }

        let request = BlockFinalizeRequest {
            ids: block_ids.to_vec(),
            worked_by: agent_id.to_string(),
        };
        let response = self.remote.finalize_blocks(&request).await?;

        let finalization = BlockFinalization {
            requested: block_ids.len(),
            updated: response.updated as usize,
        };

        if finalization.is_complete() {
            let guard = self.store.guard(store::BLOCKS);
            let _lock = guard.lock().await;
            let mut blocks: Vec<Block> = self.store.read(store::BLOCKS).await?;
            for block in blocks.iter_mut().filter(|b| block_ids.contains(&b.id)) {
                block.finalized = true;
            }
            self.store.write(store::BLOCKS, &blocks).await?;
            tracing::info!(count = finalization.updated, "blocks finalized");
        } else {
            tracing::warn!(
                requested = finalization.requested,
                updated = finalization.updated,
                "block finalization partially applied"
            );
        }

        Ok(finalization)
    }
}
