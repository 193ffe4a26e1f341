//! Weekly/cycle closure engine.
//!
//! Period closure is the end-of-cycle commitment of an area's work. It is
//! gated on a clear pending-sync set: the gate belongs to the caller (see
//! [`ensure_ready`]) and is not re-validated here.

use crate::error::{Result, SyncError};
use crate::remote::{AreaClosureSummary, ClosureUpload, RemoteApi, PERIOD_CLOSURE_ACTIVITY};
use campo_engine::{AreaId, PendingWork};
use serde::Serialize;

/// Per-area outcome of a closure batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureReport {
    pub succeeded: Vec<AreaId>,
    pub failed: Vec<AreaId>,
}

/// Commits finalized period records per area.
pub struct ClosureEngine<R> {
    remote: R,
}

impl<R: RemoteApi> ClosureEngine<R> {
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    /// List the areas still awaiting closure for `period`.
    ///
    /// An empty list means the remote reports nothing pending; transport
    /// failures propagate as errors and are never conflated with "none".
    pub async fn pending_areas(
        &self,
        agent_id: &str,
        period: u32,
    ) -> Result<Vec<AreaClosureSummary>> {
        let summaries = self.remote.pending_closures(agent_id, period).await?;
        if summaries.is_empty() {
            tracing::info!(agent = agent_id, period, "no areas pending closure");
        }
        Ok(summaries)
    }

    /// Commit the period closure for each requested area, sequentially.
    ///
    /// A failed area never aborts the rest; outcomes are partitioned into
    /// the report.
    pub async fn close_areas(
        &self,
        agent_id: &str,
        period: u32,
        area_ids: &[AreaId],
    ) -> ClosureReport {
        let mut report = ClosureReport::default();

        for area_id in area_ids {
            let upload = ClosureUpload {
                agent_id: agent_id.to_string(),
                area_id: area_id.clone(),
                period,
                activity: PERIOD_CLOSURE_ACTIVITY,
            };

            match self.remote.close_area(&upload).await {
                Ok(()) => report.succeeded.push(area_id.clone()),
                Err(err) => {
                    tracing::warn!(area = %area_id, %err, "area closure failed");
                    report.failed.push(area_id.clone());
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "period closure batch finished"
        );
        report
    }
}

/// Caller-side gate: closure may only start once nothing awaits sync.
///
/// The UI calls this with [`crate::Reconciler::pending_work`] before
/// offering the closure action; the error message names what is still
/// pending.
pub fn ensure_ready(pending: &PendingWork) -> Result<()> {
    if pending.is_clear() {
        Ok(())
    } else {
        Err(SyncError::ClosureBlocked(pending.clone()))
    }
}
