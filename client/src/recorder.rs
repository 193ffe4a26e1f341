//! Mutation recorder: captures local-only edits into the record store.
//!
//! Never contacts the network. Everything recorded here carries a pending
//! marker until a sync pass confirms it remotely.
//!
//! Block selection for finalization is ephemeral UI state handed straight
//! to [`crate::Reconciler::finalize_blocks`]; nothing is recorded for it.

use crate::error::Result;
use crate::store::{self, FileStore};
use campo_engine::{
    capture, AgentId, AreaId, BlockId, Error, Property, PropertyId, PropertyPatch, Timestamp,
    Visit, VisitId,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// A visit as it leaves the capture form, before the recorder assigns its
/// identity and capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitDraft {
    pub property_id: PropertyId,
    pub agent_id: AgentId,
    pub area_id: AreaId,
    pub block_id: BlockId,
    pub inspected_deposits: BTreeMap<String, u32>,
    pub inhabitants: u32,
    pub dogs: u32,
    pub cats: u32,
    pub samples_initial: u32,
    pub samples_final: u32,
    pub focus_count: u32,
    pub larvicide_grams: f64,
    pub treated_deposits: u32,
}

impl VisitDraft {
    fn into_visit(self, id: VisitId, timestamp: Timestamp) -> Visit {
        Visit {
            id,
            property_id: self.property_id,
            agent_id: self.agent_id,
            area_id: self.area_id,
            block_id: self.block_id,
            timestamp,
            inspected_deposits: self.inspected_deposits,
            inhabitants: self.inhabitants,
            dogs: self.dogs,
            cats: self.cats,
            samples_initial: self.samples_initial,
            samples_final: self.samples_final,
            focus_count: self.focus_count,
            larvicide_grams: self.larvicide_grams,
            treated_deposits: self.treated_deposits,
            synced: false,
        }
    }
}

/// Records visits and property edits into the local store.
pub struct MutationRecorder {
    store: Arc<FileStore>,
}

impl MutationRecorder {
    pub fn new(store: Arc<FileStore>) -> Self {
        Self { store }
    }

    /// Append a new visit with `synced = false` and mark its property as
    /// visited.
    ///
    /// The visit write is issued first. If the property update fails
    /// afterwards, the visit is already persisted; the collections converge
    /// on the next sync pass. The draft's property must exist in the local
    /// snapshot.
    pub async fn record_visit(&self, draft: VisitDraft) -> Result<Visit> {
        let visit = draft.into_visit(
            Uuid::new_v4().to_string(),
            Utc::now().timestamp_millis() as Timestamp,
        );

        {
            let guard = self.store.guard(store::PROPERTIES);
            let _lock = guard.lock().await;
            let properties: Vec<Property> = self.store.read(store::PROPERTIES).await?;
            if !properties.iter().any(|p| p.id == visit.property_id) {
                return Err(Error::PropertyNotFound(visit.property_id.clone()).into());
            }
        }

        {
            let guard = self.store.guard(store::VISITS);
            let _lock = guard.lock().await;
            let mut visits: Vec<Visit> = self.store.read(store::VISITS).await?;
            visits.push(visit.clone());
            self.store.write(store::VISITS, &visits).await?;
        }

        {
            let guard = self.store.guard(store::PROPERTIES);
            let _lock = guard.lock().await;
            let mut properties: Vec<Property> = self.store.read(store::PROPERTIES).await?;
            match capture::apply_visit(&mut properties, &visit) {
                Ok(()) => self.store.write(store::PROPERTIES, &properties).await?,
                Err(err) => {
                    // the property vanished between the check and the update
                    // (snapshot refresh race); the visit itself is already
                    // safe in the store
                    tracing::warn!(%err, visit = %visit.id, "visit recorded without property update");
                }
            }
        }

        tracing::debug!(visit = %visit.id, property = %visit.property_id, "visit captured");
        Ok(visit)
    }

    /// Merge `patch` into the stored property and flag it as edited
    /// offline. Returns the updated record.
    ///
    /// On a store failure the caller still holds the form data and may
    /// retry.
    pub async fn record_property_edit(
        &self,
        property_id: &str,
        patch: PropertyPatch,
    ) -> Result<Property> {
        let guard = self.store.guard(store::PROPERTIES);
        let _lock = guard.lock().await;

        let mut properties: Vec<Property> = self.store.read(store::PROPERTIES).await?;
        let updated = capture::apply_patch(&mut properties, property_id, &patch)?;
        self.store.write(store::PROPERTIES, &properties).await?;

        tracing::debug!(property = %property_id, "offline edit recorded");
        Ok(updated)
    }
}
