//! Remote service seam: the endpoints the sync client consumes.
//!
//! Upload payloads strip the local-only markers before they reach the wire;
//! request and response bodies keep the service's legacy field names.

mod http;

pub use http::HttpRemoteApi;

use async_trait::async_trait;
use campo_engine::{
    AgentId, AreaId, Block, BlockId, Property, PropertyId, PropertyKind, PropertyStatus,
    Timestamp, Visit, VisitId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Activity code the service expects on a period-closure submission.
pub const PERIOD_CLOSURE_ACTIVITY: u8 = 4;

/// Remote call failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request never completed: connection refused, DNS, timeout.
    #[error("network failure: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

/// A visit as posted to the service: the full record minus the sync flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitUpload {
    pub id: VisitId,
    pub property_id: PropertyId,
    pub agent_id: AgentId,
    pub area_id: AreaId,
    pub block_id: BlockId,
    pub timestamp: Timestamp,
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

impl From<&Visit> for VisitUpload {
    fn from(visit: &Visit) -> Self {
        Self {
            id: visit.id.clone(),
            property_id: visit.property_id.clone(),
            agent_id: visit.agent_id.clone(),
            area_id: visit.area_id.clone(),
            block_id: visit.block_id.clone(),
            timestamp: visit.timestamp,
            inspected_deposits: visit.inspected_deposits.clone(),
            inhabitants: visit.inhabitants,
            dogs: visit.dogs,
            cats: visit.cats,
            samples_initial: visit.samples_initial,
            samples_final: visit.samples_final,
            focus_count: visit.focus_count,
            larvicide_grams: visit.larvicide_grams,
            treated_deposits: visit.treated_deposits,
        }
    }
}

/// A property as sent to the update endpoint: minus `id` (it travels in the
/// path) and minus the offline marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpload {
    pub block_id: BlockId,
    pub position: u32,
    pub street: String,
    pub number: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub inhabitants: u32,
    pub dogs: u32,
    pub cats: u32,
    pub observation: String,
    pub status: PropertyStatus,
}

impl From<&Property> for PropertyUpload {
    fn from(property: &Property) -> Self {
        Self {
            block_id: property.block_id.clone(),
            position: property.position,
            street: property.street.clone(),
            number: property.number.clone(),
            kind: property.kind,
            inhabitants: property.inhabitants,
            dogs: property.dogs,
            cats: property.cats,
            observation: property.observation.clone(),
            status: property.status,
        }
    }
}

/// Bulk block-finalization request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockFinalizeRequest {
    pub ids: Vec<BlockId>,
    #[serde(rename = "trabalhadoPor")]
    pub worked_by: AgentId,
}

/// Bulk block-finalization response. The service reports only how many
/// blocks it updated, never which ones.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockFinalizeResponse {
    #[serde(rename = "quarteiroesAtualizados")]
    pub updated: u32,
}

/// One area still awaiting period closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaClosureSummary {
    pub area_id: AreaId,
    pub area_name: String,
    pub diary_count: u32,
    pub days_worked: u32,
}

/// Period-closure submission for one area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosureUpload {
    #[serde(rename = "idAgente")]
    pub agent_id: AgentId,
    #[serde(rename = "idArea")]
    pub area_id: AreaId,
    #[serde(rename = "semana")]
    pub period: u32,
    #[serde(rename = "atividade")]
    pub activity: u8,
}

/// The remote endpoints the client consumes.
///
/// `pending_closures` maps the service's "nothing pending" 404 to an empty
/// list; genuine transport failures surface as [`RemoteError::Network`].
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn fetch_blocks(&self, agent_id: &str) -> Result<Vec<Block>, RemoteError>;

    async fn fetch_properties(&self, agent_id: &str) -> Result<Vec<Property>, RemoteError>;

    async fn create_visit(&self, visit: &VisitUpload) -> Result<(), RemoteError>;

    async fn update_property(
        &self,
        property_id: &str,
        property: &PropertyUpload,
    ) -> Result<(), RemoteError>;

    async fn finalize_blocks(
        &self,
        request: &BlockFinalizeRequest,
    ) -> Result<BlockFinalizeResponse, RemoteError>;

    async fn pending_closures(
        &self,
        agent_id: &str,
        period: u32,
    ) -> Result<Vec<AreaClosureSummary>, RemoteError>;

    async fn close_area(&self, closure: &ClosureUpload) -> Result<(), RemoteError>;
}
