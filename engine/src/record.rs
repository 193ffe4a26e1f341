//! Domain records for the field snapshot.

use crate::{AgentId, AreaId, BlockId, PropertyId, Timestamp, VisitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level administrative region containing blocks.
///
/// Areas are registered by an administrator on the remote service and are
/// never modified from the field client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub code: String,
    pub zone: String,
    pub category: String,
    pub map_url: String,
    pub responsible_agent_id: AgentId,
}

/// A subdivision of an area, assignable to one field agent.
///
/// Cached read-only on the device, except for `finalized` which the
/// reconciliation engine sets after a confirmed bulk update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    pub area_id: AreaId,
    pub number: u32,
    pub total_properties: u32,
    pub responsible_agent_id: AgentId,
    #[serde(default)]
    pub finalized: bool,
}

/// Kind of inspectable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Residential,
    Commerce,
    VacantLot,
    StrategicPoint,
    Other,
}

/// Inspection status of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Pending,
    Visited,
    Closed,
    Refused,
}

/// A single inspectable address within a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub block_id: BlockId,
    pub position: u32,
    pub street: String,
    pub number: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub inhabitants: u32,
    pub dogs: u32,
    pub cats: u32,
    #[serde(default)]
    pub observation: String,
    pub status: PropertyStatus,
    /// Set while the record carries local edits not yet confirmed remotely.
    /// Keeps its legacy wire name.
    #[serde(rename = "editadoOffline", default)]
    pub edited_offline: bool,
}

impl Property {
    /// Record a completed visit: the property is now `Visited` and carries
    /// a local edit awaiting sync.
    pub fn mark_visited(&mut self) {
        self.status = PropertyStatus::Visited;
        self.edited_offline = true;
    }

    /// Clear the offline marker after a confirmed remote update.
    pub fn clear_offline_marker(&mut self) {
        self.edited_offline = false;
    }
}

/// A capture event recording inspection results for one property.
///
/// Immutable once created, except for `synced` which flips true after the
/// remote service confirms the upload. Deposit counts are keyed by deposit
/// type code; `BTreeMap` keeps serialization deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: VisitId,
    pub property_id: PropertyId,
    pub agent_id: AgentId,
    pub area_id: AreaId,
    pub block_id: BlockId,
    /// Capture time, milliseconds since epoch
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
    #[serde(default)]
    pub synced: bool,
}

impl Visit {
    /// True while the visit awaits remote confirmation.
    pub fn is_pending(&self) -> bool {
        !self.synced
    }

    /// Flip the sync flag after a confirmed remote acceptance. Terminal:
    /// no further local mutation of the visit is permitted.
    pub fn mark_synced(&mut self) {
        self.synced = true;
    }
}
