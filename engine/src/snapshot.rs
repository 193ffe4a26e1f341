//! Snapshot value object for an agent's assigned workload.
//!
//! The snapshot is an explicit value handed through the UI layer for
//! rendering; the record store keeps the authoritative serialized copies.

use crate::record::{Block, Property};
use serde::{Deserialize, Serialize};

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotSource {
    /// Fresh from the remote service
    Remote,
    /// The previously stored copy, served because the remote was unreachable
    LocalFallback,
}

/// The blocks and properties assigned to one field agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    pub blocks: Vec<Block>,
    pub properties: Vec<Property>,
}

impl FieldSnapshot {
    pub fn new(blocks: Vec<Block>, properties: Vec<Property>) -> Self {
        Self { blocks, properties }
    }

    pub fn empty() -> Self {
        Self {
            blocks: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.properties.is_empty()
    }

    /// Look up a block by id.
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Look up a property by id.
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    /// All properties belonging to one block.
    pub fn properties_in_block<'a>(
        &'a self,
        block_id: &'a str,
    ) -> impl Iterator<Item = &'a Property> {
        self.properties.iter().filter(move |p| p.block_id == block_id)
    }
}

/// Result of a snapshot refresh: the snapshot plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRefresh {
    pub snapshot: FieldSnapshot,
    pub source: SnapshotSource,
}

impl SnapshotRefresh {
    /// True when the snapshot may lag behind the remote authority.
    pub fn is_stale(&self) -> bool {
        matches!(self.source, SnapshotSource::LocalFallback)
    }
}
