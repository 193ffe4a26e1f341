//! # Campo Engine
//!
//! Core logic for an offline-first field data capture client.
//!
//! Field agents cache the blocks and properties assigned to them, record
//! visits and property edits with no connectivity, and later reconcile the
//! pending records against the remote service. This crate holds the pure
//! part of that cycle: the domain records, the capture state transitions,
//! the derived pending-work set, and the merge that absorbs sync outcomes
//! back into the stored collections.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, network, or platform
//! - **Explicit values**: snapshots and patches are values passed around,
//!   never ambient mutable state
//! - **Testable**: Pure logic, no mocks needed
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! The snapshot hierarchy is [`Area`] → [`Block`] → [`Property`], with
//! [`Visit`] capture events hanging off properties. Locally touched records
//! carry a pending marker: `synced == false` on visits, the legacy
//! `editadoOffline` flag on properties.
//!
//! ### Patches
//!
//! Property edits are expressed as a [`PropertyPatch`] of optional fields
//! and merged through [`PropertyPatch::apply`], so stray keys never reach
//! the stored records.
//!
//! ### Pending work
//!
//! [`PendingWork::scan`] derives the set of records awaiting remote
//! confirmation. It is the unit of work for a sync pass and the gate for
//! period closure.
//!
//! ### Outcome absorption
//!
//! A sync pass runs against point-in-time copies while capture keeps
//! writing. [`absorb_visit_outcomes`] and [`absorb_property_outcomes`]
//! merge per-item results back into the freshly read collections by record
//! id, never by blind overwrite.
//!
//! ## Quick Start
//!
//! ```rust
//! use campo_engine::{capture, PendingWork, Property, PropertyKind, PropertyStatus, Visit};
//! use std::collections::BTreeMap;
//!
//! // One property out of the cached snapshot.
//! let mut properties = vec![Property {
//!     id: "imovel-1".into(),
//!     block_id: "q-10".into(),
//!     position: 1,
//!     street: "Rua das Acácias".into(),
//!     number: "120".into(),
//!     kind: PropertyKind::Residential,
//!     inhabitants: 3,
//!     dogs: 1,
//!     cats: 0,
//!     observation: String::new(),
//!     status: PropertyStatus::Pending,
//!     edited_offline: false,
//! }];
//!
//! // A visit captured in the field.
//! let visit = Visit {
//!     id: "v-1".into(),
//!     property_id: "imovel-1".into(),
//!     agent_id: "agent-7".into(),
//!     area_id: "a-1".into(),
//!     block_id: "q-10".into(),
//!     timestamp: 1754400000000,
//!     inspected_deposits: BTreeMap::from([("a1".to_string(), 2)]),
//!     inhabitants: 3,
//!     dogs: 1,
//!     cats: 0,
//!     samples_initial: 1,
//!     samples_final: 0,
//!     focus_count: 0,
//!     larvicide_grams: 0.0,
//!     treated_deposits: 0,
//!     synced: false,
//! };
//!
//! capture::apply_visit(&mut properties, &visit).unwrap();
//! assert_eq!(properties[0].status, PropertyStatus::Visited);
//!
//! let pending = PendingWork::scan(&[visit], &properties);
//! assert_eq!(pending.unsynced_visits, 1);
//! assert_eq!(pending.edited_properties, 1);
//! assert!(!pending.is_clear());
//! ```

pub mod capture;
pub mod error;
pub mod patch;
pub mod reconcile;
pub mod record;
pub mod snapshot;

// Re-export main types at crate root
pub use error::Error;
pub use patch::PropertyPatch;
pub use reconcile::{absorb_property_outcomes, absorb_visit_outcomes, PendingWork};
pub use record::{Area, Block, Property, PropertyKind, PropertyStatus, Visit};
pub use snapshot::{FieldSnapshot, SnapshotRefresh, SnapshotSource};

/// Type aliases for clarity
pub type AgentId = String;
pub type AreaId = String;
pub type BlockId = String;
pub type PropertyId = String;
pub type VisitId = String;
pub type Timestamp = u64;
