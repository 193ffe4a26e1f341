//! Pending-work derivation and sync-outcome absorption.
//!
//! A sync pass pushes point-in-time copies of the pending records while
//! capture may keep appending to the stored collections. Absorbing the
//! outcomes is therefore a merge keyed by record id against a fresh read,
//! never a blind overwrite of the whole collection.

use crate::record::{Property, Visit};
use crate::VisitId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived summary of records still awaiting remote confirmation.
///
/// This is the unit of work for a sync pass and the gate for period
/// closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingWork {
    /// Visits with `synced == false`
    pub unsynced_visits: usize,
    /// Properties with the offline marker set
    pub edited_properties: usize,
}

impl PendingWork {
    /// Derive the pending set from the two collections.
    pub fn scan(visits: &[Visit], properties: &[Property]) -> Self {
        Self {
            unsynced_visits: visits.iter().filter(|v| v.is_pending()).count(),
            edited_properties: properties.iter().filter(|p| p.edited_offline).count(),
        }
    }

    /// True when nothing awaits remote confirmation.
    pub fn is_clear(&self) -> bool {
        self.unsynced_visits == 0 && self.edited_properties == 0
    }
}

impl fmt::Display for PendingWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} and {} {} awaiting sync",
            self.unsynced_visits,
            if self.unsynced_visits == 1 {
                "visit"
            } else {
                "visits"
            },
            self.edited_properties,
            if self.edited_properties == 1 {
                "property"
            } else {
                "properties"
            },
        )
    }
}

/// Mark as synced every stored visit whose upload was acknowledged.
///
/// Ids with no matching stored visit are ignored; already-synced visits are
/// left alone, so absorbing the same outcome twice is harmless.
pub fn absorb_visit_outcomes(stored: &mut [Visit], synced_ids: &[VisitId]) {
    for visit in stored.iter_mut() {
        if visit.is_pending() && synced_ids.iter().any(|id| id == &visit.id) {
            visit.mark_synced();
        }
    }
}

/// Clear the offline marker on every stored property whose pushed payload
/// was confirmed remotely.
///
/// A property re-edited after its copy was pushed no longer matches the
/// confirmed payload; its marker stays set and the newer edit ships on the
/// next pass.
pub fn absorb_property_outcomes(stored: &mut [Property], confirmed: &[Property]) {
    for property in stored.iter_mut() {
        if !property.edited_offline {
            continue;
        }
        let unchanged_since_push = confirmed
            .iter()
            .any(|pushed| pushed.id == property.id && same_payload(property, pushed));
        if unchanged_since_push {
            property.clear_offline_marker();
        }
    }
}

/// Payload equality ignoring the offline marker.
fn same_payload(a: &Property, b: &Property) -> bool {
    let mut a = a.clone();
    let mut b = b.clone();
    a.edited_offline = false;
    b.edited_offline = false;
    a == b
}
