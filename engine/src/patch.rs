//! Typed partial updates for properties.
//!
//! Edit forms produce a sparse set of fields. Merging them through an
//! explicit patch keeps unexpected keys out of the stored records.

use crate::record::{Property, PropertyKind, PropertyStatus};
use serde::{Deserialize, Serialize};

/// An optional-field update for a [`Property`].
///
/// Unset fields leave the stored value untouched. The patch never carries
/// `id` or the offline marker; those are managed by the capture layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyPatch {
    pub position: Option<u32>,
    pub street: Option<String>,
    pub number: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PropertyKind>,
    pub inhabitants: Option<u32>,
    pub dogs: Option<u32>,
    pub cats: Option<u32>,
    pub observation: Option<String>,
    pub status: Option<PropertyStatus>,
}

impl PropertyPatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the set fields into `property`.
    pub fn apply(&self, property: &mut Property) {
        if let Some(position) = self.position {
            property.position = position;
        }
        if let Some(street) = &self.street {
            property.street = street.clone();
        }
        if let Some(number) = &self.number {
            property.number = number.clone();
        }
        if let Some(kind) = self.kind {
            property.kind = kind;
        }
        if let Some(inhabitants) = self.inhabitants {
            property.inhabitants = inhabitants;
        }
        if let Some(dogs) = self.dogs {
            property.dogs = dogs;
        }
        if let Some(cats) = self.cats {
            property.cats = cats;
        }
        if let Some(observation) = &self.observation {
            property.observation = observation.clone();
        }
        if let Some(status) = self.status {
            property.status = status;
        }
    }
}
