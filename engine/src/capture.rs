//! Pure state transitions for locally captured data.
//!
//! These functions mutate in-memory collections only; persistence and
//! network access are the caller's concern.

use crate::error::{Error, Result};
use crate::patch::PropertyPatch;
use crate::record::{Property, Visit};

/// Mark the property referenced by `visit` as visited.
///
/// A visit may only be captured against a property present in the local
/// snapshot.
pub fn apply_visit(properties: &mut [Property], visit: &Visit) -> Result<()> {
    let property = properties
        .iter_mut()
        .find(|p| p.id == visit.property_id)
        .ok_or_else(|| Error::PropertyNotFound(visit.property_id.clone()))?;

    property.mark_visited();
    Ok(())
}

/// Merge `patch` into the property with `property_id` and flag it as
/// carrying offline edits. Returns a copy of the updated record.
pub fn apply_patch(
    properties: &mut [Property],
    property_id: &str,
    patch: &PropertyPatch,
) -> Result<Property> {
    let property = properties
        .iter_mut()
        .find(|p| p.id == property_id)
        .ok_or_else(|| Error::PropertyNotFound(property_id.to_string()))?;

    patch.apply(property);
    property.edited_offline = true;
    Ok(property.clone())
}
