//! Ownership checks shared by every user- and event-scoped operation.

use uuid::Uuid;

use crate::errors::{PlannerError, PlannerResult};

/// Allows the operation only when the acting identity owns the resource.
///
/// `resource` is used in the error message, e.g. `"event"` or `"user"`.
pub fn ensure_owner(acting: Uuid, owner: Uuid, resource: &str) -> PlannerResult<()> {
    if acting == owner {
        Ok(())
    } else {
        Err(PlannerError::Forbidden(format!(
            "You do not have access to this {resource}"
        )))
    }
}
