//! Request scope.

use tally_shared::types::{OrganizationId, UserId};

/// Tenant and acting user of a single request.
///
/// Every service operation is scoped to exactly one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    /// Tenant the request operates on.
    pub organization_id: OrganizationId,
    /// User performing the request.
    pub user_id: UserId,
}

impl TenantContext {
    /// Creates a new context.
    #[must_use]
    pub const fn new(organization_id: OrganizationId, user_id: UserId) -> Self {
        Self {
            organization_id,
            user_id,
        }
    }
}
