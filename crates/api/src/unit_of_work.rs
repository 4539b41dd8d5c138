//! Per-request transaction and event buffer.

use sea_orm::{DatabaseTransaction, DbErr};
use tally_core::TenantContext;
use tally_core::events::{EventBus, PendingEvents};
use tally_db::RlsConnection;
use tracing::debug;

use crate::AppState;

/// One request's RLS-scoped transaction together with the events its services publish.
///
/// Events reach the outbound queue only from [`UnitOfWork::commit`]. Dropping the unit of work
/// rolls the transaction back and discards the events.
pub struct UnitOfWork {
    rls: RlsConnection,
    events: PendingEvents,
    bus: EventBus,
}

impl UnitOfWork {
    /// Opens a transaction scoped to the request's tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    pub async fn begin(state: &AppState, ctx: &TenantContext) -> Result<Self, DbErr> {
        let rls = RlsConnection::new(&state.db, ctx.organization_id).await?;
        Ok(Self {
            rls,
            events: PendingEvents::new(),
            bus: state.events.clone(),
        })
    }

    /// The transaction repositories run on.
    #[must_use]
    pub const fn conn(&self) -> &DatabaseTransaction {
        self.rls.transaction()
    }

    /// The buffer services publish into.
    #[must_use]
    pub const fn events(&self) -> &PendingEvents {
        &self.events
    }

    /// Commits the transaction, then forwards the buffered events.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; no event is forwarded in that case.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.rls.commit().await?;
        let forwarded = self.events.forward_to(&self.bus);
        if forwarded > 0 {
            debug!(forwarded, "domain events queued");
        }
        Ok(())
    }
}
