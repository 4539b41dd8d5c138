//! Row-Level Security (RLS) context management.
//!
//! Every tenant-scoped request runs inside one transaction whose
//! `app.current_organization_id` setting selects the visible rows.
//!
//! ```ignore
//! use tally_db::rls::RlsExt;
//!
//! let rls = db.with_rls(organization_id).await?;
//! let categories = item_categories::Entity::find().all(rls.transaction()).await?;
//! rls.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tally_shared::types::OrganizationId;

/// Returns the statement that scopes the current transaction to a tenant.
///
/// The ID is a UUID, so interpolating it cannot inject SQL.
#[must_use]
pub fn rls_context_sql(organization_id: OrganizationId) -> String {
    format!("SET LOCAL app.current_organization_id = '{organization_id}'")
}

/// A transaction with the tenant RLS context applied.
///
/// Dropping it without calling [`RlsConnection::commit`] rolls every change back.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Begins a transaction and sets `app.current_organization_id` with `SET LOCAL`, which
    /// scopes the setting to this transaction only.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the context cannot be set.
    pub async fn new(db: &DatabaseConnection, organization_id: OrganizationId) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        txn.execute_unprepared(&rls_context_sql(organization_id))
            .await?;
        Ok(Self { txn })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub const fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to open RLS-scoped transactions.
#[async_trait::async_trait]
pub trait RlsExt {
    /// Opens a transaction scoped to the organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the RLS connection cannot be created.
    async fn with_rls(&self, organization_id: OrganizationId) -> Result<RlsConnection, DbErr>;
}

#[async_trait::async_trait]
impl RlsExt for DatabaseConnection {
    async fn with_rls(&self, organization_id: OrganizationId) -> Result<RlsConnection, DbErr> {
        RlsConnection::new(self, organization_id).await
    }
}
