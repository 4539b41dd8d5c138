//! Account repository for chart of accounts database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tally_core::accounts::{AccountSubtype, AccountType};
use tally_shared::types::{AccountId, OrganizationId};
use uuid::Uuid;

use crate::entities::accounts;
use crate::repositories::is_unique_violation;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account code already exists in organization.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Subtype belongs to a different root type.
    #[error("Account subtype {subtype} cannot be used with account type {account_type}")]
    IncompatibleSubtype {
        /// Requested root type.
        account_type: AccountType,
        /// Requested subtype.
        subtype: AccountSubtype,
    },

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account code (must be unique within organization).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Root type.
    pub account_type: AccountType,
    /// Subtype, compatible with the root type.
    pub account_subtype: Option<AccountSubtype>,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
}

/// Account repository.
pub struct AccountRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> AccountRepository<'c, C> {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the subtype does not belong to the root type, the code is already
    /// used in the organization, or the insert fails.
    pub async fn create_account(
        &self,
        organization_id: OrganizationId,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        if let Some(subtype) = input.account_subtype
            && !subtype.is_compatible_with(input.account_type)
        {
            return Err(AccountError::IncompatibleSubtype {
                account_type: input.account_type,
                subtype,
            });
        }

        let existing = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .filter(accounts::Column::Code.eq(&input.code))
            .count(self.conn)
            .await?;

        if existing > 0 {
            return Err(AccountError::DuplicateCode(input.code));
        }

        let now = Utc::now();
        let code = input.code.clone();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization_id.into()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            account_type: Set(input.account_type.into()),
            account_subtype: Set(input.account_subtype.map(Into::into)),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(self.conn).await.map_err(|err| {
            if is_unique_violation(&err) {
                AccountError::DuplicateCode(code)
            } else {
                AccountError::Database(err)
            }
        })
    }

    /// Lists accounts for an organization ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        organization_id: OrganizationId,
        filter: AccountFilter,
    ) -> Result<Vec<accounts::Model>, AccountError> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .order_by_asc(accounts::Column::Code);

        if let Some(account_type) = filter.account_type {
            query = query.filter(
                accounts::Column::AccountType
                    .eq(crate::entities::sea_orm_active_enums::AccountType::from(account_type)),
            );
        }

        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        Ok(query.all(self.conn).await?)
    }

    /// Finds an account by ID within the organization.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist in the organization.
    pub async fn get_account(
        &self,
        organization_id: OrganizationId,
        id: AccountId,
    ) -> Result<accounts::Model, AccountError> {
        accounts::Entity::find_by_id(Uuid::from(id))
            .filter(accounts::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .one(self.conn)
            .await?
            .ok_or(AccountError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait, RuntimeErr, Value};
    use std::collections::BTreeMap;

    fn input(code: &str) -> CreateAccountInput {
        CreateAccountInput {
            code: code.to_string(),
            name: "Sales".to_string(),
            description: None,
            account_type: AccountType::Income,
            account_subtype: Some(AccountSubtype::OperatingIncome),
            is_active: true,
        }
    }

    fn model(organization_id: OrganizationId, code: &str) -> accounts::Model {
        let now = Utc::now();
        accounts::Model {
            id: Uuid::now_v7(),
            organization_id: organization_id.into(),
            code: code.to_string(),
            name: "Sales".to_string(),
            description: None,
            account_type: sea_orm_active_enums::AccountType::Income,
            account_subtype: Some(sea_orm_active_enums::AccountSubtype::OperatingIncome),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_incompatible_subtype_rejected_before_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = AccountRepository::new(&db);

        let mut bad = input("4000");
        bad.account_subtype = Some(AccountSubtype::Inventory);

        let err = repo
            .create_account(OrganizationId::new(), bad)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::IncompatibleSubtype {
                account_type: AccountType::Income,
                subtype: AccountSubtype::Inventory,
            }
        ));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .into_connection();
        let repo = AccountRepository::new(&db);

        let err = repo
            .create_account(OrganizationId::new(), input("4000"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateCode(code) if code == "4000"));
    }

    #[tokio::test]
    async fn test_code_taken_between_check_and_insert() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                "duplicate key value violates unique constraint \"accounts_organization_id_code_key\""
                    .to_string(),
            ))])
            .into_connection();
        let repo = AccountRepository::new(&db);

        let err = repo
            .create_account(OrganizationId::new(), input("4000"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateCode(code) if code == "4000"));
    }

    #[tokio::test]
    async fn test_other_insert_failures_stay_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repo = AccountRepository::new(&db);

        let err = repo
            .create_account(OrganizationId::new(), input("4000"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Database(_)));
    }

    #[tokio::test]
    async fn test_create_inserts_account() {
        let org = OrganizationId::new();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([vec![model(org, "4000")]])
            .into_connection();
        let repo = AccountRepository::new(&db);

        let created = repo.create_account(org, input("4000")).await.unwrap();
        assert_eq!(created.code, "4000");
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<accounts::Model>::new()])
            .into_connection();
        let repo = AccountRepository::new(&db);

        let id = AccountId::new();
        let err = repo
            .get_account(OrganizationId::new(), id)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotFound(missing) if missing == id));
    }

    #[test]
    fn test_list_filter_sql() {
        let org = OrganizationId::new();
        let sql = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(Uuid::from(org)))
            .filter(
                accounts::Column::AccountType.eq(sea_orm_active_enums::AccountType::from(
                    AccountType::Expense,
                )),
            )
            .order_by_asc(accounts::Column::Code)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""accounts"."account_type" = CAST('expense'"#));
        assert!(sql.ends_with(r#"ORDER BY "accounts"."code" ASC"#));
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }
}
