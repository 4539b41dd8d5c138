//! Item category repository: the Postgres implementation of [`ItemCategoryStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, Order, PaginatorTrait,
    QueryFilter, QuerySelect,
};
use tally_core::accounts::AccountRef;
use tally_core::filter::ValidatedFilter;
use tally_core::item_category::{ItemCategory, ItemCategoryStore, ItemCategoryWithCount, StoreError};
use tally_shared::types::{AccountId, ItemCategoryId, OrganizationId};
use uuid::Uuid;

use crate::entities::{accounts, item_categories, items};
use crate::filter::{FilterableEntity, apply_filter};
use crate::repositories::is_unique_violation;

impl FilterableEntity for item_categories::Entity {
    fn filter_column(key: &str) -> Option<Self::Column> {
        match key {
            "name" => Some(item_categories::Column::Name),
            "description" => Some(item_categories::Column::Description),
            "created_at" => Some(item_categories::Column::CreatedAt),
            "updated_at" => Some(item_categories::Column::UpdatedAt),
            _ => None,
        }
    }

    fn search_column() -> Self::Column {
        item_categories::Column::Name
    }

    fn default_order() -> (Self::Column, Order) {
        (item_categories::Column::Name, Order::Asc)
    }
}

#[derive(Debug, FromQueryResult)]
struct CategoryItemCount {
    category_id: Uuid,
    item_count: i64,
}

#[allow(clippy::needless_pass_by_value)]
fn store_err(err: DbErr) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict(err.to_string())
    } else {
        StoreError::Backend(err.to_string())
    }
}

fn uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|id| (*id).into()).collect()
}

/// Item category persistence over any `SeaORM` connection.
///
/// Pass the request's [`RlsConnection`](crate::rls::RlsConnection) transaction so that every
/// call of one service operation commits or rolls back together.
pub struct ItemCategoryRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> ItemCategoryRepository<'c, C> {
    /// Creates a repository over a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Counts items per category for the given categories.
    async fn item_counts(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, DbErr> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = items::Entity::find()
            .select_only()
            .column_as(items::Column::CategoryId, "category_id")
            .column_as(items::Column::Id.count(), "item_count")
            .filter(items::Column::CategoryId.is_in(ids.iter().copied()))
            .group_by(items::Column::CategoryId)
            .into_model::<CategoryItemCount>()
            .all(self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.category_id, u64::try_from(row.item_count).unwrap_or(0)))
            .collect())
    }
}

#[async_trait]
impl<C: ConnectionTrait + Send + Sync> ItemCategoryStore for ItemCategoryRepository<'_, C> {
    async fn find_category(
        &self,
        organization_id: OrganizationId,
        id: ItemCategoryId,
    ) -> Result<Option<ItemCategory>, StoreError> {
        let model = item_categories::Entity::find_by_id(Uuid::from(id))
            .filter(item_categories::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .one(self.conn)
            .await
            .map_err(store_err)?;
        Ok(model.map(Into::into))
    }

    async fn find_categories(
        &self,
        organization_id: OrganizationId,
        ids: &[ItemCategoryId],
    ) -> Result<Vec<ItemCategory>, StoreError> {
        let models = item_categories::Entity::find()
            .filter(item_categories::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .filter(item_categories::Column::Id.is_in(uuids(ids)))
            .all(self.conn)
            .await
            .map_err(store_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn name_exists(
        &self,
        organization_id: OrganizationId,
        name: &str,
        exclude: Option<ItemCategoryId>,
    ) -> Result<bool, StoreError> {
        let mut query = item_categories::Entity::find()
            .filter(item_categories::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .filter(item_categories::Column::Name.eq(name));
        if let Some(exclude) = exclude {
            query = query.filter(item_categories::Column::Id.ne(Uuid::from(exclude)));
        }
        let count = query.count(self.conn).await.map_err(store_err)?;
        Ok(count > 0)
    }

    async fn find_account(
        &self,
        organization_id: OrganizationId,
        id: AccountId,
    ) -> Result<Option<AccountRef>, StoreError> {
        let model = accounts::Entity::find_by_id(Uuid::from(id))
            .filter(accounts::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .one(self.conn)
            .await
            .map_err(store_err)?;
        Ok(model.map(Into::into))
    }

    async fn insert_category(&self, category: &ItemCategory) -> Result<(), StoreError> {
        item_categories::Entity::insert(item_categories::ActiveModel::from(category))
            .exec_without_returning(self.conn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn update_category(&self, category: &ItemCategory) -> Result<(), StoreError> {
        let model = item_categories::ActiveModel::from(category);
        item_categories::Entity::update_many()
            .set(model)
            .filter(item_categories::Column::Id.eq(Uuid::from(category.id)))
            .filter(
                item_categories::Column::OrganizationId.eq(Uuid::from(category.organization_id)),
            )
            .exec(self.conn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn unassociate_items(
        &self,
        organization_id: OrganizationId,
        ids: &[ItemCategoryId],
    ) -> Result<u64, StoreError> {
        let result = items::Entity::update_many()
            .col_expr(items::Column::CategoryId, Expr::value(Option::<Uuid>::None))
            .col_expr(items::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(items::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .filter(items::Column::CategoryId.is_in(uuids(ids)))
            .exec(self.conn)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_categories(
        &self,
        organization_id: OrganizationId,
        ids: &[ItemCategoryId],
    ) -> Result<u64, StoreError> {
        let result = item_categories::Entity::delete_many()
            .filter(item_categories::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .filter(item_categories::Column::Id.is_in(uuids(ids)))
            .exec(self.conn)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn count_items(
        &self,
        organization_id: OrganizationId,
        id: ItemCategoryId,
    ) -> Result<u64, StoreError> {
        items::Entity::find()
            .filter(items::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .filter(items::Column::CategoryId.eq(Uuid::from(id)))
            .count(self.conn)
            .await
            .map_err(store_err)
    }

    async fn list_categories(
        &self,
        organization_id: OrganizationId,
        filter: &ValidatedFilter,
    ) -> Result<(Vec<ItemCategoryWithCount>, u64), StoreError> {
        let query = apply_filter(
            item_categories::Entity::find()
                .filter(item_categories::Column::OrganizationId.eq(Uuid::from(organization_id))),
            filter,
        );

        let total = query.clone().count(self.conn).await.map_err(store_err)?;
        let models = query
            .offset(filter.page.offset())
            .limit(filter.page.limit())
            .all(self.conn)
            .await
            .map_err(store_err)?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let counts = self.item_counts(&ids).await.map_err(store_err)?;

        let rows = models
            .into_iter()
            .map(|model| {
                let item_count = counts.get(&model.id).copied().unwrap_or(0);
                ItemCategoryWithCount {
                    category: model.into(),
                    item_count,
                }
            })
            .collect();

        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::entities::sea_orm_active_enums::AccountType;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, RuntimeErr, Value};
    use tally_core::TenantContext;
    use tally_core::events::PendingEvents;
    use tally_core::item_category::{ItemCategoryError, ItemCategoryInput, ItemCategoryService};
    use tally_shared::types::UserId;

    fn category_model(organization_id: Uuid, name: &str) -> item_categories::Model {
        let now = Utc::now();
        item_categories::Model {
            id: Uuid::now_v7(),
            organization_id,
            name: name.to_string(),
            description: None,
            sell_account_id: None,
            cost_account_id: None,
            inventory_account_id: None,
            user_id: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_find_account_maps_to_domain() {
        let org = Uuid::now_v7();
        let now = Utc::now();
        let model = accounts::Model {
            id: Uuid::now_v7(),
            organization_id: org,
            code: "4000".to_string(),
            name: "Sales".to_string(),
            description: None,
            account_type: AccountType::Income,
            account_subtype: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model.clone()]])
            .into_connection();

        let repo = ItemCategoryRepository::new(&db);
        let account = repo
            .find_account(org.into(), model.id.into())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.code, "4000");
        assert_eq!(account.account_type, tally_core::accounts::AccountType::Income);
    }

    #[tokio::test]
    async fn test_delete_clears_items_before_removing_category() {
        let org = Uuid::now_v7();
        let model = category_model(org, "Hardware");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model.clone()]])
            .append_exec_results([exec(3), exec(1)])
            .into_connection();

        {
            let repo = ItemCategoryRepository::new(&db);
            let events = PendingEvents::new();
            let ctx = TenantContext::new(org.into(), UserId::new());
            let deleted = ItemCategoryService::new(&repo, &events)
                .delete(&ctx, model.id.into())
                .await
                .unwrap();
            assert_eq!(deleted.name, "Hardware");
            assert_eq!(events.len(), 1);
        }

        let log = format!("{:?}", db.into_transaction_log());
        let update = log.find(r#"UPDATE \"items\" SET \"category_id\""#).unwrap();
        let delete = log.find(r#"DELETE FROM \"item_categories\""#).unwrap();
        assert!(update < delete);
    }

    #[tokio::test]
    async fn test_store_error_is_reported() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let repo = ItemCategoryRepository::new(&db);
        let err = repo
            .find_category(OrganizationId::new(), ItemCategoryId::new())
            .await
            .unwrap_err();
        assert!(
            matches!(err, StoreError::Backend(message) if message.contains("connection reset"))
        );
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_insert_reports_name_exists() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_exec_errors([DbErr::Exec(RuntimeErr::Internal(format!(
                "duplicate key value violates unique constraint {:?}",
                "item_categories_organization_id_name_key"
            )))])
            .into_connection();
        let repo = ItemCategoryRepository::new(&db);
        let events = PendingEvents::new();
        let ctx = TenantContext::new(OrganizationId::new(), UserId::new());

        let result = ItemCategoryService::new(&repo, &events)
            .create(
                &ctx,
                ItemCategoryInput {
                    name: "Hardware".to_string(),
                    ..ItemCategoryInput::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ItemCategoryError::NameExists(name)) if name == "Hardware"));
        assert!(events.is_empty());
    }
}
