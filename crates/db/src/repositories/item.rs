//! Item repository.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tally_shared::types::{
    ItemCategoryId, ItemId, OrganizationId, PageRequest, PageResponse, UserId,
};
use uuid::Uuid;

use crate::entities::{item_categories, items, sea_orm_active_enums::ItemType};

/// Error types for item operations.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// Item not found.
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// The referenced category does not exist in the organization.
    #[error("Item category not found: {0}")]
    CategoryNotFound(ItemCategoryId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an item.
#[derive(Debug, Clone)]
pub struct CreateItemInput {
    /// Item name.
    pub name: String,
    /// Item type.
    pub item_type: ItemType,
    /// Stock keeping unit.
    pub sku: Option<String>,
    /// Category the item belongs to.
    pub category_id: Option<ItemCategoryId>,
    /// Selling price.
    pub sell_price: Option<Decimal>,
    /// Purchase price.
    pub cost_price: Option<Decimal>,
}

/// Item repository.
pub struct ItemRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> ItemRepository<'c, C> {
    /// Creates a new item repository.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Creates an item owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `CategoryNotFound` if the category is not in the organization.
    pub async fn create_item(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        input: CreateItemInput,
    ) -> Result<items::Model, ItemError> {
        if let Some(category_id) = input.category_id {
            let found = item_categories::Entity::find_by_id(Uuid::from(category_id))
                .filter(item_categories::Column::OrganizationId.eq(Uuid::from(organization_id)))
                .count(self.conn)
                .await?;
            if found == 0 {
                return Err(ItemError::CategoryNotFound(category_id));
            }
        }

        let now = Utc::now();
        let item = items::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization_id.into()),
            name: Set(input.name),
            item_type: Set(input.item_type),
            sku: Set(input.sku),
            category_id: Set(input.category_id.map(Into::into)),
            sell_price: Set(input.sell_price),
            cost_price: Set(input.cost_price),
            user_id: Set(user_id.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(item.insert(self.conn).await?)
    }

    /// Gets an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist in the organization.
    pub async fn get_item(
        &self,
        organization_id: OrganizationId,
        id: ItemId,
    ) -> Result<items::Model, ItemError> {
        items::Entity::find_by_id(Uuid::from(id))
            .filter(items::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .one(self.conn)
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    /// Lists items by name, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_items(
        &self,
        organization_id: OrganizationId,
        category_id: Option<ItemCategoryId>,
        page: PageRequest,
    ) -> Result<PageResponse<items::Model>, ItemError> {
        let mut query = items::Entity::find()
            .filter(items::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .order_by_asc(items::Column::Name)
            .order_by_asc(items::Column::Id);

        if let Some(category_id) = category_id {
            query = query.filter(items::Column::CategoryId.eq(Uuid::from(category_id)));
        }

        let total = query.clone().count(self.conn).await?;
        let data = query
            .offset(page.offset())
            .limit(page.limit())
            .all(self.conn)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }
}
