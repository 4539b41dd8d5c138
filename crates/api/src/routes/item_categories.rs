//! Item category routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tally_core::filter::{FilterDescriptor, FilterRole, SortOrder};
use tally_core::item_category::{ItemCategoryInput, ItemCategoryService};
use tally_db::ItemCategoryRepository;
use tally_shared::types::{AccountId, ItemCategoryId, PageRequest};
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser, unit_of_work::UnitOfWork};

/// Creates the item category routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/item-categories",
            get(list_categories)
                .post(create_category)
                .delete(bulk_delete_categories),
        )
        .route(
            "/item-categories/{category_id}",
            get(get_category)
                .post(edit_category)
                .delete(delete_category),
        )
}

/// Query parameters for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct ListCategoriesQuery {
    /// Field to sort by.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<SortOrder>,
    /// Case-insensitive name search.
    pub search: Option<String>,
    /// JSON array of `{ field, comparator, value }` roles.
    pub stringified_filter_roles: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl ListCategoriesQuery {
    fn into_descriptor(self) -> Result<FilterDescriptor, ApiError> {
        let roles = FilterRole::parse_list(self.stringified_filter_roles.as_deref().unwrap_or(""))?;
        let defaults = PageRequest::default();
        Ok(FilterDescriptor {
            sort_by: self.sort_by,
            sort_order: self.sort_order.unwrap_or_default(),
            search: self.search,
            roles,
            page: PageRequest::new(
                self.page.unwrap_or(defaults.page),
                self.per_page.unwrap_or(defaults.per_page),
            ),
        })
    }
}

/// Query parameters for bulk deletion.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteQuery {
    /// Comma separated category IDs.
    #[serde(default)]
    pub ids: String,
}

/// Request body for creating or editing a category.
#[derive(Debug, Deserialize, Validate)]
pub struct ItemCategoryRequest {
    /// Category name, unique within the organization.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Income account for sales.
    pub sell_account_id: Option<AccountId>,
    /// Expense account for the cost of sales.
    pub cost_account_id: Option<AccountId>,
    /// Inventory asset account.
    pub inventory_account_id: Option<AccountId>,
}

impl From<ItemCategoryRequest> for ItemCategoryInput {
    fn from(request: ItemCategoryRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            description: request.description,
            sell_account_id: request.sell_account_id,
            cost_account_id: request.cost_account_id,
            inventory_account_id: request.inventory_account_id,
        }
    }
}

fn parse_ids(raw: &str) -> Result<Vec<ItemCategoryId>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<ItemCategoryId>().map_err(|_| {
                ApiError::bad_request("invalid_ids", format!("'{part}' is not a valid ID"))
            })
        })
        .collect()
}

/// GET `/item-categories` - List categories with item counts.
async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let descriptor = query.into_descriptor()?;
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let store = ItemCategoryRepository::new(uow.conn());
    let page = ItemCategoryService::new(&store, uow.events())
        .list(&ctx, &descriptor)
        .await?;

    Ok(Json(page))
}

/// POST `/item-categories` - Create a category.
async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ItemCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_write()?;
    payload.validate()?;
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let store = ItemCategoryRepository::new(uow.conn());
    let category = ItemCategoryService::new(&store, uow.events())
        .create(&ctx, payload.into())
        .await?;
    uow.commit().await?;

    info!(category_id = %category.id, name = %category.name, "Item category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET `/item-categories/{category_id}` - Get a category with its item count.
async fn get_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<ItemCategoryId>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let store = ItemCategoryRepository::new(uow.conn());
    let category = ItemCategoryService::new(&store, uow.events())
        .get(&ctx, category_id)
        .await?;

    Ok(Json(category))
}

/// POST `/item-categories/{category_id}` - Replace a category's editable fields.
async fn edit_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<ItemCategoryId>,
    Json(payload): Json<ItemCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_write()?;
    payload.validate()?;
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let store = ItemCategoryRepository::new(uow.conn());
    let category = ItemCategoryService::new(&store, uow.events())
        .edit(&ctx, category_id, payload.into())
        .await?;
    uow.commit().await?;

    info!(category_id = %category.id, "Item category edited");
    Ok(Json(category))
}

/// DELETE `/item-categories/{category_id}` - Delete a category, unassigning its items.
async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<ItemCategoryId>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_write()?;
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let store = ItemCategoryRepository::new(uow.conn());
    let category = ItemCategoryService::new(&store, uow.events())
        .delete(&ctx, category_id)
        .await?;
    uow.commit().await?;

    info!(category_id = %category.id, "Item category deleted");
    Ok(Json(json!({
        "id": category.id,
        "message": "The item category has been deleted successfully."
    })))
}

/// DELETE `/item-categories?ids=a,b` - Delete several categories at once.
async fn bulk_delete_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<BulkDeleteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_write()?;
    let ids = parse_ids(&query.ids)?;
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let store = ItemCategoryRepository::new(uow.conn());
    let deleted = ItemCategoryService::new(&store, uow.events())
        .bulk_delete(&ctx, &ids)
        .await?;
    uow.commit().await?;

    info!(count = deleted.len(), "Item categories deleted");
    Ok(Json(json!({
        "ids": deleted,
        "message": "The item categories have been deleted successfully."
    })))
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use tally_core::filter::Comparator;

    #[test]
    fn test_parse_ids_skips_blanks() {
        let a = ItemCategoryId::new();
        let b = ItemCategoryId::new();
        let ids = parse_ids(&format!("{a}, {b},")).unwrap();
        assert_eq!(ids, vec![a, b]);
        assert!(parse_ids("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_ids_rejects_garbage() {
        let err = parse_ids("not-a-uuid").unwrap_err();
        assert_eq!(err.code(), "invalid_ids");
    }

    #[test]
    fn test_query_into_descriptor() {
        let query = ListCategoriesQuery {
            sort_by: Some("created_at".into()),
            sort_order: Some(SortOrder::Desc),
            stringified_filter_roles: Some(
                r#"[{"field":"name","comparator":"contains","value":"tool"}]"#.into(),
            ),
            per_page: Some(5),
            ..ListCategoriesQuery::default()
        };

        let descriptor = query.into_descriptor().unwrap();
        assert_eq!(descriptor.sort_order, SortOrder::Desc);
        assert_eq!(descriptor.roles.len(), 1);
        assert_eq!(descriptor.roles[0].comparator, Comparator::Contains);
        assert_eq!(descriptor.page.page, 1);
        assert_eq!(descriptor.page.per_page, 5);
    }

    #[test]
    fn test_request_validation() {
        let request = ItemCategoryRequest {
            name: String::new(),
            description: None,
            sell_account_id: None,
            cost_account_id: None,
            inventory_account_id: None,
        };
        assert!(request.validate().is_err());
    }
}
