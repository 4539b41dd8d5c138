//! Item routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tally_core::events::{DomainEvent, EventPayload, EventPublisher};
use tally_db::ItemRepository;
use tally_db::entities::sea_orm_active_enums::ItemType;
use tally_db::repositories::CreateItemInput;
use tally_shared::types::{ItemCategoryId, ItemId, PageRequest};
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser, unit_of_work::UnitOfWork};

/// Creates the item routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{item_id}", get(get_item))
}

/// Query parameters for listing items.
#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    /// Only items of this category.
    pub category_id: Option<ItemCategoryId>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for creating an item.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    /// Item name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// `service`, `non_inventory` or `inventory`.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Stock keeping unit.
    #[validate(length(max = 100))]
    pub sku: Option<String>,
    /// Category.
    pub category_id: Option<ItemCategoryId>,
    /// Selling price.
    pub sell_price: Option<Decimal>,
    /// Purchase price.
    pub cost_price: Option<Decimal>,
}

/// GET `/items` - List items, optionally of one category.
async fn list_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListItemsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = auth.context();
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        query.page.unwrap_or(defaults.page),
        query.per_page.unwrap_or(defaults.per_page),
    );

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let items = ItemRepository::new(uow.conn())
        .list_items(ctx.organization_id, query.category_id, page)
        .await?;

    Ok(Json(items))
}

/// POST `/items` - Create an item.
async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_write()?;
    payload.validate()?;
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let item = ItemRepository::new(uow.conn())
        .create_item(
            ctx.organization_id,
            ctx.user_id,
            CreateItemInput {
                name: payload.name,
                item_type: payload.item_type,
                sku: payload.sku,
                category_id: payload.category_id,
                sell_price: payload.sell_price,
                cost_price: payload.cost_price,
            },
        )
        .await?;
    uow.events().publish(DomainEvent::new(
        &ctx,
        EventPayload::ItemCreated {
            item_id: item.id.into(),
            name: item.name.clone(),
            category_id: item.category_id.map(Into::into),
        },
    ));
    uow.commit().await?;

    info!(item_id = %item.id, "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET `/items/{item_id}` - Get an item.
async fn get_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<ItemId>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = auth.context();
    let uow = UnitOfWork::begin(&state, &ctx).await?;

    let item = ItemRepository::new(uow.conn())
        .get_item(ctx.organization_id, item_id)
        .await?;

    Ok(Json(item))
}
