//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tally_core::accounts::{AccountSubtype, AccountType};
use tally_db::entities::accounts;
use tally_db::repositories::{AccountFilter, AccountRepository, CreateAccountInput};
use tally_shared::types::AccountId;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser, unit_of_work::UnitOfWork};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{account_id}", get(get_account))
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Filter by root type.
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub active: Option<bool>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Account code (must be unique within organization).
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    /// Account name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Root type: asset, liability, equity, income, expense.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Subtype, compatible with the root type.
    pub subtype: Option<AccountSubtype>,
    /// Whether the account is active (default: true).
    pub is_active: Option<bool>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Root type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Subtype.
    pub subtype: Option<AccountSubtype>,
    /// Whether the account is active.
    pub is_active: bool,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            description: model.description,
            account_type: model.account_type.into(),
            subtype: model.account_subtype.map(Into::into),
            is_active: model.is_active,
        }
    }
}

/// GET `/accounts` - List accounts ordered by code.
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListAccountsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = auth.context();
    let uow = UnitOfWork::begin(&state, &ctx).await?;

    let filter = AccountFilter {
        account_type: query.account_type,
        is_active: query.active,
    };
    let accounts = AccountRepository::new(uow.conn())
        .list_accounts(ctx.organization_id, filter)
        .await?;

    let response: Vec<AccountResponse> = accounts.into_iter().map(Into::into).collect();
    Ok(Json(json!({ "accounts": response })))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_write()?;
    payload.validate()?;
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let account = AccountRepository::new(uow.conn())
        .create_account(
            ctx.organization_id,
            CreateAccountInput {
                code: payload.code,
                name: payload.name,
                description: payload.description,
                account_type: payload.account_type,
                account_subtype: payload.subtype,
                is_active: payload.is_active.unwrap_or(true),
            },
        )
        .await?;
    uow.commit().await?;

    info!(account_id = %account.id, code = %account.code, "Account created");
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// GET `/accounts/{account_id}` - Get an account.
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = auth.context();
    let uow = UnitOfWork::begin(&state, &ctx).await?;

    let account = AccountRepository::new(uow.conn())
        .get_account(ctx.organization_id, account_id)
        .await?;

    Ok(Json(AccountResponse::from(account)))
}
