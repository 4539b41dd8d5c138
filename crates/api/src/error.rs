//! Mapping of domain errors to HTTP responses.
//!
//! Every failure leaves the handler as an [`ApiError`] and is rendered as
//! `{ "error": code, "message": text }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tally_core::filter::FilterError;
use tally_core::item_category::ItemCategoryError;
use tally_core::reports::ReportError;
use tally_db::repositories::{AccountError, ItemError, JournalError};
use tally_shared::AppError;
use tracing::error;

/// An error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error response.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 400 with the given code.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// Logs the cause and returns a 500 that does not reveal it.
    pub fn internal(cause: &dyn std::fmt::Display) -> Self {
        error!(error = %cause, "request failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "An internal error occurred",
        )
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.code, "message": self.message })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        if err.is_internal() {
            return Self::internal(&err);
        }
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.error_code(), err.to_string())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::internal(&err)
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        Self::bad_request("invalid_filter", err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            err.to_string(),
        )
    }
}

impl From<ItemCategoryError> for ApiError {
    fn from(err: ItemCategoryError) -> Self {
        let (status, code) = match &err {
            ItemCategoryError::NotFound(_) => (StatusCode::NOT_FOUND, "item_category_not_found"),
            ItemCategoryError::NotFoundMany(_) => {
                (StatusCode::NOT_FOUND, "item_categories_not_found")
            }
            ItemCategoryError::NameExists(_) => (StatusCode::CONFLICT, "item_category_name_exists"),
            ItemCategoryError::AccountNotFound { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "account_not_found")
            }
            ItemCategoryError::AccountWrongRole { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "account_wrong_role")
            }
            ItemCategoryError::EmptySelection => (StatusCode::BAD_REQUEST, "empty_selection"),
            ItemCategoryError::SelectionTooLarge { .. } => {
                (StatusCode::BAD_REQUEST, "selection_too_large")
            }
            ItemCategoryError::Filter(filter) => return Self::from(filter.clone()),
            ItemCategoryError::Store(_) => return Self::internal(&err),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        let code = match err {
            ReportError::InvalidDateRange { .. } => "invalid_date_range",
            ReportError::TooManyColumns { .. } => "too_many_columns",
        };
        Self::bad_request(code, err.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let (status, code) = match &err {
            AccountError::DuplicateCode(_) => (StatusCode::CONFLICT, "duplicate_account_code"),
            AccountError::IncompatibleSubtype { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "incompatible_subtype")
            }
            AccountError::NotFound(_) => (StatusCode::NOT_FOUND, "account_not_found"),
            AccountError::Database(_) => return Self::internal(&err),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        let (status, code) = match &err {
            ItemError::NotFound(_) => (StatusCode::NOT_FOUND, "item_not_found"),
            ItemError::CategoryNotFound(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "item_category_not_found")
            }
            ItemError::Database(_) => return Self::internal(&err),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        let (status, code) = match &err {
            JournalError::Validation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_journal_lines")
            }
            JournalError::DuplicateNumber(_) => (StatusCode::CONFLICT, "duplicate_journal_number"),
            JournalError::AccountNotFound(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "account_not_found")
            }
            JournalError::NotFound(_) => (StatusCode::NOT_FOUND, "manual_journal_not_found"),
            JournalError::Database(_) => return Self::internal(&err),
        };
        Self::new(status, code, err.to_string())
    }
}
