//! Manual journal routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tally_core::events::{DomainEvent, EventPayload, EventPublisher};
use tally_core::ledger::{JournalLineInput, JournalSourceType, ManualJournalInput};
use tally_db::JournalRepository;
use tally_shared::types::ManualJournalId;
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::AuthUser, unit_of_work::UnitOfWork};

/// Creates the manual journal routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/manual-journals", post(create_journal))
        .route("/manual-journals/{journal_id}", get(get_journal))
}

/// Request body for posting a manual journal.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJournalRequest {
    /// Journal number, unique within the organization.
    #[validate(length(min = 1, max = 50))]
    pub journal_number: String,
    /// Posting date.
    pub date: NaiveDate,
    /// Originating document type (default: journal).
    #[serde(default)]
    pub source_type: JournalSourceType,
    /// External reference.
    #[validate(length(max = 255))]
    pub reference: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Lines; debits must equal credits.
    pub lines: Vec<JournalLineInput>,
}

impl From<CreateJournalRequest> for ManualJournalInput {
    fn from(request: CreateJournalRequest) -> Self {
        Self {
            journal_number: request.journal_number,
            date: request.date,
            source_type: request.source_type,
            reference: request.reference,
            description: request.description,
            lines: request.lines,
        }
    }
}

/// POST `/manual-journals` - Post a balanced journal to the ledger.
async fn create_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateJournalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_write()?;
    payload.validate()?;
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let journal = JournalRepository::new(uow.conn())
        .create_journal(ctx.organization_id, ctx.user_id, payload.into())
        .await?;
    uow.events().publish(DomainEvent::new(
        &ctx,
        EventPayload::ManualJournalCreated {
            journal_id: journal.id,
            journal_number: journal.journal_number.clone(),
            amount: journal.amount,
        },
    ));
    uow.commit().await?;

    info!(journal_id = %journal.id, amount = %journal.amount, "Manual journal created");
    Ok((StatusCode::CREATED, Json(journal)))
}

/// GET `/manual-journals/{journal_id}` - Get a journal with its lines.
async fn get_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(journal_id): Path<ManualJournalId>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = auth.context();
    let uow = UnitOfWork::begin(&state, &ctx).await?;

    let journal = JournalRepository::new(uow.conn())
        .get_journal(ctx.organization_id, journal_id)
        .await?;

    Ok(Json(journal))
}
