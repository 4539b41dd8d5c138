//! Financial report routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tally_core::reports::{
    Basis, DisplayColumns, NegativeFormat, NumberFormat, PeriodUnit, ProfitLossQuery,
    ProfitLossService,
};
use tally_db::ReportRepository;
use tally_shared::types::AccountId;
use tracing::debug;

use crate::{AppState, error::ApiError, middleware::AuthUser, unit_of_work::UnitOfWork};

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/profit-loss", get(profit_loss))
}

/// `display_columns_type` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayColumnsType {
    /// One total column.
    #[default]
    Total,
    /// One column per period of `display_columns_by`.
    DatePeriods,
}

/// Query parameters of the profit & loss report.
///
/// The range defaults to the current calendar year.
#[derive(Debug, Default, Deserialize)]
pub struct ProfitLossParams {
    /// First day, inclusive (YYYY-MM-DD).
    pub from_date: Option<NaiveDate>,
    /// Last day, inclusive (YYYY-MM-DD).
    pub to_date: Option<NaiveDate>,
    /// `accrual` (default) or `cash`.
    pub basis: Option<Basis>,
    /// `total` (default) or `date_periods`.
    pub display_columns_type: Option<DisplayColumnsType>,
    /// `day`, `month` (default), `quarter` or `year`.
    pub display_columns_by: Option<PeriodUnit>,
    /// Show amounts in thousands.
    pub divide_on_1000: Option<bool>,
    /// Round to whole units.
    pub no_cents: Option<bool>,
    /// Write zero amounts.
    pub show_zero: Option<bool>,
    /// `mines` (default) or `parentheses`.
    pub negative_format: Option<NegativeFormat>,
    /// Drop accounts with a zero total.
    pub none_zero: Option<bool>,
    /// Drop accounts without postings.
    pub none_transactions: Option<bool>,
    /// Comma separated account IDs.
    pub account_ids: Option<String>,
}

impl ProfitLossParams {
    /// Builds the report query, filling defaults.
    ///
    /// # Errors
    ///
    /// Returns a 400 error for malformed account IDs or an inverted date range.
    pub fn into_query(self, today: NaiveDate) -> Result<ProfitLossQuery, ApiError> {
        let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
        let year_end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);

        let mut query = ProfitLossQuery::new(
            self.from_date.unwrap_or(year_start),
            self.to_date.unwrap_or(year_end),
        );
        query.validate()?;

        let defaults = query.number_format;
        query.basis = self.basis.unwrap_or_default();
        query.display_columns = match self.display_columns_type.unwrap_or_default() {
            DisplayColumnsType::Total => DisplayColumns::Total,
            DisplayColumnsType::DatePeriods => {
                DisplayColumns::DatePeriods(self.display_columns_by.unwrap_or(PeriodUnit::Month))
            }
        };
        query.number_format = NumberFormat {
            divide_on_1000: self.divide_on_1000.unwrap_or(defaults.divide_on_1000),
            no_cents: self.no_cents.unwrap_or(defaults.no_cents),
            show_zero: self.show_zero.unwrap_or(defaults.show_zero),
            negative_format: self.negative_format.unwrap_or(defaults.negative_format),
        };
        query.none_zero = self.none_zero.unwrap_or(query.none_zero);
        query.none_transactions = self.none_transactions.unwrap_or(query.none_transactions);
        query.account_ids = parse_account_ids(self.account_ids.as_deref().unwrap_or(""))?;

        Ok(query)
    }
}

fn parse_account_ids(raw: &str) -> Result<Vec<AccountId>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<AccountId>().map_err(|_| {
                ApiError::bad_request("invalid_account_ids", format!("'{part}' is not a valid ID"))
            })
        })
        .collect()
}

/// GET `/reports/profit-loss` - Profit & loss sheet, computed on every request.
async fn profit_loss(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ProfitLossParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.into_query(Utc::now().date_naive())?;
    let ctx = auth.context();

    let uow = UnitOfWork::begin(&state, &ctx).await?;
    let repo = ReportRepository::new(uow.conn());
    let accounts = repo.load_accounts(ctx.organization_id).await?;
    let postings = repo
        .load_postings(ctx.organization_id, query.from_date, query.to_date)
        .await?;

    debug!(
        accounts = accounts.len(),
        postings = postings.len(),
        from = %query.from_date,
        to = %query.to_date,
        "Shaping profit & loss"
    );

    let sheet = ProfitLossService::generate(&query, &accounts, &postings)?;
    Ok(Json(sheet))
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults_cover_current_year() {
        let query = ProfitLossParams::default()
            .into_query(date(2026, 10, 19))
            .unwrap();

        assert_eq!(query.from_date, date(2026, 1, 1));
        assert_eq!(query.to_date, date(2026, 12, 31));
        assert_eq!(query.basis, Basis::Accrual);
        assert_eq!(query.display_columns, DisplayColumns::Total);
        assert!(!query.number_format.show_zero);
        assert!(query.none_transactions);
        assert!(query.account_ids.is_empty());
    }

    #[test]
    fn test_date_periods_default_to_months() {
        let params = ProfitLossParams {
            display_columns_type: Some(DisplayColumnsType::DatePeriods),
            negative_format: Some(NegativeFormat::Parentheses),
            ..ProfitLossParams::default()
        };
        let query = params.into_query(date(2026, 10, 19)).unwrap();

        assert_eq!(
            query.display_columns,
            DisplayColumns::DatePeriods(PeriodUnit::Month)
        );
        assert_eq!(
            query.number_format.negative_format,
            NegativeFormat::Parentheses
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let params = ProfitLossParams {
            from_date: Some(date(2026, 6, 1)),
            to_date: Some(date(2026, 5, 1)),
            ..ProfitLossParams::default()
        };
        let err = params.into_query(date(2026, 10, 19)).unwrap_err();
        assert_eq!(err.code(), "invalid_date_range");
    }

    #[test]
    fn test_account_ids_parsed() {
        let a = AccountId::new();
        let b = AccountId::new();
        let params = ProfitLossParams {
            account_ids: Some(format!("{a},{b}")),
            ..ProfitLossParams::default()
        };
        let query = params.into_query(date(2026, 10, 19)).unwrap();
        assert_eq!(query.account_ids, vec![a, b]);

        let bad = ProfitLossParams {
            account_ids: Some("x".into()),
            ..ProfitLossParams::default()
        };
        assert_eq!(
            bad.into_query(date(2026, 10, 19)).unwrap_err().code(),
            "invalid_account_ids"
        );
    }
}
