//! Report repository: loads the accounts and ledger postings a profit & loss sheet is shaped from.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use tally_core::accounts::AccountRef;
use tally_core::reports::LedgerPosting;
use tally_shared::types::OrganizationId;
use uuid::Uuid;

use crate::entities::{
    accounts, ledger_entries, manual_journals,
    sea_orm_active_enums::{AccountType, JournalSourceType},
};

#[derive(Debug, FromQueryResult)]
struct PostingRow {
    account_id: Uuid,
    date: NaiveDate,
    debit: Decimal,
    credit: Decimal,
    source_type: JournalSourceType,
}

/// Read-only queries behind the financial reports.
pub struct ReportRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> ReportRepository<'c, C> {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Loads the organization's income and expense accounts ordered by code.
    ///
    /// Inactive accounts are included; they may still carry postings in the period.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_accounts(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<AccountRef>, DbErr> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .filter(
                accounts::Column::AccountType.is_in([AccountType::Income, AccountType::Expense]),
            )
            .order_by_asc(accounts::Column::Code)
            .all(self.conn)
            .await?;

        Ok(accounts.into_iter().map(Into::into).collect())
    }

    /// Loads every ledger posting dated within `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_postings(
        &self,
        organization_id: OrganizationId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LedgerPosting>, DbErr> {
        let rows = postings_query(organization_id, from, to)
            .into_model::<PostingRow>()
            .all(self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| LedgerPosting {
                account_id: row.account_id.into(),
                date: row.date,
                debit: row.debit,
                credit: row.credit,
                source_type: row.source_type.into(),
            })
            .collect())
    }
}

fn postings_query(
    organization_id: OrganizationId,
    from: NaiveDate,
    to: NaiveDate,
) -> sea_orm::Select<ledger_entries::Entity> {
    ledger_entries::Entity::find()
        .select_only()
        .column(ledger_entries::Column::AccountId)
        .column(manual_journals::Column::Date)
        .column(ledger_entries::Column::Debit)
        .column(ledger_entries::Column::Credit)
        .column(manual_journals::Column::SourceType)
        .join(JoinType::InnerJoin, ledger_entries::Relation::ManualJournals.def())
        .filter(ledger_entries::Column::OrganizationId.eq(Uuid::from(organization_id)))
        .filter(manual_journals::Column::Date.between(from, to))
        .order_by_asc(manual_journals::Column::Date)
        .order_by_asc(ledger_entries::Column::LineNo)
}
