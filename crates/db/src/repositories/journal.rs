//! Manual journal repository: posts validated journals to the ledger.

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tally_core::ledger::{
    JournalLine, JournalValidationError, ManualJournal, ManualJournalInput, validate_lines,
};
use tally_shared::types::{AccountId, ManualJournalId, OrganizationId, UserId};
use uuid::Uuid;

use crate::entities::{accounts, ledger_entries, manual_journals};
use crate::repositories::is_unique_violation;

/// Error types for manual journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Lines break a double-entry rule.
    #[error(transparent)]
    Validation(#[from] JournalValidationError),

    /// Journal number already used in the organization.
    #[error("Journal number '{0}' already exists")]
    DuplicateNumber(String),

    /// A line references an account outside the organization.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Journal not found.
    #[error("Manual journal not found: {0}")]
    NotFound(ManualJournalId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Manual journal repository.
pub struct JournalRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> JournalRepository<'c, C> {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Validates and posts a manual journal.
    ///
    /// Nothing is written unless the lines balance, the number is free and every line account
    /// belongs to the organization.
    ///
    /// # Errors
    ///
    /// Returns the first failed check or a database error.
    pub async fn create_journal(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        input: ManualJournalInput,
    ) -> Result<ManualJournal, JournalError> {
        let totals = validate_lines(&input.lines)?;
        let org = Uuid::from(organization_id);

        let taken = manual_journals::Entity::find()
            .filter(manual_journals::Column::OrganizationId.eq(org))
            .filter(manual_journals::Column::JournalNumber.eq(&input.journal_number))
            .count(self.conn)
            .await?;
        if taken > 0 {
            return Err(JournalError::DuplicateNumber(input.journal_number));
        }

        self.ensure_accounts(org, &input).await?;

        let now = Utc::now();
        let number = input.journal_number.clone();
        let journal = manual_journals::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(org),
            journal_number: Set(input.journal_number),
            date: Set(input.date),
            source_type: Set(input.source_type.into()),
            reference: Set(input.reference),
            description: Set(input.description),
            amount: Set(totals.debit),
            user_id: Set(user_id.into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                JournalError::DuplicateNumber(number)
            } else {
                JournalError::Database(err)
            }
        })?;

        let entries: Vec<ledger_entries::Model> = (1i32..)
            .zip(input.lines)
            .map(|(line_no, line)| ledger_entries::Model {
                id: Uuid::now_v7(),
                organization_id: org,
                journal_id: journal.id,
                account_id: line.account_id.into(),
                debit: line.debit,
                credit: line.credit,
                memo: line.memo,
                line_no,
                created_at: now,
            })
            .collect();

        ledger_entries::Entity::insert_many(entries.iter().map(|entry| {
            ledger_entries::ActiveModel {
                id: Set(entry.id),
                organization_id: Set(entry.organization_id),
                journal_id: Set(entry.journal_id),
                account_id: Set(entry.account_id),
                debit: Set(entry.debit),
                credit: Set(entry.credit),
                memo: Set(entry.memo.clone()),
                line_no: Set(entry.line_no),
                created_at: Set(entry.created_at),
            }
        }))
        .exec_without_returning(self.conn)
        .await?;

        tracing::debug!(
            journal_id = %journal.id,
            lines = entries.len(),
            amount = %journal.amount,
            "manual journal posted"
        );

        Ok(to_domain(journal, entries))
    }

    /// Gets a journal with its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the journal does not exist in the organization.
    pub async fn get_journal(
        &self,
        organization_id: OrganizationId,
        id: ManualJournalId,
    ) -> Result<ManualJournal, JournalError> {
        let journal = manual_journals::Entity::find_by_id(Uuid::from(id))
            .filter(manual_journals::Column::OrganizationId.eq(Uuid::from(organization_id)))
            .one(self.conn)
            .await?
            .ok_or(JournalError::NotFound(id))?;

        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::JournalId.eq(journal.id))
            .order_by_asc(ledger_entries::Column::LineNo)
            .all(self.conn)
            .await?;

        Ok(to_domain(journal, entries))
    }

    async fn ensure_accounts(
        &self,
        organization_id: Uuid,
        input: &ManualJournalInput,
    ) -> Result<(), JournalError> {
        let wanted: BTreeSet<Uuid> = input.lines.iter().map(|l| l.account_id.into()).collect();

        let found: BTreeSet<Uuid> = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .filter(accounts::Column::Id.is_in(wanted.iter().copied()))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|account| account.id)
            .collect();

        match input
            .lines
            .iter()
            .find(|line| !found.contains(&Uuid::from(line.account_id)))
        {
            Some(line) => Err(JournalError::AccountNotFound(line.account_id)),
            None => Ok(()),
        }
    }
}

fn to_domain(
    journal: manual_journals::Model,
    entries: Vec<ledger_entries::Model>,
) -> ManualJournal {
    ManualJournal {
        id: journal.id.into(),
        organization_id: journal.organization_id.into(),
        journal_number: journal.journal_number,
        date: journal.date,
        source_type: journal.source_type.into(),
        reference: journal.reference,
        description: journal.description,
        amount: journal.amount,
        user_id: journal.user_id.into(),
        lines: entries
            .into_iter()
            .map(|entry| JournalLine {
                account_id: entry.account_id.into(),
                debit: entry.debit,
                credit: entry.credit,
                memo: entry.memo,
                line_no: u32::try_from(entry.line_no).unwrap_or_default(),
            })
            .collect(),
        created_at: journal.created_at,
    }
}
