//! Manual journal types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, ManualJournalId, OrganizationId, UserId};

/// Document a set of ledger postings originates from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalSourceType {
    /// A manual journal.
    #[default]
    Journal,
    /// A sales invoice.
    Invoice,
    /// A purchase bill.
    Bill,
    /// A payment received or made.
    Payment,
    /// A directly paid expense.
    Expense,
}

impl JournalSourceType {
    /// All source types.
    pub const ALL: [Self; 5] = [
        Self::Journal,
        Self::Invoice,
        Self::Bill,
        Self::Payment,
        Self::Expense,
    ];

    /// Returns false for postings that only exist under accrual accounting.
    ///
    /// Invoices and bills recognize revenue and cost when issued; on a cash basis those amounts
    /// appear only once the matching payment posts.
    #[must_use]
    pub const fn recognized_on_cash_basis(self) -> bool {
        !matches!(self, Self::Invoice | Self::Bill)
    }

    /// Returns the snake_case key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Invoice => "invoice",
            Self::Bill => "bill",
            Self::Payment => "payment",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for JournalSourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JournalSourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("Unknown journal source type: {s}"))
    }
}

/// One line of a journal to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
    /// Line memo.
    #[serde(default)]
    pub memo: Option<String>,
}

/// A journal to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualJournalInput {
    /// Journal number, unique within the tenant.
    pub journal_number: String,
    /// Posting date.
    pub date: NaiveDate,
    /// Originating document type.
    #[serde(default)]
    pub source_type: JournalSourceType,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Lines.
    pub lines: Vec<JournalLineInput>,
}

/// Debit and credit totals of a validated journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

/// A posted journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Memo.
    pub memo: Option<String>,
    /// 1-based position.
    pub line_no: u32,
}

/// A posted manual journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualJournal {
    /// Journal ID.
    pub id: ManualJournalId,
    /// Owning tenant.
    pub organization_id: OrganizationId,
    /// Journal number.
    pub journal_number: String,
    /// Posting date.
    pub date: NaiveDate,
    /// Originating document type.
    pub source_type: JournalSourceType,
    /// External reference.
    pub reference: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Total of either side.
    pub amount: Decimal,
    /// User who posted the journal.
    pub user_id: UserId,
    /// Lines in posting order.
    pub lines: Vec<JournalLine>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
