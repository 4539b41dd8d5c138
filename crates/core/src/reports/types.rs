//! Report query and result types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::error::ReportError;
use super::format::format_amount;
use crate::ledger::JournalSourceType;

/// Accounting basis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Revenue and cost recognized when invoiced or billed.
    #[default]
    Accrual,
    /// Revenue and cost recognized when paid.
    Cash,
}

/// Length of one date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    /// One calendar day.
    Day,
    /// One calendar month.
    Month,
    /// One calendar quarter.
    Quarter,
    /// One calendar year.
    Year,
}

/// Column layout of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "by")]
pub enum DisplayColumns {
    /// A single total column.
    #[default]
    Total,
    /// One column per date period, plus the total.
    DatePeriods(PeriodUnit),
}

/// How negative amounts are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeFormat {
    /// Leading minus sign: `-1,200.00`.
    #[default]
    Mines,
    /// Parentheses: `(1,200.00)`.
    Parentheses,
}

/// Formatting applied to every `formatted_amount`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Show amounts in thousands.
    pub divide_on_1000: bool,
    /// Round to whole units.
    pub no_cents: bool,
    /// Write zero amounts instead of leaving them blank.
    pub show_zero: bool,
    /// Negative amount style.
    pub negative_format: NegativeFormat,
}

/// Parameters of a profit & loss report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLossQuery {
    /// First day of the range, inclusive.
    pub from_date: NaiveDate,
    /// Last day of the range, inclusive.
    pub to_date: NaiveDate,
    /// Accounting basis.
    pub basis: Basis,
    /// Column layout.
    pub display_columns: DisplayColumns,
    /// Amount formatting.
    pub number_format: NumberFormat,
    /// Drop accounts whose total is zero.
    pub none_zero: bool,
    /// Drop accounts without postings in the range.
    pub none_transactions: bool,
    /// Restrict the report to these accounts when not empty.
    pub account_ids: Vec<AccountId>,
}

impl ProfitLossQuery {
    /// Creates a query over a date range with default options.
    #[must_use]
    pub const fn new(from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self {
            from_date,
            to_date,
            basis: Basis::Accrual,
            display_columns: DisplayColumns::Total,
            number_format: NumberFormat {
                divide_on_1000: false,
                no_cents: false,
                show_zero: false,
                negative_format: NegativeFormat::Mines,
            },
            none_zero: false,
            none_transactions: true,
            account_ids: Vec::new(),
        }
    }

    /// Checks the date range.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if `from_date` is after `to_date`.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.from_date > self.to_date {
            return Err(ReportError::InvalidDateRange {
                start: self.from_date,
                end: self.to_date,
            });
        }
        Ok(())
    }

    /// Returns true if the posting falls inside the query scope.
    #[must_use]
    pub fn includes(&self, posting: &LedgerPosting) -> bool {
        posting.date >= self.from_date
            && posting.date <= self.to_date
            && (self.account_ids.is_empty() || self.account_ids.contains(&posting.account_id))
            && (self.basis == Basis::Accrual || posting.source_type.recognized_on_cash_basis())
    }
}

/// One ledger line as the report sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPosting {
    /// Account posted to.
    pub account_id: AccountId,
    /// Journal date.
    pub date: NaiveDate,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Originating document type.
    pub source_type: JournalSourceType,
}

/// A date column of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePeriod {
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
    /// Column heading.
    pub label: String,
}

impl DatePeriod {
    /// Returns true if the date falls inside the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// A number with its display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Raw amount.
    pub amount: Decimal,
    /// Amount formatted for display.
    pub formatted_amount: String,
}

impl Amount {
    /// Formats an amount.
    #[must_use]
    pub fn new(amount: Decimal, format: &NumberFormat) -> Self {
        Self {
            amount,
            formatted_amount: format_amount(amount, format),
        }
    }
}

/// Top-level sections of the statement, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Operating and other income.
    Income,
    /// Cost of goods sold.
    CostOfSales,
    /// Operating expenses.
    Expenses,
    /// Non-operating expenses.
    OtherExpenses,
}

impl SectionKind {
    /// Section heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::CostOfSales => "Cost of sales",
            Self::Expenses => "Expenses",
            Self::OtherExpenses => "Other expenses",
        }
    }
}

/// One account row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLossAccount {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Total over the range.
    pub total: Amount,
    /// Totals per date column; empty for a total-only report.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub periods: Vec<Amount>,
}

/// A section with its accounts and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLossSection {
    /// Section key.
    pub key: SectionKind,
    /// Section heading.
    pub name: String,
    /// Account rows ordered by code.
    pub accounts: Vec<ProfitLossAccount>,
    /// Section total.
    pub total: Amount,
    /// Section totals per date column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub periods: Vec<Amount>,
}

/// A derived line such as gross profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLossTotal {
    /// Total.
    pub total: Amount,
    /// Totals per date column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub periods: Vec<Amount>,
}

/// The complete profit & loss statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLossSheet {
    /// Query the sheet was built from.
    pub query: ProfitLossQuery,
    /// Date columns; empty for a total-only report.
    pub columns: Vec<DatePeriod>,
    /// Income section.
    pub income: ProfitLossSection,
    /// Cost of sales section.
    pub cost_of_sales: ProfitLossSection,
    /// Income minus cost of sales.
    pub gross_profit: ProfitLossTotal,
    /// Operating expenses section.
    pub expenses: ProfitLossSection,
    /// Gross profit minus expenses.
    pub operating_profit: ProfitLossTotal,
    /// Other expenses section.
    pub other_expenses: ProfitLossSection,
    /// Operating profit minus other expenses.
    pub net_income: ProfitLossTotal,
}
