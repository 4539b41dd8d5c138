//! Profit & loss statement generation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::ReportError;
use super::periods::{date_periods, period_count};
use super::types::{
    Amount, DatePeriod, DisplayColumns, LedgerPosting, NumberFormat, ProfitLossAccount,
    ProfitLossQuery, ProfitLossSection, ProfitLossSheet, ProfitLossTotal, SectionKind,
};
use crate::accounts::{AccountRef, AccountSubtype, AccountType};

/// Upper bound on date columns in one report.
pub const MAX_DATE_COLUMNS: usize = 400;

/// Service for shaping profit & loss statements.
pub struct ProfitLossService;

/// Raw sums for one row: the total and one value per date column.
#[derive(Debug, Clone, Default)]
struct Totals {
    total: Decimal,
    periods: Vec<Decimal>,
}

impl Totals {
    fn zeroed(columns: usize) -> Self {
        Self {
            total: Decimal::ZERO,
            periods: vec![Decimal::ZERO; columns],
        }
    }

    fn add(&mut self, other: &Self) {
        self.total += other.total;
        for (mine, theirs) in self.periods.iter_mut().zip(&other.periods) {
            *mine += *theirs;
        }
    }

    fn minus(&self, other: &Self) -> Self {
        Self {
            total: self.total - other.total,
            periods: self
                .periods
                .iter()
                .zip(&other.periods)
                .map(|(a, b)| *a - *b)
                .collect(),
        }
    }

    fn render(&self, format: &NumberFormat) -> (Amount, Vec<Amount>) {
        (
            Amount::new(self.total, format),
            self.periods.iter().map(|p| Amount::new(*p, format)).collect(),
        )
    }
}

struct SectionBuilder {
    kind: SectionKind,
    rows: Vec<(AccountRef, Totals)>,
    totals: Totals,
}

impl SectionBuilder {
    fn new(kind: SectionKind, columns: usize) -> Self {
        Self {
            kind,
            rows: Vec::new(),
            totals: Totals::zeroed(columns),
        }
    }

    fn push(&mut self, account: AccountRef, totals: Totals) {
        self.totals.add(&totals);
        self.rows.push((account, totals));
    }

    fn build(mut self, format: &NumberFormat) -> (ProfitLossSection, Totals) {
        self.rows.sort_by(|(a, _), (b, _)| a.code.cmp(&b.code));
        let accounts = self
            .rows
            .into_iter()
            .map(|(account, totals)| {
                let (total, periods) = totals.render(format);
                ProfitLossAccount {
                    id: account.id,
                    code: account.code,
                    name: account.name,
                    total,
                    periods,
                }
            })
            .collect();
        let (total, periods) = self.totals.render(format);

        (
            ProfitLossSection {
                key: self.kind,
                name: self.kind.label().to_string(),
                accounts,
                total,
                periods,
            },
            self.totals,
        )
    }
}

impl ProfitLossService {
    /// Returns the statement section an account belongs to, if any.
    ///
    /// Every income account is income. Expense accounts split by subtype into cost of sales,
    /// other expenses and (everything else) expenses. Balance sheet accounts are not reported.
    #[must_use]
    pub fn section_of(account: &AccountRef) -> Option<SectionKind> {
        match (account.account_type, account.account_subtype) {
            (AccountType::Income, _) => Some(SectionKind::Income),
            (AccountType::Expense, Some(AccountSubtype::CostOfGoodsSold)) => {
                Some(SectionKind::CostOfSales)
            }
            (AccountType::Expense, Some(AccountSubtype::OtherExpense)) => {
                Some(SectionKind::OtherExpenses)
            }
            (AccountType::Expense, _) => Some(SectionKind::Expenses),
            _ => None,
        }
    }

    /// Builds the statement.
    ///
    /// `accounts` is the tenant's chart of accounts; `postings` may contain lines outside the
    /// query scope, which are ignored.
    ///
    /// # Errors
    ///
    /// `InvalidDateRange` if the range is reversed, `TooManyColumns` if the date-period
    /// breakdown exceeds [`MAX_DATE_COLUMNS`].
    pub fn generate(
        query: &ProfitLossQuery,
        accounts: &[AccountRef],
        postings: &[LedgerPosting],
    ) -> Result<ProfitLossSheet, ReportError> {
        query.validate()?;

        let columns = match query.display_columns {
            DisplayColumns::Total => Vec::new(),
            DisplayColumns::DatePeriods(unit) => {
                let count = period_count(query.from_date, query.to_date, unit);
                if count > MAX_DATE_COLUMNS {
                    return Err(ReportError::TooManyColumns {
                        count,
                        max: MAX_DATE_COLUMNS,
                    });
                }
                date_periods(query.from_date, query.to_date, unit)
            }
        };

        let mut by_account: HashMap<AccountId, Vec<&LedgerPosting>> = HashMap::new();
        for posting in postings.iter().filter(|p| query.includes(p)) {
            by_account.entry(posting.account_id).or_default().push(posting);
        }

        let mut income = SectionBuilder::new(SectionKind::Income, columns.len());
        let mut cost_of_sales = SectionBuilder::new(SectionKind::CostOfSales, columns.len());
        let mut expenses = SectionBuilder::new(SectionKind::Expenses, columns.len());
        let mut other_expenses = SectionBuilder::new(SectionKind::OtherExpenses, columns.len());

        for account in accounts {
            let Some(kind) = Self::section_of(account) else {
                continue;
            };
            if !query.account_ids.is_empty() && !query.account_ids.contains(&account.id) {
                continue;
            }

            let lines = by_account.get(&account.id).map_or(&[][..], Vec::as_slice);
            if query.none_transactions && lines.is_empty() {
                continue;
            }

            let totals = Self::account_totals(account.account_type, lines, &columns);
            if query.none_zero && totals.total.is_zero() {
                continue;
            }

            let section = match kind {
                SectionKind::Income => &mut income,
                SectionKind::CostOfSales => &mut cost_of_sales,
                SectionKind::Expenses => &mut expenses,
                SectionKind::OtherExpenses => &mut other_expenses,
            };
            section.push(account.clone(), totals);
        }

        let format = &query.number_format;
        let (income, income_totals) = income.build(format);
        let (cost_of_sales, cost_totals) = cost_of_sales.build(format);
        let (expenses, expense_totals) = expenses.build(format);
        let (other_expenses, other_totals) = other_expenses.build(format);

        let gross = income_totals.minus(&cost_totals);
        let operating = gross.minus(&expense_totals);
        let net = operating.minus(&other_totals);

        Ok(ProfitLossSheet {
            query: query.clone(),
            columns,
            income,
            cost_of_sales,
            gross_profit: Self::line(&gross, format),
            expenses,
            operating_profit: Self::line(&operating, format),
            other_expenses,
            net_income: Self::line(&net, format),
        })
    }

    /// Sums postings on the account's normal side, overall and per column.
    fn account_totals(
        account_type: AccountType,
        lines: &[&LedgerPosting],
        columns: &[DatePeriod],
    ) -> Totals {
        let mut totals = Totals::zeroed(columns.len());
        for line in lines {
            let amount = account_type.balance(line.debit, line.credit);
            totals.total += amount;
            if let Some(index) = columns.iter().position(|c| c.contains(line.date)) {
                totals.periods[index] += amount;
            }
        }
        totals
    }

    fn line(totals: &Totals, format: &NumberFormat) -> ProfitLossTotal {
        let (total, periods) = totals.render(format);
        ProfitLossTotal { total, periods }
    }
}
