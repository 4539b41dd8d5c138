//! Repository abstractions for data access.
//!
//! Repositories borrow a connection, usually the request's RLS transaction, so several of them
//! can take part in one unit of work.

pub mod account;
pub mod item;
pub mod item_category;
pub mod journal;
pub mod report;

pub use account::{AccountError, AccountFilter, AccountRepository, CreateAccountInput};
pub use item::{CreateItemInput, ItemError, ItemRepository};
pub use item_category::ItemCategoryRepository;
pub use journal::{JournalError, JournalRepository};
pub use report::ReportRepository;

use sea_orm::{DbErr, SqlErr};

/// Postgres reports SQLSTATE 23505 with this message prefix.
const UNIQUE_VIOLATION: &str = "duplicate key value violates unique constraint";

/// Whether a write failed on a unique index.
///
/// Pre-checks run in the same transaction but cannot see rows a concurrent request commits
/// afterwards, so the index is the final arbiter for names, codes and journal numbers.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains(UNIQUE_VIOLATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sea_orm::RuntimeErr;

    #[rstest]
    #[case(
        DbErr::Exec(RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"accounts_organization_id_code_key\""
                .into()
        )),
        true
    )]
    #[case(
        DbErr::Query(RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"manual_journals_number_key\"".into()
        )),
        true
    )]
    #[case(
        DbErr::Exec(RuntimeErr::Internal(
            "insert or update on table \"items\" violates foreign key constraint".into()
        )),
        false
    )]
    #[case(DbErr::Custom("connection reset".into()), false)]
    #[case(DbErr::RecordNotInserted, false)]
    fn test_is_unique_violation(#[case] err: DbErr, #[case] expected: bool) {
        assert_eq!(is_unique_violation(&err), expected);
    }
}
