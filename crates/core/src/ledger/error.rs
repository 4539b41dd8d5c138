//! Journal validation errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a set of journal lines cannot be posted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalValidationError {
    /// Fewer than two lines.
    #[error("A journal must have at least 2 lines")]
    InsufficientLines,

    /// A line carries a negative amount.
    #[error("Line {line_no}: amounts cannot be negative")]
    NegativeAmount {
        /// 1-based line number.
        line_no: u32,
    },

    /// A line carries both a debit and a credit.
    #[error("Line {line_no}: specify either a debit or a credit, not both")]
    BothSides {
        /// 1-based line number.
        line_no: u32,
    },

    /// A line carries neither a debit nor a credit.
    #[error("Line {line_no}: a debit or credit amount is required")]
    ZeroLine {
        /// 1-based line number.
        line_no: u32,
    },

    /// All lines are debits, or all are credits.
    #[error("A journal must have both debit and credit lines")]
    SingleSided,

    /// Debits and credits differ.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debits.
        debit: Decimal,
        /// Total credits.
        credit: Decimal,
    },
}
