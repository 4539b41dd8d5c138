//! Double-entry rules for journal lines.

use rust_decimal::Decimal;

use super::error::JournalValidationError;
use super::types::{JournalLineInput, JournalTotals};

/// Validates journal lines and returns their totals.
///
/// Every line must carry exactly one positive side, the journal needs at least one debit and one
/// credit line, and total debits must equal total credits.
///
/// # Errors
///
/// Returns the first rule the lines break.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<JournalTotals, JournalValidationError> {
    if lines.len() < 2 {
        return Err(JournalValidationError::InsufficientLines);
    }

    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;
    let mut has_debit = false;
    let mut has_credit = false;

    for (line_no, line) in (1u32..).zip(lines) {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(JournalValidationError::NegativeAmount { line_no });
        }

        match (line.debit.is_zero(), line.credit.is_zero()) {
            (false, false) => return Err(JournalValidationError::BothSides { line_no }),
            (true, true) => return Err(JournalValidationError::ZeroLine { line_no }),
            (false, true) => {
                debit += line.debit;
                has_debit = true;
            }
            (true, false) => {
                credit += line.credit;
                has_credit = true;
            }
        }
    }

    if !has_debit || !has_credit {
        return Err(JournalValidationError::SingleSided);
    }

    if debit != credit {
        return Err(JournalValidationError::Unbalanced { debit, credit });
    }

    Ok(JournalTotals { debit, credit })
}
