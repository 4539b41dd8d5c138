//! Property-based tests for journal line validation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::JournalValidationError;
use super::types::JournalLineInput;
use super::validation::validate_lines;

/// Amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn debit(amount: Decimal) -> JournalLineInput {
    JournalLineInput {
        account_id: AccountId::new(),
        debit: amount,
        credit: Decimal::ZERO,
        memo: None,
    }
}

fn credit(amount: Decimal) -> JournalLineInput {
    JournalLineInput {
        account_id: AccountId::new(),
        debit: Decimal::ZERO,
        credit: amount,
        memo: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any split of a debit total over several credit lines balances.
    #[test]
    fn prop_split_credits_balance(amounts in prop::collection::vec(positive_amount(), 1..8)) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut lines = vec![debit(total)];
        lines.extend(amounts.into_iter().map(credit));

        let totals = validate_lines(&lines);
        prop_assert!(totals.is_ok(), "balanced journal rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debit, total);
        prop_assert_eq!(totals.credit, total);
    }

    /// Any difference between the sides is reported with both totals.
    #[test]
    fn prop_difference_is_unbalanced(a in positive_amount(), b in positive_amount()) {
        prop_assume!(a != b);
        let result = validate_lines(&[debit(a), credit(b)]);
        prop_assert_eq!(result, Err(JournalValidationError::Unbalanced { debit: a, credit: b }));
    }

    /// A negative amount is rejected wherever it appears.
    #[test]
    fn prop_negative_rejected(amount in positive_amount(), position in 0usize..3) {
        let mut lines = vec![debit(amount), credit(amount), credit(amount)];
        lines[0].debit = amount + amount;
        lines[position].credit = -amount;
        lines[position].debit = Decimal::ZERO;

        let line_no = u32::try_from(position + 1).unwrap();
        prop_assert_eq!(
            validate_lines(&lines),
            Err(JournalValidationError::NegativeAmount { line_no })
        );
    }

    /// One-sided journals never pass, however many lines they have.
    #[test]
    fn prop_single_sided_rejected(amounts in prop::collection::vec(positive_amount(), 2..6)) {
        let lines: Vec<_> = amounts.into_iter().map(debit).collect();
        prop_assert_eq!(validate_lines(&lines), Err(JournalValidationError::SingleSided));
    }
}
