//! Amount formatting for report output.

use rust_decimal::{Decimal, RoundingStrategy};

use super::types::{NegativeFormat, NumberFormat};

/// Formats an amount for display.
///
/// Zero is written as an empty string unless `show_zero` is set. Digits are grouped in
/// thousands with commas.
#[must_use]
pub fn format_amount(amount: Decimal, format: &NumberFormat) -> String {
    let scaled = if format.divide_on_1000 {
        amount / Decimal::ONE_THOUSAND
    } else {
        amount
    };
    let places: u32 = if format.no_cents { 0 } else { 2 };
    let rounded = scaled.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);

    if rounded.is_zero() && !format.show_zero {
        return String::new();
    }

    let digits = group_thousands(&format!("{:.*}", places as usize, rounded.abs()));

    if rounded.is_sign_negative() && !rounded.is_zero() {
        match format.negative_format {
            NegativeFormat::Mines => format!("-{digits}"),
            NegativeFormat::Parentheses => format!("({digits})"),
        }
    } else {
        digits
    }
}

fn group_thousands(plain: &str) -> String {
    let (whole, fraction) = match plain.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (plain, None),
    };

    let mut grouped = String::with_capacity(plain.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
