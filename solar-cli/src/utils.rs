use rust_decimal::Decimal;
use thiserror::Error;

use solar_core::calculations::common::round_dp;

/// Error returned when a string cannot be parsed as a money amount.
#[derive(Debug, Error)]
pub enum ParseMoneyError {
    #[error("amount is required")]
    Empty,

    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Normalizes input for decimal parsing: trims whitespace, a leading `$` and
/// commas (thousands separator).
fn normalize_money_input(s: &str) -> String {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .trim()
        .replace(',', "")
}

/// Parses a string into a [`Decimal`] amount.
///
/// Handles comma as thousands separator and an optional dollar sign
/// (e.g. `"$1,234.56"`). Unlike form fields, empty input is an error: every
/// command argument that takes money needs a value.
pub fn parse_money(s: &str) -> Result<Decimal, ParseMoneyError> {
    let normalized = normalize_money_input(s);
    if normalized.is_empty() {
        return Err(ParseMoneyError::Empty);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid amount: {}", e);
        ParseMoneyError::Invalid {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Formats a dollar amount with thousands separators, e.g. `$18,000` or
/// `$1,200.75`. Whole amounts drop the cents.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = round_dp(amount, 2).normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = rounded.abs().to_string();

    let (whole, frac) = match text.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac {
        Some(frac) => format!("{sign}${grouped}.{frac:0<2}"),
        None => format!("{sign}${grouped}"),
    }
}

/// Formats a percentage with one decimal place, e.g. `66.7%`.
pub fn format_percent(value: Decimal) -> String {
    format!("{:.1}%", round_dp(value, 1))
}
