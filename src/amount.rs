// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Normalization of human-entered amounts.
//!
//! Spreadsheets and forms hand over amounts like `$3.000.000`, `1,234.56` or
//! `658.000 COP`. [`parse_amount`] turns them into a canonical [`Decimal`] at
//! the boundary so the engine only ever sees plain numbers.
//!
//! Separator rules:
//!
//! - Both `.` and `,` present: the right-most one is the decimal separator.
//! - One kind, repeated: thousands separator.
//! - One kind, once, followed by exactly three digits: thousands separator
//!   (`658.000` is 658000), unless the integer part is `0`.
//! - Otherwise: decimal separator.
//!
//! Around the digits only a single leading sign and one currency symbol or
//! ISO code are accepted (`-$45`, `$-45`, `45 COP`).

use crate::error::AmountError;
use rust_decimal::Decimal;
use std::str::FromStr;

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

const CURRENCY_CODES: [&str; 12] = [
    "ARS", "BRL", "CAD", "CLP", "COP", "EUR", "GBP", "JPY", "MXN", "PEN", "USD", "UYU",
];

/// Parses an amount written with currency symbols and local separators.
///
/// # Example
///
/// ```
/// use payoff_planner::parse_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_amount("$3.000.000").unwrap(), dec!(3000000));
/// assert_eq!(parse_amount("1.234,56 €").unwrap(), dec!(1234.56));
/// assert_eq!(parse_amount("-$45.10").unwrap(), dec!(-45.10));
/// ```
///
/// # Errors
///
/// - [`AmountError::Empty`] - No digits and nothing but symbols or whitespace.
/// - [`AmountError::Invalid`] - Anything else that is not a number.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let invalid = || AmountError::Invalid(input.trim().to_string());

    let Some(first_digit) = input.find(|c: char| c.is_ascii_digit()) else {
        return if prefix_sign(input).is_some() {
            Err(AmountError::Empty)
        } else {
            Err(invalid())
        };
    };
    let last_digit = input
        .rfind(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;

    // A leading separator belongs to the number (".5").
    let start = match input[..first_digit].chars().last() {
        Some(c @ ('.' | ',')) => first_digit - c.len_utf8(),
        _ => first_digit,
    };
    let (prefix, body, suffix) = (
        &input[..start],
        &input[start..=last_digit],
        &input[last_digit + 1..],
    );

    let negative = prefix_sign(prefix).ok_or_else(invalid)?;
    let suffix = suffix.trim();
    if !suffix.is_empty() && strip_currency(suffix) != Some("") {
        return Err(invalid());
    }

    let body: String = body
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '\'' | '_'))
        .collect();
    if !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(invalid());
    }

    let canonical = canonicalize(&body).ok_or_else(invalid)?;
    let value = Decimal::from_str(&canonical).map_err(|_| invalid())?;
    Ok(if negative { -value } else { value })
}

/// Reads the text before the digits: at most one sign and one currency marker,
/// in either order. Returns whether the amount is negative.
fn prefix_sign(prefix: &str) -> Option<bool> {
    let mut rest = prefix.trim_start();
    let mut sign = None;
    let mut currency = false;
    while !rest.is_empty() {
        if sign.is_none() {
            if let Some(c @ ('-' | '+')) = rest.chars().next() {
                sign = Some(c == '-');
                rest = rest[1..].trim_start();
                continue;
            }
        }
        if !currency {
            if let Some(after) = strip_currency(rest) {
                currency = true;
                rest = after.trim_start();
                continue;
            }
        }
        return None;
    }
    Some(sign == Some(true))
}

/// Removes one leading currency symbol or ISO code.
fn strip_currency(text: &str) -> Option<&str> {
    if let Some(rest) = text.strip_prefix(CURRENCY_SYMBOLS) {
        return Some(rest);
    }
    let code_len = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let code = &text[..code_len];
    CURRENCY_CODES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(code))
        .then(|| &text[code_len..])
}

/// Rewrites digits and separators into `1234.56` form.
fn canonicalize(body: &str) -> Option<String> {
    let dots = body.matches('.').count();
    let commas = body.matches(',').count();

    let (integer, fraction) = match (dots, commas) {
        (0, 0) => (body, None),
        (_, 0) | (0, _) => {
            let separator = if dots > 0 { '.' } else { ',' };
            let count = dots + commas;
            let (head, tail) = body.rsplit_once(separator)?;
            let is_thousands =
                count > 1 || (tail.len() == 3 && !head.trim_start_matches('0').is_empty());
            if is_thousands {
                return grouped_digits(body, separator);
            }
            (head, Some(tail))
        }
        _ => {
            let last_dot = body.rfind('.')?;
            let last_comma = body.rfind(',')?;
            let (decimal, thousands) = if last_dot > last_comma { ('.', ',') } else { (',', '.') };
            let (head, tail) = body.rsplit_once(decimal)?;
            if head.contains(decimal) || tail.contains(thousands) {
                return None;
            }
            let head = grouped_digits(head, thousands)?;
            return Some(format!("{head}.{tail}"));
        }
    };

    let integer = if integer.is_empty() { "0" } else { integer };
    match fraction {
        Some(fraction) if !fraction.is_empty() => Some(format!("{integer}.{fraction}")),
        Some(_) => None,
        None => Some(integer.to_string()),
    }
}

/// Strips thousands separators, requiring groups of three after the first.
fn grouped_digits(digits: &str, separator: char) -> Option<String> {
    let mut groups = digits.split(separator);
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 {
        return None;
    }
    let mut out = first.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}
