//! Validation and normalization helpers.
//!
//! Pure, total functions: the single place input legality is enforced
//! before anything reaches the persistence layer. Bad input maps to
//! `None`/`false`, never to a fault.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::transaction::TransactionType;

/// Characters stripped by `sanitize_string`: everything outside word
/// characters, whitespace, comma, and hyphen.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s,-]").expect("literal pattern"));

/// True iff `text` parses exactly under the given calendar-date format.
/// Trailing or partial input fails.
pub fn validate_date(text: &str, format: &str) -> bool {
    NaiveDate::parse_from_str(text, format).is_ok()
}

/// Trims whitespace and strips problematic characters. Returns `None`
/// when nothing printable survives.
pub fn sanitize_string(raw: &str) -> Option<String> {
    let cleaned = DISALLOWED.replace_all(raw.trim(), "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Splits a comma-joined tag string into sanitized tags, dropping empty
/// entries and preserving order.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',').filter_map(sanitize_string).collect()
}

/// Rounds an amount to cents. Midpoints round away from zero:
/// 100.005 becomes 100.01.
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Coerces a raw amount string to a 2-decimal-place value, or `None`
/// when it is not a number.
pub fn format_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok().map(round_amount)
}

/// Maps any casing/whitespace variant of a valid transaction type to its
/// canonical enum value; anything else is `None`.
pub fn normalize_transaction_type(raw: &str) -> Option<TransactionType> {
    TransactionType::parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date_exact_match() {
        assert!(validate_date("2025-01-05", "%Y-%m-%d"));
        assert!(validate_date("05.01.2025", "%d.%m.%Y"));
    }

    #[test]
    fn test_validate_date_rejects_partial_and_garbage() {
        assert!(!validate_date("2025-01-05 extra", "%Y-%m-%d"));
        assert!(!validate_date("2025-13-05", "%Y-%m-%d"));
        assert!(!validate_date("not-a-date", "%Y-%m-%d"));
        assert!(!validate_date("", "%Y-%m-%d"));
    }

    #[test]
    fn test_sanitize_string_trims_and_strips() {
        assert_eq!(
            sanitize_string("  coffee & cake!  "),
            Some("coffee  cake".to_string())
        );
        assert_eq!(
            sanitize_string("rent, utilities-2025"),
            Some("rent, utilities-2025".to_string())
        );
    }

    #[test]
    fn test_sanitize_string_empty_is_none() {
        assert_eq!(sanitize_string(""), None);
        assert_eq!(sanitize_string("   "), None);
        assert_eq!(sanitize_string("!!!"), None);
    }

    #[test]
    fn test_parse_tags_drops_empty_entries() {
        assert_eq!(
            parse_tags("food, , travel ,!!,work"),
            vec!["food", "travel", "work"]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(",,,").is_empty());
    }

    #[test]
    fn test_format_amount_rounds_to_cents() {
        assert_eq!(format_amount("50"), Some(Decimal::new(50, 0)));
        assert_eq!(format_amount(" 3.456 "), Some(Decimal::new(346, 2)));
        assert_eq!(format_amount("100.004"), Some(Decimal::new(10000, 2)));
    }

    #[test]
    fn test_format_amount_midpoint_rounds_away_from_zero() {
        assert_eq!(format_amount("100.005"), Some(Decimal::new(10001, 2)));
        assert_eq!(format_amount("-100.005"), Some(Decimal::new(-10001, 2)));
    }

    #[test]
    fn test_format_amount_rejects_non_numeric() {
        assert_eq!(format_amount("abc"), None);
        assert_eq!(format_amount(""), None);
        assert_eq!(format_amount("12.3.4"), None);
    }

    #[test]
    fn test_format_amount_idempotent() {
        for raw in ["100.005", "50", "-3.456", "0.999"] {
            let once = format_amount(raw).unwrap();
            let twice = format_amount(&once.to_string()).unwrap();
            assert_eq!(once, twice, "format_amount not idempotent for {}", raw);
            assert_eq!(round_amount(once), once);
        }
    }

    #[test]
    fn test_normalize_transaction_type_variants() {
        for raw in ["Income ", " INCOME", "income"] {
            assert_eq!(
                normalize_transaction_type(raw),
                Some(TransactionType::Income)
            );
        }
        assert_eq!(
            normalize_transaction_type("expense"),
            Some(TransactionType::Expense)
        );
        assert_eq!(
            normalize_transaction_type("Investment"),
            Some(TransactionType::Investment)
        );
    }

    #[test]
    fn test_normalize_transaction_type_invalid_is_none() {
        assert_eq!(normalize_transaction_type("transfer"), None);
        assert_eq!(normalize_transaction_type(""), None);
        assert_eq!(normalize_transaction_type("in come"), None);
    }
}
