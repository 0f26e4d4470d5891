//! Exact numeric parsing for event fields.
//!
//! Token amounts are non-negative integers in the token's smallest unit and
//! are held as [`BigUint`]. Sums reported by the oracle callback are
//! decimals and are held as [`BigDecimal`]. Neither has an upper bound, so
//! a value is never truncated or clamped.
//!
//! String-valued fields are parsed exactly. JSON numbers are read through
//! `serde_json`'s default number model: integer amounts are accepted up to
//! `u64::MAX`, and numeric sums carry `f64` precision. Producers that need
//! more must send the value as a string.

use std::borrow::Cow;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigUint, Sign};
use serde_json::Value;

/// Returns the textual form of a JSON scalar.
///
/// Strings are returned as-is and numbers in their `serde_json` rendering.
/// Other JSON kinds have no text form.
#[must_use]
pub fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// Parses a non-negative integer amount written in plain decimal digits.
///
/// Returns `None` for signs, separators, fractions, exponents, or empty
/// input.
#[must_use]
pub fn parse_amount(text: &str) -> Option<BigUint> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::from_str(text).ok()
}

/// Reads an amount from a JSON field value.
///
/// Strings go through [`parse_amount`]. Numbers are accepted only when
/// `serde_json` holds them as an exact `u64`; larger or fractional numbers
/// have already lost precision and are rejected.
#[must_use]
pub fn amount_from_value(value: &Value) -> Option<BigUint> {
    match value {
        Value::String(s) => parse_amount(s),
        Value::Number(n) => n.as_u64().map(BigUint::from),
        _ => None,
    }
}

/// Parses a non-negative decimal sum without rounding.
///
/// Returns `None` for negative or malformed input.
#[must_use]
pub fn parse_sum(text: &str) -> Option<BigDecimal> {
    let value = BigDecimal::from_str(text.trim()).ok()?;
    if value.sign() == Sign::Minus {
        return None;
    }
    Some(value)
}

/// Reads a decimal sum from a JSON field value.
#[must_use]
pub fn sum_from_value(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::String(_) | Value::Number(_) => parse_sum(&value_text(value)?),
        _ => None,
    }
}

/// Serde adapter storing [`BigUint`] amounts as decimal strings.
///
/// JSON numbers cannot carry the full amount range, so stored entities
/// keep amounts in string form.
pub mod biguint_string {
    use num_bigint::BigUint;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes the amount as a decimal string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    /// Deserializes an amount from a decimal string.
    ///
    /// # Errors
    ///
    /// Fails when the string is not a non-negative integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_amount(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid amount: {text:?}")))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn big(text: &str) -> BigUint {
        let Ok(value) = BigUint::from_str(text) else {
            panic!("{text} is not an integer");
        };
        value
    }

    fn dec(text: &str) -> BigDecimal {
        let Ok(value) = BigDecimal::from_str(text) else {
            panic!("{text} is not a decimal");
        };
        value
    }

    #[test]
    fn amounts_parse_exactly() {
        assert_eq!(parse_amount("1000000"), Some(BigUint::from(1_000_000u32)));
        assert_eq!(parse_amount("0"), Some(BigUint::from(0u32)));
        assert_eq!(parse_amount(" 42 "), Some(BigUint::from(42u32)));
    }

    #[test]
    fn amounts_beyond_u128_are_kept() {
        // u128::MAX + 1
        let text = "340282366920938463463374607431768211456";
        let Some(amount) = parse_amount(text) else {
            panic!("amount should parse");
        };
        assert_eq!(amount.to_string(), text);
        assert!(amount > BigUint::from(u128::MAX));
    }

    #[test]
    fn malformed_amounts_are_rejected() {
        for bad in ["-5", "+5", "1.5", "1e6", "", "abc", "1_000", " "] {
            assert_eq!(parse_amount(bad), None, "{bad:?} must be rejected");
        }
    }

    #[test]
    fn numeric_amounts_are_limited_to_exact_integers() {
        assert_eq!(
            amount_from_value(&serde_json::json!(500)),
            Some(BigUint::from(500u32))
        );
        assert_eq!(
            amount_from_value(&serde_json::json!(u64::MAX)),
            Some(BigUint::from(u64::MAX))
        );

        // Larger literals only survive as f64 and are refused rather than
        // stored rounded.
        let Ok(wide) = serde_json::from_str::<Value>("12345678901234567890123") else {
            panic!("valid JSON");
        };
        assert_eq!(amount_from_value(&wide), None);
        let Ok(exponent) = serde_json::from_str::<Value>("1e2") else {
            panic!("valid JSON");
        };
        assert_eq!(amount_from_value(&exponent), None);
        assert_eq!(amount_from_value(&serde_json::json!(-3)), None);
        assert_eq!(amount_from_value(&Value::Null), None);

        assert_eq!(
            amount_from_value(&Value::from("12345678901234567890123")),
            Some(big("12345678901234567890123"))
        );
    }

    #[test]
    fn sums_parse_exactly() {
        assert_eq!(parse_sum("50.5"), Some(dec("50.5")));
        assert_eq!(parse_sum("48.0"), Some(dec("48")));
        assert_eq!(parse_sum("0"), Some(dec("0")));
        assert_eq!(parse_sum("0.000000000000000001"), Some(dec("1e-18")));
    }

    #[test]
    fn sums_beyond_28_digits_are_kept() {
        let text = "1.0000000000000000000000000000001";
        let Some(sum) = parse_sum(text) else {
            panic!("sum should parse");
        };
        assert_eq!(&sum - dec("1"), dec("1e-31"));
    }

    #[test]
    fn negative_or_malformed_sums_are_rejected() {
        assert_eq!(parse_sum("-1.25"), None);
        assert_eq!(parse_sum("twelve"), None);
        assert_eq!(parse_sum(""), None);
    }

    #[test]
    fn sums_accept_strings_and_numbers() {
        assert_eq!(sum_from_value(&Value::from("2.5")), Some(dec("2.5")));
        assert_eq!(sum_from_value(&serde_json::json!(50.5)), Some(dec("50.5")));
        assert_eq!(sum_from_value(&serde_json::json!(7)), Some(dec("7")));
        assert_eq!(sum_from_value(&serde_json::json!([1])), None);
    }

    #[test]
    fn value_text_accepts_strings_and_numbers() {
        assert_eq!(value_text(&Value::from("7")).as_deref(), Some("7"));
        assert_eq!(value_text(&serde_json::json!(42)).as_deref(), Some("42"));
        assert_eq!(value_text(&serde_json::json!(50.5)).as_deref(), Some("50.5"));
        assert!(value_text(&Value::Null).is_none());
        assert!(value_text(&serde_json::json!({"a": 1})).is_none());
    }

    #[test]
    fn string_serde_round_trips_wide_amounts() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Wrapper(#[serde(with = "biguint_string")] BigUint);

        let value = Wrapper(big("340282366920938463463374607431768211456"));
        let Ok(json) = serde_json::to_value(&value) else {
            panic!("serialization failed");
        };
        assert_eq!(json, serde_json::json!("340282366920938463463374607431768211456"));
        let Ok(back) = serde_json::from_value::<Wrapper>(json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, value);
        assert!(serde_json::from_value::<Wrapper>(serde_json::json!("-1")).is_err());
    }
}
