//! Numeric coercion for form-style price fields.
//!
//! Prices in a draft are kept as the text the trader typed. Before any
//! arithmetic they go through [`coerce`]: blank text counts as zero, text
//! that is not a number yields `None` and every calculation treats that as
//! "no result".

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};

/// Coerce a price field to a number.
///
/// Returns `Some(0)` for blank input, `None` when the text is not a
/// decimal number.
pub fn coerce(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Deserialize a stored number that may have been saved as form text.
///
/// Numbers and numeric strings parse as usual. Blank strings and `null`
/// count as zero, and so does anything that is not a number.
pub fn deserialize_coerced<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => coerce(&n.to_string()),
        serde_json::Value::String(s) => coerce(&s),
        serde_json::Value::Null => Some(Decimal::ZERO),
        _ => None,
    };
    Ok(value.unwrap_or(Decimal::ZERO))
}

/// True when the field holds nothing but whitespace.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Render a value with exactly two decimals, or an empty string when
/// there is no value.
pub fn fmt2(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!(
            "{:.2}",
            v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_blank_coerces_to_zero() {
        assert_eq!(coerce(""), Some(Decimal::ZERO));
        assert_eq!(coerce("   "), Some(Decimal::ZERO));
    }

    #[test]
    fn test_parses_plain_and_scientific() {
        assert_eq!(coerce("2400"), Some(dec!(2400)));
        assert_eq!(coerce(" 2390.5 "), Some(dec!(2390.5)));
        assert_eq!(coerce("-1.25"), Some(dec!(-1.25)));
        assert_eq!(coerce("2.4e3"), Some(dec!(2400)));
    }

    #[test]
    fn test_garbage_is_not_a_number() {
        assert_eq!(coerce("abc"), None);
        assert_eq!(coerce("12abc"), None);
        assert_eq!(coerce("NaN"), None);
    }

    #[test]
    fn test_fmt2() {
        assert_eq!(fmt2(Some(dec!(2))), "2.00");
        assert_eq!(fmt2(Some(dec!(1.005))), "1.01");
        assert_eq!(fmt2(Some(dec!(0.3333333))), "0.33");
        assert_eq!(fmt2(None), "");
    }
}
