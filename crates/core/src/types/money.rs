//! Decimal money helpers.
//!
//! The marketplace backend is single-currency (USD) and is inconsistent about
//! whether amounts arrive as JSON numbers or string-encoded decimals, so
//! amounts are parsed leniently and always sent back as strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};

/// Format an amount for display, e.g. `$19.90`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

/// Parse a user- or backend-supplied amount.
///
/// Accepts an optional leading `$` and surrounding whitespace. Returns `None`
/// for anything that is not a plain decimal.
#[must_use]
pub fn parse_money(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<Decimal>().ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl RawAmount {
    fn into_decimal<E: serde::de::Error>(self) -> Result<Decimal, E> {
        match self {
            Self::Text(s) => parse_money(&s)
                .ok_or_else(|| E::custom(format!("invalid decimal amount: {s:?}"))),
            Self::Number(n) => n
                .to_string()
                .parse::<Decimal>()
                .map_err(|e| E::custom(format!("invalid decimal amount {n}: {e}"))),
        }
    }
}

/// Serde adapter for `Decimal` amounts: reads numbers or strings, writes strings.
pub mod lenient {
    use super::{Decimal, Deserialize, Deserializer, RawAmount, Serializer};

    /// Serialize as a string-encoded decimal.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Deserialize from a JSON number or a string-encoded decimal.
    ///
    /// # Errors
    ///
    /// Fails when the value is neither a number nor a parseable decimal string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        RawAmount::deserialize(deserializer)?.into_decimal()
    }
}

/// Serde adapter for optional `Decimal` amounts. `null` and `""` read as `None`.
pub mod lenient_option {
    use super::{Decimal, Deserialize, Deserializer, RawAmount, Serializer};

    /// Serialize as a string-encoded decimal or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize from `null`, `""`, a JSON number or a decimal string.
    ///
    /// # Errors
    ///
    /// Fails when a present value cannot be parsed as a decimal.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        match Option::<RawAmount>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawAmount::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(raw) => raw.into_decimal().map(Some),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use serde::Serialize;

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Line {
        #[serde(with = "lenient")]
        price: Decimal,
        #[serde(with = "lenient_option", default)]
        sale: Option<Decimal>,
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::from_str("19.9").unwrap()), "$19.90");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
        assert_eq!(format_money(Decimal::from_str("-5").unwrap()), "-$5.00");
        assert_eq!(format_money(Decimal::from_str("2.005").unwrap()), "$2.00");
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money(" $12.50 "), Decimal::from_str("12.50").ok());
        assert_eq!(parse_money("7"), Some(Decimal::from(7)));
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("abc"), None);
    }

    #[test]
    fn test_lenient_reads_numbers_and_strings() {
        let a: Line = serde_json::from_str(r#"{"price": 12.5, "sale": "10.00"}"#).unwrap();
        assert_eq!(a.price, Decimal::from_str("12.5").unwrap());
        assert_eq!(a.sale, Decimal::from_str("10.00").ok());

        let b: Line = serde_json::from_str(r#"{"price": "3", "sale": null}"#).unwrap();
        assert_eq!(b.price, Decimal::from(3));
        assert_eq!(b.sale, None);

        let c: Line = serde_json::from_str(r#"{"price": "3", "sale": ""}"#).unwrap();
        assert_eq!(c.sale, None);

        let d: Line = serde_json::from_str(r#"{"price": "3"}"#).unwrap();
        assert_eq!(d.sale, None);
    }

    #[test]
    fn test_lenient_writes_strings() {
        let line = Line {
            price: Decimal::from_str("4.20").unwrap(),
            sale: None,
        };
        assert_eq!(
            serde_json::to_string(&line).unwrap(),
            r#"{"price":"4.20","sale":null}"#
        );
    }

    #[test]
    fn test_lenient_rejects_garbage() {
        assert!(serde_json::from_str::<Line>(r#"{"price": "twelve"}"#).is_err());
    }
}
