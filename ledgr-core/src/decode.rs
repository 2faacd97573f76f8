//! Policy-aware JSON decoding.
//!
//! Decoding runs in two passes. `serde_json` (built with `arbitrary_precision`) parses the text
//! and keeps every number literal verbatim; the tree is then rebuilt bottom-up into a
//! [`Value`], choosing each number's representation from the literal and the [`IntDecoding`]
//! policy. Nothing is rounded before the policy has been consulted.

use std::sync::Arc;

use ledgr_value::{MAX_SAFE_INTEGER, ObjectMap, Value};
use num_bigint::BigInt;

use crate::IntDecoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DecodeErrorKind {
    Syntax,
    PrecisionLoss,
    NumberOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Malformed wire text. `line`/`column` are 1-based; `0` means the position is unknown.
    #[error("invalid json: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error(
        "integer exceeds maximum safe integer: {literal}. Try decoding with a different int decoding policy"
    )]
    PrecisionLoss { literal: String },

    #[error("number cannot be represented: {literal}")]
    NumberOutOfRange { literal: String },
}

impl DecodeError {
    #[must_use]
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::Syntax { .. } => DecodeErrorKind::Syntax,
            Self::PrecisionLoss { .. } => DecodeErrorKind::PrecisionLoss,
            Self::NumberOutOfRange { .. } => DecodeErrorKind::NumberOutOfRange,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Syntax {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Decode wire text under `policy`.
///
/// Fails with [`DecodeError::Syntax`] on malformed input and with
/// [`DecodeError::PrecisionLoss`] when `policy` is [`IntDecoding::Safe`] and an integer's
/// magnitude exceeds [`MAX_SAFE_INTEGER`]. No partial tree is returned on failure.
pub fn decode(text: &str, policy: IntDecoding) -> Result<Value, DecodeError> {
    let raw: serde_json::Value = serde_json::from_str(text)?;
    normalize(raw, policy)
}

/// [`decode`] with [`IntDecoding::Default`].
pub fn decode_default(text: &str) -> Result<Value, DecodeError> {
    decode(text, IntDecoding::Default)
}

/// [`decode`] over raw body bytes. Invalid UTF-8 is reported as a syntax error.
pub fn decode_slice(bytes: &[u8], policy: IntDecoding) -> Result<Value, DecodeError> {
    let raw: serde_json::Value = serde_json::from_slice(bytes)?;
    normalize(raw, policy)
}

fn normalize(raw: serde_json::Value, policy: IntDecoding) -> Result<Value, DecodeError> {
    Ok(match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(v) => Value::Bool(v),
        serde_json::Value::String(s) => Value::String(Arc::from(s)),
        serde_json::Value::Number(n) => decode_number(&n.to_string(), policy)?,
        serde_json::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize(item, policy))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_json::Value::Object(map) => {
            let mut out = ObjectMap::with_capacity_and_hasher(map.len(), Default::default());
            for (k, v) in map {
                out.insert(Arc::from(k), normalize(v, policy)?);
            }
            Value::Object(out)
        }
    })
}

/// Longest integer an exponent literal may expand to before it is rejected as out of range.
const MAX_EXPANDED_DIGITS: usize = 4096;

fn decode_number(literal: &str, policy: IntDecoding) -> Result<Value, DecodeError> {
    if is_integer_literal(literal) {
        return decode_integer(literal, literal, policy);
    }
    if policy == IntDecoding::Default {
        return nearest_f64(literal).map(Value::Number);
    }

    // Fraction/exponent literals are judged on their exact decimal value, never on a rounded f64.
    match exact_integer(literal) {
        Exact::Integer(digits) => decode_integer(literal, &digits, policy),
        Exact::Fraction => nearest_f64(literal).map(Value::Number),
        Exact::Huge if policy == IntDecoding::Safe => Err(precision_loss(literal)),
        Exact::Huge => Err(out_of_range(literal)),
    }
}

fn is_integer_literal(literal: &str) -> bool {
    !literal.contains(['.', 'e', 'E'])
}

/// Decode an integer value under `policy`. `digits` is its plain decimal spelling; errors
/// name the wire `literal`.
fn decode_integer(literal: &str, digits: &str, policy: IntDecoding) -> Result<Value, DecodeError> {
    if let Ok(v) = digits.parse::<i64>()
        && v.unsigned_abs() <= MAX_SAFE_INTEGER.unsigned_abs()
    {
        return Ok(match policy {
            IntDecoding::Bigint => Value::BigInt(BigInt::from(v)),
            IntDecoding::Default | IntDecoding::Safe | IntDecoding::Mixed => {
                Value::Number(v as f64)
            }
        });
    }

    match policy {
        IntDecoding::Default => nearest_f64(literal).map(Value::Number),
        IntDecoding::Safe => Err(precision_loss(literal)),
        IntDecoding::Mixed | IntDecoding::Bigint => digits
            .parse::<BigInt>()
            .map(Value::BigInt)
            .map_err(|_| out_of_range(literal)),
    }
}

/// Exact reading of a fraction/exponent literal.
#[derive(Debug, PartialEq, Eq)]
enum Exact {
    /// Whole number, spelled as plain decimal digits.
    Integer(String),
    Fraction,
    /// Whole number longer than [`MAX_EXPANDED_DIGITS`].
    Huge,
}

// The literal is `digits * 10^scale`; it is whole when `scale >= 0` or when the last `-scale`
// digits are zeros.
fn exact_integer(literal: &str) -> Exact {
    let (sign, unsigned) = match literal.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", literal),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], &unsigned[at + 1..]),
        None => (unsigned, ""),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let joined = format!("{whole}{fraction}");
    let digits = joined.trim_start_matches('0');
    if digits.is_empty() {
        return Exact::Integer("0".to_string());
    }

    let exponent = if exponent.is_empty() {
        0
    } else {
        match exponent.parse::<i64>() {
            Ok(e) => e,
            Err(_) if exponent.starts_with('-') => return Exact::Fraction,
            Err(_) => return Exact::Huge,
        }
    };
    let scale = exponent.saturating_sub(fraction.len() as i64);

    if scale >= 0 {
        let zeros = scale.unsigned_abs();
        if zeros.saturating_add(digits.len() as u64) > MAX_EXPANDED_DIGITS as u64 {
            return Exact::Huge;
        }
        return Exact::Integer(format!("{sign}{digits}{}", "0".repeat(zeros as usize)));
    }

    let dropped = scale.unsigned_abs();
    let trailing_zeros = digits.len() - digits.trim_end_matches('0').len();
    if dropped > trailing_zeros as u64 {
        return Exact::Fraction;
    }
    Exact::Integer(format!("{sign}{}", &digits[..digits.len() - dropped as usize]))
}

fn nearest_f64(literal: &str) -> Result<f64, DecodeError> {
    match literal.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(out_of_range(literal)),
    }
}

fn precision_loss(literal: &str) -> DecodeError {
    DecodeError::PrecisionLoss {
        literal: literal.to_string(),
    }
}

fn out_of_range(literal: &str) -> DecodeError {
    DecodeError::NumberOutOfRange {
        literal: literal.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [IntDecoding; 4] = [
        IntDecoding::Default,
        IntDecoding::Safe,
        IntDecoding::Mixed,
        IntDecoding::Bigint,
    ];

    fn ok<T>(r: Result<T, DecodeError>) -> T {
        match r {
            Ok(v) => v,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    fn err<T: std::fmt::Debug>(r: Result<T, DecodeError>) -> DecodeError {
        match r {
            Ok(v) => panic!("expected error, got {v:?}"),
            Err(err) => err,
        }
    }

    fn big(s: &str) -> BigInt {
        match s.parse() {
            Ok(v) => v,
            Err(err) => panic!("bad bigint literal {s}: {err}"),
        }
    }

    #[test]
    fn amount_example_under_each_policy() {
        let text = r#"{"amount": 18446744073709551615}"#;

        let v = ok(decode(text, IntDecoding::Bigint));
        assert_eq!(
            v,
            Value::object([("amount", Value::BigInt(big("18446744073709551615")))])
        );

        let v = ok(decode(text, IntDecoding::Mixed));
        assert_eq!(v.get("amount"), Some(&Value::BigInt(big("18446744073709551615"))));

        let e = err(decode(text, IntDecoding::Safe));
        assert_eq!(
            e,
            DecodeError::PrecisionLoss {
                literal: "18446744073709551615".to_string()
            }
        );

        let v = ok(decode(text, IntDecoding::Default));
        assert_eq!(v.get("amount"), Some(&Value::Number(18446744073709551615.0)));
    }

    #[test]
    fn threshold_is_inclusive() {
        for policy in [IntDecoding::Default, IntDecoding::Safe, IntDecoding::Mixed] {
            let v = ok(decode("9007199254740991", policy));
            assert_eq!(v, Value::Number(9007199254740991.0), "{policy}");
            let v = ok(decode("-9007199254740991", policy));
            assert_eq!(v, Value::Number(-9007199254740991.0), "{policy}");
        }

        assert_eq!(
            err(decode("9007199254740992", IntDecoding::Safe)).kind(),
            DecodeErrorKind::PrecisionLoss
        );
        assert_eq!(
            ok(decode("9007199254740992", IntDecoding::Mixed)),
            Value::BigInt(big("9007199254740992"))
        );
    }

    #[test]
    fn mixed_and_safe_judge_magnitude_not_sign() {
        assert_eq!(
            ok(decode("-9007199254740993", IntDecoding::Mixed)),
            Value::BigInt(big("-9007199254740993"))
        );
        assert!(matches!(
            decode("-9007199254740993", IntDecoding::Safe),
            Err(DecodeError::PrecisionLoss { literal }) if literal == "-9007199254740993"
        ));
    }

    #[test]
    fn bigint_applies_to_small_integers_too() {
        let v = ok(decode(r#"{"round": 7, "ids": [0, -1]}"#, IntDecoding::Bigint));
        assert_eq!(
            v,
            Value::object([
                ("round", Value::BigInt(BigInt::from(7))),
                (
                    "ids",
                    Value::Array(vec![
                        Value::BigInt(BigInt::from(0)),
                        Value::BigInt(BigInt::from(-1))
                    ])
                ),
            ])
        );
    }

    #[test]
    fn floats_stay_numbers_except_integral_under_bigint() {
        for policy in [IntDecoding::Default, IntDecoding::Safe, IntDecoding::Mixed] {
            assert_eq!(ok(decode("1.5", policy)), Value::Number(1.5));
            assert_eq!(ok(decode("1e3", policy)), Value::Number(1000.0));
        }
        assert_eq!(ok(decode("1.5", IntDecoding::Bigint)), Value::Number(1.5));
        assert_eq!(
            ok(decode("1e3", IntDecoding::Bigint)),
            Value::BigInt(BigInt::from(1000))
        );
        assert_eq!(
            ok(decode("2.0", IntDecoding::Bigint)),
            Value::BigInt(BigInt::from(2))
        );
    }

    #[test]
    fn integral_fraction_literals_are_never_rounded() {
        for literal in ["9007199254740993.0", "18446744073709551615.0", "18446744073709551615e0"] {
            assert_eq!(
                err(decode(literal, IntDecoding::Safe)),
                DecodeError::PrecisionLoss {
                    literal: literal.to_string()
                },
                "{literal}"
            );
        }

        assert_eq!(
            ok(decode("9007199254740993.0", IntDecoding::Bigint)),
            Value::BigInt(big("9007199254740993"))
        );
        assert_eq!(
            ok(decode("18446744073709551615e0", IntDecoding::Bigint)),
            Value::BigInt(big("18446744073709551615"))
        );
        assert_eq!(
            ok(decode("18446744073709551615.0", IntDecoding::Mixed)),
            Value::BigInt(big("18446744073709551615"))
        );
        assert_eq!(
            ok(decode("-1844674407370955161.5E1", IntDecoding::Mixed)),
            Value::BigInt(big("-18446744073709551615"))
        );

        assert_eq!(
            ok(decode("18446744073709551615.0", IntDecoding::Default)),
            Value::Number(18446744073709551615.0)
        );
    }

    #[test]
    fn integral_fraction_literals_in_safe_range_stay_numbers() {
        for policy in [IntDecoding::Default, IntDecoding::Safe, IntDecoding::Mixed] {
            assert_eq!(ok(decode("9007199254740991.0", policy)), Value::Number(9007199254740991.0));
            assert_eq!(ok(decode("1500e-2", policy)), Value::Number(15.0));
        }
        assert_eq!(
            ok(decode("1500e-2", IntDecoding::Bigint)),
            Value::BigInt(BigInt::from(15))
        );
        assert_eq!(ok(decode("-0.0", IntDecoding::Bigint)), Value::BigInt(BigInt::from(0)));
        assert_eq!(ok(decode("1.25e-1", IntDecoding::Bigint)), Value::Number(0.125));
        assert_eq!(ok(decode("1e-400", IntDecoding::Safe)), Value::Number(0.0));
    }

    #[test]
    fn exact_integer_reads_decimal_value() {
        assert_eq!(exact_integer("12.340e2"), Exact::Integer("1234".to_string()));
        assert_eq!(exact_integer("-7E+3"), Exact::Integer("-7000".to_string()));
        assert_eq!(exact_integer("0.000"), Exact::Integer("0".to_string()));
        assert_eq!(exact_integer("120e-1"), Exact::Integer("12".to_string()));
        assert_eq!(exact_integer("120e-2"), Exact::Fraction);
        assert_eq!(exact_integer("0.5"), Exact::Fraction);
        assert_eq!(exact_integer("1e99999999999999999999"), Exact::Huge);
        assert_eq!(exact_integer("1e-99999999999999999999"), Exact::Fraction);
        assert_eq!(exact_integer("1e5000"), Exact::Huge);
    }

    #[test]
    fn out_of_f64_range_literals_follow_policy() {
        assert_eq!(
            err(decode("[1e400]", IntDecoding::Default)).kind(),
            DecodeErrorKind::NumberOutOfRange
        );
        assert_eq!(
            err(decode("[1e400]", IntDecoding::Safe)).kind(),
            DecodeErrorKind::PrecisionLoss
        );
        let exact = Value::BigInt(big(&format!("1{}", "0".repeat(400))));
        assert_eq!(ok(decode("1e400", IntDecoding::Mixed)), exact);
        assert_eq!(ok(decode("1e400", IntDecoding::Bigint)), exact);

        for policy in [IntDecoding::Default, IntDecoding::Mixed, IntDecoding::Bigint] {
            let e = err(decode("1e5000", policy));
            assert_eq!(e.kind(), DecodeErrorKind::NumberOutOfRange, "{policy}");
        }
        assert_eq!(
            err(decode("1e5000", IntDecoding::Safe)).kind(),
            DecodeErrorKind::PrecisionLoss
        );
    }

    #[test]
    fn default_rejects_integers_beyond_f64_range() {
        let literal = format!("1{}", "0".repeat(400));
        assert_eq!(
            err(decode(&literal, IntDecoding::Default)).kind(),
            DecodeErrorKind::NumberOutOfRange
        );
        let v = ok(decode(&literal, IntDecoding::Bigint));
        assert_eq!(v, Value::BigInt(big(&literal)));
    }

    #[test]
    fn malformed_text_fails_under_every_policy() {
        for policy in ALL {
            for text in ["{", "", "[1,]", r#"{"a" 1}"#, "nul", "01"] {
                let e = err(decode(text, policy));
                assert_eq!(e.kind(), DecodeErrorKind::Syntax, "{policy}: {text:?}");
            }
        }
    }

    #[test]
    fn syntax_errors_carry_position() {
        let e = err(decode("{\n  \"a\": ?\n}", IntDecoding::Default));
        let DecodeError::Syntax { line, column, .. } = e else {
            panic!("expected syntax error, got {e:?}");
        };
        assert_eq!(line, 2);
        assert!(column > 0);
    }

    #[test]
    fn syntax_error_is_reported_even_after_oversized_integer() {
        // The whole text must be well-formed before any value is produced.
        let e = err(decode("[18446744073709551615, ", IntDecoding::Safe));
        assert_eq!(e.kind(), DecodeErrorKind::Syntax);
    }

    #[test]
    fn object_members_keep_wire_order_and_last_duplicate_wins() {
        let v = ok(decode(r#"{"z": 1, "a": 2, "z": 3}"#, IntDecoding::Default));
        let Value::Object(map) = v else {
            panic!("expected object");
        };
        let entries: Vec<(&str, &Value)> = map.iter().map(|(k, v)| (k.as_ref(), v)).collect();
        assert_eq!(
            entries,
            [("z", &Value::Number(3.0)), ("a", &Value::Number(2.0))]
        );
    }

    #[test]
    fn non_numeric_nodes_pass_through() {
        let v = ok(decode(
            r#"{"s": "xé", "b": false, "n": null, "nested": {"list": []}}"#,
            IntDecoding::Safe,
        ));
        assert_eq!(
            v,
            Value::object([
                ("s", Value::from("xé")),
                ("b", Value::Bool(false)),
                ("n", Value::Null),
                ("nested", Value::object([("list", Value::Array(Vec::new()))])),
            ])
        );
    }

    #[test]
    fn decode_slice_matches_decode() {
        let text = r#"{"total-money": 10000000000000000000}"#;
        assert_eq!(
            ok(decode_slice(text.as_bytes(), IntDecoding::Mixed)),
            ok(decode(text, IntDecoding::Mixed))
        );
        assert_eq!(
            err(decode_slice(b"\"\xff\"", IntDecoding::Mixed)).kind(),
            DecodeErrorKind::Syntax
        );
    }

    #[test]
    fn decode_default_uses_default_policy() {
        assert_eq!(
            ok(decode_default("18446744073709551615")),
            Value::Number(18446744073709551615.0)
        );
    }

    #[test]
    fn repeated_calls_are_independent_of_previous_policy() {
        let text = "18446744073709551615";
        let first = ok(decode(text, IntDecoding::Bigint));
        assert!(decode(text, IntDecoding::Safe).is_err());
        assert_eq!(ok(decode(text, IntDecoding::Bigint)), first);
    }
}
